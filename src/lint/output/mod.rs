//! Lint output formatters.
//!
//! This module provides formatters for outputting lint results
//! in different formats (human-readable, JSON).

pub mod human;
pub mod json;

use std::io::Write;
use std::path::PathBuf;

use crate::lint::{LintResults, ModelStatistics};
use crate::model::Node;

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// The outcome of linting one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileReport {
    pub file: PathBuf,
    pub results: LintResults,
    /// Set when the file could not be read or parsed.
    pub error: Option<String>,
    /// Nodes selected by `--debug-nodes`.
    pub nodes: Option<Vec<Node>>,
    /// Model statistics from `--stats-only` or `--analyze-rules`.
    pub statistics: Option<ModelStatistics>,
}

impl FileReport {
    /// A file that was linted.
    pub fn linted(file: impl Into<PathBuf>, results: LintResults) -> Self {
        Self {
            file: file.into(),
            results,
            ..Default::default()
        }
    }

    /// A file that could not be linted.
    pub fn failed(file: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Attach the nodes dumped for this file.
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Attach model statistics for this file.
    pub fn with_statistics(mut self, statistics: ModelStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Lint errors, counting an input error as one.
    pub fn error_count(&self) -> usize {
        self.results.error_count() + usize::from(self.error.is_some())
    }

    pub fn warning_count(&self) -> usize {
        self.results.warning_count()
    }

    /// Check if this file fails the run.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Totals across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    /// Sum the counts of `reports`.
    pub fn of(reports: &[FileReport]) -> Self {
        Self {
            files: reports.len(),
            errors: reports.iter().map(FileReport::error_count).sum(),
            warnings: reports.iter().map(FileReport::warning_count).sum(),
        }
    }
}

/// Trait for formatting lint output.
pub trait LintFormatter {
    /// Format the reports of a run to the given writer.
    fn format<W: Write>(&self, reports: &[FileReport], writer: &mut W) -> std::io::Result<()>;
}

pub use human::HumanFormatter;
pub use json::JsonFormatter;
