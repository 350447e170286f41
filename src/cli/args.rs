//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::lint::OutputFormat;

/// ignition-lint - Lint Ignition Perspective views.
#[derive(Debug, Parser)]
#[command(name = "ignition-lint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to rule config file (overrides ./rule_config.json)
    #[arg(short, long, global = true, env = "IGNITION_LINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Lint arguments when no subcommand is given
    #[command(flatten)]
    pub lint: LintArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lint view files (default if no command specified)
    Lint(LintArgs),

    /// List built-in rules
    Rules(RulesArgs),

    /// Print the JSON Schema of the rule config file
    Schema,
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// View files or directories to lint (default: current directory)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// File name patterns to look for in directories (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "view.json")]
    pub files: Vec<String>,

    /// Print model statistics instead of linting
    #[arg(long)]
    pub stats_only: bool,

    /// Print the nodes of the given types (`--debug-nodes=component,property`, default all)
    #[arg(
        long,
        value_name = "TYPES",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "all"
    )]
    pub debug_nodes: Option<String>,

    /// Print how many nodes each rule will visit
    #[arg(long)]
    pub analyze_rules: bool,
}

/// Arguments for the `rules` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RulesArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}
