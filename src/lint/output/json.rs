//! JSON output formatter.
//!
//! Formats lint results as machine-readable JSON: per file, the warnings
//! and errors keyed by rule name.

use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;

use super::{FileReport, LintFormatter, Summary};
use crate::lint::ModelStatistics;
use crate::model::Node;

/// Formats lint output as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
    summary: Summary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file: String,
    warnings: IndexMap<String, Vec<String>>,
    errors: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<&'a [Node]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<&'a ModelStatistics>,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LintFormatter for JsonFormatter {
    fn format<W: Write>(&self, reports: &[FileReport], writer: &mut W) -> std::io::Result<()> {
        let files = reports
            .iter()
            .map(|report| JsonFile {
                file: report.file.display().to_string(),
                warnings: report.results.warning_texts(),
                errors: report.results.error_texts(),
                error: report.error.as_deref(),
                nodes: report.nodes.as_deref(),
                statistics: report.statistics.as_ref(),
            })
            .collect();

        let output = JsonOutput {
            files,
            summary: Summary::of(reports),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{LintDiagnostic, LintResults, RuleId, Severity};
    use serde_json::{json, Value};

    fn render(reports: &[FileReport]) -> Value {
        let mut output = Vec::new();
        JsonFormatter::new().format(reports, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn outputs_rule_keyed_texts() {
        let mut results = LintResults::default();
        results.extend(
            "UnusedCustomPropertiesRule",
            vec![LintDiagnostic::new(
                RuleId::new("UnusedCustomPropertiesRule"),
                Severity::Error,
                "custom.unusedProp",
                "custom property 'unusedProp' is defined but never referenced",
            )],
        );

        let parsed = render(&[FileReport::linted("view.json", results)]);

        assert_eq!(parsed["files"][0]["file"], "view.json");
        assert_eq!(
            parsed["files"][0]["errors"]["UnusedCustomPropertiesRule"],
            json!(["custom.unusedProp: custom property 'unusedProp' is defined but never referenced"])
        );
        assert_eq!(parsed["files"][0]["warnings"], json!({}));
        assert!(parsed["files"][0].get("error").is_none());
        assert_eq!(parsed["summary"], json!({ "files": 1, "errors": 1, "warnings": 0 }));
    }

    #[test]
    fn outputs_input_errors() {
        let parsed = render(&[FileReport::failed("missing/view.json", "View not found")]);

        assert_eq!(parsed["files"][0]["error"], "View not found");
        assert_eq!(parsed["summary"]["errors"], 1);
    }

    #[test]
    fn outputs_empty_run() {
        let parsed = render(&[]);

        assert_eq!(parsed["files"], json!([]));
        assert_eq!(parsed["summary"]["files"], 0);
    }
}
