//! Human-readable output formatter.
//!
//! Formats lint results for terminal display with optional color support.

use std::io::Write;

use indexmap::IndexMap;

use super::{FileReport, LintFormatter, Summary};
use crate::lint::{LintDiagnostic, Severity};
use crate::ui::LintTheme;

/// Formats lint output for human consumption.
pub struct HumanFormatter {
    theme: LintTheme,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool) -> Self {
        Self {
            theme: if use_color {
                LintTheme::new()
            } else {
                LintTheme::plain()
            },
        }
    }

    fn write_group<W: Write>(
        &self,
        group: &IndexMap<String, Vec<LintDiagnostic>>,
        writer: &mut W,
    ) -> std::io::Result<()> {
        for (rule, diagnostics) in group {
            for diag in diagnostics {
                let severity = match diag.severity {
                    Severity::Warning => self.theme.warning.apply_to("warning"),
                    Severity::Error => self.theme.error.apply_to("error"),
                };
                writeln!(
                    writer,
                    "  {}[{}]: {}: {}",
                    severity,
                    rule,
                    self.theme.dim.apply_to(&diag.path),
                    diag.message
                )?;

                if let Some(ref suggestion) = diag.suggestion {
                    writeln!(
                        writer,
                        "     = help: did you mean '{}'?",
                        self.theme.hint.apply_to(suggestion)
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl LintFormatter for HumanFormatter {
    fn format<W: Write>(&self, reports: &[FileReport], writer: &mut W) -> std::io::Result<()> {
        for report in reports {
            writeln!(
                writer,
                "{}",
                self.theme.header.apply_to(report.file.display())
            )?;

            if let Some(ref error) = report.error {
                writeln!(writer, "  {}: {}", self.theme.error.apply_to("error"), error)?;
            } else if report.results.is_empty() {
                writeln!(writer, "  {}", self.theme.success.apply_to("no issues"))?;
            } else {
                self.write_group(&report.results.warnings, writer)?;
                self.write_group(&report.results.errors, writer)?;
            }

            writeln!(writer)?;
        }

        let summary = Summary::of(reports);
        let line = format!(
            "Found {} error(s) and {} warning(s) in {} file(s)",
            summary.errors, summary.warnings, summary.files
        );
        let style = if summary.errors > 0 {
            &self.theme.error
        } else if summary.warnings > 0 {
            &self.theme.warning
        } else {
            &self.theme.success
        };
        writeln!(writer, "{}", style.apply_to(line))?;

        Ok(())
    }
}
