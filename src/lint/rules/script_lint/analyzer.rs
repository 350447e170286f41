//! External script analysis.
//!
//! [`PylintAnalyzer`] runs pylint once over a combined source file and
//! parses its text report. Tests substitute their own [`ScriptAnalyzer`].

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::Context;
use regex::Regex;

use crate::error::{LintError, Result};

/// Checks run when none are configured.
pub const DEFAULT_CHECKS: [&str; 3] = ["unused-import", "undefined-variable", "syntax-error"];

/// `file:line:col: category: message`
static MESSAGE_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*):(\d+):(\d+): ([^:]+): (.+)$").expect("MESSAGE_LINE_REGEX must compile")
});

/// pylint exit status bits for a fatal message and a usage error.
const FATAL_STATUS_BITS: i32 = 1 | 32;

/// One diagnostic reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerMessage {
    /// 1-based line in the analyzed source.
    pub line: usize,
    pub column: usize,
    /// Message id or category, e.g. `E0602`.
    pub category: String,
    pub message: String,
}

/// Parsed analyzer report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerOutput {
    pub messages: Vec<AnalyzerMessage>,
    /// Report lines that looked like neither a message nor report chrome.
    pub unparsed: Vec<String>,
    /// The report as produced.
    pub raw: String,
}

/// Static analysis over a single source unit.
pub trait ScriptAnalyzer: Send + Sync {
    /// Analyze `source`, returning every reported message.
    fn analyze(&self, source: &str) -> Result<AnalyzerOutput>;
}

/// Parse a pylint text report.
pub fn parse_output(raw: &str) -> AnalyzerOutput {
    let mut output = AnalyzerOutput {
        raw: raw.to_string(),
        ..Default::default()
    };

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_report_chrome(trimmed) {
            continue;
        }

        let parsed = MESSAGE_LINE_REGEX.captures(trimmed).and_then(|caps| {
            Some(AnalyzerMessage {
                line: caps[2].parse().ok()?,
                column: caps[3].parse().ok()?,
                category: caps[4].trim().to_string(),
                message: caps[5].trim().to_string(),
            })
        });
        match parsed {
            Some(message) => output.messages.push(message),
            None => output.unparsed.push(line.to_string()),
        }
    }

    output
}

/// Module banners, separators and score lines.
fn is_report_chrome(line: &str) -> bool {
    line.starts_with("*************")
        || line.starts_with("---")
        || line.starts_with("Your code has been rated")
}

/// Runs pylint as a subprocess.
#[derive(Debug, Clone)]
pub struct PylintAnalyzer {
    command: String,
    enabled_checks: Vec<String>,
}

impl PylintAnalyzer {
    /// Create an analyzer that runs `command` with `enabled_checks`.
    pub fn new(command: impl Into<String>, enabled_checks: Vec<String>) -> Self {
        Self {
            command: command.into(),
            enabled_checks,
        }
    }

    /// Arguments for one run over `file`.
    pub fn args(&self, file: &Path) -> Vec<String> {
        vec![
            "--disable=all".to_string(),
            format!("--enable={}", self.enabled_checks.join(",")),
            "--output-format=text".to_string(),
            "--score=no".to_string(),
            file.display().to_string(),
        ]
    }
}

impl Default for PylintAnalyzer {
    fn default() -> Self {
        Self::new(
            "pylint",
            DEFAULT_CHECKS.iter().map(|c| c.to_string()).collect(),
        )
    }
}

impl ScriptAnalyzer for PylintAnalyzer {
    fn analyze(&self, source: &str) -> Result<AnalyzerOutput> {
        let mut file = tempfile::Builder::new()
            .prefix("ignition_lint_")
            .suffix(".py")
            .tempfile()
            .context("Failed to create temporary script file")?;
        file.write_all(source.as_bytes())
            .and_then(|_| file.flush())
            .context("Failed to write temporary script file")?;

        let args = self.args(file.path());
        tracing::debug!("Running {} {}", self.command, args.join(" "));

        let start = Instant::now();
        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.command))?;
        tracing::debug!("{} finished in {:?}", self.command, start.elapsed());

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        tracing::debug!("{} output:\n{}", self.command, stdout);

        match output.status.code() {
            Some(code) if code & FATAL_STATUS_BITS == 0 => Ok(parse_output(&stdout)),
            Some(code) => Err(LintError::AnalyzerFailed {
                message: format!(
                    "'{}' exited with status {}: {}",
                    self.command,
                    code,
                    stderr.trim()
                ),
            }),
            None => Err(LintError::AnalyzerFailed {
                message: format!("'{}' was terminated by a signal", self.command),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pylint_text_report() {
        let raw = "************* Module combined\n\
                   /tmp/x.py:9:4: E0602: Undefined variable 'foo' (undefined-variable)\n\
                   /tmp/x.py:3:0: W0611: Unused import os (unused-import)\n";
        let output = parse_output(raw);

        assert!(output.unparsed.is_empty());
        assert_eq!(
            output.messages,
            vec![
                AnalyzerMessage {
                    line: 9,
                    column: 4,
                    category: "E0602".into(),
                    message: "Undefined variable 'foo' (undefined-variable)".into(),
                },
                AnalyzerMessage {
                    line: 3,
                    column: 0,
                    category: "W0611".into(),
                    message: "Unused import os (unused-import)".into(),
                },
            ]
        );
    }

    #[test]
    fn windows_paths_parse() {
        let output = parse_output(r"C:\tmp\x.py:12:0: E0001: Parsing failed: 'invalid syntax' (syntax-error)");
        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].line, 12);
    }

    #[test]
    fn keeps_unrecognized_lines() {
        let output = parse_output("something went sideways\n\n");
        assert!(output.messages.is_empty());
        assert_eq!(output.unparsed, vec!["something went sideways"]);
    }

    #[test]
    fn builds_narrow_argument_list() {
        let args = PylintAnalyzer::default().args(Path::new("combined.py"));
        assert_eq!(
            args,
            vec![
                "--disable=all",
                "--enable=unused-import,undefined-variable,syntax-error",
                "--output-format=text",
                "--score=no",
                "combined.py",
            ]
        );
    }

    #[test]
    fn missing_command_is_an_error() {
        let analyzer = PylintAnalyzer::new("ignition-lint-no-such-analyzer", vec![]);
        assert!(analyzer.analyze("x = 1\n").is_err());
    }
}
