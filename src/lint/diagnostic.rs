//! Lint diagnostic messages.
//!
//! A [`LintDiagnostic`] is located by the flattened path of the node that
//! produced it. Its display form, `<path>: <message>`, is the text reported
//! per rule.

use std::fmt;

use super::rule::{RuleId, Severity};

/// A diagnostic message produced by a lint rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The rule that produced this diagnostic.
    pub rule_id: RuleId,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Path of the offending node.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Optional replacement suggestion.
    pub suggestion: Option<String>,
}

impl LintDiagnostic {
    /// Create a new diagnostic.
    pub fn new(
        rule_id: RuleId,
        severity: Severity,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a replacement suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: '{}')", suggestion)?;
        }
        Ok(())
    }
}
