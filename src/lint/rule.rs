//! Lint rule definitions.
//!
//! This module provides the core traits and types for defining lint rules:
//!
//! - [`LintRule`] - The trait that all lint rules must implement
//! - [`RuleId`] - Unique identifier for a lint rule
//! - [`Severity`] - Severity level for diagnostics (Warning, Error)

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::diagnostic::LintDiagnostic;
use crate::model::{NodeType, Visitor};
use crate::view::FlatMap;

/// Unique identifier for a lint rule.
///
/// This is the name rules are configured under, e.g. `NamePatternRule`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleId(pub String);

impl RuleId {
    /// Create a new rule ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity level for lint diagnostics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Style or recommendation; never fails a run.
    #[default]
    Warning,
    /// Functional problem; fails the run.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A lint rule over the view node model.
///
/// The engine resets the rule, feeds it every node whose type is in
/// [`LintRule::target_types`] through the [`Visitor`] methods, calls
/// [`LintRule::post_process`] once, then collects its diagnostics. Rules
/// accumulate state between those calls and must clear it in `reset`.
pub trait LintRule: Visitor + Send + Sync {
    /// Unique identifier for this rule.
    fn id(&self) -> RuleId;

    /// Description of what this rule checks.
    fn description(&self) -> &str;

    /// Node types this rule visits. Empty means every node.
    fn target_types(&self) -> &BTreeSet<NodeType>;

    /// The rule's diagnostic buffer.
    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic>;

    /// Clear state from a previous document.
    fn reset(&mut self) {
        self.diagnostics_mut().clear();
    }

    /// Second pass after every node has been visited.
    fn post_process(&mut self, _flat: &FlatMap) {}

    /// Record a diagnostic.
    fn report(&mut self, diagnostic: LintDiagnostic) {
        self.diagnostics_mut().push(diagnostic);
    }

    /// Drain the diagnostics recorded since the last reset.
    fn take_diagnostics(&mut self) -> Vec<LintDiagnostic> {
        std::mem::take(self.diagnostics_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_equality() {
        let id1 = RuleId::new("NamePatternRule");
        let id2 = RuleId::new("NamePatternRule");
        let id3 = RuleId::new("PollingIntervalRule");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn rule_id_display() {
        let id = RuleId::new("PollingIntervalRule");
        assert_eq!(format!("{}", id), "PollingIntervalRule");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Error), "error");
    }

    #[test]
    fn severity_deserializes_lowercase() {
        let severity: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(severity, Severity::Error);
        assert!(serde_json::from_str::<Severity>("\"fatal\"").is_err());
    }
}
