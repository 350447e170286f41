//! Rule engine.
//!
//! The [`LintEngine`] owns the configured rules and runs them over a view's
//! node model, collecting per-rule warnings and errors.

use indexmap::IndexMap;

use super::diagnostic::LintDiagnostic;
use super::rule::{LintRule, Severity};
use super::stats::ModelStatistics;
use crate::model::{build_model, Node, ViewModel};
use crate::view::FlatMap;

/// Diagnostics from one document, keyed by rule name.
///
/// Rules with no findings of a severity have no entry in that map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintResults {
    pub warnings: IndexMap<String, Vec<LintDiagnostic>>,
    pub errors: IndexMap<String, Vec<LintDiagnostic>>,
}

impl LintResults {
    /// Add a rule's diagnostics, splitting them by severity.
    pub fn extend(&mut self, rule: &str, diagnostics: Vec<LintDiagnostic>) {
        for diagnostic in diagnostics {
            let bucket = match diagnostic.severity {
                Severity::Warning => &mut self.warnings,
                Severity::Error => &mut self.errors,
            };
            bucket.entry(rule.to_string()).or_default().push(diagnostic);
        }
    }

    /// Total number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    /// Total number of errors.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Check if any rule reported an error.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Check if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Warnings as `rule → [text]`.
    pub fn warning_texts(&self) -> IndexMap<String, Vec<String>> {
        as_texts(&self.warnings)
    }

    /// Errors as `rule → [text]`.
    pub fn error_texts(&self) -> IndexMap<String, Vec<String>> {
        as_texts(&self.errors)
    }
}

fn as_texts(map: &IndexMap<String, Vec<LintDiagnostic>>) -> IndexMap<String, Vec<String>> {
    map.iter()
        .map(|(rule, diags)| (rule.clone(), diags.iter().map(|d| d.to_string()).collect()))
        .collect()
}

/// Runs configured rules over view models.
#[derive(Default)]
pub struct LintEngine {
    rules: Vec<Box<dyn LintRule>>,
}

impl LintEngine {
    /// Create an engine with the given rules, run in order.
    pub fn new(rules: Vec<Box<dyn LintRule>>) -> Self {
        Self { rules }
    }

    /// The configured rules.
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Build the model for `flat` and run every rule over it.
    pub fn lint(&mut self, flat: &FlatMap) -> LintResults {
        let model = build_model(flat);
        self.process(model.nodes(), flat)
    }

    /// Run every rule over `nodes`.
    ///
    /// Each rule is reset, visited by the nodes it targets in the given
    /// order, then post-processed against the flat map.
    pub fn process(&mut self, nodes: &[Node], flat: &FlatMap) -> LintResults {
        let mut results = LintResults::default();

        for rule in &mut self.rules {
            rule.reset();

            let applicable: Vec<&Node> = nodes
                .iter()
                .filter(|n| n.applies_to(rule.target_types()))
                .collect();
            tracing::debug!("Running {} over {} node(s)", rule.id(), applicable.len());

            for node in applicable {
                node.accept(rule.as_mut());
            }
            rule.post_process(flat);

            let diagnostics = rule.take_diagnostics();
            results.extend(&rule.id().0, diagnostics);
        }

        results
    }

    /// Describe a model and how the configured rules cover it.
    pub fn statistics(&self, model: &ViewModel) -> ModelStatistics {
        ModelStatistics::collect(model, &self.rules)
    }
}
