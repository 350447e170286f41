//! Rule: scripts and expressions must not walk the component tree.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lint::rule::{LintRule, RuleId, Severity};
use crate::lint::LintDiagnostic;
use crate::model::{ExpressionBinding, NodeType, ScriptNode, Visitor};

use super::parse_kwargs;

/// Configured rule name.
pub const RULE_NAME: &str = "BadComponentReferenceRule";

const DEFAULT_PATTERNS: [&str; 14] = [
    ".getSibling(",
    ".getParent(",
    ".getChild(",
    ".getChildren(",
    "self.parent.",
    "self.children.",
    "self.parent)",
    "self.children)",
    "self.parent,",
    "self.children,",
    "self.parent\n",
    "self.children\n",
    "self.parent\r",
    "self.children\r",
];

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Settings for [`BadComponentReferenceRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct BadComponentReferenceConfig {
    /// Substrings that indicate component tree traversal.
    pub forbidden_patterns: Vec<String>,
    /// Match patterns case-sensitively.
    pub case_sensitive: bool,
    /// Severity of a violation.
    pub severity: Severity,
}

impl Default for BadComponentReferenceConfig {
    fn default() -> Self {
        Self {
            forbidden_patterns: default_patterns(),
            case_sensitive: true,
            severity: Severity::Error,
        }
    }
}

/// Flags `getSibling`/`parent`/`children` style traversal in scripts and expressions.
pub struct BadComponentReferenceRule {
    config: BadComponentReferenceConfig,
    /// Patterns in the form they are matched against.
    match_patterns: Vec<String>,
    targets: BTreeSet<NodeType>,
    diagnostics: Vec<LintDiagnostic>,
}

impl BadComponentReferenceRule {
    /// Create the rule.
    pub fn new(config: BadComponentReferenceConfig) -> Self {
        let match_patterns = if config.case_sensitive {
            config.forbidden_patterns.clone()
        } else {
            config
                .forbidden_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect()
        };
        let targets = NodeType::SCRIPTS
            .into_iter()
            .chain(std::iter::once(NodeType::ExpressionBinding))
            .collect();

        Self {
            config,
            match_patterns,
            targets,
            diagnostics: Vec::new(),
        }
    }

    /// Create the rule from configuration kwargs.
    pub fn from_kwargs(kwargs: &Value) -> Result<Self> {
        Ok(Self::new(parse_kwargs(RULE_NAME, kwargs)?))
    }

    /// Configured patterns found in `content`, in configuration order.
    pub fn find_patterns(&self, content: &str) -> Vec<&str> {
        let haystack = if self.config.case_sensitive {
            content.to_string()
        } else {
            content.to_lowercase()
        };

        self.match_patterns
            .iter()
            .zip(&self.config.forbidden_patterns)
            .filter(|(needle, _)| !needle.is_empty() && haystack.contains(needle.as_str()))
            .map(|(_, original)| original.as_str())
            .collect()
    }

    fn check(&mut self, path: &str, content: &str, kind: &str) {
        if content.is_empty() {
            return;
        }
        let found = self.find_patterns(content);
        let Some(first) = found.first() else {
            return;
        };

        let first = first.escape_debug().to_string();
        let described = match found.len() {
            1 => format!("'{}'", first),
            n => format!(
                "'{}' and {} other object traversal pattern(s)",
                first,
                n - 1
            ),
        };
        let message = format!(
            "{} contains {} which creates brittle view structure dependencies. \
             Consider using view.custom properties or message handling for \
             component communication instead.",
            kind, described
        );
        self.report(LintDiagnostic::new(
            self.id(),
            self.config.severity,
            path,
            message,
        ));
    }
}

impl Default for BadComponentReferenceRule {
    fn default() -> Self {
        Self::new(BadComponentReferenceConfig::default())
    }
}

impl Visitor for BadComponentReferenceRule {
    fn visit_expression_binding(&mut self, binding: &ExpressionBinding) {
        self.check(&binding.path, &binding.expression, "Expression");
    }

    fn visit_script(&mut self, script: &dyn ScriptNode) {
        self.check(script.path(), script.script(), "Script");
    }
}

impl LintRule for BadComponentReferenceRule {
    fn id(&self) -> RuleId {
        RuleId::new(RULE_NAME)
    }

    fn description(&self) -> &str {
        "Scripts and expressions must not navigate the component tree with getSibling, parent or children"
    }

    fn target_types(&self) -> &BTreeSet<NodeType> {
        &self.targets
    }

    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
        &mut self.diagnostics
    }
}
