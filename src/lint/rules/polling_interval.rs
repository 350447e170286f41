//! Rule: expressions must not poll faster than a configured minimum.
//!
//! `now()` re-evaluates its expression on a timer. With no argument it runs
//! as fast as possible; with a small argument it runs almost as often. An
//! argument of exactly `0` evaluates once and is allowed.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lint::rule::{LintRule, RuleId, Severity};
use crate::lint::LintDiagnostic;
use crate::model::{ExpressionBinding, NodeType, TagBinding, TagMode, Visitor};

use super::parse_kwargs;

/// Configured rule name.
pub const RULE_NAME: &str = "PollingIntervalRule";

const DEFAULT_MINIMUM_INTERVAL: u64 = 10_000;

static NOW_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"now\s*\(\s*(\d*)\s*\)").expect("NOW_CALL_REGEX must compile")
});

static NOW_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"now\s*\(").expect("NOW_OPEN_REGEX must compile"));

/// Settings for [`PollingIntervalRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PollingIntervalConfig {
    /// Smallest allowed `now()` interval in milliseconds.
    #[serde(alias = "min_interval")]
    pub minimum_interval: u64,
    /// Severity of a violation.
    pub severity: Severity,
}

impl Default for PollingIntervalConfig {
    fn default() -> Self {
        Self {
            minimum_interval: DEFAULT_MINIMUM_INTERVAL,
            severity: Severity::Error,
        }
    }
}

/// What is wrong with a polling call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingProblem {
    /// `now()` with no interval.
    MissingInterval,
    /// A literal interval under the minimum.
    BelowMinimum(u64),
    /// An interval that is not a literal number.
    NonLiteralInterval,
}

/// Check an expression's `now(...)` calls against `minimum`.
pub fn check_polling(expression: &str, minimum: u64) -> Option<PollingProblem> {
    let mut literal_calls = 0;

    for caps in NOW_CALL_REGEX.captures_iter(expression) {
        literal_calls += 1;
        let argument = &caps[1];
        if argument.is_empty() {
            return Some(PollingProblem::MissingInterval);
        }
        // Digits too long for u64 are far above any minimum.
        if let Ok(interval) = argument.parse::<u64>() {
            if interval > 0 && interval < minimum {
                return Some(PollingProblem::BelowMinimum(interval));
            }
        }
    }

    if NOW_OPEN_REGEX.find_iter(expression).count() > literal_calls {
        return Some(PollingProblem::NonLiteralInterval);
    }
    None
}

/// Flags bindings whose expressions poll too often.
pub struct PollingIntervalRule {
    config: PollingIntervalConfig,
    targets: BTreeSet<NodeType>,
    diagnostics: Vec<LintDiagnostic>,
}

impl PollingIntervalRule {
    /// Create the rule.
    pub fn new(config: PollingIntervalConfig) -> Self {
        Self {
            config,
            targets: NodeType::BINDINGS.into_iter().collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Create the rule from configuration kwargs.
    pub fn from_kwargs(kwargs: &Value) -> Result<Self> {
        Ok(Self::new(parse_kwargs(RULE_NAME, kwargs)?))
    }

    fn check(&mut self, path: &str, expression: &str) {
        let minimum = self.config.minimum_interval;
        let Some(problem) = check_polling(expression, minimum) else {
            return;
        };

        let message = match problem {
            PollingProblem::MissingInterval => format!(
                "'{}' calls now() without an interval and polls continuously",
                expression
            ),
            PollingProblem::BelowMinimum(interval) => format!(
                "'{}' polls every {}ms, below the minimum of {}ms",
                expression, interval, minimum
            ),
            PollingProblem::NonLiteralInterval => format!(
                "'{}' calls now() with an interval that is not a literal number",
                expression
            ),
        };
        self.report(LintDiagnostic::new(
            self.id(),
            self.config.severity,
            path,
            message,
        ));
    }
}

impl Default for PollingIntervalRule {
    fn default() -> Self {
        Self::new(PollingIntervalConfig::default())
    }
}

impl Visitor for PollingIntervalRule {
    fn visit_expression_binding(&mut self, binding: &ExpressionBinding) {
        self.check(&binding.path, &binding.expression);
    }

    fn visit_tag_binding(&mut self, binding: &TagBinding) {
        match binding.mode {
            TagMode::Expression => self.check(&binding.path, &binding.tag_path),
            TagMode::Indirect => {
                for (key, reference) in &binding.references {
                    let path = format!("{}.references.{}", binding.path, key);
                    self.check(&path, reference);
                }
            }
            TagMode::Direct => {}
        }
    }
}

impl LintRule for PollingIntervalRule {
    fn id(&self) -> RuleId {
        RuleId::new(RULE_NAME)
    }

    fn description(&self) -> &str {
        "Expressions must not call now() with a missing or too-small polling interval"
    }

    fn target_types(&self) -> &BTreeSet<NodeType> {
        &self.targets
    }

    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
        &mut self.diagnostics
    }
}
