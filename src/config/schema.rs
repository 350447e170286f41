//! Rule configuration structures.
//!
//! These map to the rule configuration file:
//!
//! ```json
//! {
//!   "_comment": "keys starting with an underscore are ignored",
//!   "NamePatternRule": { "enabled": true, "kwargs": { "convention": "PascalCase" } },
//!   "PollingIntervalRule": { "kwargs": { "minimum_interval": 10000 } }
//! }
//! ```

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_enabled() -> bool {
    true
}

/// Configuration entry for one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Whether the rule runs.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Rule-specific settings.
    #[serde(default)]
    pub kwargs: Value,
}

impl RuleConfig {
    /// An enabled rule with default settings.
    pub fn enabled() -> Self {
        Self::default()
    }

    /// An enabled rule with the given settings.
    pub fn with_kwargs(kwargs: Value) -> Self {
        Self {
            enabled: true,
            kwargs,
        }
    }

    /// A disabled rule.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            kwargs: Value::Null,
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kwargs: Value::Null,
        }
    }
}

/// A configured rule that will not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub name: String,
    pub reason: String,
}

/// The whole rule configuration, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintConfig {
    pub rules: IndexMap<String, RuleConfig>,
    /// Entries that could not be read.
    pub skipped: Vec<SkippedRule>,
}

impl LintConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rule entry.
    pub fn with_rule(mut self, name: impl Into<String>, config: RuleConfig) -> Self {
        self.rules.insert(name.into(), config);
        self
    }

    /// Entries with `enabled: true`.
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&str, &RuleConfig)> {
        self.rules
            .iter()
            .filter(|(_, config)| config.enabled)
            .map(|(name, config)| (name.as_str(), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_config_defaults() {
        let config: RuleConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.enabled);
        assert!(config.kwargs.is_null());
    }

    #[test]
    fn rule_config_rejects_unknown_fields() {
        assert!(serde_json::from_value::<RuleConfig>(json!({ "enable": false })).is_err());
    }

    #[test]
    fn enabled_rules_skip_disabled() {
        let config = LintConfig::new()
            .with_rule("A", RuleConfig::enabled())
            .with_rule("B", RuleConfig::disabled())
            .with_rule("C", RuleConfig::with_kwargs(json!({ "severity": "error" })));

        let names: Vec<&str> = config.enabled_rules().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
