//! Rule registry for building lint rules from configuration.
//!
//! The [`RuleRegistry`] maps rule names to factories. [`RuleRegistry::build`]
//! turns a [`LintConfig`] into the rules to run, skipping anything that
//! cannot be built.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::rule::LintRule;
use super::rules::{
    bad_component_reference, name_pattern, polling_interval, script_lint, unused_properties,
    BadComponentReferenceRule, NamePatternRule, PollingIntervalRule, PylintScriptRule,
    UnusedCustomPropertiesRule,
};
use crate::config::{LintConfig, SkippedRule};
use crate::error::Result;
use crate::model::NodeType;

/// Builds a rule from its kwargs.
pub type RuleFactory = fn(&Value) -> Result<Box<dyn LintRule>>;

/// Rules built from a configuration, plus the entries that were left out.
pub struct RuleSet {
    pub rules: Vec<Box<dyn LintRule>>,
    pub skipped: Vec<SkippedRule>,
}

impl RuleSet {
    /// Names of the rules that will run.
    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.id().0).collect()
    }
}

/// Description of a registered rule with default settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleInfo {
    pub name: String,
    pub description: String,
    /// Empty means every node type.
    pub target_types: Vec<NodeType>,
}

/// Registry of all available lint rules.
pub struct RuleRegistry {
    factories: IndexMap<&'static str, RuleFactory>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create a registry with all built-in rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(name_pattern::RULE_NAME, |kwargs| {
            Ok(Box::new(NamePatternRule::from_kwargs(kwargs)?))
        });
        registry.register(polling_interval::RULE_NAME, |kwargs| {
            Ok(Box::new(PollingIntervalRule::from_kwargs(kwargs)?))
        });
        registry.register(unused_properties::RULE_NAME, |kwargs| {
            Ok(Box::new(UnusedCustomPropertiesRule::from_kwargs(kwargs)?))
        });
        registry.register(bad_component_reference::RULE_NAME, |kwargs| {
            Ok(Box::new(BadComponentReferenceRule::from_kwargs(kwargs)?))
        });
        registry.register(script_lint::RULE_NAME, |kwargs| {
            Ok(Box::new(PylintScriptRule::from_kwargs(kwargs)?))
        });
        registry
    }

    /// Register a rule factory under `name`.
    pub fn register(&mut self, name: &'static str, factory: RuleFactory) {
        self.factories.insert(name, factory);
    }

    /// Check if a rule name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered rule names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Build one rule from its kwargs.
    pub fn create(&self, name: &str, kwargs: &Value) -> Option<Result<Box<dyn LintRule>>> {
        self.factories.get(name).map(|factory| factory(kwargs))
    }

    /// Build every enabled rule in `config`, in file order.
    ///
    /// Disabled rules are left out silently. Unknown names and kwargs that
    /// fail to parse are logged and listed in [`RuleSet::skipped`], together
    /// with any entries the loader already rejected.
    pub fn build(&self, config: &LintConfig) -> RuleSet {
        let mut rules = Vec::new();
        let mut skipped = config.skipped.clone();

        for (name, rule_config) in &config.rules {
            if !rule_config.enabled {
                tracing::debug!("Rule {} is disabled", name);
                continue;
            }

            match self.create(name, &rule_config.kwargs) {
                Some(Ok(rule)) => {
                    tracing::debug!("Enabled rule {}", name);
                    rules.push(rule);
                }
                Some(Err(e)) => {
                    tracing::warn!("Skipping rule {}: {}", name, e);
                    skipped.push(SkippedRule {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
                None => {
                    tracing::warn!("Unknown rule '{}'", name);
                    skipped.push(SkippedRule {
                        name: name.clone(),
                        reason: "unknown rule".to_string(),
                    });
                }
            }
        }

        RuleSet { rules, skipped }
    }

    /// Describe each registered rule with its default settings.
    pub fn describe(&self) -> Vec<RuleInfo> {
        self.factories
            .iter()
            .filter_map(|(name, factory)| match factory(&Value::Null) {
                Ok(rule) => Some(RuleInfo {
                    name: name.to_string(),
                    description: rule.description().to_string(),
                    target_types: rule.target_types().iter().copied().collect(),
                }),
                Err(e) => {
                    tracing::warn!("Cannot describe {}: {}", name, e);
                    None
                }
            })
            .collect()
    }

    /// Get the number of registered rules.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Target types of a rule as a sorted set. Empty means all.
pub fn target_names(targets: &BTreeSet<NodeType>) -> Vec<&'static str> {
    targets.iter().map(NodeType::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::lint::{LintDiagnostic, RuleId};
    use crate::model::Visitor;
    use serde_json::json;

    struct MockRule {
        targets: BTreeSet<NodeType>,
        diagnostics: Vec<LintDiagnostic>,
    }

    impl Visitor for MockRule {}

    impl LintRule for MockRule {
        fn id(&self) -> RuleId {
            RuleId::new("MockRule")
        }
        fn description(&self) -> &str {
            "A mock rule for testing"
        }
        fn target_types(&self) -> &BTreeSet<NodeType> {
            &self.targets
        }
        fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
            &mut self.diagnostics
        }
    }

    fn mock_factory(_: &Value) -> Result<Box<dyn LintRule>> {
        Ok(Box::new(MockRule {
            targets: BTreeSet::new(),
            diagnostics: Vec::new(),
        }))
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_custom_rule() {
        let mut registry = RuleRegistry::new();
        registry.register("MockRule", mock_factory);

        assert!(registry.contains("MockRule"));
        let rule = registry.create("MockRule", &Value::Null).unwrap().unwrap();
        assert_eq!(rule.description(), "A mock rule for testing");
    }

    #[test]
    fn builtins_are_registered_in_order() {
        let registry = RuleRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "NamePatternRule",
                "PollingIntervalRule",
                "UnusedCustomPropertiesRule",
                "BadComponentReferenceRule",
                "PylintScriptRule"
            ]
        );
    }

    #[test]
    fn build_follows_config_order_and_skips_disabled() {
        let config = LintConfig::new()
            .with_rule("PollingIntervalRule", RuleConfig::enabled())
            .with_rule("NamePatternRule", RuleConfig::disabled())
            .with_rule("UnusedCustomPropertiesRule", RuleConfig::enabled());

        let set = RuleRegistry::with_builtins().build(&config);

        assert_eq!(set.names(), vec!["PollingIntervalRule", "UnusedCustomPropertiesRule"]);
        assert!(set.skipped.is_empty());
    }

    #[test]
    fn unknown_rules_are_skipped() {
        let config = LintConfig::new()
            .with_rule("NoSuchRule", RuleConfig::enabled())
            .with_rule("PollingIntervalRule", RuleConfig::enabled());

        let set = RuleRegistry::with_builtins().build(&config);

        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.skipped.len(), 1);
        assert_eq!(set.skipped[0].name, "NoSuchRule");
        assert_eq!(set.skipped[0].reason, "unknown rule");
    }

    #[test]
    fn bad_kwargs_are_skipped() {
        let config = LintConfig::new().with_rule(
            "PollingIntervalRule",
            RuleConfig::with_kwargs(json!({ "minimum_interval": "often" })),
        );

        let set = RuleRegistry::with_builtins().build(&config);

        assert!(set.rules.is_empty());
        assert_eq!(set.skipped[0].name, "PollingIntervalRule");
        assert!(set.skipped[0].reason.contains("PollingIntervalRule"));
    }

    #[test]
    fn loader_skips_carry_through() {
        let mut config = LintConfig::new();
        config.skipped.push(SkippedRule {
            name: "NamePatternRule".into(),
            reason: "invalid type".into(),
        });

        let set = RuleRegistry::with_builtins().build(&config);
        assert_eq!(set.skipped.len(), 1);
    }

    #[test]
    fn describe_lists_defaults() {
        let infos = RuleRegistry::with_builtins().describe();
        assert_eq!(infos.len(), 5);

        let naming = infos.iter().find(|i| i.name == "NamePatternRule").unwrap();
        assert_eq!(naming.target_types, vec![NodeType::Component]);
        assert!(!naming.description.is_empty());
    }

    #[test]
    fn target_names_are_snake_case() {
        let targets: BTreeSet<NodeType> = [NodeType::MessageHandler, NodeType::Component]
            .into_iter()
            .collect();
        assert_eq!(target_names(&targets), vec!["component", "message_handler"]);
    }
}
