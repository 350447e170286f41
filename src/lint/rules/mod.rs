//! Built-in lint rules.
//!
//! Every rule is configured by name with a JSON `kwargs` object, parsed into
//! the rule's own settings struct by [`parse_kwargs`].

pub mod bad_component_reference;
pub mod name_pattern;
pub mod polling_interval;
pub mod script_lint;
pub mod unused_properties;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{LintError, Result};

pub use bad_component_reference::{BadComponentReferenceConfig, BadComponentReferenceRule};
pub use name_pattern::{NamePatternConfig, NamePatternRule, NamingConvention};
pub use polling_interval::{PollingIntervalConfig, PollingIntervalRule};
pub use script_lint::{
    AnalyzerMessage, AnalyzerOutput, PylintAnalyzer, PylintScriptConfig, PylintScriptRule,
    ScriptAnalyzer,
};
pub use unused_properties::{UnusedCustomPropertiesRule, UnusedPropertiesConfig};

/// Parse a rule's kwargs into its settings. `null` means all defaults.
pub(crate) fn parse_kwargs<T: DeserializeOwned>(rule: &str, kwargs: &Value) -> Result<T> {
    let kwargs = match kwargs {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(kwargs).map_err(|e| LintError::RuleConfig {
        rule: rule.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_kwargs_use_defaults() {
        let config: PollingIntervalConfig = parse_kwargs("PollingIntervalRule", &Value::Null).unwrap();
        assert_eq!(config, PollingIntervalConfig::default());
    }

    #[test]
    fn bad_kwargs_name_the_rule() {
        let err = parse_kwargs::<PollingIntervalConfig>(
            "PollingIntervalRule",
            &json!({ "minimum_interval": "fast" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("PollingIntervalRule"));
    }
}
