//! Rule configuration loading.
//!
//! An explicit config path must exist. Without one, `rule_config.json` in
//! the working directory is used if present, else [`default_config`].

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::schema::{LintConfig, RuleConfig, SkippedRule};
use crate::error::{LintError, Result};
use crate::lint::rules::{bad_component_reference, name_pattern, polling_interval, unused_properties};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rule_config.json";

/// Every rule that runs without an external tool, with default settings.
pub fn default_config() -> LintConfig {
    LintConfig::new()
        .with_rule(name_pattern::RULE_NAME, RuleConfig::enabled())
        .with_rule(polling_interval::RULE_NAME, RuleConfig::enabled())
        .with_rule(unused_properties::RULE_NAME, RuleConfig::enabled())
        .with_rule(bad_component_reference::RULE_NAME, RuleConfig::enabled())
}

/// Resolve and load the configuration for a run.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<LintConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let path = working_dir.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        tracing::debug!("Using rule configuration {}", path.display());
        load_config_file(&path)
    } else {
        tracing::debug!("No {} found, using built-in rules", DEFAULT_CONFIG_FILE);
        Ok(default_config())
    }
}

/// Load a configuration file.
pub fn load_config_file(path: &Path) -> Result<LintConfig> {
    if !path.exists() {
        return Err(LintError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Parse configuration text read from `path`.
pub fn parse_config(content: &str, path: &Path) -> Result<LintConfig> {
    let value: Value = serde_json::from_str(content).map_err(|e| LintError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config_from_value(value)
}

/// Build a configuration from a parsed JSON value.
///
/// Keys starting with `_` are comments. Entries that are not objects, or
/// that do not have the entry shape, are skipped with a warning.
pub fn config_from_value(value: Value) -> Result<LintConfig> {
    let Value::Object(entries) = value else {
        return Err(LintError::ConfigValidationError {
            message: "rule configuration must be a JSON object keyed by rule name".to_string(),
        });
    };

    let mut config = LintConfig::new();
    for (name, entry) in entries {
        if name.starts_with('_') {
            continue;
        }
        if !entry.is_object() {
            tracing::warn!("Ignoring configuration for '{}': not an object", name);
            continue;
        }

        match serde_json::from_value::<RuleConfig>(entry) {
            Ok(rule) => {
                config.rules.insert(name, rule);
            }
            Err(e) => {
                tracing::warn!("Invalid configuration for '{}': {}", name, e);
                config.skipped.push(SkippedRule {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn default_config_excludes_script_analysis() {
        let config = default_config();
        let names: Vec<&str> = config.enabled_rules().map(|(name, _)| name).collect();

        assert_eq!(
            names,
            vec![
                "NamePatternRule",
                "PollingIntervalRule",
                "UnusedCustomPropertiesRule",
                "BadComponentReferenceRule"
            ]
        );
    }

    #[test]
    fn skips_comment_keys_and_non_objects() {
        let config = config_from_value(json!({
            "_comment": "ignored",
            "Weird": 5,
            "PollingIntervalRule": { "kwargs": { "minimum_interval": 5000 } }
        }))
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(
            config.rules["PollingIntervalRule"].kwargs,
            json!({ "minimum_interval": 5000 })
        );
        assert!(config.skipped.is_empty());
    }

    #[test]
    fn malformed_entries_are_listed() {
        let config = config_from_value(json!({
            "NamePatternRule": { "enabled": "yes" },
            "PollingIntervalRule": {}
        }))
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.skipped.len(), 1);
        assert_eq!(config.skipped[0].name, "NamePatternRule");
    }

    #[test]
    fn top_level_must_be_an_object() {
        let err = config_from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, LintError::ConfigValidationError { .. }));
    }

    #[test]
    fn preserves_file_order() {
        let config = parse_config(
            r#"{ "UnusedCustomPropertiesRule": {}, "NamePatternRule": {}, "PollingIntervalRule": {} }"#,
            Path::new("rule_config.json"),
        )
        .unwrap();
        let names: Vec<&String> = config.rules.keys().collect();
        assert_eq!(
            names,
            vec!["UnusedCustomPropertiesRule", "NamePatternRule", "PollingIntervalRule"]
        );
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse_config("{ nope", Path::new("/cfg/rule_config.json")).unwrap_err();
        assert!(err.to_string().contains("/cfg/rule_config.json"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(temp.path().join("missing.json").as_path()), temp.path()).unwrap_err();
        assert!(matches!(err, LintError::ConfigNotFound { .. }));
    }

    #[test]
    fn falls_back_to_defaults_without_a_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_config(None, temp.path()).unwrap(), default_config());
    }

    #[test]
    fn finds_config_in_working_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "PollingIntervalRule": { "enabled": true } }"#,
        )
        .unwrap();

        let config = load_config(None, temp.path()).unwrap();
        assert_eq!(config.rules.len(), 1);
    }
}
