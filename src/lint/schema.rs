//! JSON Schema generation for the rule configuration file.
//!
//! Each rule's `kwargs` schema is derived from its settings struct, so the
//! schema tracks the options the rules actually accept.

use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{json, Map, Value};

use super::rules::{
    bad_component_reference, name_pattern, polling_interval, script_lint, unused_properties,
    BadComponentReferenceConfig, NamePatternConfig, PollingIntervalConfig, PylintScriptConfig,
    UnusedPropertiesConfig,
};

/// Generates JSON Schema for `rule_config.json`.
pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Create a new schema generator.
    pub fn new() -> Self {
        Self
    }

    /// Generate the complete JSON Schema for the configuration file.
    pub fn generate(&self) -> Value {
        let mut rules = Map::new();
        rules.insert(
            name_pattern::RULE_NAME.to_string(),
            self.rule_schema::<NamePatternConfig>("Naming conventions for components and other nodes"),
        );
        rules.insert(
            polling_interval::RULE_NAME.to_string(),
            self.rule_schema::<PollingIntervalConfig>("Minimum interval for now() polling"),
        );
        rules.insert(
            unused_properties::RULE_NAME.to_string(),
            self.rule_schema::<UnusedPropertiesConfig>("Custom properties and params that are never referenced"),
        );
        rules.insert(
            bad_component_reference::RULE_NAME.to_string(),
            self.rule_schema::<BadComponentReferenceConfig>("Object traversal in scripts and expressions"),
        );
        rules.insert(
            script_lint::RULE_NAME.to_string(),
            self.rule_schema::<PylintScriptConfig>("Static analysis of embedded scripts"),
        );

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "https://github.com/ignition-lint/ignition-lint/schemas/rule_config.json",
            "title": "ignition-lint rule configuration",
            "description": "Rules to run, keyed by rule name",
            "type": "object",
            "properties": rules,
            "patternProperties": {
                "^_": {
                    "description": "Comment; ignored"
                }
            },
            "additionalProperties": false
        })
    }

    /// Schema for one rule entry.
    fn rule_schema<T: JsonSchema>(&self, description: &str) -> Value {
        json!({
            "type": "object",
            "description": description,
            "properties": {
                "enabled": {
                    "type": "boolean",
                    "default": true,
                    "description": "Whether the rule runs"
                },
                "kwargs": self.kwargs_schema::<T>()
            },
            "additionalProperties": false
        })
    }

    /// Schema for a rule's settings struct, with subschemas inlined.
    fn kwargs_schema<T: JsonSchema>(&self) -> Value {
        let generator = SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator();
        let mut schema = generator.into_root_schema_for::<T>().to_value();
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
            object.insert(
                "description".to_string(),
                Value::String("Rule-specific settings".to_string()),
            );
        }
        schema
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_valid_json_schema() {
        let schema = SchemaGenerator::new().generate();

        assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn includes_every_builtin_rule() {
        let schema = SchemaGenerator::new().generate();
        let rules = schema["properties"].as_object().unwrap();

        for name in [
            "NamePatternRule",
            "PollingIntervalRule",
            "UnusedCustomPropertiesRule",
            "BadComponentReferenceRule",
            "PylintScriptRule",
        ] {
            assert!(rules.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn allows_comment_keys() {
        let schema = SchemaGenerator::new().generate();
        assert!(schema["patternProperties"]["^_"].is_object());
    }

    #[test]
    fn kwargs_come_from_settings_structs() {
        let schema = SchemaGenerator::new().generate();
        let polling = &schema["properties"]["PollingIntervalRule"]["properties"]["kwargs"];

        assert!(polling["properties"]["minimum_interval"].is_object());
        assert!(polling.get("$schema").is_none());
    }

    #[test]
    fn entry_has_enabled_flag() {
        let schema = SchemaGenerator::new().generate();
        let entry = &schema["properties"]["NamePatternRule"];

        assert_eq!(entry["properties"]["enabled"]["type"], "boolean");
        assert!(entry["properties"]["kwargs"]["properties"]["convention"].is_object());
    }
}
