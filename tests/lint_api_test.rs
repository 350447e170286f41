//! Integration tests for the library API.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use ignition_lint::config::{config_from_value, default_config};
use ignition_lint::lint::rules::{
    AnalyzerMessage, AnalyzerOutput, PylintScriptConfig, PylintScriptRule, ScriptAnalyzer,
};
use ignition_lint::lint::{
    LintEngine, LintRule, RuleRegistry, Severity, UnusedCustomPropertiesRule,
};
use ignition_lint::model::{build_model, NodeType};
use ignition_lint::view::{flatten, read_flat};
use serde_json::{json, Value};
use tempfile::TempDir;

fn unused_rule_engine() -> LintEngine {
    LintEngine::new(vec![Box::new(UnusedCustomPropertiesRule::default())])
}

#[test]
fn unused_view_property_is_an_error() {
    let view = json!({
        "custom": { "unusedProp": 1 },
        "root": { "meta": { "name": "root" } }
    });

    let results = unused_rule_engine().lint(&flatten(&view));

    let errors = &results.error_texts()["UnusedCustomPropertiesRule"];
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unusedProp"));
    assert!(errors[0].contains("never referenced"));
    assert!(results.warnings.is_empty());
}

#[test]
fn expression_reference_marks_property_used() {
    let view = json!({
        "custom": { "unusedProp": 1 },
        "root": {
            "meta": { "name": "root" },
            "children": [{
                "meta": { "name": "Label" },
                "propConfig": {
                    "props.text": {
                        "binding": { "type": "expr", "config": { "expression": "{view.custom.unusedProp}" } }
                    }
                }
            }]
        }
    });

    let results = unused_rule_engine().lint(&flatten(&view));

    assert!(results.is_empty(), "unexpected: {:?}", results.error_texts());
}

#[test]
fn this_custom_reference_covers_every_component() {
    let view = json!({
        "root": {
            "meta": { "name": "root" },
            "children": [
                { "meta": { "name": "A" }, "custom": { "count": 1 } },
                {
                    "meta": { "name": "B" },
                    "custom": { "count": 2 },
                    "events": { "dom": { "onClick": { "config": { "script": "self.custom.count += 1" } } } }
                }
            ]
        }
    });

    let results = unused_rule_engine().lint(&flatten(&view));

    assert!(results.is_empty(), "unexpected: {:?}", results.error_texts());
}

#[test]
fn default_configuration_runs_every_local_rule() {
    let view = json!({
        "custom": { "interval": 1 },
        "root": {
            "meta": { "name": "root" },
            "children": [{
                "meta": { "name": "clock_label" },
                "propConfig": {
                    "props.text": {
                        "binding": { "type": "expr", "config": { "expression": "now(100) + {view.custom.interval}" } }
                    }
                },
                "scripts": {
                    "customMethods": [{ "name": "refresh", "params": [], "script": "self.getSibling('Other').refresh()" }]
                }
            }]
        }
    });

    let rule_set = RuleRegistry::with_builtins().build(&default_config());
    let mut engine = LintEngine::new(rule_set.rules);
    let results = engine.lint(&flatten(&view));

    assert!(results.warnings.contains_key("NamePatternRule"));
    assert!(results.errors.contains_key("PollingIntervalRule"));
    assert!(results.errors.contains_key("BadComponentReferenceRule"));
    assert!(!results.errors.contains_key("UnusedCustomPropertiesRule"));
}

#[test]
fn rule_state_does_not_leak_between_documents() {
    let mut engine = unused_rule_engine();
    let unused = flatten(&json!({ "custom": { "a": 1 }, "root": { "meta": { "name": "root" } } }));
    let clean = flatten(&json!({ "root": { "meta": { "name": "root" } } }));

    assert!(engine.lint(&unused).has_errors());
    assert!(engine.lint(&clean).is_empty());
    assert!(engine.lint(&unused).has_errors());
}

#[test]
fn configured_severity_applies() {
    let config = config_from_value(json!({
        "NamePatternRule": {
            "kwargs": {
                "convention": "camelCase",
                "severity": "error",
                "target_node_types": ["component", "custom_method"]
            }
        }
    }))
    .unwrap();
    let rule_set = RuleRegistry::with_builtins().build(&config);
    let mut engine = LintEngine::new(rule_set.rules);

    let view = json!({
        "root": {
            "meta": { "name": "root" },
            "children": [{ "meta": { "name": "StatusPanel" } }],
            "scripts": { "customMethods": [{ "name": "do_refresh", "script": "pass" }] }
        }
    });
    let results = engine.lint(&flatten(&view));

    let errors = &results.errors["NamePatternRule"];
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(errors[0].suggestion.as_deref(), Some("statusPanel"));
}

#[test]
fn reads_views_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("view.json");
    std::fs::write(
        &path,
        r#"{ "params": { "lineId": 1 }, "root": { "meta": { "name": "root" } } }"#,
    )
    .unwrap();

    let results = unused_rule_engine().lint(&read_flat(&path).unwrap());

    assert!(results.error_texts()["UnusedCustomPropertiesRule"][0].contains("view parameter 'lineId'"));
}

/// Records the combined source it was given and reports fixed messages.
struct RecordingAnalyzer {
    seen: Arc<Mutex<Vec<String>>>,
    messages: Vec<AnalyzerMessage>,
}

impl ScriptAnalyzer for RecordingAnalyzer {
    fn analyze(&self, source: &str) -> ignition_lint::Result<AnalyzerOutput> {
        self.seen.lock().unwrap().push(source.to_string());
        Ok(AnalyzerOutput {
            messages: self.messages.clone(),
            ..Default::default()
        })
    }
}

#[test]
fn scripts_are_analyzed_in_one_batch() {
    let view = json!({
        "root": {
            "meta": { "name": "root" },
            "scripts": {
                "messageHandlers": [
                    { "messageType": "refresh", "script": "x = 1", "pageScope": true },
                    { "messageType": "reset", "script": "y = undefined_name", "pageScope": true }
                ]
            }
        }
    });
    let flat = flatten(&view);
    let model = build_model(&flat);
    let handlers = model.nodes_of_type(NodeType::MessageHandler).count();
    assert_eq!(handlers, 2);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let rule = PylintScriptRule::with_analyzer(
        PylintScriptConfig::default(),
        Box::new(RecordingAnalyzer {
            seen: Arc::clone(&seen),
            messages: vec![],
        }),
    );
    let targets: BTreeSet<NodeType> = rule.target_types().clone();
    assert!(targets.contains(&NodeType::MessageHandler));

    let mut engine = LintEngine::new(vec![Box::new(rule)]);
    let results = engine.lint(&flat);

    assert!(results.is_empty());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("def onMessageReceived(self, payload):"));
    assert!(seen[0].contains("y = undefined_name"));
}

#[test]
fn analyzer_failure_does_not_abort_other_rules() {
    struct Failing;
    impl ScriptAnalyzer for Failing {
        fn analyze(&self, _: &str) -> ignition_lint::Result<AnalyzerOutput> {
            Err(ignition_lint::LintError::AnalyzerFailed {
                message: "not installed".into(),
            })
        }
    }

    let view: Value = json!({
        "custom": { "unused": 1 },
        "root": {
            "meta": { "name": "root" },
            "scripts": { "customMethods": [{ "name": "go", "script": "pass" }] }
        }
    });
    let rules: Vec<Box<dyn LintRule>> = vec![
        Box::new(PylintScriptRule::with_analyzer(PylintScriptConfig::default(), Box::new(Failing))),
        Box::new(UnusedCustomPropertiesRule::default()),
    ];
    let results = LintEngine::new(rules).lint(&flatten(&view));

    assert!(results.error_texts()["PylintScriptRule"][0].contains("Script analysis failed"));
    assert!(results.errors.contains_key("UnusedCustomPropertiesRule"));
}
