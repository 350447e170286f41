//! Rule: custom properties and view parameters must be referenced.
//!
//! Definitions are collected from property nodes. References are collected
//! from binding and script text during the visit, then from every string in
//! the view once all nodes have been seen.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::lint::rule::{LintRule, RuleId, Severity};
use crate::lint::LintDiagnostic;
use crate::model::{BindingNode, NodeType, Property, ScriptNode, Visitor};
use crate::view::FlatMap;

use super::parse_kwargs;

/// Configured rule name.
pub const RULE_NAME: &str = "UnusedCustomPropertiesRule";

/// `owner.custom.name` / `owner.params.name`, braced or not.
static SCOPED_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\.(custom|params)\.([A-Za-z_][A-Za-z0-9_]*)")
        .expect("SCOPED_REFERENCE_REGEX must compile")
});

/// Bare `{name}`.
static BARE_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("BARE_REFERENCE_REGEX must compile")
});

/// Settings for [`UnusedCustomPropertiesRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct UnusedPropertiesConfig {
    /// Severity of an unused definition.
    pub severity: Severity,
}

impl Default for UnusedPropertiesConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DefinitionKind {
    ViewCustom,
    ViewParam,
    ComponentCustom,
}

#[derive(Debug, Clone)]
struct Definition {
    kind: DefinitionKind,
    name: String,
    /// Normalized reference form, e.g. `view.custom.x` or `Label.custom.x`.
    key: String,
}

/// Flags custom properties and view parameters that nothing references.
pub struct UnusedCustomPropertiesRule {
    config: UnusedPropertiesConfig,
    targets: BTreeSet<NodeType>,
    /// Definitions by defining path.
    definitions: IndexMap<String, Definition>,
    used: HashSet<String>,
    diagnostics: Vec<LintDiagnostic>,
}

impl UnusedCustomPropertiesRule {
    /// Create the rule.
    pub fn new(config: UnusedPropertiesConfig) -> Self {
        let targets = std::iter::once(NodeType::Property)
            .chain(NodeType::BINDINGS)
            .chain(NodeType::SCRIPTS)
            .collect();
        Self {
            config,
            targets,
            definitions: IndexMap::new(),
            used: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Create the rule from configuration kwargs.
    pub fn from_kwargs(kwargs: &Value) -> Result<Self> {
        Ok(Self::new(parse_kwargs(RULE_NAME, kwargs)?))
    }

    fn define(&mut self, location: String, kind: DefinitionKind, name: &str, key: String) {
        self.definitions.entry(location).or_insert(Definition {
            kind,
            name: name.to_string(),
            key,
        });
    }

    fn record_references(&mut self, text: &str) {
        for caps in SCOPED_REFERENCE_REGEX.captures_iter(text) {
            let (owner, scope, name) = (&caps[1], &caps[2], &caps[3]);
            let key = match (owner, scope) {
                ("this" | "self", "custom") => format!("*.custom.{}", name),
                _ => format!("{}.{}.{}", owner, scope, name),
            };
            self.used.insert(key);
        }

        for caps in BARE_REFERENCE_REGEX.captures_iter(text) {
            self.used.insert(format!("view.custom.{}", &caps[1]));
            self.used.insert(format!("view.params.{}", &caps[1]));
        }
    }

    fn is_used(&self, definition: &Definition) -> bool {
        self.used.contains(&definition.key)
            || (definition.kind == DefinitionKind::ComponentCustom
                && self.used.contains(&format!("*.custom.{}", definition.name)))
    }
}

impl Default for UnusedCustomPropertiesRule {
    fn default() -> Self {
        Self::new(UnusedPropertiesConfig::default())
    }
}

/// First path segment, without any array index.
fn first_segment(path: &str) -> &str {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    &path[..end]
}

impl Visitor for UnusedCustomPropertiesRule {
    fn visit_property(&mut self, property: &Property) {
        match &property.component {
            None => {
                if let Some(rest) = property.path.strip_prefix("custom.") {
                    let name = first_segment(rest);
                    self.define(
                        format!("custom.{}", name),
                        DefinitionKind::ViewCustom,
                        name,
                        format!("view.custom.{}", name),
                    );
                } else if let Some(rest) = property.path.strip_prefix("params.") {
                    let name = first_segment(rest);
                    self.define(
                        format!("params.{}", name),
                        DefinitionKind::ViewParam,
                        name,
                        format!("view.params.{}", name),
                    );
                }
            }
            Some(owner) => {
                let relative = property.path.get(owner.len()..).unwrap_or_default();
                if let Some(rest) = relative.strip_prefix(".custom.") {
                    let name = first_segment(rest);
                    let component = owner.rsplit('.').next().unwrap_or(owner);
                    self.define(
                        format!("{}.custom.{}", owner, name),
                        DefinitionKind::ComponentCustom,
                        name,
                        format!("{}.custom.{}", component, name),
                    );
                }
            }
        }
    }

    fn visit_binding(&mut self, binding: &dyn BindingNode) {
        for text in binding.texts() {
            self.record_references(text);
        }
    }

    fn visit_script(&mut self, script: &dyn ScriptNode) {
        self.record_references(script.script());
    }
}

impl LintRule for UnusedCustomPropertiesRule {
    fn id(&self) -> RuleId {
        RuleId::new(RULE_NAME)
    }

    fn description(&self) -> &str {
        "Custom properties and view parameters must be referenced somewhere in the view"
    }

    fn target_types(&self) -> &BTreeSet<NodeType> {
        &self.targets
    }

    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
        &mut self.diagnostics
    }

    fn reset(&mut self) {
        self.definitions.clear();
        self.used.clear();
        self.diagnostics.clear();
    }

    fn post_process(&mut self, flat: &FlatMap) {
        for text in flat.string_values() {
            self.record_references(text);
        }

        let unused: Vec<(String, Definition)> = self
            .definitions
            .iter()
            .filter(|(_, definition)| !self.is_used(definition))
            .map(|(location, definition)| (location.clone(), definition.clone()))
            .collect();

        for (location, definition) in unused {
            let label = match definition.kind {
                DefinitionKind::ViewParam => "view parameter",
                DefinitionKind::ViewCustom | DefinitionKind::ComponentCustom => "custom property",
            };
            self.report(LintDiagnostic::new(
                self.id(),
                self.config.severity,
                location,
                format!(
                    "{} '{}' is defined but never referenced",
                    label, definition.name
                ),
            ));
        }
    }
}
