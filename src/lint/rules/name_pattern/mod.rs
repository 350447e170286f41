//! Rule: names follow a naming convention.
//!
//! Checks component names, property names, custom method names, message
//! handler types and event types. The convention, length bounds and
//! skip/forbidden lists can be overridden per node type.

pub mod case;

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LintError, Result};
use crate::lint::rule::{LintRule, RuleId, Severity};
use crate::lint::LintDiagnostic;
use crate::model::{
    Component, CustomMethodScript, EventHandlerScript, MessageHandlerScript, NodeType, Property,
    Visitor,
};

use super::parse_kwargs;

pub use case::{Abbreviations, NamingConvention, COMMON_ABBREVIATIONS};

/// Configured rule name.
pub const RULE_NAME: &str = "NamePatternRule";

const DEFAULT_SKIP_NAMES: [&str; 1] = ["root"];

/// A single node type name or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn values(&self) -> Vec<&str> {
        match self {
            OneOrMany::One(value) => vec![value.as_str()],
            OneOrMany::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Settings that replace the global ones for one node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct NameOverride {
    pub convention: Option<String>,
    /// Custom regex; takes precedence over `convention`.
    #[serde(alias = "custom_pattern")]
    pub pattern: Option<String>,
    /// How the pattern is described in messages.
    pub pattern_description: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub forbidden_names: Option<Vec<String>>,
    pub skip_names: Option<Vec<String>>,
    pub allow_numbers: Option<bool>,
    pub severity: Option<Severity>,
}

/// Settings for [`NamePatternRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct NamePatternConfig {
    /// One of `PascalCase`, `camelCase`, `snake_case`, `kebab-case`,
    /// `SCREAMING_SNAKE_CASE`, `Title Case`, `lower case`.
    pub convention: Option<String>,
    /// Custom regex; takes precedence over `convention`.
    pub custom_pattern: Option<String>,
    /// Node types to check. Defaults to the override keys, else `component`.
    pub target_node_types: Option<OneOrMany>,
    /// Per node type overrides, keyed by node type name.
    pub node_type_specific_rules: IndexMap<String, NameOverride>,
    pub allow_numbers: bool,
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub forbidden_names: Vec<String>,
    /// Names that are never checked. Defaults to `["root"]`.
    pub skip_names: Option<Vec<String>>,
    /// Extra abbreviations kept in capitals.
    pub allowed_abbreviations: Vec<String>,
    /// Also recognize a built-in list of common technical abbreviations.
    pub auto_detect_abbreviations: bool,
    pub severity: Severity,
}

impl Default for NamePatternConfig {
    fn default() -> Self {
        Self {
            convention: None,
            custom_pattern: None,
            target_node_types: None,
            node_type_specific_rules: IndexMap::new(),
            allow_numbers: true,
            min_length: 1,
            max_length: None,
            forbidden_names: Vec::new(),
            skip_names: None,
            allowed_abbreviations: Vec::new(),
            auto_detect_abbreviations: true,
            severity: Severity::Warning,
        }
    }
}

/// Resolved checks for one node type.
#[derive(Debug, Clone)]
struct NameCheck {
    pattern: Regex,
    description: String,
    /// Set when a named convention is active; enables suggestions.
    convention: Option<NamingConvention>,
    allow_numbers: bool,
    min_length: usize,
    max_length: Option<usize>,
    forbidden: HashSet<String>,
    skip: HashSet<String>,
    severity: Severity,
}

fn parse_convention(raw: &str) -> NamingConvention {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown naming convention '{}', using PascalCase", raw);
        NamingConvention::PascalCase
    })
}

/// Anchor a user pattern at the start of the name.
fn compile_custom(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| LintError::RuleConfig {
        rule: RULE_NAME.to_string(),
        message: format!("invalid pattern '{}': {}", pattern, e),
    })
}

fn compile_convention(convention: NamingConvention, allow_numbers: bool) -> Result<Regex> {
    Regex::new(&convention.pattern(allow_numbers)).map_err(|e| LintError::RuleConfig {
        rule: RULE_NAME.to_string(),
        message: e.to_string(),
    })
}

impl NameCheck {
    fn global(config: &NamePatternConfig) -> Result<Self> {
        let (pattern, description, convention) = match &config.custom_pattern {
            Some(custom) => (
                compile_custom(custom)?,
                format!("custom pattern: {}", custom),
                None,
            ),
            None => {
                let convention = config
                    .convention
                    .as_deref()
                    .map(parse_convention)
                    .unwrap_or(NamingConvention::PascalCase);
                (
                    compile_convention(convention, config.allow_numbers)?,
                    convention.name().to_string(),
                    Some(convention),
                )
            }
        };

        Ok(Self {
            pattern,
            description,
            convention,
            allow_numbers: config.allow_numbers,
            min_length: config.min_length,
            max_length: config.max_length,
            forbidden: config.forbidden_names.iter().cloned().collect(),
            skip: match &config.skip_names {
                Some(names) => names.iter().cloned().collect(),
                None => DEFAULT_SKIP_NAMES.iter().map(|s| s.to_string()).collect(),
            },
            severity: config.severity,
        })
    }

    fn with_override(&self, config: &NamePatternConfig, rule: &NameOverride) -> Result<Self> {
        let mut check = self.clone();
        let allow_numbers = rule.allow_numbers.unwrap_or(config.allow_numbers);
        check.allow_numbers = allow_numbers;

        if let Some(pattern) = &rule.pattern {
            check.pattern = compile_custom(pattern)?;
            check.description = format!("custom pattern: {}", pattern);
            check.convention = None;
        } else if let Some(raw) = &rule.convention {
            let convention = parse_convention(raw);
            check.pattern = compile_convention(convention, allow_numbers)?;
            check.description = convention.name().to_string();
            check.convention = Some(convention);
        } else if let (Some(convention), Some(_)) = (check.convention, rule.allow_numbers) {
            check.pattern = compile_convention(convention, allow_numbers)?;
        }

        if let Some(description) = &rule.pattern_description {
            check.description = description.clone();
        }
        if let Some(min) = rule.min_length {
            check.min_length = min;
        }
        if rule.max_length.is_some() {
            check.max_length = rule.max_length;
        }
        if let Some(names) = &rule.forbidden_names {
            check.forbidden = names.iter().cloned().collect();
        }
        if let Some(names) = &rule.skip_names {
            check.skip = names.iter().cloned().collect();
        }
        if let Some(severity) = rule.severity {
            check.severity = severity;
        }
        Ok(check)
    }
}

/// Flags names that break the configured naming convention.
pub struct NamePatternRule {
    default_check: NameCheck,
    overrides: HashMap<NodeType, NameCheck>,
    abbreviations: Abbreviations,
    targets: BTreeSet<NodeType>,
    diagnostics: Vec<LintDiagnostic>,
}

impl NamePatternRule {
    /// Create the rule.
    ///
    /// Fails if a custom pattern is not a valid regex. Unknown conventions
    /// and node type names are logged and ignored.
    pub fn new(config: NamePatternConfig) -> Result<Self> {
        let default_check = NameCheck::global(&config)?;

        let mut overrides = HashMap::new();
        for (raw, rule) in &config.node_type_specific_rules {
            match raw.parse::<NodeType>() {
                Ok(node_type) => {
                    overrides.insert(node_type, default_check.with_override(&config, rule)?);
                }
                Err(_) => {
                    tracing::warn!("Unknown node type '{}' in node_type_specific_rules", raw)
                }
            }
        }

        let mut targets: BTreeSet<NodeType> = config
            .target_node_types
            .iter()
            .flat_map(OneOrMany::values)
            .filter_map(|raw| match raw.parse::<NodeType>() {
                Ok(node_type) => Some(node_type),
                Err(_) => {
                    tracing::warn!("Unknown node type '{}' in target_node_types", raw);
                    None
                }
            })
            .collect();
        if targets.is_empty() {
            targets = overrides.keys().copied().collect();
        }
        if targets.is_empty() {
            targets.insert(NodeType::Component);
        }

        Ok(Self {
            default_check,
            overrides,
            abbreviations: Abbreviations::new(
                &config.allowed_abbreviations,
                config.auto_detect_abbreviations,
            ),
            targets,
            diagnostics: Vec::new(),
        })
    }

    /// Create the rule from configuration kwargs.
    pub fn from_kwargs(kwargs: &Value) -> Result<Self> {
        Self::new(parse_kwargs(RULE_NAME, kwargs)?)
    }

    fn check_for(&self, node_type: NodeType) -> &NameCheck {
        self.overrides.get(&node_type).unwrap_or(&self.default_check)
    }

    /// Validate `name` as a name of `node_type`.
    ///
    /// Returns the violation message and an optional suggestion.
    pub fn validate(&self, node_type: NodeType, name: &str) -> Option<(String, Option<String>)> {
        let check = self.check_for(node_type);

        if check.skip.contains(name) {
            return None;
        }
        if check.forbidden.contains(name) {
            return Some((
                format!("Name '{}' is forbidden for {}", name, node_type),
                None,
            ));
        }

        let length = name.chars().count();
        if length < check.min_length {
            return Some((
                format!(
                    "Name '{}' is too short (minimum {} characters) for {}",
                    name, check.min_length, node_type
                ),
                None,
            ));
        }
        if let Some(max) = check.max_length {
            if length > max {
                return Some((
                    format!(
                        "Name '{}' is too long (maximum {} characters) for {}",
                        name, max, node_type
                    ),
                    None,
                ));
            }
        }

        let candidate = match check.convention {
            Some(convention) => convention.normalize(name, &self.abbreviations),
            None => name.to_string(),
        };
        if check.pattern.is_match(&candidate) {
            return None;
        }

        let suggestion = check.convention.and_then(|convention| {
            convention.suggest(name, &self.abbreviations, check.allow_numbers)
        });
        Some((
            format!(
                "Name '{}' doesn't follow {} for {}",
                name, check.description, node_type
            ),
            suggestion,
        ))
    }

    fn check(&mut self, node_type: NodeType, path: &str, name: &str) {
        if name.is_empty() {
            return;
        }
        let Some((message, suggestion)) = self.validate(node_type, name) else {
            return;
        };

        let mut diagnostic = LintDiagnostic::new(
            self.id(),
            self.check_for(node_type).severity,
            path,
            message,
        );
        if let Some(suggestion) = suggestion {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        self.report(diagnostic);
    }
}

impl Visitor for NamePatternRule {
    fn visit_component(&mut self, component: &Component) {
        self.check(NodeType::Component, &component.path, &component.name);
    }

    fn visit_property(&mut self, property: &Property) {
        self.check(NodeType::Property, &property.path, &property.name);
    }

    fn visit_message_handler(&mut self, script: &MessageHandlerScript) {
        self.check(NodeType::MessageHandler, &script.path, &script.message_type);
    }

    fn visit_custom_method(&mut self, script: &CustomMethodScript) {
        self.check(NodeType::CustomMethod, &script.path, &script.name);
    }

    fn visit_event_handler(&mut self, script: &EventHandlerScript) {
        self.check(NodeType::EventHandler, &script.path, &script.event_type);
    }
}

impl LintRule for NamePatternRule {
    fn id(&self) -> RuleId {
        RuleId::new(RULE_NAME)
    }

    fn description(&self) -> &str {
        "Component, property, method, message and event names must follow a naming convention"
    }

    fn target_types(&self) -> &BTreeSet<NodeType> {
        &self.targets
    }

    fn diagnostics_mut(&mut self) -> &mut Vec<LintDiagnostic> {
        &mut self.diagnostics
    }
}
