//! Reconstruction of a typed node model from a flattened view.
//!
//! Each node kind is found by an independent scan of the flat map. Missing
//! sub-fields degrade to sentinels (`"unknown"`, empty strings, default
//! scopes) so a hand-edited view still yields a usable model.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use super::index::ComponentIndex;
use super::node::{
    Component, CustomMethodScript, EventHandlerScript, ExpressionBinding, MessageHandlerScript,
    MessageScope, Node, Property, PropertyBinding, TagBinding, TagMode, TransformScript,
};
use super::ViewModel;
use crate::view::{value_text, FlatMap};

/// Placeholder for values a node needs but the view does not provide.
pub const UNKNOWN: &str = "unknown";

/// Default event handler scope (local).
pub const DEFAULT_EVENT_SCOPE: &str = "L";

const DEFAULT_METHOD_NAME: &str = "unknown_method";

/// Segments under which leaves are structure, not user properties.
const STRUCTURAL_SEGMENTS: [&str; 5] = ["meta", "binding", "scripts", "events", "propConfig"];

/// Component prop maps holding CSS declarations.
const STYLE_SEGMENTS: [&str; 2] = ["style", "elementStyle"];

static MESSAGE_HANDLER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*\.)?scripts\.messageHandlers\[\d+\]\.messageType$")
        .expect("MESSAGE_HANDLER_REGEX must compile")
});

static CUSTOM_METHOD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*\.)?scripts\.customMethods\[\d+\]").expect("CUSTOM_METHOD_REGEX must compile")
});

static METHOD_PARAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.params\[(\d+)\]$").expect("METHOD_PARAM_REGEX must compile")
});

static EVENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\.)events\.([^.\[]+)(?:\.([^.\[]+))?(?:\[\d+\])?$")
        .expect("EVENT_REGEX must compile")
});

/// Build the node model for a flattened view.
///
/// Nodes are emitted grouped by kind: components, bindings (each followed by
/// its script transforms), message handlers, custom methods, event handlers,
/// then properties.
pub fn build_model(flat: &FlatMap) -> ViewModel {
    let mut components = collect_components(flat);

    let mut index = ComponentIndex::new();
    for (position, component) in components.iter().enumerate() {
        index.insert(component.path.clone(), position);
    }

    let bindings = collect_bindings(flat);
    let message_handlers = collect_message_handlers(flat);
    let custom_methods = collect_custom_methods(flat);
    let event_handlers = collect_event_handlers(flat);
    let properties = collect_properties(flat, &index);

    for property in &properties {
        let owner = property.component.as_deref().and_then(|c| index.get(c));
        if let Some(position) = owner {
            components[position]
                .properties
                .insert(property.name.clone(), property.value.clone());
        }
    }

    tracing::debug!(
        "Built model: {} components, {} bindings, {} message handlers, {} custom methods, {} event handlers, {} properties",
        components.len(),
        bindings.len(),
        message_handlers.len(),
        custom_methods.len(),
        event_handlers.len(),
        properties.len()
    );

    let nodes = components
        .into_iter()
        .map(Node::Component)
        .chain(bindings)
        .chain(message_handlers.into_iter().map(Node::MessageHandler))
        .chain(custom_methods.into_iter().map(Node::CustomMethod))
        .chain(event_handlers.into_iter().map(Node::EventHandler))
        .chain(properties.into_iter().map(Node::Property))
        .collect();

    ViewModel::new(nodes, index)
}

fn collect_components(flat: &FlatMap) -> Vec<Component> {
    flat.iter()
        .filter_map(|(path, value)| {
            let prefix = path.strip_suffix(".meta.name")?;
            Some(Component {
                path: prefix.to_string(),
                name: value_text(value),
                component_type: text_or_unknown(flat, &format!("{}.type", prefix)),
                properties: IndexMap::new(),
            })
        })
        .collect()
}

fn collect_bindings(flat: &FlatMap) -> Vec<Node> {
    let mut nodes = Vec::new();

    for (path, value) in flat.iter() {
        let Some(prefix) = path.strip_suffix(".binding.type") else {
            continue;
        };
        let config = format!("{}.binding.config", prefix);

        match value.as_str().unwrap_or_default() {
            "expression" | "expr" => nodes.push(Node::ExpressionBinding(ExpressionBinding {
                path: prefix.to_string(),
                expression: text_or_unknown(flat, &format!("{}.expression", config)),
            })),
            "property" => nodes.push(Node::PropertyBinding(PropertyBinding {
                path: prefix.to_string(),
                target_path: text_or_unknown(flat, &format!("{}.path", config)),
            })),
            "tag" => nodes.push(Node::TagBinding(tag_binding(flat, prefix, &config))),
            other => {
                tracing::debug!("Unsupported binding type '{}' at {}", other, prefix);
            }
        }

        nodes.extend(collect_transforms(flat, prefix));
    }

    nodes
}

fn tag_binding(flat: &FlatMap, prefix: &str, config: &str) -> TagBinding {
    let mode = match flat.get_str(&format!("{}.mode", config)) {
        Some(raw) => TagMode::parse(raw).unwrap_or_else(|| {
            tracing::debug!("Unknown tag binding mode '{}' at {}, using direct", raw, prefix);
            TagMode::Direct
        }),
        None => TagMode::Direct,
    };

    let references_prefix = format!("{}.references.", config);
    let references = flat
        .with_prefix(&references_prefix)
        .map(|(path, value)| {
            (
                path[references_prefix.len()..].to_string(),
                value_text(value),
            )
        })
        .collect();

    TagBinding {
        path: prefix.to_string(),
        tag_path: text_or_unknown(flat, &format!("{}.tagPath", config)),
        mode,
        references,
    }
}

fn collect_transforms(flat: &FlatMap, binding_path: &str) -> Vec<Node> {
    let prefix = format!("{}.binding.transforms[", binding_path);

    flat.with_prefix(&prefix)
        .filter_map(|(path, value)| {
            let base = path.strip_suffix(".type")?;
            let index = base.get(prefix.len()..)?.strip_suffix(']')?;
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if value.as_str() != Some("script") {
                return None;
            }
            Some(Node::Transform(TransformScript {
                path: base.to_string(),
                binding_path: binding_path.to_string(),
                script: flat.get_text(&format!("{}.script", base)).unwrap_or_default(),
            }))
        })
        .collect()
}

fn collect_message_handlers(flat: &FlatMap) -> Vec<MessageHandlerScript> {
    flat.iter()
        .filter(|(path, _)| MESSAGE_HANDLER_REGEX.is_match(path))
        .filter_map(|(path, value)| {
            let base = path.strip_suffix(".messageType")?;
            let flag = |name: &str| flat.get_bool(&format!("{}.{}", base, name)).unwrap_or(false);
            Some(MessageHandlerScript {
                path: base.to_string(),
                message_type: value_text(value),
                scope: MessageScope {
                    page: flag("pageScope"),
                    session: flag("sessionScope"),
                    view: flag("viewScope"),
                },
                script: flat.get_text(&format!("{}.script", base)).unwrap_or_default(),
            })
        })
        .collect()
}

#[derive(Default)]
struct MethodDraft {
    name: Option<String>,
    script: Option<String>,
    params: Vec<Option<String>>,
}

fn collect_custom_methods(flat: &FlatMap) -> Vec<CustomMethodScript> {
    let mut drafts: IndexMap<String, MethodDraft> = IndexMap::new();

    for (path, value) in flat.iter() {
        let Some(found) = CUSTOM_METHOD_REGEX.find(path) else {
            continue;
        };
        let base = found.as_str();
        let field = &path[found.end()..];
        let draft = drafts.entry(base.to_string()).or_default();

        if field == ".name" {
            draft.name = Some(value_text(value));
        } else if field == ".script" {
            draft.script = Some(value_text(value));
        } else if let Some(caps) = METHOD_PARAM_REGEX.captures(field) {
            if let Ok(position) = caps[1].parse::<usize>() {
                if draft.params.len() <= position {
                    draft.params.resize(position + 1, None);
                }
                draft.params[position] = Some(value_text(value));
            }
        }
    }

    drafts
        .into_iter()
        .map(|(path, draft)| {
            let name = draft.name.unwrap_or_else(|| {
                tracing::debug!("Custom method at {} has no name", path);
                DEFAULT_METHOD_NAME.to_string()
            });
            CustomMethodScript {
                path,
                name,
                params: draft.params.into_iter().map(Option::unwrap_or_default).collect(),
                script: draft.script.unwrap_or_default(),
            }
        })
        .collect()
}

fn collect_event_handlers(flat: &FlatMap) -> Vec<EventHandlerScript> {
    let mut handlers: IndexMap<String, EventHandlerScript> = IndexMap::new();

    for (path, value) in flat.iter() {
        if !(path.contains(".events.") || path.starts_with("events.")) {
            continue;
        }
        let Some(event_path) = path
            .strip_suffix(".config.script")
            .or_else(|| path.strip_suffix(".script"))
        else {
            continue;
        };
        if handlers.contains_key(event_path) {
            continue;
        }
        let Some(caps) = EVENT_REGEX.captures(event_path) else {
            continue;
        };

        let (domain, event_type) = match caps.get(2) {
            Some(event_type) => (Some(caps[1].to_string()), event_type.as_str().to_string()),
            None => (None, caps[1].to_string()),
        };

        handlers.insert(
            event_path.to_string(),
            EventHandlerScript {
                path: event_path.to_string(),
                domain,
                event_type,
                scope: flat
                    .get_text(&format!("{}.scope", event_path))
                    .unwrap_or_else(|| DEFAULT_EVENT_SCOPE.to_string()),
                script: value_text(value),
            },
        );
    }

    handlers.into_values().collect()
}

struct PropertyDraft {
    name: String,
    value: Value,
    persistent: Option<bool>,
    component: Option<String>,
}

fn collect_properties(flat: &FlatMap, index: &ComponentIndex) -> Vec<Property> {
    let mut drafts: IndexMap<String, PropertyDraft> = IndexMap::new();

    for (path, value) in flat.iter() {
        let Some(candidate) = classify_property(path, flat, index) else {
            continue;
        };

        if !drafts.contains_key(&candidate.path) {
            if candidate.persistent == Some(false) {
                continue;
            }
            drafts.insert(
                candidate.path.clone(),
                PropertyDraft {
                    name: last_segment(&candidate.path).to_string(),
                    value: Value::Null,
                    persistent: candidate.persistent,
                    component: candidate.component.map(str::to_string),
                },
            );
        }

        if let Some(draft) = drafts.get_mut(&candidate.path) {
            if candidate.path == path {
                draft.value = value.clone();
            } else {
                assign_nested(&mut draft.value, flat, path, candidate.path.len(), value.clone());
            }
        }
    }

    drafts
        .into_iter()
        .map(|(path, draft)| Property {
            path,
            name: draft.name,
            value: draft.value,
            persistent: draft.persistent,
            component: draft.component,
        })
        .collect()
}

struct PropertyCandidate<'a> {
    /// Property path; array elements collapse onto their array.
    path: String,
    persistent: Option<bool>,
    component: Option<&'a str>,
}

fn classify_property<'a>(
    path: &'a str,
    flat: &FlatMap,
    index: &ComponentIndex,
) -> Option<PropertyCandidate<'a>> {
    if path.ends_with(".type") || path.starts_with("propConfig.") {
        return None;
    }
    let segments: Vec<&str> = path.split('.').collect();
    let interior = &segments[..segments.len().saturating_sub(1)];
    if interior
        .iter()
        .any(|s| STRUCTURAL_SEGMENTS.contains(&segment_name(s)))
    {
        return None;
    }

    if path.starts_with("custom.") || path.starts_with("params.") {
        let top = top_property(flat, path, 7);
        let persistent = resolve_persistence(flat, &[format!("propConfig.{}", top)]);
        return Some(PropertyCandidate {
            path: cut_at_index(flat, path, 0),
            persistent: Some(persistent),
            component: None,
        });
    }

    let (owner, _) = index.owner_of(path)?;
    let relative = &path[owner.len()..];

    if relative.starts_with(".custom.") {
        let property_path = cut_at_index(flat, path, owner.len() + 1);
        let name_start = owner.len() + ".custom.".len();
        let name = top_property(flat, path, name_start)[name_start..].to_string();
        let persistent = resolve_persistence(
            flat,
            &[
                format!("propConfig.{}.custom.{}", owner, name),
                format!("{}.propConfig.custom.{}", owner, name),
            ],
        );
        return Some(PropertyCandidate {
            path: property_path,
            persistent: Some(persistent),
            component: Some(owner),
        });
    }

    let relative_segments: Vec<&str> = relative.trim_start_matches('.').split('.').collect();
    let relative_interior = &relative_segments[..relative_segments.len().saturating_sub(1)];
    if relative_interior
        .iter()
        .any(|s| STYLE_SEGMENTS.contains(&segment_name(s)))
    {
        return None;
    }

    Some(PropertyCandidate {
        path: cut_at_index(flat, path, owner.len() + 1),
        persistent: None,
        component: Some(owner),
    })
}

fn resolve_persistence(flat: &FlatMap, config_paths: &[String]) -> bool {
    config_paths
        .iter()
        .find_map(|p| flat.get_bool(&format!("{}.persistent", p)))
        .unwrap_or(true)
}

/// Truncate `path` at the first array index at or after byte `from`.
///
/// Only brackets the flattener produced count; a key such as `a[1]` is kept.
fn cut_at_index(flat: &FlatMap, path: &str, from: usize) -> String {
    array_index_at(flat, path, from)
        .map(|pos| path[..pos].to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Byte position of the first flattener-produced `[` at or after `from`.
fn array_index_at(flat: &FlatMap, path: &str, from: usize) -> Option<usize> {
    path[from..]
        .match_indices('[')
        .map(|(offset, _)| from + offset)
        .find(|&pos| flat.is_array(&path[..pos]))
}

/// `path` up to the end of the key starting at byte `from`, without any
/// array index.
fn top_property(flat: &FlatMap, path: &str, from: usize) -> String {
    let end = path[from..].find('.').map_or(path.len(), |i| from + i);
    cut_at_index(flat, &path[..end], from)
}

fn segment_name(segment: &str) -> &str {
    segment.split('[').next().unwrap_or(segment)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn text_or_unknown(flat: &FlatMap, path: &str) -> String {
    flat.get_text(path).unwrap_or_else(|| {
        tracing::debug!("Missing {}, using '{}'", path, UNKNOWN);
        UNKNOWN.to_string()
    })
}

enum PathToken<'a> {
    Index(usize),
    Key(&'a str),
}

/// Split `path` after byte `start` into keys and array indices.
fn tokenize<'a>(flat: &FlatMap, path: &'a str, start: usize) -> Vec<PathToken<'a>> {
    let mut tokens = Vec::new();
    let mut pos = start;

    while pos < path.len() {
        let rest = &path[pos..];
        if rest.starts_with('[') && flat.is_array(&path[..pos]) {
            let close = rest.find(']').unwrap_or(rest.len());
            match rest[1..close].parse() {
                Ok(i) => tokens.push(PathToken::Index(i)),
                Err(_) => break,
            }
            pos += close + 1;
        } else {
            let key_start = if rest.starts_with('.') { pos + 1 } else { pos };
            let end = path[key_start..]
                .char_indices()
                .map(|(offset, c)| (key_start + offset, c))
                .find(|&(at, c)| c == '.' || (c == '[' && flat.is_array(&path[..at])))
                .map_or(path.len(), |(at, _)| at);
            tokens.push(PathToken::Key(&path[key_start..end]));
            pos = end;
        }
    }

    tokens
}

/// Write `leaf` into `target` at the part of `path` after byte `start`,
/// creating arrays and objects along the way.
fn assign_nested(target: &mut Value, flat: &FlatMap, path: &str, start: usize, leaf: Value) {
    let mut slot = target;

    for token in tokenize(flat, path, start) {
        match token {
            PathToken::Index(i) => {
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                let Value::Array(items) = slot else {
                    return;
                };
                if items.len() <= i {
                    items.resize(i + 1, Value::Null);
                }
                slot = &mut items[i];
            }
            PathToken::Key(key) => {
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                let Value::Object(map) = slot else {
                    return;
                };
                slot = map.entry(key).or_insert(Value::Null);
            }
        }
    }

    *slot = leaf;
}
