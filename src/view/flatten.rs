//! Flattening of nested view documents into ordered path→value maps.
//!
//! Paths use `.key` for object fields and `[n]` for array indices. Any object
//! carrying a `meta.name` field contributes that name as an extra path segment
//! before its own keys, so a component's subtree is addressed by the chain of
//! component names above it:
//!
//! ```
//! use ignition_lint::view::flatten;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "root": {
//!         "meta": { "name": "root" },
//!         "children": [{ "meta": { "name": "Button1" }, "type": "ia.input.button" }]
//!     }
//! });
//! let flat = flatten(&doc);
//! assert_eq!(flat.get_str("root.root.children[0].Button1.type"), Some("ia.input.button"));
//! ```

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered mapping from flattened path to leaf value.
///
/// Iteration order is the depth-first order of the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatMap {
    entries: IndexMap<String, Value>,
    /// Paths of the arrays whose elements were flattened as `[n]`.
    #[serde(skip)]
    arrays: BTreeSet<String>,
}

impl FlatMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf value, returning the previous value at that path.
    pub fn insert(&mut self, path: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(path.into(), value)
    }

    /// Get the leaf value at a path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    /// Get the leaf at a path if it is a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Get the leaf at a path if it is a boolean.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Get the leaf at a path rendered as text.
    ///
    /// Strings are returned as-is, other scalars in their JSON form.
    pub fn get_text(&self, path: &str) -> Option<String> {
        self.get(path).map(value_text)
    }

    /// Mark `path` as an array, so `path[n]` is read as an index rather
    /// than as part of a key.
    pub fn mark_array(&mut self, path: impl Into<String>) {
        self.arrays.insert(path.into());
    }

    /// Check whether `path` is an array of the source document.
    pub fn is_array(&self, path: &str) -> bool {
        self.arrays.contains(path)
    }

    /// Check whether a path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Iterate over all entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over entries whose path starts with `prefix`.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.iter().filter(move |(path, _)| path.starts_with(prefix))
    }

    /// Iterate over every string leaf.
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().filter_map(Value::as_str)
    }

    /// Number of leaf paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no paths.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            arrays: BTreeSet::new(),
        }
    }
}

/// Render a leaf value as text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten a view document.
///
/// Empty objects and arrays produce no paths. A bare scalar document is
/// stored at the empty path.
pub fn flatten(document: &Value) -> FlatMap {
    let mut flat = FlatMap::new();
    flatten_value(document, String::new(), &mut flat);
    flat
}

fn flatten_value(value: &Value, path: String, flat: &mut FlatMap) {
    match value {
        Value::Object(map) => flatten_object(map, path, flat),
        Value::Array(items) => {
            flat.mark_array(path.clone());
            for (index, item) in items.iter().enumerate() {
                flatten_value(item, format!("{}[{}]", path, index), flat);
            }
        }
        scalar => {
            flat.insert(path, scalar.clone());
        }
    }
}

fn flatten_object(map: &Map<String, Value>, path: String, flat: &mut FlatMap) {
    let path = match component_name(map) {
        Some(name) => join(&path, name),
        None => path,
    };

    for (key, value) in map {
        flatten_value(value, join(&path, key), flat);
    }
}

fn component_name(map: &Map<String, Value>) -> Option<&str> {
    map.get("meta")?
        .get("name")?
        .as_str()
        .filter(|name| !name.is_empty())
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}
