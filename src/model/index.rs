//! Path index for resolving which component owns a flattened path.

use std::collections::BTreeMap;

/// Maps component paths to their position in the model.
///
/// Ownership is positional: a path belongs to the component whose path is
/// its longest proper prefix ending on a segment boundary (`.` or `[`).
#[derive(Debug, Clone, Default)]
pub struct ComponentIndex {
    paths: BTreeMap<String, usize>,
}

impl ComponentIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a component path.
    pub fn insert(&mut self, path: impl Into<String>, position: usize) {
        self.paths.insert(path.into(), position);
    }

    /// Position of the component at exactly `path`.
    pub fn get(&self, path: &str) -> Option<usize> {
        self.paths.get(path).copied()
    }

    /// Find the owning component of `path`.
    ///
    /// Walks segment boundaries from the end of the path towards the start,
    /// so the first hit is the longest prefix.
    pub fn owner_of<'a>(&self, path: &'a str) -> Option<(&'a str, usize)> {
        path.char_indices()
            .rev()
            .filter(|&(_, c)| c == '.' || c == '[')
            .find_map(|(i, _)| {
                let prefix = &path[..i];
                self.get(prefix).map(|position| (prefix, position))
            })
    }

    /// Number of indexed components.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if no components are indexed.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
