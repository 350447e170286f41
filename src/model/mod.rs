//! Typed node model of a Perspective view.
//!
//! The model is a flat arena of [`Node`]s plus a [`ComponentIndex`] for
//! resolving which component owns a path. It is rebuilt from scratch for
//! every document by [`build_model`].

pub mod builder;
pub mod index;
pub mod node;

use std::collections::BTreeMap;

use indexmap::IndexMap;

pub use builder::{build_model, DEFAULT_EVENT_SCOPE, UNKNOWN};
pub use index::ComponentIndex;
pub use node::{
    BindingNode, Component, CustomMethodScript, EventHandlerScript, ExpressionBinding,
    MessageHandlerScript, MessageScope, Node, NodeType, Property, PropertyBinding, ScriptNode,
    TagBinding, TagMode, TransformScript, Visitor,
};

/// Nodes recovered from one view.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    nodes: Vec<Node>,
    components: ComponentIndex,
}

impl ViewModel {
    /// Create a model. `components` positions must index into `nodes`.
    pub fn new(nodes: Vec<Node>, components: ComponentIndex) -> Self {
        Self { nodes, components }
    }

    /// All nodes in emission order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes of one type.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| n.node_type() == node_type)
    }

    /// All components.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Component(c) => Some(c),
            _ => None,
        })
    }

    /// The component owning `path`, by longest prefix.
    pub fn owner_of(&self, path: &str) -> Option<&Component> {
        let (_, position) = self.components.owner_of(path)?;
        match self.nodes.get(position) {
            Some(Node::Component(c)) => Some(c),
            _ => None,
        }
    }

    /// Node count per type.
    pub fn count_by_type(&self) -> BTreeMap<NodeType, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.node_type()).or_insert(0) += 1;
        }
        counts
    }

    /// Component count per component type, in first-seen order.
    pub fn components_by_type(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for component in self.components() {
            *counts.entry(component.component_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the model has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
