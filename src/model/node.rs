//! Node types recovered from a flattened view.
//!
//! Every node is addressed by the flattened path it was discovered at. The
//! set of variants is closed: [`Node`] wraps one struct per [`NodeType`], and
//! rules consume nodes through the [`Visitor`] trait.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag identifying a node variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Component,
    Property,
    ExpressionBinding,
    PropertyBinding,
    TagBinding,
    MessageHandler,
    CustomMethod,
    Transform,
    EventHandler,
}

impl NodeType {
    /// Every node type.
    pub const ALL: [NodeType; 9] = [
        NodeType::Component,
        NodeType::Property,
        NodeType::ExpressionBinding,
        NodeType::PropertyBinding,
        NodeType::TagBinding,
        NodeType::MessageHandler,
        NodeType::CustomMethod,
        NodeType::Transform,
        NodeType::EventHandler,
    ];

    /// Binding node types.
    pub const BINDINGS: [NodeType; 3] = [
        NodeType::ExpressionBinding,
        NodeType::PropertyBinding,
        NodeType::TagBinding,
    ];

    /// Script-bearing node types.
    pub const SCRIPTS: [NodeType; 4] = [
        NodeType::MessageHandler,
        NodeType::CustomMethod,
        NodeType::Transform,
        NodeType::EventHandler,
    ];

    /// The snake_case name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Component => "component",
            NodeType::Property => "property",
            NodeType::ExpressionBinding => "expression_binding",
            NodeType::PropertyBinding => "property_binding",
            NodeType::TagBinding => "tag_binding",
            NodeType::MessageHandler => "message_handler",
            NodeType::CustomMethod => "custom_method",
            NodeType::Transform => "transform",
            NodeType::EventHandler => "event_handler",
        }
    }

    /// Check if this is a binding type.
    pub fn is_binding(&self) -> bool {
        Self::BINDINGS.contains(self)
    }

    /// Check if this is a script type.
    pub fn is_script(&self) -> bool {
        Self::SCRIPTS.contains(self)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown node type: {}", s))
    }
}

/// A named component instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    /// Properties attributed to this component, by name.
    pub properties: IndexMap<String, Value>,
}

/// A user-visible property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub path: String,
    pub name: String,
    pub value: Value,
    /// Resolved persistence, present for custom properties and view params.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
    /// Path of the owning component, if component-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// Expression binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionBinding {
    pub path: String,
    pub expression: String,
}

/// Property binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyBinding {
    pub path: String,
    pub target_path: String,
}

/// How a tag binding resolves its tag path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    #[default]
    Direct,
    Indirect,
    Expression,
}

impl TagMode {
    /// Parse a mode from a binding config value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct" => Some(TagMode::Direct),
            "indirect" => Some(TagMode::Indirect),
            "expression" => Some(TagMode::Expression),
            _ => None,
        }
    }
}

/// Tag binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagBinding {
    pub path: String,
    pub tag_path: String,
    pub mode: TagMode,
    /// Indirect references by placeholder key.
    pub references: IndexMap<String, String>,
}

/// Scopes a message handler listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MessageScope {
    pub page: bool,
    pub session: bool,
    pub view: bool,
}

/// Component message handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageHandlerScript {
    pub path: String,
    pub message_type: String,
    pub scope: MessageScope,
    pub script: String,
}

/// Component custom method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomMethodScript {
    pub path: String,
    pub name: String,
    pub params: Vec<String>,
    pub script: String,
}

/// Script transform attached to a binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformScript {
    pub path: String,
    pub binding_path: String,
    pub script: String,
}

/// Component event handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHandlerScript {
    pub path: String,
    /// Event domain such as `dom` or `component`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub event_type: String,
    pub scope: String,
    pub script: String,
}

/// Shared view of the three binding variants.
pub trait BindingNode {
    fn path(&self) -> &str;
    fn node_type(&self) -> NodeType;
    /// Every text fragment the binding evaluates or points at.
    fn texts(&self) -> Vec<&str>;
}

impl BindingNode for ExpressionBinding {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::ExpressionBinding
    }
    fn texts(&self) -> Vec<&str> {
        vec![&self.expression]
    }
}

impl BindingNode for PropertyBinding {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::PropertyBinding
    }
    fn texts(&self) -> Vec<&str> {
        vec![&self.target_path]
    }
}

impl BindingNode for TagBinding {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::TagBinding
    }
    fn texts(&self) -> Vec<&str> {
        std::iter::once(self.tag_path.as_str())
            .chain(self.references.values().map(String::as_str))
            .collect()
    }
}

/// Shared view of the four script variants.
pub trait ScriptNode {
    fn path(&self) -> &str;
    fn node_type(&self) -> NodeType;
    fn script(&self) -> &str;

    /// The `def` line the script body runs under.
    fn function_signature(&self) -> String;

    /// The script wrapped in its function signature.
    ///
    /// An empty body becomes `pass` so the result is always valid source.
    fn formatted_script(&self) -> String {
        let body = if self.script().trim().is_empty() {
            "\tpass"
        } else {
            self.script()
        };
        format!("{}\n{}", self.function_signature(), body)
    }
}

impl ScriptNode for MessageHandlerScript {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::MessageHandler
    }
    fn script(&self) -> &str {
        &self.script
    }
    fn function_signature(&self) -> String {
        "def onMessageReceived(self, payload):".to_string()
    }
}

impl ScriptNode for CustomMethodScript {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::CustomMethod
    }
    fn script(&self) -> &str {
        &self.script
    }
    fn function_signature(&self) -> String {
        let params: Vec<&str> = std::iter::once("self")
            .chain(
                self.params
                    .iter()
                    .map(String::as_str)
                    .filter(|p| !p.is_empty()),
            )
            .collect();
        format!("def {}({}):", self.name, params.join(", "))
    }
}

impl ScriptNode for TransformScript {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::Transform
    }
    fn script(&self) -> &str {
        &self.script
    }
    fn function_signature(&self) -> String {
        "def transform(self, value):".to_string()
    }
}

impl ScriptNode for EventHandlerScript {
    fn path(&self) -> &str {
        &self.path
    }
    fn node_type(&self) -> NodeType {
        NodeType::EventHandler
    }
    fn script(&self) -> &str {
        &self.script
    }
    fn function_signature(&self) -> String {
        format!("def {}(self, event):", self.event_type)
    }
}

/// Receives nodes by variant.
///
/// Every method has a default. Binding variants fall back to
/// [`Visitor::visit_binding`] and script variants to [`Visitor::visit_script`],
/// so a visitor can handle a whole family in one place.
pub trait Visitor {
    fn visit_component(&mut self, _component: &Component) {}

    fn visit_property(&mut self, _property: &Property) {}

    fn visit_binding(&mut self, _binding: &dyn BindingNode) {}

    fn visit_expression_binding(&mut self, binding: &ExpressionBinding) {
        self.visit_binding(binding);
    }

    fn visit_property_binding(&mut self, binding: &PropertyBinding) {
        self.visit_binding(binding);
    }

    fn visit_tag_binding(&mut self, binding: &TagBinding) {
        self.visit_binding(binding);
    }

    fn visit_script(&mut self, _script: &dyn ScriptNode) {}

    fn visit_message_handler(&mut self, script: &MessageHandlerScript) {
        self.visit_script(script);
    }

    fn visit_custom_method(&mut self, script: &CustomMethodScript) {
        self.visit_script(script);
    }

    fn visit_transform(&mut self, script: &TransformScript) {
        self.visit_script(script);
    }

    fn visit_event_handler(&mut self, script: &EventHandlerScript) {
        self.visit_script(script);
    }
}

/// A node recovered from a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum Node {
    Component(Component),
    Property(Property),
    ExpressionBinding(ExpressionBinding),
    PropertyBinding(PropertyBinding),
    TagBinding(TagBinding),
    MessageHandler(MessageHandlerScript),
    CustomMethod(CustomMethodScript),
    Transform(TransformScript),
    EventHandler(EventHandlerScript),
}

impl Node {
    /// The flattened path this node was found at.
    pub fn path(&self) -> &str {
        match self {
            Node::Component(n) => &n.path,
            Node::Property(n) => &n.path,
            Node::ExpressionBinding(n) => &n.path,
            Node::PropertyBinding(n) => &n.path,
            Node::TagBinding(n) => &n.path,
            Node::MessageHandler(n) => &n.path,
            Node::CustomMethod(n) => &n.path,
            Node::Transform(n) => &n.path,
            Node::EventHandler(n) => &n.path,
        }
    }

    /// The variant tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Component(_) => NodeType::Component,
            Node::Property(_) => NodeType::Property,
            Node::ExpressionBinding(_) => NodeType::ExpressionBinding,
            Node::PropertyBinding(_) => NodeType::PropertyBinding,
            Node::TagBinding(_) => NodeType::TagBinding,
            Node::MessageHandler(_) => NodeType::MessageHandler,
            Node::CustomMethod(_) => NodeType::CustomMethod,
            Node::Transform(_) => NodeType::Transform,
            Node::EventHandler(_) => NodeType::EventHandler,
        }
    }

    /// Check membership in a rule's target set. An empty set matches everything.
    pub fn applies_to(&self, targets: &BTreeSet<NodeType>) -> bool {
        targets.is_empty() || targets.contains(&self.node_type())
    }

    /// Dispatch to the visitor method for this variant.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Component(n) => visitor.visit_component(n),
            Node::Property(n) => visitor.visit_property(n),
            Node::ExpressionBinding(n) => visitor.visit_expression_binding(n),
            Node::PropertyBinding(n) => visitor.visit_property_binding(n),
            Node::TagBinding(n) => visitor.visit_tag_binding(n),
            Node::MessageHandler(n) => visitor.visit_message_handler(n),
            Node::CustomMethod(n) => visitor.visit_custom_method(n),
            Node::Transform(n) => visitor.visit_transform(n),
            Node::EventHandler(n) => visitor.visit_event_handler(n),
        }
    }

    /// The script view of this node, if it carries one.
    pub fn as_script(&self) -> Option<&dyn ScriptNode> {
        match self {
            Node::MessageHandler(n) => Some(n),
            Node::CustomMethod(n) => Some(n),
            Node::Transform(n) => Some(n),
            Node::EventHandler(n) => Some(n),
            _ => None,
        }
    }

    /// The binding view of this node, if it is a binding.
    pub fn as_binding(&self) -> Option<&dyn BindingNode> {
        match self {
            Node::ExpressionBinding(n) => Some(n),
            Node::PropertyBinding(n) => Some(n),
            Node::TagBinding(n) => Some(n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Visitor for Recorder {
        fn visit_component(&mut self, component: &Component) {
            self.calls.push(format!("component:{}", component.name));
        }

        fn visit_binding(&mut self, binding: &dyn BindingNode) {
            self.calls.push(format!("binding:{}", binding.node_type()));
        }

        fn visit_script(&mut self, script: &dyn ScriptNode) {
            self.calls.push(format!("script:{}", script.node_type()));
        }

        fn visit_transform(&mut self, script: &TransformScript) {
            self.calls.push(format!("transform:{}", script.binding_path));
        }
    }

    fn message_handler(script: &str) -> MessageHandlerScript {
        MessageHandlerScript {
            path: "root.root.scripts.messageHandlers[0]".into(),
            message_type: "refresh".into(),
            scope: MessageScope::default(),
            script: script.into(),
        }
    }

    #[test]
    fn node_type_round_trips_through_str() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>(), Ok(t));
        }
        assert!("widget".parse::<NodeType>().is_err());
    }

    #[test]
    fn node_type_families() {
        assert!(NodeType::TagBinding.is_binding());
        assert!(!NodeType::TagBinding.is_script());
        assert!(NodeType::EventHandler.is_script());
        assert!(!NodeType::Component.is_binding());
    }

    #[test]
    fn applies_to_empty_set_matches_all() {
        let node = Node::MessageHandler(message_handler(""));
        assert!(node.applies_to(&BTreeSet::new()));
        assert!(node.applies_to(&BTreeSet::from([NodeType::MessageHandler])));
        assert!(!node.applies_to(&BTreeSet::from([NodeType::Component])));
    }

    #[test]
    fn visitor_falls_back_to_family_methods() {
        let nodes = vec![
            Node::Component(Component {
                path: "root.root".into(),
                name: "root".into(),
                component_type: "ia.container.flex".into(),
                properties: IndexMap::new(),
            }),
            Node::ExpressionBinding(ExpressionBinding {
                path: "root.root.props.text".into(),
                expression: "now()".into(),
            }),
            Node::Transform(TransformScript {
                path: "root.root.props.text.binding.transforms[0]".into(),
                binding_path: "root.root.props.text".into(),
                script: "\treturn value".into(),
            }),
            Node::MessageHandler(message_handler("\tpass")),
        ];

        let mut recorder = Recorder::default();
        for node in &nodes {
            node.accept(&mut recorder);
        }

        assert_eq!(
            recorder.calls,
            vec![
                "component:root",
                "binding:expression_binding",
                "transform:root.root.props.text",
                "script:message_handler",
            ]
        );
    }

    #[test]
    fn function_signatures() {
        let method = CustomMethodScript {
            path: "p".into(),
            name: "calculate".into(),
            params: vec!["a".into(), "b".into()],
            script: String::new(),
        };
        assert_eq!(method.function_signature(), "def calculate(self, a, b):");

        let event = EventHandlerScript {
            path: "p".into(),
            domain: Some("dom".into()),
            event_type: "onClick".into(),
            scope: "L".into(),
            script: String::new(),
        };
        assert_eq!(event.function_signature(), "def onClick(self, event):");
        assert_eq!(
            message_handler("").function_signature(),
            "def onMessageReceived(self, payload):"
        );
    }

    #[test]
    fn empty_script_formats_as_pass() {
        let handler = message_handler("   ");
        assert_eq!(
            handler.formatted_script(),
            "def onMessageReceived(self, payload):\n\tpass"
        );

        let handler = message_handler("\tprint(payload)");
        assert_eq!(
            handler.formatted_script(),
            "def onMessageReceived(self, payload):\n\tprint(payload)"
        );
    }

    #[test]
    fn tag_binding_texts_include_references() {
        let mut references = IndexMap::new();
        references.insert("0".to_string(), "{view.params.line}".to_string());
        let binding = TagBinding {
            path: "p".into(),
            tag_path: "[default]Line{0}/Speed".into(),
            mode: TagMode::Indirect,
            references,
        };
        assert_eq!(
            binding.texts(),
            vec!["[default]Line{0}/Speed", "{view.params.line}"]
        );
    }

    #[test]
    fn nodes_serialize_with_type_tag() {
        let node = Node::ExpressionBinding(ExpressionBinding {
            path: "custom.a".into(),
            expression: "1".into(),
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["node_type"], "expression_binding");
        assert_eq!(json["expression"], "1");
    }
}
