//! Node handles, arena nodes and owned node snapshots.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value stored under an attribute key.
pub type AttributeValue = serde_json::Value;

/// Attribute mapping of an element. Keys are unique.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Stable handle of a node in a [`Document`](super::Document).
///
/// Handles never change when nodes move, so positions and operations expressed in terms of
/// handles stay valid across structural edits elsewhere in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a fresh random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic handle of the root with the given name.
    ///
    /// Every replica derives the same handle from the same name.
    pub fn for_root(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An element: name, attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Attributes,
    pub(crate) children: Vec<NodeId>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Sum of child offset sizes. Every child counts as one.
    pub fn max_offset(&self) -> usize {
        self.children.len()
    }
}

/// Payload of an arena node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    /// Atomic text leaf with offset size 1
    Text(String),
}

/// A node stored in the document arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// Parent handle, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(data) => Some(data),
            NodeKind::Element(_) => None,
        }
    }
}

/// Owned, recursive snapshot of a subtree.
///
/// Used as the payload of insert operations and to compare document content. Handles are part
/// of the snapshot, so inserting the same snapshot on two replicas yields the same nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeData {
    Element {
        id: NodeId,
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: Attributes,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeData>,
    },
    Text {
        id: NodeId,
        data: String,
    },
}

impl NodeData {
    /// An empty element with a fresh handle.
    pub fn element(name: impl Into<String>) -> Self {
        Self::element_with_id(NodeId::new(), name)
    }

    /// An empty element with the given handle.
    pub fn element_with_id(id: NodeId, name: impl Into<String>) -> Self {
        NodeData::Element {
            id,
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// A text leaf with a fresh handle.
    pub fn text(data: impl Into<String>) -> Self {
        NodeData::Text {
            id: NodeId::new(),
            data: data.into(),
        }
    }

    /// Sets an attribute. Text leaves carry no attributes and are returned unchanged.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        if let NodeData::Element { attributes, .. } = &mut self {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Appends children. Text leaves have no children and are returned unchanged.
    pub fn with_children(mut self, nodes: Vec<NodeData>) -> Self {
        if let NodeData::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn id(&self) -> NodeId {
        match self {
            NodeData::Element { id, .. } | NodeData::Text { id, .. } => *id,
        }
    }

    /// Element name, `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeData] {
        match self {
            NodeData::Element { children, .. } => children,
            NodeData::Text { .. } => &[],
        }
    }

    /// Visits this node and all descendants in document order.
    pub(crate) fn for_each_id(&self, f: &mut impl FnMut(NodeId)) {
        f(self.id());
        for child in self.children() {
            child.for_each_id(f);
        }
    }
}
