//! The document tree.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`] handles. Elements own an ordered
//! list of child handles; every node has at most one parent at a time. The document also owns a
//! monotonically increasing version counter: every applied [`Operation`] must declare the
//! current version as its base version and bumps the counter by one.
//!
//! Removed content is never dropped. It is moved into the graveyard root, keeping its handles,
//! so that reversing a removal reinserts the very same nodes.

pub mod errors;
pub mod node;
pub mod position;


use std::{collections::HashMap, fmt::Write as _};

pub use errors::ModelError;
pub use node::{AttributeValue, Attributes, Element, Node, NodeData, NodeId, NodeKind};
pub use position::{Position, Range};

use crate::{
    EditorConfig, Result,
    constants::GRAVEYARD,
    delta::Delta,
    operation::{Operation, OperationError},
};

/// Document version counter.
pub type Version = u64;

/// A mutable element tree with named roots, a graveyard and a version counter.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    /// Named roots in configuration order
    roots: Vec<(String, NodeId)>,
    main_root: NodeId,
    graveyard: NodeId,
    version: Version,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with the default configuration: a single root named `main`.
    pub fn new() -> Self {
        let config = EditorConfig::default();
        Self::build(&config.roots, &config.main_root)
    }

    /// Creates a document with the roots described by `config`.
    pub fn with_config(config: &EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config.roots, &config.main_root))
    }

    fn build(root_names: &[String], main_root: &str) -> Self {
        let mut nodes = HashMap::new();
        let mut roots = Vec::with_capacity(root_names.len());
        for name in root_names.iter().map(String::as_str).chain([GRAVEYARD]) {
            let id = NodeId::for_root(name);
            nodes.insert(id, Self::root_node(name));
            if name != GRAVEYARD {
                roots.push((name.to_string(), id));
            }
        }
        Self {
            nodes,
            roots,
            main_root: NodeId::for_root(main_root),
            graveyard: NodeId::for_root(GRAVEYARD),
            version: 0,
        }
    }

    fn root_node(name: &str) -> Node {
        Node {
            parent: None,
            kind: NodeKind::Element(Element {
                name: name.to_string(),
                attributes: Attributes::new(),
                children: Vec::new(),
            }),
        }
    }

    /// Current document version.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn main_root(&self) -> NodeId {
        self.main_root
    }

    /// The root holding removed content.
    pub fn graveyard(&self) -> NodeId {
        self.graveyard
    }

    /// Handle of the named root, if it exists.
    pub fn root(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .find(|(root_name, _)| root_name == name)
            .map(|(_, id)| *id)
    }

    /// Handle of the named root, or an error naming the missing root.
    pub fn require_root(&self, name: &str) -> Result<NodeId> {
        self.root(name).ok_or_else(|| {
            ModelError::UnknownRoot {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Named roots in configuration order (the graveyard is not included).
    pub fn roots(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.roots.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The element behind `id`, or an error if it is missing or a text leaf.
    pub fn element(&self, id: NodeId) -> Result<&Element> {
        let node = self
            .nodes
            .get(&id)
            .ok_or(ModelError::NodeNotFound { id })?;
        Ok(node.as_element().ok_or(ModelError::NotAnElement { id })?)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ModelError::NodeNotFound { id })?;
        Ok(node.as_element_mut().ok_or(ModelError::NotAnElement { id })?)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    /// True when `id` exists and has no parent.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.parent.is_none())
    }

    /// Offset of `id` inside its parent.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.element(parent)
            .ok()?
            .children
            .iter()
            .position(|child| *child == id)
    }

    pub fn max_offset(&self, id: NodeId) -> Result<usize> {
        Ok(self.element(id)?.max_offset())
    }

    /// The child starting at `offset`, if any.
    pub fn child_at(&self, parent: NodeId, offset: usize) -> Option<NodeId> {
        self.element(parent).ok()?.children.get(offset).copied()
    }

    /// True when `node` is `ancestor` or lies somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The position right before `id` in its parent.
    pub fn position_before(&self, id: NodeId) -> Result<Position> {
        let parent = self.parent(id).ok_or_else(|| self.detached(id))?;
        let offset = self.index_of(id).ok_or_else(|| self.detached(id))?;
        Ok(Position::new(parent, offset))
    }

    /// The position right after `id` in its parent.
    pub fn position_after(&self, id: NodeId) -> Result<Position> {
        let before = self.position_before(id)?;
        Ok(before.with_offset(before.offset + 1))
    }

    fn detached(&self, id: NodeId) -> crate::Error {
        if self.contains_node(id) {
            ModelError::InvalidRange {
                reason: format!("node {id} has no parent"),
            }
            .into()
        } else {
            ModelError::NodeNotFound { id }.into()
        }
    }

    /// Checks that `position` resolves to an element and an offset within its bounds.
    pub fn validate_position(&self, position: &Position) -> Result<()> {
        let max_offset = self.max_offset(position.parent)?;
        if position.offset > max_offset {
            return Err(ModelError::OffsetOutOfBounds {
                parent: position.parent,
                offset: position.offset,
                max_offset,
            }
            .into());
        }
        Ok(())
    }

    /// Checks that both ends of `range` resolve.
    pub fn validate_range(&self, range: &Range) -> Result<()> {
        self.validate_position(&range.start())?;
        self.validate_position(&range.end())
    }

    /// Owned snapshot of the subtree rooted at `id`.
    pub fn snapshot(&self, id: NodeId) -> Result<NodeData> {
        let node = self
            .nodes
            .get(&id)
            .ok_or(ModelError::NodeNotFound { id })?;
        Ok(match &node.kind {
            NodeKind::Text(data) => NodeData::Text {
                id,
                data: data.clone(),
            },
            NodeKind::Element(element) => NodeData::Element {
                id,
                name: element.name.clone(),
                attributes: element.attributes.clone(),
                children: element
                    .children
                    .iter()
                    .map(|child| self.snapshot(*child))
                    .collect::<Result<_>>()?,
            },
        })
    }

    /// Compact markup of the subtree rooted at `id`, e.g. `<p align="left">ab</p>`.
    ///
    /// Unknown handles render as an empty string.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(data) => out.push_str(data),
            NodeKind::Element(element) => {
                let _ = write!(out, "<{}", element.name);
                for (key, value) in &element.attributes {
                    match value {
                        AttributeValue::String(s) => {
                            let _ = write!(out, " {key}=\"{s}\"");
                        }
                        other => {
                            let _ = write!(out, " {key}={other}");
                        }
                    }
                }
                out.push('>');
                for child in &element.children {
                    self.render_into(*child, out);
                }
                let _ = write!(out, "</{}>", element.name);
            }
        }
    }

    /// Applies a single operation.
    ///
    /// Fails with a version mismatch when the operation was computed against another version.
    /// A failed operation leaves the document untouched; a successful one bumps the version.
    pub fn apply_operation(&mut self, operation: &Operation) -> Result<()> {
        if operation.base_version() != self.version {
            return Err(OperationError::VersionMismatch {
                operation: operation.type_name(),
                expected: operation.base_version(),
                actual: self.version,
            }
            .into());
        }
        operation.execute(self)?;
        self.version += 1;
        tracing::trace!(
            operation = operation.type_name(),
            version = self.version,
            "Applied operation"
        );
        Ok(())
    }

    /// Applies every operation of `delta` in order, all or nothing.
    ///
    /// If any operation fails, the document is restored to its state before the first one.
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<()> {
        let snapshot = self.clone();
        for operation in delta.operations() {
            if let Err(err) = self.apply_operation(operation) {
                tracing::warn!(
                    delta = delta.type_id(),
                    version = self.version,
                    error = %err,
                    "Delta failed to apply, rolling back"
                );
                *self = snapshot;
                return Err(err);
            }
        }
        tracing::debug!(
            delta = delta.type_id(),
            operations = delta.operations().len(),
            version = self.version,
            "Applied delta"
        );
        Ok(())
    }

    /// Creates `nodes` (with their handles) at `position`.
    pub(crate) fn insert_nodes(&mut self, position: &Position, nodes: &[NodeData]) -> Result<()> {
        self.validate_position(position)?;
        let mut seen = std::collections::HashSet::new();
        for data in nodes {
            let mut duplicate = None;
            data.for_each_id(&mut |id| {
                if duplicate.is_none() && (self.nodes.contains_key(&id) || !seen.insert(id)) {
                    duplicate = Some(id);
                }
            });
            if let Some(id) = duplicate {
                return Err(ModelError::NodeAlreadyExists { id }.into());
            }
        }

        let ids: Vec<NodeId> = nodes
            .iter()
            .map(|data| self.create_subtree(data, position.parent))
            .collect();
        self.element_mut(position.parent)?
            .children
            .splice(position.offset..position.offset, ids);
        Ok(())
    }

    fn create_subtree(&mut self, data: &NodeData, parent: NodeId) -> NodeId {
        let id = data.id();
        let kind = match data {
            NodeData::Text { data, .. } => NodeKind::Text(data.clone()),
            NodeData::Element {
                name,
                attributes,
                children,
                ..
            } => NodeKind::Element(Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children: children
                    .iter()
                    .map(|child| self.create_subtree(child, id))
                    .collect(),
            }),
        };
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                kind,
            },
        );
        id
    }

    /// Moves `how_many` siblings starting at `source` to `target`.
    ///
    /// `target` is expressed before the nodes are detached, as in
    /// [`Position::transformed_by_move`].
    pub(crate) fn move_nodes(
        &mut self,
        source: &Position,
        how_many: usize,
        target: &Position,
    ) -> Result<()> {
        let range = Range::from_position_and_shift(*source, how_many);
        self.validate_range(&range)?;
        self.validate_position(target)?;

        if range.contains_position(target) {
            return Err(ModelError::MoveIntoItself {
                id: self.element(source.parent)?.children[target.offset],
            }
            .into());
        }
        let moved: Vec<NodeId> =
            self.element(source.parent)?.children[source.offset..source.offset + how_many].to_vec();
        if let Some(id) = moved.iter().find(|id| self.contains(**id, target.parent)) {
            return Err(ModelError::MoveIntoItself { id: *id }.into());
        }

        let target_offset = if target.parent == source.parent && target.offset > source.offset {
            target.offset - how_many
        } else {
            target.offset
        };
        self.element_mut(source.parent)?
            .children
            .drain(source.offset..source.offset + how_many);
        self.element_mut(target.parent)?
            .children
            .splice(target_offset..target_offset, moved.iter().copied());
        for id in moved {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = Some(target.parent);
            }
        }
        Ok(())
    }

    /// Sets (or clears, with `None`) one attribute. Returns the previous value.
    pub(crate) fn set_attribute(
        &mut self,
        id: NodeId,
        key: &str,
        value: Option<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        let element = self.element_mut(id)?;
        Ok(match value {
            Some(value) => element.attributes.insert(key.to_string(), value),
            None => element.attributes.remove(key),
        })
    }

    /// Renames an element. Returns the previous name.
    pub(crate) fn rename_element(&mut self, id: NodeId, name: &str) -> Result<String> {
        let element = self.element_mut(id)?;
        Ok(std::mem::replace(&mut element.name, name.to_string()))
    }
}
