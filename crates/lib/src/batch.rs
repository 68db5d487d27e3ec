//! Batches: the deltas of one user action.
//!
//! A [`Batch`] borrows the document for the duration of an action and records every delta it
//! creates, in order. Each delta is applied as it is created; a delta whose construction fails
//! is not recorded and leaves the document as it was, while the deltas created before it stay
//! applied.
//!
//! ```
//! use treedelta::{Batch, Document, model::{NodeData, Position}};
//!
//! let mut doc = Document::new();
//! let root = doc.main_root();
//! let heading = NodeData::element("h1");
//! let id = heading.id();
//!
//! let mut batch = Batch::new(&mut doc);
//! batch.insert(Position::new(root, 0), vec![heading]).unwrap();
//! batch.rename(id, "h2").unwrap();
//! assert_eq!(batch.deltas().len(), 2);
//! assert_eq!(batch.base_version(), Some(0));
//!
//! assert_eq!(doc.render(root), "<main><h2></h2></main>");
//! ```

use crate::{
    Document, Result,
    delta::{
        AttributeDelta, Delta, EditContext, InsertDelta, MergeDelta, MoveDelta, RemoveDelta,
        RenameDelta, SplitDelta, UnwrapDelta, WrapDelta,
    },
    model::{AttributeValue, NodeData, NodeId, Position, Range, Version},
};

/// Groups the deltas of one user action.
pub struct Batch<'doc> {
    context: EditContext<'doc>,
    deltas: Vec<Delta>,
}

impl<'doc> Batch<'doc> {
    pub fn new(document: &'doc mut Document) -> Self {
        Self {
            context: EditContext::new(document),
            deltas: Vec::new(),
        }
    }

    /// The document as modified by the deltas created so far.
    pub fn document(&self) -> &Document {
        self.context.document()
    }

    /// Inserts `nodes` at `position`.
    pub fn insert(&mut self, position: Position, nodes: Vec<NodeData>) -> Result<&Delta> {
        let delta = InsertDelta::create(&mut self.context, position, nodes)?;
        Ok(self.push(delta))
    }

    /// Removes the siblings in `range`.
    pub fn remove(&mut self, range: Range) -> Result<&Delta> {
        let delta = RemoveDelta::create(&mut self.context, range)?;
        Ok(self.push(delta))
    }

    /// Moves the siblings in `range` to `target`.
    pub fn move_range(&mut self, range: Range, target: Position) -> Result<&Delta> {
        let delta = MoveDelta::create(&mut self.context, range, target)?;
        Ok(self.push(delta))
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<&Delta> {
        let delta = AttributeDelta::create(&mut self.context, node, key, Some(value.into()))?;
        Ok(self.push(delta))
    }

    pub fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<&Delta> {
        let delta = AttributeDelta::create(&mut self.context, node, key, None)?;
        Ok(self.push(delta))
    }

    pub fn rename(&mut self, node: NodeId, name: &str) -> Result<&Delta> {
        let delta = RenameDelta::create(&mut self.context, node, name)?;
        Ok(self.push(delta))
    }

    /// Splits the element containing `position` at that position.
    pub fn split(&mut self, position: Position) -> Result<&Delta> {
        let delta = SplitDelta::create(&mut self.context, position)?;
        Ok(self.push(delta))
    }

    /// Merges the elements on either side of `position`.
    pub fn merge(&mut self, position: Position) -> Result<&Delta> {
        let delta = MergeDelta::create(&mut self.context, position)?;
        Ok(self.push(delta))
    }

    /// Wraps the siblings in `range` in the empty element `wrapper`.
    pub fn wrap(&mut self, range: Range, wrapper: NodeData) -> Result<&Delta> {
        let delta = WrapDelta::create(&mut self.context, range, wrapper)?;
        Ok(self.push(delta))
    }

    /// Replaces `element` with its children.
    pub fn unwrap(&mut self, element: NodeId) -> Result<&Delta> {
        let delta = UnwrapDelta::create(&mut self.context, element)?;
        Ok(self.push(delta))
    }

    /// Deltas created so far, in creation order.
    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn into_deltas(self) -> Vec<Delta> {
        self.deltas
    }

    /// Base version of the first recorded operation.
    pub fn base_version(&self) -> Option<Version> {
        self.deltas.iter().find_map(Delta::base_version)
    }

    fn push(&mut self, delta: impl Into<Delta>) -> &Delta {
        self.deltas.push(delta.into());
        &self.deltas[self.deltas.len() - 1]
    }
}
