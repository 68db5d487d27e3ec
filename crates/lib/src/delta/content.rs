//! Single-operation content deltas.
//!
//! Each constructor produces at most one operation. Edits that would not change the document
//! (inserting nothing, removing an empty range, setting an attribute to its current value)
//! produce an empty delta.

use super::{AttributeDelta, EditContext, InsertDelta, MoveDelta, RemoveDelta, RenameDelta};
use crate::{
    Result,
    model::{AttributeValue, NodeData, NodeId, Position, Range},
    operation::{AttributeOperation, Operation, OperationError, RenameOperation},
};

impl InsertDelta {
    pub fn create(
        ctx: &mut EditContext<'_>,
        position: Position,
        nodes: Vec<NodeData>,
    ) -> Result<InsertDelta> {
        ctx.document().validate_position(&position)?;
        let mut delta = InsertDelta::default();
        if nodes.is_empty() {
            return Ok(delta);
        }
        let version = ctx.version();
        ctx.apply(&mut delta, Operation::insert(position, nodes, version))?;
        Ok(delta)
    }
}

impl RemoveDelta {
    pub fn create(ctx: &mut EditContext<'_>, range: Range) -> Result<RemoveDelta> {
        ctx.document().validate_range(&range)?;
        let mut delta = RemoveDelta::default();
        if range.is_empty() {
            return Ok(delta);
        }
        let version = ctx.version();
        ctx.apply(&mut delta, Operation::remove(range, version))?;
        Ok(delta)
    }
}

impl MoveDelta {
    pub fn create(ctx: &mut EditContext<'_>, range: Range, target: Position) -> Result<MoveDelta> {
        let document = ctx.document();
        document.validate_range(&range)?;
        document.validate_position(&target)?;
        let mut delta = MoveDelta::default();
        if range.is_empty() || target == range.start() || target == range.end() {
            return Ok(delta);
        }
        let version = ctx.version();
        ctx.apply(&mut delta, Operation::move_range(range, target, false, version))?;
        Ok(delta)
    }
}

impl AttributeDelta {
    /// Sets `key` on `node` to `value`, or clears it when `value` is `None`.
    pub fn create(
        ctx: &mut EditContext<'_>,
        node: NodeId,
        key: &str,
        value: Option<AttributeValue>,
    ) -> Result<AttributeDelta> {
        let old_value = ctx.document().element(node)?.attribute(key).cloned();
        let mut delta = AttributeDelta::default();
        if old_value == value {
            return Ok(delta);
        }
        let operation = Operation::Attribute(AttributeOperation {
            node,
            key: key.to_string(),
            old_value,
            new_value: value,
            base_version: ctx.version(),
        });
        ctx.apply(&mut delta, operation)?;
        Ok(delta)
    }
}

impl RenameDelta {
    pub fn create(ctx: &mut EditContext<'_>, node: NodeId, name: &str) -> Result<RenameDelta> {
        let document = ctx.document();
        let old_name = document.element(node)?.name().to_string();
        if document.is_root(node) {
            return Err(OperationError::InvalidRenameTarget {
                node,
                reason: "roots cannot be renamed".to_string(),
            }
            .into());
        }
        let mut delta = RenameDelta::default();
        if old_name == name {
            return Ok(delta);
        }
        let operation = Operation::Rename(RenameOperation {
            node,
            old_name,
            new_name: name.to_string(),
            base_version: ctx.version(),
        });
        ctx.apply(&mut delta, operation)?;
        Ok(delta)
    }
}
