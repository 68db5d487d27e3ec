//! Atomic, invertible tree mutations.
//!
//! Every [`Operation`] carries the document version it was computed against. Operations are
//! applied through [`Document::apply_operation`](crate::Document::apply_operation), which
//! refuses any operation whose base version is not the current one.
//!
//! Removal and reinsertion are moves into and out of the graveyard root, so they share
//! [`MoveOperation`] with plain moves and differ only in their tag.

pub mod errors;


use serde::{Deserialize, Serialize};

pub use errors::OperationError;

use crate::{
    Document, Result,
    constants::GRAVEYARD,
    model::{AttributeValue, NodeData, NodeId, Position, Range, Version},
};

/// Inserts new nodes at a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOperation {
    pub position: Position,
    pub nodes: Vec<NodeData>,
    pub base_version: Version,
}

impl InsertOperation {
    /// Number of top-level nodes inserted.
    pub fn how_many(&self) -> usize {
        self.nodes.len()
    }
}

/// Moves a run of siblings. Also the payload of remove and reinsert operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOperation {
    pub source: Position,
    pub how_many: usize,
    /// Target expressed before the moved nodes are detached
    pub target: Position,
    /// Concurrent edits on the boundaries of the moved run follow it to the target
    #[serde(default)]
    pub is_sticky: bool,
    pub base_version: Version,
}

impl MoveOperation {
    /// The moved run, in source coordinates.
    pub fn source_range(&self) -> Range {
        Range::from_position_and_shift(self.source, self.how_many)
    }

    /// Where the first moved node sits once the move is applied.
    pub fn moved_range_start(&self) -> Position {
        self.target
            .transformed_by_deletion(&self.source, self.how_many)
            .unwrap_or(self.target)
    }

    /// True when a non-empty run is moved onto one of its own boundaries, which leaves the
    /// document as it was.
    pub fn is_in_place(&self) -> bool {
        let range = self.source_range();
        !range.is_empty() && (self.target == range.start() || self.target == range.end())
    }

    /// The move that puts the nodes back.
    pub fn reversed(&self) -> MoveOperation {
        MoveOperation {
            source: self.moved_range_start(),
            how_many: self.how_many,
            target: self
                .source
                .transformed_by_insertion(&self.target, self.how_many, false),
            is_sticky: self.is_sticky,
            base_version: self.base_version + 1,
        }
    }
}

/// Sets or clears one attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeOperation {
    pub node: NodeId,
    pub key: String,
    pub old_value: Option<AttributeValue>,
    pub new_value: Option<AttributeValue>,
    pub base_version: Version,
}

/// Renames an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOperation {
    pub node: NodeId,
    pub old_name: String,
    pub new_name: String,
    pub base_version: Version,
}

/// Does nothing but consume a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoOperation {
    pub base_version: Version,
}

/// An atomic, invertible tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    Insert(InsertOperation),
    Move(MoveOperation),
    /// Move into the graveyard
    Remove(MoveOperation),
    /// Move out of the graveyard
    Reinsert(MoveOperation),
    Attribute(AttributeOperation),
    Rename(RenameOperation),
    NoOp(NoOperation),
}

/// Graveyard position that removed nodes are moved to.
pub fn graveyard_position() -> Position {
    Position::new(NodeId::for_root(GRAVEYARD), 0)
}

impl Operation {
    pub fn insert(position: Position, nodes: Vec<NodeData>, base_version: Version) -> Self {
        Operation::Insert(InsertOperation {
            position,
            nodes,
            base_version,
        })
    }

    pub fn move_range(
        range: Range,
        target: Position,
        is_sticky: bool,
        base_version: Version,
    ) -> Self {
        Operation::Move(MoveOperation {
            source: range.start(),
            how_many: range.len(),
            target,
            is_sticky,
            base_version,
        })
    }

    /// Moves `range` into the graveyard.
    pub fn remove(range: Range, base_version: Version) -> Self {
        Operation::Remove(MoveOperation {
            source: range.start(),
            how_many: range.len(),
            target: graveyard_position(),
            is_sticky: false,
            base_version,
        })
    }

    pub fn no_op(base_version: Version) -> Self {
        Operation::NoOp(NoOperation { base_version })
    }

    /// Stable lowercase name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::Insert(_) => "insert",
            Operation::Move(_) => "move",
            Operation::Remove(_) => "remove",
            Operation::Reinsert(_) => "reinsert",
            Operation::Attribute(_) => "attribute",
            Operation::Rename(_) => "rename",
            Operation::NoOp(_) => "noop",
        }
    }

    pub fn base_version(&self) -> Version {
        match self {
            Operation::Insert(op) => op.base_version,
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
                op.base_version
            }
            Operation::Attribute(op) => op.base_version,
            Operation::Rename(op) => op.base_version,
            Operation::NoOp(op) => op.base_version,
        }
    }

    pub fn set_base_version(&mut self, version: Version) {
        match self {
            Operation::Insert(op) => op.base_version = version,
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
                op.base_version = version
            }
            Operation::Attribute(op) => op.base_version = version,
            Operation::Rename(op) => op.base_version = version,
            Operation::NoOp(op) => op.base_version = version,
        }
    }

    /// The move payload of move, remove and reinsert operations.
    pub fn as_move(&self) -> Option<&MoveOperation> {
        match self {
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => Some(op),
            _ => None,
        }
    }

    pub(crate) fn as_move_mut(&mut self) -> Option<&mut MoveOperation> {
        match self {
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => Some(op),
            _ => None,
        }
    }

    /// Rebuilds an operation of the same tag around a different move payload.
    pub(crate) fn with_move(&self, payload: MoveOperation) -> Operation {
        match self {
            Operation::Remove(_) => Operation::Remove(payload),
            Operation::Reinsert(_) => Operation::Reinsert(payload),
            _ => Operation::Move(payload),
        }
    }

    /// Whether this is a sticky move. Only move-like operations can be sticky.
    pub fn is_sticky(&self) -> bool {
        self.as_move().is_some_and(|op| op.is_sticky)
    }

    /// Sets the sticky flag of a move-like operation. Other operations are left untouched.
    pub fn set_sticky(&mut self, sticky: bool) {
        if let Some(op) = self.as_move_mut() {
            op.is_sticky = sticky;
        }
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self, Operation::NoOp(_))
    }

    /// The inverse operation, expecting the version right after this one.
    pub fn reversed(&self) -> Operation {
        match self {
            Operation::Insert(op) => Operation::Remove(MoveOperation {
                source: op.position,
                how_many: op.how_many(),
                target: graveyard_position(),
                is_sticky: false,
                base_version: op.base_version + 1,
            }),
            Operation::Move(op) => Operation::Move(op.reversed()),
            Operation::Remove(op) => Operation::Reinsert(op.reversed()),
            Operation::Reinsert(op) => Operation::Remove(op.reversed()),
            Operation::Attribute(op) => Operation::Attribute(AttributeOperation {
                node: op.node,
                key: op.key.clone(),
                old_value: op.new_value.clone(),
                new_value: op.old_value.clone(),
                base_version: op.base_version + 1,
            }),
            Operation::Rename(op) => Operation::Rename(RenameOperation {
                node: op.node,
                old_name: op.new_name.clone(),
                new_name: op.old_name.clone(),
                base_version: op.base_version + 1,
            }),
            Operation::NoOp(op) => Operation::no_op(op.base_version + 1),
        }
    }

    /// Validates and performs the mutation. Version bookkeeping is done by the document.
    pub(crate) fn execute(&self, document: &mut Document) -> Result<()> {
        match self {
            Operation::Insert(op) => document.insert_nodes(&op.position, &op.nodes),
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
                document.move_nodes(&op.source, op.how_many, &op.target)
            }
            Operation::Attribute(op) => {
                let actual = document.element(op.node)?.attribute(&op.key).cloned();
                if actual != op.old_value {
                    return Err(OperationError::AttributeMismatch {
                        node: op.node,
                        key: op.key.clone(),
                        expected: op.old_value.clone(),
                        actual,
                    }
                    .into());
                }
                document.set_attribute(op.node, &op.key, op.new_value.clone())?;
                Ok(())
            }
            Operation::Rename(op) => {
                let actual = document.element(op.node)?.name().to_string();
                if document.is_root(op.node) {
                    return Err(OperationError::InvalidRenameTarget {
                        node: op.node,
                        reason: "roots cannot be renamed".to_string(),
                    }
                    .into());
                }
                if actual != op.old_name {
                    return Err(OperationError::NameMismatch {
                        node: op.node,
                        expected: op.old_name.clone(),
                        actual,
                    }
                    .into());
                }
                document.rename_element(op.node, &op.new_name)?;
                Ok(())
            }
            Operation::NoOp(_) => Ok(()),
        }
    }

    /// Position this operation is anchored at, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Operation::Insert(op) => Some(op.position),
            Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
                Some(op.source)
            }
            _ => None,
        }
    }
}
