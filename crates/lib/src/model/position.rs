//! Positions between children and flat sibling ranges.
//!
//! Positions are `(parent handle, offset)` pairs. Because parents are addressed by handle,
//! only edits to the *same* parent ever shift a position; edits to ancestors or descendants
//! leave it untouched. The `transformed_by_*` methods are the positional arithmetic the
//! transformation resolver is built on; they never look at a document.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ModelError, NodeId};
use crate::Result;

/// A point between two children of `parent`, `offset` children from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub parent: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(parent: NodeId, offset: usize) -> Self {
        Self { parent, offset }
    }

    /// Same parent, different offset.
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            parent: self.parent,
            offset,
        }
    }

    /// Transforms this position by an insertion of `how_many` nodes at `at`.
    ///
    /// When the insertion happens exactly at this position, `insert_before` decides whether
    /// the new nodes end up before this position (shifting it) or after it.
    pub fn transformed_by_insertion(
        &self,
        at: &Position,
        how_many: usize,
        insert_before: bool,
    ) -> Position {
        if self.parent == at.parent
            && (at.offset < self.offset || (at.offset == self.offset && insert_before))
        {
            self.with_offset(self.offset + how_many)
        } else {
            *self
        }
    }

    /// Transforms this position by the deletion of `how_many` nodes starting at `at`.
    ///
    /// Returns `None` when the position lies strictly inside the deleted run.
    pub fn transformed_by_deletion(&self, at: &Position, how_many: usize) -> Option<Position> {
        if self.parent != at.parent || self.offset <= at.offset {
            return Some(*self);
        }
        if self.offset >= at.offset + how_many {
            return Some(self.with_offset(self.offset - how_many));
        }
        None
    }

    /// Transforms this position by moving `how_many` nodes from `source` to `target`.
    ///
    /// Positions strictly inside the moved run travel with it. When `sticky` is set, positions
    /// on either boundary of the run travel with it as well, and so does the source of an empty
    /// run. Otherwise the position is shifted by the removal and then by the insertion at the
    /// target, where `insert_before` breaks the tie at equal offsets.
    pub fn transformed_by_move(
        &self,
        source: &Position,
        how_many: usize,
        target: &Position,
        insert_before: bool,
        sticky: bool,
    ) -> Position {
        let target = target
            .transformed_by_deletion(source, how_many)
            .unwrap_or(*target);

        match self.transformed_by_deletion(source, how_many) {
            None => self.combined(source, &target),
            Some(deleted) if sticky && deleted == *source => self.combined(source, &target),
            Some(deleted) => deleted.transformed_by_insertion(&target, how_many, insert_before),
        }
    }

    /// Re-anchors a position in `source.parent` into `target.parent`, keeping its distance
    /// from `source`.
    fn combined(&self, source: &Position, target: &Position) -> Position {
        target.with_offset(target.offset + (self.offset - source.offset))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.parent, self.offset)
    }
}

/// A flat run of siblings: `[start, end)` inside one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    start: Position,
    end: Position,
}

impl Range {
    /// Creates a range, checking that both ends share a parent and are ordered.
    pub fn new(start: Position, end: Position) -> Result<Self> {
        if start.parent != end.parent {
            return Err(ModelError::InvalidRange {
                reason: format!("range ends have different parents ({start} and {end})"),
            }
            .into());
        }
        if start.offset > end.offset {
            return Err(ModelError::InvalidRange {
                reason: format!("range start {start} is after its end {end}"),
            }
            .into());
        }
        Ok(Self { start, end })
    }

    /// The range of `how_many` siblings starting at `start`.
    pub fn from_position_and_shift(start: Position, how_many: usize) -> Self {
        Self {
            start,
            end: start.with_offset(start.offset + how_many),
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn parent(&self) -> NodeId {
        self.start.parent
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `position` lies strictly between the range boundaries.
    pub fn contains_position(&self, position: &Position) -> bool {
        position.parent == self.parent()
            && position.offset > self.start.offset
            && position.offset < self.end.offset
    }

    /// True when `position` is strictly inside, or on a boundary of a non-empty sticky range.
    pub fn absorbs(&self, position: &Position, sticky: bool) -> bool {
        self.contains_position(position)
            || (sticky && !self.is_empty() && (*position == self.start || *position == self.end))
    }

    /// The common part of two ranges, if non-empty.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if self.parent() != other.parent() {
            return None;
        }
        let start = self.start.offset.max(other.start.offset);
        let end = self.end.offset.min(other.end.offset);
        (start < end).then(|| Range {
            start: self.start.with_offset(start),
            end: self.start.with_offset(end),
        })
    }

    /// Transforms this range by an insertion of `how_many` nodes at `at`.
    ///
    /// An insertion strictly inside grows the range. A sticky range also grows when the
    /// insertion happens on one of its boundaries; a non-sticky range leaves such nodes out.
    /// An empty sticky range takes in whatever is inserted at its start.
    pub fn transformed_by_insertion(&self, at: &Position, how_many: usize, sticky: bool) -> Range {
        if sticky && self.is_empty() && *at == self.start {
            return Range::from_position_and_shift(self.start, how_many);
        }
        let sticky = sticky && !self.is_empty();
        if self.absorbs(at, sticky) {
            Range {
                start: self.start.transformed_by_insertion(at, how_many, !sticky),
                end: self.end.transformed_by_insertion(at, how_many, true),
            }
        } else {
            Range {
                start: self.start.transformed_by_insertion(at, how_many, true),
                end: self.end.transformed_by_insertion(at, how_many, self.is_empty()),
            }
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end.offset)
    }
}
