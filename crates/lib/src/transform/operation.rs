//! Operation-level transformation rules.

use std::collections::VecDeque;

use crate::{
    model::{Position, Range},
    operation::{AttributeOperation, InsertOperation, MoveOperation, Operation, RenameOperation},
};

/// Transforms `a` so that it can be applied after `b`.
///
/// `a_strong` settles ties: at equal positions the strong side's content goes first, and on
/// conflicting attribute or name changes the strong side's value wins. A move can come out
/// split into several moves; an operation with nothing left to do becomes a no-op.
pub(crate) fn transform_operation(a: &Operation, b: &Operation, a_strong: bool) -> Vec<Operation> {
    if a.is_no_op() {
        return vec![a.clone()];
    }
    // Moving a run onto its own boundary changes nothing on either side.
    if a.as_move().is_some_and(MoveOperation::is_in_place) {
        return vec![degrade(a, "nodes moved onto their own boundary")];
    }
    if b.as_move().is_some_and(MoveOperation::is_in_place) {
        return vec![a.clone()];
    }
    match b {
        Operation::Insert(insert) => vec![by_insertion(a, insert, a_strong)],
        Operation::Move(moved) | Operation::Reinsert(moved) => by_move(a, moved, false, a_strong),
        Operation::Remove(moved) => by_move(a, moved, true, a_strong),
        Operation::Attribute(other) => vec![by_attribute(a, other, a_strong)],
        Operation::Rename(other) => vec![by_rename(a, other, a_strong)],
        Operation::NoOp(_) => vec![a.clone()],
    }
}

fn by_insertion(a: &Operation, b: &InsertOperation, a_strong: bool) -> Operation {
    let how_many = b.how_many();
    match a {
        Operation::Insert(op) => Operation::Insert(InsertOperation {
            position: op
                .position
                .transformed_by_insertion(&b.position, how_many, !a_strong),
            ..op.clone()
        }),
        Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
            let range = op
                .source_range()
                .transformed_by_insertion(&b.position, how_many, op.is_sticky);
            a.with_move(MoveOperation {
                source: range.start(),
                how_many: range.len(),
                target: op
                    .target
                    .transformed_by_insertion(&b.position, how_many, !a_strong),
                ..op.clone()
            })
        }
        _ => a.clone(),
    }
}

fn by_move(a: &Operation, b: &MoveOperation, b_removes: bool, a_strong: bool) -> Vec<Operation> {
    // Removed nodes stay removed: a removal wins contested nodes against any other move.
    let a_strong = match (matches!(a, Operation::Remove(_)), b_removes) {
        (true, false) => true,
        (false, true) => false,
        _ => a_strong,
    };
    match a {
        Operation::Insert(op) => vec![Operation::Insert(InsertOperation {
            position: follow_move(&op.position, b, !a_strong),
            ..op.clone()
        })],
        Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
            move_by_move(a, op, b, a_strong)
        }
        _ => vec![a.clone()],
    }
}

fn by_attribute(a: &Operation, b: &AttributeOperation, a_strong: bool) -> Operation {
    match a {
        Operation::Attribute(op) if op.node == b.node && op.key == b.key => {
            if a_strong {
                Operation::Attribute(AttributeOperation {
                    old_value: b.new_value.clone(),
                    ..op.clone()
                })
            } else {
                degrade(a, "attribute already changed by a stronger edit")
            }
        }
        _ => a.clone(),
    }
}

fn by_rename(a: &Operation, b: &RenameOperation, a_strong: bool) -> Operation {
    match a {
        Operation::Rename(op) if op.node == b.node => {
            if a_strong {
                Operation::Rename(RenameOperation {
                    old_name: b.new_name.clone(),
                    ..op.clone()
                })
            } else {
                degrade(a, "element already renamed by a stronger edit")
            }
        }
        _ => a.clone(),
    }
}

/// Where `position` ends up once `b` is applied.
fn follow_move(position: &Position, b: &MoveOperation, insert_before: bool) -> Position {
    position.transformed_by_move(&b.source, b.how_many, &b.target, insert_before, b.is_sticky)
}

/// Transforms the move-like `a` (payload `op`) against the move `b`.
///
/// Nodes of `a`'s range that `b` did not touch are re-mapped to where they are after `b`.
/// Nodes both moves claim are moved again only by the strong side, or by a side whose
/// target lies inside the other's moved run. When `b` drops its nodes inside `a`'s range,
/// the range grows to include them, unless `a` was itself aimed inside `b`'s run. Each
/// resulting run becomes one move, emitted in order.
fn move_by_move(
    a: &Operation,
    op: &MoveOperation,
    b: &MoveOperation,
    a_strong: bool,
) -> Vec<Operation> {
    let target = follow_move(&op.target, b, !a_strong);

    if op.how_many == 0 {
        // An empty sticky run takes in the nodes `b` drops at its source.
        let landed = b.moved_range_start();
        let source = op.source.transformed_by_deletion(&b.source, b.how_many);
        if op.is_sticky && source == Some(landed) {
            return vec![a.with_move(MoveOperation {
                source: landed,
                how_many: b.how_many,
                target,
                ..op.clone()
            })];
        }
        return vec![a.with_move(MoveOperation {
            source: follow_move(&op.source, b, true),
            target,
            ..op.clone()
        })];
    }

    let own = op.source_range();
    let other = b.source_range();
    let landed = b.moved_range_start();
    let common = own.intersection(&other);

    // The untouched part of `own` on each side of `common`, after `b` took its nodes out.
    let (before, after) = match common {
        Some(common) => {
            let before_len = common.start().offset - own.start().offset;
            let after_len = own.end().offset - common.end().offset;
            (
                (before_len > 0).then(|| Range::from_position_and_shift(own.start(), before_len)),
                (after_len > 0)
                    .then(|| Range::from_position_and_shift(common.end(), after_len))
                    .map(|range| after_deletion(&range, b)),
            )
        }
        None => (Some(after_deletion(&own, b)), None),
    };

    let span = match (before, after) {
        (Some(before), Some(after)) => {
            Some(Range::from_position_and_shift(before.start(), before.len() + after.len()))
        }
        (one, other) => one.or(other),
    };

    if let Some(span) = span
        && span.absorbs(&landed, op.is_sticky)
    {
        if other.absorbs(&op.target, b.is_sticky) {
            // Both moves drop their nodes inside the other's run. `a` leaves `b`'s nodes where
            // they landed and takes the slot `b` emptied.
            let target = b.source.transformed_by_insertion(&landed, b.how_many, true);
            let pieces = [
                Range::from_position_and_shift(span.start(), landed.offset - span.start().offset),
                Range::from_position_and_shift(
                    landed.with_offset(landed.offset + b.how_many),
                    span.end().offset - landed.offset,
                ),
            ];
            let pieces = pieces.into_iter().filter(|piece| !piece.is_empty()).collect();
            return emit(a, op, pieces, target);
        }
        let grown = span.transformed_by_insertion(&landed, b.how_many, op.is_sticky);
        return emit(a, op, vec![grown], target);
    }

    let keep_common = a_strong || other.absorbs(&op.target, b.is_sticky);
    let common = common.filter(|_| keep_common).map(|common| {
        Range::from_position_and_shift(
            landed.with_offset(landed.offset + (common.start().offset - other.start().offset)),
            common.len(),
        )
    });
    let before = before.map(|range| range.transformed_by_insertion(&landed, b.how_many, false));
    let after = after.map(|range| range.transformed_by_insertion(&landed, b.how_many, false));

    let pieces = match (before, common, after) {
        (Some(before), None, Some(after)) => {
            vec![Range::from_position_and_shift(before.start(), before.len() + after.len())]
        }
        (before, common, after) => [before, common, after].into_iter().flatten().collect(),
    };

    if pieces.is_empty() {
        return vec![degrade(a, "every moved node was claimed by a stronger move")];
    }
    emit(a, op, pieces, target)
}

/// `range`, known to lie outside `b`'s source run, once `b`'s nodes are taken out.
fn after_deletion(range: &Range, b: &MoveOperation) -> Range {
    let start = range
        .start()
        .transformed_by_deletion(&b.source, b.how_many)
        .unwrap_or(b.source);
    Range::from_position_and_shift(start, range.len())
}

/// One move per piece, each landing right after the previous one.
fn emit(
    a: &Operation,
    op: &MoveOperation,
    pieces: Vec<Range>,
    mut target: Position,
) -> Vec<Operation> {
    let mut pending: VecDeque<Range> = pieces.into();
    let mut operations = Vec::with_capacity(pending.len());
    while let Some(piece) = pending.pop_front() {
        let step = MoveOperation {
            source: piece.start(),
            how_many: piece.len(),
            target,
            ..op.clone()
        };
        let landed = step.moved_range_start();
        for rest in pending.iter_mut() {
            let moved = after_deletion(rest, &step);
            *rest = moved.transformed_by_insertion(&landed, step.how_many, false);
        }
        target = landed.with_offset(landed.offset + step.how_many);
        operations.push(a.with_move(step));
    }
    operations
}

fn degrade(a: &Operation, reason: &str) -> Operation {
    tracing::warn!(
        operation = a.type_name(),
        base_version = a.base_version(),
        reason,
        "Operation degraded to no-op"
    );
    Operation::no_op(a.base_version())
}
