use super::{DeltaError, DeltaVariant, EditContext, MergeDelta};
use crate::{
    Document, Result,
    model::{NodeId, Position, Range},
    operation::Operation,
};

impl MergeDelta {
    /// Merges the two sibling elements on either side of `position`.
    ///
    /// The children of the trailing element are moved, with a sticky move, to the end of the
    /// leading element; the now empty trailing element is then removed.
    pub fn create(ctx: &mut EditContext<'_>, position: Position) -> Result<MergeDelta> {
        let document = ctx.document();
        document.validate_position(&position)?;

        let leading = position
            .offset
            .checked_sub(1)
            .and_then(|offset| document.child_at(position.parent, offset));
        let trailing = document.child_at(position.parent, position.offset);
        let (Some(leading), Some(trailing)) = (leading, trailing) else {
            return Err(not_mergeable(position, "no element on both sides of the position"));
        };
        let leading_len = element_len(document, position, leading)?;
        let trailing_len = element_len(document, position, trailing)?;

        let children = Range::from_position_and_shift(Position::new(trailing, 0), trailing_len);
        let end_of_leading = Position::new(leading, leading_len);

        let delta = ctx.atomically(|ctx| {
            let mut delta = MergeDelta::default();
            let version = ctx.version();
            ctx.apply(
                &mut delta,
                Operation::move_range(children, end_of_leading, true, version),
            )?;
            let version = ctx.version();
            ctx.apply(
                &mut delta,
                Operation::remove(Range::from_position_and_shift(position, 1), version),
            )?;
            Ok(delta)
        })?;

        tracing::debug!(
            parent = %position.parent,
            offset = position.offset,
            leading = %leading,
            trailing = %trailing,
            "Created merge delta"
        );
        Ok(delta)
    }

    /// The merge position: where the trailing element was removed from.
    pub fn position(&self) -> Option<Position> {
        self.remove_operation().and_then(Operation::position)
    }

    /// The sticky move of the trailing children into the leading element.
    pub fn move_operation(&self) -> Option<&Operation> {
        self.operations().first()
    }

    /// The removal of the emptied trailing element.
    pub fn remove_operation(&self) -> Option<&Operation> {
        self.operations().get(1)
    }
}

fn element_len(document: &Document, position: Position, id: NodeId) -> Result<usize> {
    document
        .element(id)
        .map(|element| element.max_offset())
        .map_err(|_| not_mergeable(position, &format!("node {id} is not an element")))
}

fn not_mergeable(position: Position, reason: &str) -> crate::Error {
    DeltaError::NotMergeable {
        position,
        reason: reason.to_string(),
    }
    .into()
}
