use super::{DeltaError, DeltaVariant, EditContext, SplitDelta};
use crate::{
    Result,
    model::{NodeData, NodeId, Position, Range},
    operation::Operation,
};

impl SplitDelta {
    /// Splits the element containing `position` in two.
    ///
    /// An empty copy of the element (same name and attributes, fresh handle) is inserted right
    /// after it, then every child from `position` onwards is moved into the copy with a sticky
    /// move. Both operations are applied before the delta is returned.
    pub fn create(ctx: &mut EditContext<'_>, position: Position) -> Result<SplitDelta> {
        let document = ctx.document();
        let element = document.element(position.parent)?;
        if document.is_root(position.parent) {
            return Err(DeltaError::RootSplit {
                node: position.parent,
            }
            .into());
        }
        document.validate_position(&position)?;

        let copy = NodeData::Element {
            id: NodeId::new(),
            name: element.name().to_string(),
            attributes: element.attributes().clone(),
            children: Vec::new(),
        };
        let copy_id = copy.id();
        let copy_position = document.position_after(position.parent)?;
        let trailing = Range::new(position, position.with_offset(element.max_offset()))?;

        let delta = ctx.atomically(|ctx| {
            let mut delta = SplitDelta::default();
            let version = ctx.version();
            ctx.apply(&mut delta, Operation::insert(copy_position, vec![copy], version))?;
            let version = ctx.version();
            ctx.apply(
                &mut delta,
                Operation::move_range(trailing, Position::new(copy_id, 0), true, version),
            )?;
            Ok(delta)
        })?;

        tracing::debug!(
            element = %position.parent,
            offset = position.offset,
            copy = %copy_id,
            "Created split delta"
        );
        Ok(delta)
    }

    /// The split position: where the moved children were taken from.
    pub fn position(&self) -> Option<Position> {
        self.move_operation().and_then(Operation::position)
    }

    /// The operation creating the copy: an insert, or a reinsert when this split undoes a merge.
    pub fn clone_operation(&self) -> Option<&Operation> {
        self.operations().first()
    }

    /// The sticky move of the trailing children into the copy.
    pub fn move_operation(&self) -> Option<&Operation> {
        self.operations().get(1)
    }
}
