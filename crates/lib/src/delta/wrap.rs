use super::{DeltaError, DeltaVariant, EditContext, UnwrapDelta, WrapDelta};
use crate::{
    Result,
    model::{NodeData, NodeId, Position, Range},
    operation::Operation,
};

impl WrapDelta {
    /// Wraps the siblings in `range` in `wrapper`, which must be an empty element.
    pub fn create(ctx: &mut EditContext<'_>, range: Range, wrapper: NodeData) -> Result<WrapDelta> {
        let wrapper_id = wrapper.id();
        if wrapper.name().is_none() {
            return Err(invalid_wrapper(format!("{wrapper_id} is a text node")));
        }
        if !wrapper.children().is_empty() {
            return Err(invalid_wrapper(format!("{wrapper_id} already has children")));
        }
        if range.is_empty() {
            return Err(invalid_wrapper("cannot wrap an empty range".to_string()));
        }
        ctx.document().validate_range(&range)?;

        let start = range.start();
        let shifted =
            Range::from_position_and_shift(start.with_offset(start.offset + 1), range.len());

        let delta = ctx.atomically(|ctx| {
            let mut delta = WrapDelta::default();
            let version = ctx.version();
            ctx.apply(&mut delta, Operation::insert(start, vec![wrapper], version))?;
            let version = ctx.version();
            ctx.apply(
                &mut delta,
                Operation::move_range(shifted, Position::new(wrapper_id, 0), false, version),
            )?;
            Ok(delta)
        })?;

        tracing::debug!(range = %range, wrapper = %wrapper_id, "Created wrap delta");
        Ok(delta)
    }

    /// Where the wrapper was inserted.
    pub fn position(&self) -> Option<Position> {
        self.insert_operation().and_then(Operation::position)
    }

    /// The insertion of the wrapper, or its reinsertion when this wrap undoes an unwrap.
    pub fn insert_operation(&self) -> Option<&Operation> {
        self.operations().first()
    }

    /// The move of the wrapped siblings into the wrapper.
    pub fn move_operation(&self) -> Option<&Operation> {
        self.operations().get(1)
    }
}

impl UnwrapDelta {
    /// Replaces `element` with its children.
    pub fn create(ctx: &mut EditContext<'_>, element: NodeId) -> Result<UnwrapDelta> {
        let document = ctx.document();
        let how_many = document.max_offset(element)?;
        if document.is_root(element) {
            return Err(DeltaError::InvalidTarget {
                node: element,
                reason: "roots cannot be unwrapped".to_string(),
            }
            .into());
        }
        let before = document.position_before(element)?;
        let children = Range::from_position_and_shift(Position::new(element, 0), how_many);
        let unwrapped =
            Range::from_position_and_shift(before.with_offset(before.offset + how_many), 1);

        let delta = ctx.atomically(|ctx| {
            let mut delta = UnwrapDelta::default();
            let version = ctx.version();
            ctx.apply(&mut delta, Operation::move_range(children, before, false, version))?;
            let version = ctx.version();
            ctx.apply(&mut delta, Operation::remove(unwrapped, version))?;
            Ok(delta)
        })?;

        tracing::debug!(element = %element, children = how_many, "Created unwrap delta");
        Ok(delta)
    }

    /// Where the unwrapped element was removed from.
    pub fn position(&self) -> Option<Position> {
        self.remove_operation().and_then(Operation::position)
    }

    /// The move of the children out of the element.
    pub fn move_operation(&self) -> Option<&Operation> {
        self.operations().first()
    }

    /// The removal of the emptied element.
    pub fn remove_operation(&self) -> Option<&Operation> {
        self.operations().get(1)
    }
}

fn invalid_wrapper(reason: String) -> crate::Error {
    DeltaError::InvalidWrapper { reason }.into()
}
