//! Deltas: named, ordered bundles of operations forming one semantic edit.
//!
//! A [`Delta`] is a tagged union over one struct per edit kind. Every variant owns its
//! operation list, declares a stable type identifier ([`Registered`]), a transformation
//! priority and the kind its reversal produces ([`DeltaVariant`]).
//!
//! Variants are created through their `create` constructors, which take an explicit
//! [`EditContext`] and apply each operation as it is generated. A constructor either returns a
//! fully applied delta or an error with the document untouched.
//!
//! Split and merge are each other's reverse, as are wrap and unwrap. Their reversals are
//! post-processed so that the reversed delta is indistinguishable from one built directly:
//! a reversed merge carries the same sticky move as a split, and vice versa.

pub mod context;
pub mod errors;
pub mod registry;

mod content;
mod merge;
mod split;
mod wrap;


pub use context::EditContext;
pub use errors::DeltaError;
pub use registry::{DeltaRecord, Registered};

use crate::{
    constants::{CONTENT_PRIORITY, SPLIT_PRIORITY, WRAP_PRIORITY},
    model::{Position, Version},
    operation::Operation,
};

/// Behaviour shared by every delta variant.
pub trait DeltaVariant: Registered + Default + Into<Delta> {
    /// The tag of this variant.
    const KIND: DeltaKind;

    /// Transformation priority. Higher wins contested positions.
    const PRIORITY: u8;

    /// The kind produced by reversing a delta of this variant.
    const REVERSE: DeltaKind;

    /// Operations in execution order.
    fn operations(&self) -> &[Operation];

    /// Appends an operation. Operations are never removed or reordered.
    fn add_operation(&mut self, operation: Operation);
}

macro_rules! delta_variants {
    ($(
        $(#[$meta:meta])*
        $variant:ident($ty:ident) {
            type_id: $type_id:literal,
            priority: $priority:expr,
            reverse: $reverse:ident $(,)?
        }
    ),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq)]
            pub struct $ty {
                operations: Vec<Operation>,
            }

            impl Registered for $ty {
                fn type_id() -> &'static str {
                    $type_id
                }
            }

            impl DeltaVariant for $ty {
                const KIND: DeltaKind = DeltaKind::$variant;
                const PRIORITY: u8 = $priority;
                const REVERSE: DeltaKind = DeltaKind::$reverse;

                fn operations(&self) -> &[Operation] {
                    &self.operations
                }

                fn add_operation(&mut self, operation: Operation) {
                    self.operations.push(operation);
                }
            }

            impl From<$ty> for Delta {
                fn from(delta: $ty) -> Self {
                    Delta::$variant(delta)
                }
            }
        )*

        /// Field-less tag of a [`Delta`] variant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DeltaKind {
            $($variant,)*
        }

        impl DeltaKind {
            /// Every registered kind.
            pub const ALL: &'static [DeltaKind] = &[$(DeltaKind::$variant,)*];

            pub fn type_id(self) -> &'static str {
                match self {
                    $(DeltaKind::$variant => <$ty as Registered>::type_id(),)*
                }
            }

            /// Whether this kind accepts a stored type identifier.
            pub fn supports_type_id(self, type_id: &str) -> bool {
                match self {
                    $(DeltaKind::$variant => <$ty as Registered>::supports_type_id(type_id),)*
                }
            }

            pub fn priority(self) -> u8 {
                match self {
                    $(DeltaKind::$variant => <$ty as DeltaVariant>::PRIORITY,)*
                }
            }

            /// The kind produced by reversing a delta of this kind.
            pub fn reverse(self) -> DeltaKind {
                match self {
                    $(DeltaKind::$variant => <$ty as DeltaVariant>::REVERSE,)*
                }
            }
        }

        /// A semantic edit: one variant per edit kind, each owning its operations.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Delta {
            $($variant($ty),)*
        }

        impl Delta {
            /// A delta of `kind` holding `operations` as they are.
            pub fn from_operations(kind: DeltaKind, operations: Vec<Operation>) -> Delta {
                match kind {
                    $(DeltaKind::$variant => Delta::$variant($ty { operations }),)*
                }
            }

            pub fn kind(&self) -> DeltaKind {
                match self {
                    $(Delta::$variant(_) => DeltaKind::$variant,)*
                }
            }

            /// Operations in execution order.
            pub fn operations(&self) -> &[Operation] {
                match self {
                    $(Delta::$variant(delta) => &delta.operations,)*
                }
            }

            fn operations_mut(&mut self) -> &mut Vec<Operation> {
                match self {
                    $(Delta::$variant(delta) => &mut delta.operations,)*
                }
            }
        }
    };
}

delta_variants! {
    /// Inserts new nodes at one position.
    Insert(InsertDelta) { type_id: "insert:v0", priority: CONTENT_PRIORITY, reverse: Remove },
    /// Removes a run of siblings into the graveyard.
    Remove(RemoveDelta) { type_id: "remove:v0", priority: CONTENT_PRIORITY, reverse: Insert },
    /// Moves a run of siblings.
    Move(MoveDelta) { type_id: "move:v0", priority: CONTENT_PRIORITY, reverse: Move },
    /// Sets or clears one attribute.
    Attribute(AttributeDelta) {
        type_id: "attribute:v0",
        priority: CONTENT_PRIORITY,
        reverse: Attribute,
    },
    /// Renames an element.
    Rename(RenameDelta) { type_id: "rename:v0", priority: CONTENT_PRIORITY, reverse: Rename },
    /// Splits an element in two at a position.
    Split(SplitDelta) { type_id: "split:v0", priority: SPLIT_PRIORITY, reverse: Merge },
    /// Merges two adjacent sibling elements.
    Merge(MergeDelta) { type_id: "merge:v0", priority: SPLIT_PRIORITY, reverse: Split },
    /// Wraps a run of siblings in a new element.
    Wrap(WrapDelta) { type_id: "wrap:v0", priority: WRAP_PRIORITY, reverse: Unwrap },
    /// Replaces an element with its children.
    Unwrap(UnwrapDelta) { type_id: "unwrap:v0", priority: WRAP_PRIORITY, reverse: Wrap },
}

impl Delta {
    /// An empty delta of `kind`.
    pub fn empty(kind: DeltaKind) -> Delta {
        Delta::from_operations(kind, Vec::new())
    }

    /// Appends an operation. Operations are never removed or reordered.
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations_mut().push(operation);
    }

    /// Stable type identifier, e.g. `"split:v0"`.
    pub fn type_id(&self) -> &'static str {
        self.kind().type_id()
    }

    pub fn priority(&self) -> u8 {
        self.kind().priority()
    }

    pub fn is_empty(&self) -> bool {
        self.operations().is_empty()
    }

    /// Base version of the first operation.
    pub fn base_version(&self) -> Option<Version> {
        self.operations().first().map(Operation::base_version)
    }

    /// The document version once every operation is applied.
    pub fn end_version(&self) -> Option<Version> {
        self.operations().last().map(|op| op.base_version() + 1)
    }

    /// Anchor position of the delta, `None` when it has no operations.
    pub fn position(&self) -> Option<Position> {
        match self {
            Delta::Split(delta) => delta.position(),
            Delta::Merge(delta) => delta.position(),
            Delta::Unwrap(delta) => delta.position(),
            _ => self.operations().iter().find_map(Operation::position),
        }
    }

    /// The delta that undoes this one.
    ///
    /// Operations are inverted and applied in reverse order, starting at the version right
    /// after this delta. The result has the reverse kind of this delta.
    pub fn get_reversed(&self) -> Delta {
        let mut operations: Vec<Operation> =
            self.operations().iter().rev().map(Operation::reversed).collect();
        if let Some(start) = self.end_version() {
            renumber(&mut operations, start);
        }

        match self.kind() {
            // The inverse of a split's move comes first in the reversed split, the inverse of
            // a merge's move second. Both must stick like the move of a fresh merge or split.
            DeltaKind::Split => {
                if let Some(first) = operations.first_mut() {
                    first.set_sticky(true);
                }
            }
            DeltaKind::Merge => {
                if let Some(second) = operations.get_mut(1) {
                    second.set_sticky(true);
                }
            }
            _ => {}
        }

        Delta::from_operations(self.kind().reverse(), operations)
    }

    /// Rewrites the base versions so that the operations follow each other from `start`.
    pub(crate) fn renumber(&mut self, start: Version) {
        renumber(self.operations_mut(), start);
    }

    pub fn as_split(&self) -> Option<&SplitDelta> {
        match self {
            Delta::Split(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn as_merge(&self) -> Option<&MergeDelta> {
        match self {
            Delta::Merge(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn as_wrap(&self) -> Option<&WrapDelta> {
        match self {
            Delta::Wrap(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn as_unwrap(&self) -> Option<&UnwrapDelta> {
        match self {
            Delta::Unwrap(delta) => Some(delta),
            _ => None,
        }
    }
}

fn renumber(operations: &mut [Operation], start: Version) {
    for (version, operation) in (start..).zip(operations.iter_mut()) {
        operation.set_base_version(version);
    }
}
