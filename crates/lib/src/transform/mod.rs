//! Transformation of concurrent deltas.
//!
//! Two deltas are concurrent when they were computed against the same document version.
//! Transforming `a` against `b` produces `a'`, which has the effect of `a` once `b` has been
//! applied. [`transform_pair`] produces both sides at once and guarantees convergence: applying
//! `a` then `b'` yields the same tree as applying `b` then `a'`.
//!
//! Contested positions are settled by strength. The delta with the higher priority is strong;
//! on equal priority the caller decides with `a_wins_ties`, which must be the opposite value on
//! the other replica. Sticky moves (the move of a split or a merge) drag positions on their
//! boundaries along, so that content inserted concurrently at a split point follows the
//! moved children.

pub mod errors;
mod operation;


pub use errors::TransformError;

use crate::{
    Result,
    delta::Delta,
    model::Version,
    operation::Operation,
};

/// Whether `a` and `b` were computed against the same document version.
///
/// A delta without operations is concurrent with anything.
pub fn is_concurrent(a: &Delta, b: &Delta) -> bool {
    match (a.base_version(), b.base_version()) {
        (Some(a_base), Some(b_base)) => a_base == b_base,
        _ => true,
    }
}

/// Whether `a` wins contested positions against `b`.
pub fn is_strong(a: &Delta, b: &Delta, a_wins_ties: bool) -> bool {
    match a.priority().cmp(&b.priority()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => a_wins_ties,
    }
}

/// Transforms `a` against `b`, returning only `a'`.
pub fn transform(a: &Delta, b: &Delta, a_wins_ties: bool) -> Result<Delta> {
    Ok(transform_pair(a, b, a_wins_ties)?.0)
}

/// Transforms two concurrent deltas against each other.
///
/// `a'` applies after `b` and `b'` applies after `a`; both orders converge. The transformed
/// deltas keep their kinds. `a'` is renumbered to start at the end version of `b` and `b'` at
/// the end version of `a`. When one side gained more operations than the other, the other is
/// padded with no-ops so that both replicas reach the same version.
pub fn transform_pair(a: &Delta, b: &Delta, a_wins_ties: bool) -> Result<(Delta, Delta)> {
    if !is_concurrent(a, b) {
        return Err(TransformError::NotConcurrent {
            a: a.type_id(),
            a_base: a.base_version().unwrap_or_default(),
            b: b.type_id(),
            b_base: b.base_version().unwrap_or_default(),
        }
        .into());
    }

    let a_strong = is_strong(a, b, a_wins_ties);
    let (mut a_ops, mut b_ops) = transform_lists(a.operations(), b.operations(), a_strong);

    // |a'| - |a| must equal |b'| - |b|.
    let (a_len, b_len) = (a.operations().len(), b.operations().len());
    while a_ops.len() + b_len < b_ops.len() + a_len {
        a_ops.push(Operation::no_op(0));
    }
    while b_ops.len() + a_len < a_ops.len() + b_len {
        b_ops.push(Operation::no_op(0));
    }

    let base = a.base_version().or(b.base_version()).unwrap_or_default();
    let mut a_prime = Delta::from_operations(a.kind(), a_ops);
    let mut b_prime = Delta::from_operations(b.kind(), b_ops);
    a_prime.renumber(base + b_len as Version);
    b_prime.renumber(base + a_len as Version);

    tracing::debug!(
        a = a.type_id(),
        b = b.type_id(),
        a_strong,
        base,
        a_operations = a_prime.operations().len(),
        b_operations = b_prime.operations().len(),
        "Transformed delta pair"
    );
    Ok((a_prime, b_prime))
}

/// Transforms two operation lists against each other.
///
/// Returns `(xs', ys')` where `xs'` applies after `ys` and `ys'` applies after `xs`.
fn transform_lists(
    xs: &[Operation],
    ys: &[Operation],
    x_strong: bool,
) -> (Vec<Operation>, Vec<Operation>) {
    if xs.is_empty() || ys.is_empty() {
        return (xs.to_vec(), ys.to_vec());
    }
    if let ([x], [y]) = (xs, ys) {
        return (
            operation::transform_operation(x, y, x_strong),
            operation::transform_operation(y, x, !x_strong),
        );
    }
    if xs.len() > 1 {
        let (head, tail) = xs.split_at(1);
        let (head, ys) = transform_lists(head, ys, x_strong);
        let (tail, ys) = transform_lists(tail, &ys, x_strong);
        return ([head, tail].concat(), ys);
    }
    let (head, tail) = ys.split_at(1);
    let (xs, head) = transform_lists(xs, head, x_strong);
    let (xs, tail) = transform_lists(&xs, tail, x_strong);
    (xs, [head, tail].concat())
}
