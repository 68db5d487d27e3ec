//! Both application orders of two concurrent deltas must produce the same tree.

use treedelta::{
    Batch, Delta, DeltaKind, Document, Result,
    model::{NodeData, NodeId, Position, Range},
    operation::Operation,
    transform::{is_concurrent, transform, transform_pair},
};

use crate::helpers::*;

fn split(position: Position) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    move |batch| batch.split(position).cloned()
}

fn merge(position: Position) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    move |batch| batch.merge(position).cloned()
}

fn insert(position: Position, text: &str) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    let node = NodeData::text(text);
    move |batch| batch.insert(position, vec![node]).cloned()
}

fn remove(range: Range) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    move |batch| batch.remove(range).cloned()
}

fn move_range(range: Range, target: Position) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    move |batch| batch.move_range(range, target).cloned()
}

fn wrap(range: Range) -> impl FnOnce(&mut Batch<'_>) -> Result<Delta> {
    let wrapper = NodeData::element("b");
    move |batch| batch.wrap(range, wrapper).cloned()
}

fn one(parent: NodeId, offset: usize) -> Range {
    Range::from_position_and_shift(Position::new(parent, offset), 1)
}

fn run(parent: NodeId, offset: usize, how_many: usize) -> Range {
    Range::from_position_and_shift(Position::new(parent, offset), how_many)
}

/// `<main><p>abc</p><p>de</p></main>` and the handles of both paragraphs.
fn two_paragraphs() -> (Document, NodeId, NodeId) {
    let doc = document_with(vec![element("p", "abc"), element("p", "de")]);
    let root = doc.main_root();
    let first = doc.child_at(root, 0).unwrap();
    let second = doc.child_at(root, 1).unwrap();
    (doc, first, second)
}

// ==========================
// SPLIT
// ==========================

/// An insertion inside the moved part of a split ends up in the copy.
#[test]
fn test_split_vs_insert_inside_trailing_part() {
    let (base, p) = single_paragraph("abc");
    for a_wins_ties in [true, false] {
        let result = converge(
            &base,
            split(Position::new(p, 1)),
            insert(Position::new(p, 2), "X"),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>a</p><p>bXc</p></main>");
    }
}

/// Sticky propagation: insertions exactly at the split offset or at the end of the element
/// follow the moved children, whatever the tie-break says.
#[test]
fn test_split_vs_insert_on_moved_boundaries() {
    let (base, p) = single_paragraph("abc");
    for a_wins_ties in [true, false] {
        let at_split = converge(
            &base,
            insert(Position::new(p, 1), "X"),
            split(Position::new(p, 1)),
            a_wins_ties,
        );
        assert_eq!(at_split, "<main><p>a</p><p>Xbc</p></main>");

        let at_end = converge(
            &base,
            insert(Position::new(p, 3), "X"),
            split(Position::new(p, 1)),
            a_wins_ties,
        );
        assert_eq!(at_end, "<main><p>a</p><p>bcX</p></main>");
    }
}

/// A split at the very end moves nothing, but text typed at that point still goes to the copy.
#[test]
fn test_split_at_end_vs_insert_at_end() {
    let (base, p) = single_paragraph("abc");
    for a_wins_ties in [true, false] {
        let result = converge(
            &base,
            split(Position::new(p, 3)),
            insert(Position::new(p, 3), "X"),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>abc</p><p>X</p></main>");

        let result = converge(
            &base,
            insert(Position::new(p, 3), "X"),
            split(Position::new(p, 3)),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>abc</p><p>X</p></main>");
    }
}

#[test]
fn test_split_vs_insert_before_split_offset() {
    let (base, p) = single_paragraph("abc");
    let result = converge(
        &base,
        split(Position::new(p, 2)),
        insert(Position::new(p, 1), "X"),
        true,
    );
    assert_eq!(result, "<main><p>aXb</p><p>c</p></main>");
}

/// The split has the higher priority: its copy goes first even when the other side wins ties.
#[test]
fn test_split_vs_insert_after_element() {
    let (base, p) = single_paragraph("abc");
    let root = base.main_root();
    let paragraph = NodeData::element("h1");

    let exchanged = exchange(
        &base,
        move |batch| batch.insert(Position::new(root, 1), vec![paragraph]).cloned(),
        split(Position::new(p, 1)),
        true,
    );
    assert_eq!(render(&exchanged.site_a), "<main><p>a</p><p>bc</p><h1></h1></main>");
}

/// Removed nodes stay removed even though the split is the stronger delta.
#[test]
fn test_split_vs_remove_in_trailing_part() {
    let (base, p) = single_paragraph("abc");
    let result = converge(&base, split(Position::new(p, 1)), remove(one(p, 2)), true);
    assert_eq!(result, "<main><p>a</p><p>b</p></main>");
}

#[test]
fn test_split_vs_split_of_same_element() {
    let (base, p) = single_paragraph("abc");
    let exchanged = exchange(&base, split(Position::new(p, 1)), split(Position::new(p, 2)), true);
    assert_eq!(render(&exchanged.site_a), "<main><p>a</p><p>bc</p><p></p></main>");

    // Padding keeps both replicas at the same version
    assert_eq!(
        exchanged.a_prime.operations().len() + exchanged.a.operations().len(),
        exchanged.b_prime.operations().len() + exchanged.b.operations().len()
    );
}

// ==========================
// MERGE
// ==========================

#[test]
fn test_merge_vs_insert_in_trailing_element() {
    let base = document_with(vec![element("p", "ab"), element("p", "cd")]);
    let root = base.main_root();
    let trailing = base.child_at(root, 1).unwrap();

    let at_end = converge(
        &base,
        merge(Position::new(root, 1)),
        insert(Position::new(trailing, 2), "X"),
        false,
    );
    assert_eq!(at_end, "<main><p>abcdX</p></main>");

    let at_start = converge(
        &base,
        merge(Position::new(root, 1)),
        insert(Position::new(trailing, 0), "X"),
        false,
    );
    assert_eq!(at_start, "<main><p>abXcd</p></main>");
}

#[test]
fn test_merge_of_empty_element_vs_insert_into_it() {
    let base = document_with(vec![element("p", "ab"), element("p", "")]);
    let root = base.main_root();
    let trailing = base.child_at(root, 1).unwrap();

    for a_wins_ties in [true, false] {
        let result = converge(
            &base,
            merge(Position::new(root, 1)),
            insert(Position::new(trailing, 0), "X"),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>abX</p></main>");
    }
}

/// The merge is stronger: the joined children go before content typed at the merge point.
#[test]
fn test_merge_vs_insert_at_end_of_leading_element() {
    let base = document_with(vec![element("p", "ab"), element("p", "cd")]);
    let root = base.main_root();
    let leading = base.child_at(root, 0).unwrap();

    let result = converge(
        &base,
        insert(Position::new(leading, 2), "X"),
        merge(Position::new(root, 1)),
        true,
    );
    assert_eq!(result, "<main><p>abcdX</p></main>");
}

#[test]
fn test_merge_vs_split_of_trailing_element() {
    let base = document_with(vec![element("p", "ab"), element("p", "cd")]);
    let root = base.main_root();
    let trailing = base.child_at(root, 1).unwrap();

    let exchanged = exchange(
        &base,
        merge(Position::new(root, 1)),
        split(Position::new(trailing, 1)),
        true,
    );
    assert_eq!(exchanged.a_prime.kind(), DeltaKind::Merge);
    assert_eq!(render(&exchanged.site_a), "<main><p>abcd</p><p></p></main>");
}

// ==========================
// WRAP, REMOVE, MOVE
// ==========================

#[test]
fn test_wrap_vs_insert() {
    let (base, p) = single_paragraph("abc");
    let range = Range::from_position_and_shift(Position::new(p, 0), 2);

    let inside = converge(&base, wrap(range), insert(Position::new(p, 1), "X"), false);
    assert_eq!(inside, "<main><p><b>aXb</b>c</p></main>");

    // Wrapping is not sticky: content inserted on the boundary stays outside
    let boundary = converge(&base, wrap(range), insert(Position::new(p, 2), "X"), false);
    assert_eq!(boundary, "<main><p><b>ab</b>Xc</p></main>");
}

#[test]
fn test_remove_vs_insert_inside_removed_element() {
    let (base, p) = single_paragraph("ab");
    let root = base.main_root();
    let result = converge(&base, remove(one(root, 0)), insert(Position::new(p, 1), "X"), true);
    assert_eq!(result, "<main></main>");
}

#[test]
fn test_identical_removals() {
    let (base, p) = single_paragraph("abc");
    for a_wins_ties in [true, false] {
        let result = converge(&base, remove(one(p, 1)), remove(one(p, 1)), a_wins_ties);
        assert_eq!(result, "<main><p>ac</p></main>");
    }
}

#[test]
fn test_overlapping_removals() {
    let (base, p) = single_paragraph("abcd");
    let first = Range::from_position_and_shift(Position::new(p, 0), 2);
    let second = Range::from_position_and_shift(Position::new(p, 1), 2);
    let result = converge(&base, remove(first), remove(second), true);
    assert_eq!(result, "<main><p>d</p></main>");
}

#[test]
fn test_competing_moves_of_same_node() {
    let (base, p) = single_paragraph("abc");

    // a wins: "a" ends up at the end
    let result = converge(
        &base,
        move_range(one(p, 0), Position::new(p, 3)),
        move_range(one(p, 0), Position::new(p, 2)),
        true,
    );
    assert_eq!(result, "<main><p>bca</p></main>");

    // b wins: "a" ends up between "b" and "c"
    let result = converge(
        &base,
        move_range(one(p, 0), Position::new(p, 3)),
        move_range(one(p, 0), Position::new(p, 2)),
        false,
    );
    assert_eq!(result, "<main><p>bac</p></main>");
}

#[test]
fn test_move_vs_remove_of_moved_node() {
    let base = document_with(vec![element("p", "ab"), element("p", "")]);
    let root = base.main_root();
    let first = base.child_at(root, 0).unwrap();
    let second = base.child_at(root, 1).unwrap();

    // The move loses against the removal even when it wins ties
    let result = converge(
        &base,
        move_range(one(first, 0), Position::new(second, 0)),
        remove(one(first, 0)),
        true,
    );
    assert_eq!(result, "<main><p>b</p><p></p></main>");
}

/// Both moves drop their run inside the other's. Each run lands in the slot the other one left.
#[test]
fn test_crossing_moves() {
    let (base, p, q) = two_paragraphs();
    for a_wins_ties in [true, false] {
        let swapped = converge(
            &base,
            move_range(run(p, 0, 3), Position::new(q, 1)),
            move_range(run(q, 0, 2), Position::new(p, 1)),
            a_wins_ties,
        );
        assert_eq!(swapped, "<main><p>de</p><p>abc</p></main>");

        let partial = converge(
            &base,
            move_range(run(p, 1, 2), Position::new(q, 1)),
            move_range(run(q, 0, 2), Position::new(p, 2)),
            a_wins_ties,
        );
        assert_eq!(partial, "<main><p>ade</p><p>bc</p></main>");
    }

    let (base, p) = single_paragraph("abcd");
    for a_wins_ties in [true, false] {
        let result = converge(
            &base,
            move_range(run(p, 0, 2), Position::new(p, 3)),
            move_range(run(p, 2, 2), Position::new(p, 1)),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>cdab</p></main>");
    }
}

/// Applies a move received from another replica on a copy of `base`, concurrently with `make_a`
/// on another copy, and returns the converged markup.
fn converge_with_received_move(
    base: &Document,
    make_a: impl FnOnce(&mut Batch<'_>) -> Result<Delta>,
    range: Range,
    target: Position,
    a_wins_ties: bool,
) -> String {
    let mut site_a = base.clone();
    let mut site_b = base.clone();
    let a = make_a(&mut Batch::new(&mut site_a)).unwrap();
    let operation = Operation::move_range(range, target, false, site_b.version());
    let b = Delta::from_operations(DeltaKind::Move, vec![operation]);
    site_b.apply_delta(&b).unwrap();

    let (a_prime, b_prime) = transform_pair(&a, &b, a_wins_ties).unwrap();
    site_a.apply_delta(&b_prime).unwrap();
    site_b.apply_delta(&a_prime).unwrap();

    let root = site_a.main_root();
    assert_eq!(site_a.snapshot(root).unwrap(), site_b.snapshot(root).unwrap());
    assert_eq!(site_a.version(), site_b.version());
    render(&site_a)
}

/// Moving a run onto its own boundary changes nothing and never disturbs a concurrent edit.
#[test]
fn test_in_place_moves_do_nothing() {
    let (base, p, _) = two_paragraphs();
    let root = base.main_root();

    let mut doc = base.clone();
    let mut batch = Batch::new(&mut doc);
    assert!(batch.move_range(one(p, 1), Position::new(p, 1)).unwrap().is_empty());
    assert!(batch.move_range(one(p, 2), Position::new(p, 3)).unwrap().is_empty());

    for a_wins_ties in [true, false] {
        let result = converge(
            &base,
            split(Position::new(p, 2)),
            move_range(one(p, 1), Position::new(p, 1)),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>ab</p><p>c</p><p>de</p></main>");

        // Replicas may still receive such moves, for example from a stored record
        let result = converge_with_received_move(
            &base,
            split(Position::new(p, 2)),
            one(p, 1),
            Position::new(p, 1),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>ab</p><p>c</p><p>de</p></main>");

        let result = converge_with_received_move(
            &base,
            merge(Position::new(root, 1)),
            one(p, 2),
            Position::new(p, 2),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>abcde</p></main>");

        let result = converge_with_received_move(
            &base,
            insert(Position::new(p, 1), "X"),
            run(p, 0, 2),
            Position::new(p, 2),
            a_wins_ties,
        );
        assert_eq!(result, "<main><p>aXbc</p><p>de</p></main>");
    }
}

// ==========================
// ALL PAIRS
// ==========================

/// One structural edit, replayable on any replica of the same document.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Split(Position),
    Merge(Position),
    Insert(Position),
    Remove(Range),
    Move(Range, Position),
}

impl Edit {
    fn apply(self, batch: &mut Batch<'_>) -> Result<Delta> {
        match self {
            Edit::Split(position) => batch.split(position).cloned(),
            Edit::Merge(position) => batch.merge(position).cloned(),
            Edit::Insert(position) => {
                let node = if batch.document().is_root(position.parent) {
                    NodeData::element("h1")
                } else {
                    NodeData::text("X")
                };
                batch.insert(position, vec![node]).cloned()
            }
            Edit::Remove(range) => batch.remove(range).cloned(),
            Edit::Move(range, target) => batch.move_range(range, target).cloned(),
        }
    }
}

/// Every split, insertion, removal and move of `doc`'s two paragraphs, plus the merge of them.
fn every_edit(doc: &Document) -> Vec<Edit> {
    let root = doc.main_root();
    let first = doc.child_at(root, 0).unwrap();
    let second = doc.child_at(root, 1).unwrap();
    let parents: Vec<(NodeId, usize)> = [root, first, second]
        .into_iter()
        .map(|parent| (parent, doc.max_offset(parent).unwrap()))
        .collect();

    let mut edits = vec![Edit::Merge(Position::new(root, 1))];
    for &(parent, max) in &parents {
        for offset in 0..=max {
            edits.push(Edit::Insert(Position::new(parent, offset)));
            if parent != root {
                edits.push(Edit::Split(Position::new(parent, offset)));
            }
        }
        for start in 0..max {
            for how_many in 1..=max - start {
                let range = run(parent, start, how_many);
                edits.push(Edit::Remove(range));
                // Elements stay under the root, text stays inside the paragraphs
                for &(target, target_max) in &parents {
                    if (target == root) != (parent == root) {
                        continue;
                    }
                    for offset in 0..=target_max {
                        edits.push(Edit::Move(range, Position::new(target, offset)));
                    }
                }
            }
        }
    }

    // Moves into their own range are rejected up front
    edits
        .into_iter()
        .filter(|edit| edit.apply(&mut Batch::new(&mut doc.clone())).is_ok())
        .collect()
}

#[test]
fn test_every_pair_of_structural_edits_converges() {
    let (base, _, _) = two_paragraphs();
    let root = base.main_root();
    let edits = every_edit(&base);

    for a in &edits {
        for b in &edits {
            for a_wins_ties in [true, false] {
                let mut site_a = base.clone();
                let mut site_b = base.clone();
                let delta_a = a.apply(&mut Batch::new(&mut site_a)).unwrap();
                let delta_b = b.apply(&mut Batch::new(&mut site_b)).unwrap();

                let (a_prime, b_prime) = transform_pair(&delta_a, &delta_b, a_wins_ties).unwrap();
                if let Err(err) = site_a.apply_delta(&b_prime) {
                    panic!("{a:?} vs {b:?} (a wins ties: {a_wins_ties}): b' failed: {err}");
                }
                if let Err(err) = site_b.apply_delta(&a_prime) {
                    panic!("{a:?} vs {b:?} (a wins ties: {a_wins_ties}): a' failed: {err}");
                }
                assert_eq!(
                    site_a.snapshot(root).unwrap(),
                    site_b.snapshot(root).unwrap(),
                    "{a:?} vs {b:?} (a wins ties: {a_wins_ties}) diverged: {} and {}",
                    render(&site_a),
                    render(&site_b)
                );
                assert_eq!(site_a.version(), site_b.version(), "{a:?} vs {b:?}");
            }
        }
    }
}

// ==========================
// VERSIONS AND UNDO
// ==========================

#[test]
fn test_transformed_deltas_are_renumbered() {
    let (base, p) = single_paragraph("abc");
    let exchanged = exchange(
        &base,
        split(Position::new(p, 1)),
        insert(Position::new(p, 0), "X"),
        true,
    );

    assert_eq!(exchanged.a_prime.base_version(), exchanged.b.end_version());
    assert_eq!(exchanged.b_prime.base_version(), exchanged.a.end_version());
    assert!(!is_concurrent(&exchanged.a, &exchanged.a_prime));

    // transform() is the first half of transform_pair()
    let a_prime = transform(&exchanged.a, &exchanged.b, true).unwrap();
    assert_eq!(a_prime, exchanged.a_prime);
}

/// A transformed delta can be undone like any other.
#[test]
fn test_undo_transformed_split() {
    let (base, p) = single_paragraph("abc");
    let mut exchanged = exchange(
        &base,
        split(Position::new(p, 1)),
        insert(Position::new(p, 2), "X"),
        true,
    );

    let undo = exchanged.a_prime.get_reversed();
    exchanged.site_b.apply_delta(&undo).unwrap();
    assert_eq!(render(&exchanged.site_b), "<main><p>abXc</p></main>");
}

#[test]
fn test_not_concurrent_deltas_are_rejected() {
    let (mut doc, p) = single_paragraph("abc");
    let mut batch = Batch::new(&mut doc);
    let first = batch.split(Position::new(p, 1)).unwrap().clone();
    let second = batch.insert(Position::new(p, 0), vec![NodeData::text("x")]).unwrap().clone();

    let err = transform(&second, &first, true).unwrap_err();
    assert_eq!(err.module(), "transform");
}
