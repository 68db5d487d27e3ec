//! Undo of every delta kind.

use treedelta::{
    Batch, Delta, DeltaKind, Document, Result,
    model::{NodeData, Position, Range},
};

use crate::helpers::*;

/// Runs `edit` in a batch, then applies the reversal of the delta it produced and checks that
/// the main root is back to where it started (handles included).
fn assert_undoable(
    doc: &mut Document,
    edit: impl FnOnce(&mut Batch<'_>) -> Result<Delta>,
) -> Delta {
    let root = doc.main_root();
    let before = doc.snapshot(root).unwrap();

    let delta = edit(&mut Batch::new(doc)).unwrap();
    assert_ne!(doc.snapshot(root).unwrap(), before, "edit should change the document");

    let reversed = delta.get_reversed();
    assert_eq!(reversed.kind(), delta.kind().reverse());
    assert_eq!(reversed.base_version(), Some(doc.version()));
    doc.apply_delta(&reversed).unwrap();
    assert_eq!(doc.snapshot(root).unwrap(), before);
    delta
}

#[test]
fn test_every_kind_can_be_undone() {
    let (mut doc, p) = single_paragraph("abcd");
    let root = doc.main_root();

    assert_undoable(&mut doc, |batch| {
        batch.insert(Position::new(p, 2), vec![NodeData::text("x")]).cloned()
    });
    assert_undoable(&mut doc, |batch| {
        batch
            .remove(Range::from_position_and_shift(Position::new(p, 1), 2))
            .cloned()
    });
    assert_undoable(&mut doc, |batch| {
        batch
            .move_range(Range::from_position_and_shift(Position::new(p, 0), 1), Position::new(p, 4))
            .cloned()
    });
    assert_undoable(&mut doc, |batch| batch.set_attribute(p, "align", "left").cloned());
    assert_undoable(&mut doc, |batch| batch.rename(p, "h1").cloned());
    assert_undoable(&mut doc, |batch| batch.split(Position::new(p, 2)).cloned());
    assert_undoable(&mut doc, |batch| {
        batch
            .wrap(
                Range::from_position_and_shift(Position::new(root, 0), 1),
                NodeData::element("blockquote"),
            )
            .cloned()
    });

    assert_eq!(render(&doc), "<main><p>abcd</p></main>");
}

#[test]
fn test_undo_merge_and_unwrap() {
    let mut doc = document_with(vec![element("p", "ab"), element("p", "cd")]);
    let root = doc.main_root();
    assert_undoable(&mut doc, |batch| batch.merge(Position::new(root, 1)).cloned());

    let quote = NodeData::element("blockquote").with_children(vec![element("p", "ef")]);
    let quote_id = quote.id();
    Batch::new(&mut doc)
        .insert(Position::new(root, 2), vec![quote])
        .unwrap();
    assert_undoable(&mut doc, |batch| batch.unwrap(quote_id).cloned());
}

#[test]
fn test_remove_attribute_undo_restores_value() {
    let p = element("p", "a").with_attribute("align", "left");
    let id = p.id();
    let mut doc = document_with(vec![p]);
    assert_undoable(&mut doc, |batch| batch.remove_attribute(id, "align").cloned());
    assert_eq!(render(&doc), "<main><p align=\"left\">a</p></main>");
}

/// The first operation of a reversed split is sticky, and so is the move of a reversed merge.
#[test]
fn test_reversed_structural_deltas_are_sticky() {
    let (mut doc, p) = single_paragraph("abc");
    let root = doc.main_root();
    let split = Batch::new(&mut doc)
        .split(Position::new(p, 1))
        .unwrap()
        .clone();

    let merge = split.get_reversed();
    assert_eq!(merge.kind(), DeltaKind::Merge);
    assert!(merge.operations()[0].is_sticky());

    doc.apply_delta(&merge).unwrap();
    let split_again = merge.get_reversed();
    assert_eq!(split_again.kind(), DeltaKind::Split);
    assert!(split_again.operations()[1].is_sticky());
    assert_eq!(split_again.base_version(), merge.end_version());

    // Redo: the split comes back with the same copy handle
    doc.apply_delta(&split_again).unwrap();
    assert_eq!(render(&doc), "<main><p>a</p><p>bc</p></main>");
    let copy = split
        .as_split()
        .and_then(|split| split.move_operation())
        .and_then(|op| op.as_move())
        .map(|op| op.target.parent)
        .unwrap();
    assert_eq!(doc.child_at(root, 1), Some(copy));
}

#[test]
fn test_stale_undo_is_a_version_mismatch() {
    let (mut doc, p) = single_paragraph("abc");
    let mut batch = Batch::new(&mut doc);
    batch.split(Position::new(p, 1)).unwrap();
    batch.set_attribute(p, "align", "left").unwrap();
    let deltas = batch.into_deltas();

    // The split is no longer the latest delta: its reversal is based on an older version
    let err = doc.apply_delta(&deltas[0].get_reversed()).unwrap_err();
    assert!(err.is_version_mismatch());
    assert_eq!(render(&doc), "<main><p align=\"left\">a</p><p>bc</p></main>");
}

#[test]
fn test_reversing_an_empty_delta() {
    let (mut doc, p) = single_paragraph("abc");
    let delta = Batch::new(&mut doc).rename(p, "p").unwrap().clone();
    assert!(delta.is_empty());
    let reversed = delta.get_reversed();
    assert!(reversed.is_empty());
    assert_eq!(reversed.position(), None);
    doc.apply_delta(&reversed).unwrap();
    assert_eq!(doc.version(), 1);
}
