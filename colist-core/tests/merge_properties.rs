//! Reconciler properties: idempotence, per-item LWW, the stale gate,
//! deletion by omission, and resurrection from a pre-deletion snapshot.

use colist_core::{merge, Item, ItemId, List, ListId, MergeOutcome, Timestamp};
use rstest::rstest;

fn item(id: &str, text: &str, updated: i64) -> Item {
    Item {
        id: ItemId::from(id),
        text: text.to_string(),
        complete: false,
        updated: Timestamp(updated),
    }
}

fn list(updated: i64, items: &[Item]) -> List {
    List {
        id: ListId::from("L1"),
        name: "Groceries".to_string(),
        items: items.iter().map(|i| (i.id.clone(), i.clone())).collect(),
        updated: Timestamp(updated),
    }
}

fn keys(list: &List) -> Vec<&str> {
    list.items.keys().map(ItemId::as_str).collect()
}

// ---------------------------------------------------------------------------
// 1. Idempotence and the stale gate
// ---------------------------------------------------------------------------

#[test]
fn resubmitting_identical_list_is_unchanged() {
    let stored = list(7, &[item("A", "x", 7)]);
    let merged = merge(Some(&stored), &stored.clone());
    assert_eq!(merged.outcome, MergeOutcome::Stale);
    assert!(!merged.changed());
    assert_eq!(merged.list, stored);
}

#[test]
fn older_submission_is_discarded_wholesale() {
    let stored = list(10, &[item("A", "x", 10)]);
    // Carries a brand-new item; still dropped because the list is older.
    let submitted = list(5, &[item("A", "y", 5), item("B", "new", 5)]);
    let merged = merge(Some(&stored), &submitted);
    assert_eq!(merged.outcome, MergeOutcome::Stale);
    assert_eq!(merged.list, stored);
}

#[rstest]
#[case(10, 10)]
#[case(10, 9)]
#[case(10, 0)]
fn gate_rejects_equal_or_older(#[case] stored_at: i64, #[case] submitted_at: i64) {
    let stored = list(stored_at, &[]);
    let submitted = list(submitted_at, &[item("Z", "z", 99)]);
    assert!(!merge(Some(&stored), &submitted).changed());
}

// ---------------------------------------------------------------------------
// 2. Per-item last-writer-wins
// ---------------------------------------------------------------------------

#[test]
fn per_item_lww() {
    let old = list(5, &[item("A", "x", 5)]);
    let new = list(10, &[item("A", "y", 10), item("B", "z", 3)]);

    let merged = merge(Some(&old), &new);

    assert!(merged.changed());
    assert_eq!(keys(&merged.list), vec!["A", "B"]);
    let a = &merged.list.items[&ItemId::from("A")];
    assert_eq!((a.text.as_str(), a.updated), ("y", Timestamp(10)));
    let b = &merged.list.items[&ItemId::from("B")];
    assert_eq!((b.text.as_str(), b.updated), ("z", Timestamp(3)));
    assert_eq!(merged.list.updated, Timestamp(10));
}

// ---------------------------------------------------------------------------
// 3. Deletion and resurrection
// ---------------------------------------------------------------------------

#[test]
fn omitting_an_item_deletes_it() {
    let old = list(5, &[item("A", "a", 1), item("B", "b", 1)]);
    let new = list(6, &[item("A", "a", 1)]);

    let merged = merge(Some(&old), &new);

    assert_eq!(merged.outcome, MergeOutcome::Merged);
    assert_eq!(keys(&merged.list), vec!["A"]);
}

#[test]
fn stale_snapshot_resurrects_deleted_item() {
    // B was deleted at t=8; a peer still holding B@2 submits at t=9.
    let old = list(8, &[]);
    let new = list(9, &[item("B", "zombie", 2)]);

    let merged = merge(Some(&old), &new);

    assert!(merged.changed());
    assert_eq!(keys(&merged.list), vec!["B"]);
    assert_eq!(merged.list.items[&ItemId::from("B")].updated, Timestamp(2));
}
