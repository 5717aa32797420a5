//! Timestamp-based list reconciliation.
//!
//! Gate precedence:
//! 1. `Created`: no stored copy; the submission is taken as-is.
//! 2. `Stale`: stored `updated >= submitted updated`; the whole
//!    submission is discarded, item changes included.
//! 3. `Merged` / `Unchanged`: per-item last-writer-wins over the
//!    submission's keys.
//!
//! The merged map is keyed by the submission's item keys only. A peer deletes
//! an item by omitting it. The flip side: a submission built from a snapshot
//! that predates a deletion still carries the deleted key, and since the stored
//! copy has nothing to compare it against, the item comes back.

use std::collections::BTreeMap;

use crate::types::{Item, ItemId, List};

/// Why [`merge`] produced its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Merged,
    Unchanged,
    Stale,
}

impl MergeOutcome {
    /// Whether the result must be written back and announced.
    pub fn changed(self) -> bool {
        matches!(self, MergeOutcome::Created | MergeOutcome::Merged)
    }
}

/// Result of reconciling a submission against the stored copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub list: List,
    pub outcome: MergeOutcome,
}

impl Merged {
    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }
}

/// Reconcile `new` against the stored `old` copy.
pub fn merge(old: Option<&List>, new: &List) -> Merged {
    let Some(old) = old else {
        return Merged {
            list: new.clone(),
            outcome: MergeOutcome::Created,
        };
    };

    if old.updated >= new.updated {
        return Merged {
            list: old.clone(),
            outcome: MergeOutcome::Stale,
        };
    }

    let items: BTreeMap<ItemId, Item> = new
        .items
        .iter()
        .map(|(key, incoming)| {
            let winner = match old.items.get(key) {
                Some(existing) if existing.updated >= incoming.updated => existing,
                _ => incoming,
            };
            (key.clone(), winner.clone())
        })
        .collect();

    let outcome = if items == old.items {
        MergeOutcome::Unchanged
    } else {
        MergeOutcome::Merged
    };

    Merged {
        list: List {
            id: new.id.clone(),
            name: new.name.clone(),
            items,
            updated: new.updated,
        },
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ListId, Timestamp};

    fn item(id: &str, text: &str, updated: i64) -> Item {
        Item {
            id: ItemId::from(id),
            text: text.to_string(),
            complete: false,
            updated: Timestamp(updated),
        }
    }

    fn list(updated: i64, items: Vec<Item>) -> List {
        List {
            id: ListId::from("L1"),
            name: "Chores".to_string(),
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            updated: Timestamp(updated),
        }
    }

    #[test]
    fn absent_old_is_creation() {
        let new = list(1, vec![item("A", "x", 1)]);
        let merged = merge(None, &new);
        assert_eq!(merged.outcome, MergeOutcome::Created);
        assert!(merged.changed());
        assert_eq!(merged.list, new);
    }

    #[test]
    fn tie_on_item_timestamp_keeps_old_item() {
        let old = list(5, vec![item("A", "old", 7)]);
        let new = list(9, vec![item("A", "new", 7)]);
        let merged = merge(Some(&old), &new);
        assert_eq!(merged.list.items[&ItemId::from("A")].text, "old");
        assert_eq!(merged.outcome, MergeOutcome::Unchanged);
    }

    #[test]
    fn unchanged_items_do_not_count_as_change_even_if_name_differs() {
        let old = list(5, vec![item("A", "x", 5)]);
        let mut new = list(6, vec![item("A", "x", 5)]);
        new.name = "Renamed".to_string();
        let merged = merge(Some(&old), &new);
        assert!(!merged.changed());
        assert_eq!(merged.list.name, "Renamed");
    }

    #[test]
    fn newer_stored_item_survives_newer_list() {
        let old = list(5, vec![item("A", "kept", 20)]);
        let new = list(30, vec![item("A", "older edit", 10), item("B", "b", 30)]);
        let merged = merge(Some(&old), &new);
        assert_eq!(merged.list.items[&ItemId::from("A")].text, "kept");
        assert!(merged.list.items.contains_key(&ItemId::from("B")));
        assert_eq!(merged.list.updated, Timestamp(30));
        assert_eq!(merged.outcome, MergeOutcome::Merged);
    }
}
