//! Domain types for shared lists.
//!
//! Every document type round-trips through serde_json unchanged; the same shape
//! is used on the wire and on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::sanitize::{safe_name, safe_slug};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a list; also the name of its room on the relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListId(pub String);

impl ListId {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of an item, unique within its list.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

static ITEM_COUNTER: AtomicU64 = AtomicU64::new(0);

impl ItemId {
    /// Fresh id from the wall clock plus a process-wide counter, so two items
    /// created in the same millisecond never collide.
    pub fn generate() -> Self {
        let n = ITEM_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("item{}-{n}", Timestamp::now().0))
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Wall-clock mutation stamp in Unix epoch milliseconds.
///
/// Ordering between peers is "latest wall clock wins"; clock skew between
/// peers is not corrected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// The current time, or one millisecond past `previous` if the clock has
    /// not moved beyond it yet.
    pub fn after(previous: Timestamp) -> Self {
        Self::now().max(Timestamp(previous.0.saturating_add(1)))
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A single entry of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub updated: Timestamp,
}

/// User input for creating or replacing an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub text: String,
    #[serde(default)]
    pub complete: bool,
}

impl ItemDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            complete: false,
        }
    }
}

impl Item {
    /// New incomplete item with a fresh id, stamped now.
    pub fn new(text: impl Into<String>) -> Result<Self, ModelError> {
        Self::from_draft(ItemDraft::new(text), Timestamp::now())
    }

    /// Build an item from a draft, keeping the draft's id when it has one.
    pub fn from_draft(draft: ItemDraft, updated: Timestamp) -> Result<Self, ModelError> {
        if draft.text.trim().is_empty() {
            return Err(ModelError::EmptyItemText);
        }
        let id = match draft.id {
            Some(id) if !id.is_empty() => id,
            _ => ItemId::generate(),
        };
        Ok(Self {
            id,
            text: draft.text,
            complete: draft.complete,
            updated,
        })
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// The shared document: a named, keyed collection of items.
///
/// Deleting an item removes its key; there are no tombstones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub id: ListId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: BTreeMap<ItemId, Item>,
    #[serde(default)]
    pub updated: Timestamp,
}

impl List {
    /// New empty list. The id is derived from the creation time and the name.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        let clean = safe_name(name);
        if clean.is_empty() {
            return Err(ModelError::EmptyListName);
        }
        let updated = Timestamp::now();
        Ok(Self {
            id: ListId(format!("{}-{}", updated.0, safe_slug(name))),
            name: clean,
            items: BTreeMap::new(),
            updated,
        })
    }

    /// Validate a document received from a peer or read from storage.
    ///
    /// Re-keys items by their own id and sanitizes the name; never invents
    /// ids or text.
    pub fn validated(self) -> Result<Self, ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::MissingListId);
        }
        let name = safe_name(&self.name);
        if name.is_empty() {
            return Err(ModelError::EmptyListName);
        }
        let mut items = BTreeMap::new();
        for item in self.items.into_values() {
            if item.id.is_empty() {
                return Err(ModelError::MissingItemId {
                    list_id: self.id.0.clone(),
                });
            }
            if item.text.trim().is_empty() {
                return Err(ModelError::EmptyItemText);
            }
            items.insert(item.id.clone(), item);
        }
        Ok(Self {
            id: self.id,
            name,
            items,
            updated: self.updated,
        })
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Items ordered for display: incomplete first, then by id.
    pub fn items_sorted(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by(|a, b| a.complete.cmp(&b.complete).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// Copy of this list with `item` inserted (or replaced), list stamped `at`.
    pub fn with_item(&self, item: Item, at: Timestamp) -> Self {
        let mut next = self.clone();
        next.items.insert(item.id.clone(), item);
        next.updated = at;
        next
    }

    /// Copy with the item's completion flipped; both item and list stamped `at`.
    pub fn with_item_toggled(&self, id: &ItemId, at: Timestamp) -> Option<Self> {
        let mut next = self.clone();
        let item = next.items.get_mut(id)?;
        item.complete = !item.complete;
        item.updated = at;
        next.updated = at;
        Some(next)
    }

    /// Copy with the item's key removed, list stamped `at`.
    pub fn without_item(&self, id: &ItemId, at: Timestamp) -> Option<Self> {
        let mut next = self.clone();
        next.items.remove(id)?;
        next.updated = at;
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ListId::from("1-groceries").to_string(), "1-groceries");
        assert_eq!(ItemId::from("item1").to_string(), "item1");
        assert_eq!(Timestamp(42).to_string(), "42");
    }

    #[test]
    fn list_id_derives_from_time_and_name() {
        let list = List::new("Weekend Trip!").expect("list");
        let (millis, slug) = list.id.0.split_once('-').expect("dash");
        assert_eq!(millis, list.updated.0.to_string());
        assert_eq!(slug, "weekend-trip");
        assert_eq!(list.name, "Weekend Trip");
        assert!(list.items.is_empty());
    }

    #[test]
    fn list_without_usable_name_is_rejected() {
        assert_eq!(List::new("   ").unwrap_err(), ModelError::EmptyListName);
        assert_eq!(List::new("???").unwrap_err(), ModelError::EmptyListName);
    }

    #[test]
    fn empty_item_text_is_rejected() {
        assert_eq!(Item::new("").unwrap_err(), ModelError::EmptyItemText);
        assert_eq!(Item::new("  ").unwrap_err(), ModelError::EmptyItemText);
    }

    #[test]
    fn generated_item_ids_are_unique() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        assert_ne!(a, b);
        assert!(a.0.starts_with("item"));
    }

    #[test]
    fn draft_keeps_existing_id() {
        let mut draft = ItemDraft::new("milk");
        draft.id = Some(ItemId::from("item7"));
        draft.complete = true;
        let item = Item::from_draft(draft, Timestamp(9)).expect("item");
        assert_eq!(item.id, ItemId::from("item7"));
        assert!(item.complete);
        assert_eq!(item.updated, Timestamp(9));
    }

    #[test]
    fn timestamp_after_is_strictly_later() {
        let far = Timestamp(i64::MAX / 2);
        assert_eq!(Timestamp::after(far), Timestamp(far.0 + 1));
        let past = Timestamp(1);
        assert!(Timestamp::after(past) > past);
    }

    #[test]
    fn validated_rekeys_items_by_their_own_id() {
        let json = r#"{
            "id": "L1",
            "name": "  Chores  ",
            "items": {"wrong-key": {"id": "item1", "text": "sweep", "complete": false, "updated": 3}},
            "updated": 4
        }"#;
        let list: List = serde_json::from_str(json).expect("parse");
        let list = list.validated().expect("valid");
        assert_eq!(list.name, "Chores");
        assert!(list.items.contains_key(&ItemId::from("item1")));
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn validated_rejects_missing_id() {
        let list: List = serde_json::from_str(r#"{"name": "x", "updated": 1}"#).expect("parse");
        assert_eq!(list.validated().unwrap_err(), ModelError::MissingListId);
    }

    #[test]
    fn validated_rejects_blank_item_text() {
        let json = r#"{"id": "L", "name": "n", "items": {"a": {"id": "a", "text": ""}}, "updated": 1}"#;
        let list: List = serde_json::from_str(json).expect("parse");
        assert_eq!(list.validated().unwrap_err(), ModelError::EmptyItemText);
    }

    #[test]
    fn sorted_items_put_incomplete_first() {
        let list = List::new("n").expect("list");
        let done = Item {
            id: ItemId::from("a"),
            text: "done".into(),
            complete: true,
            updated: Timestamp(1),
        };
        let open = Item {
            id: ItemId::from("b"),
            text: "open".into(),
            complete: false,
            updated: Timestamp(1),
        };
        let list = list
            .with_item(done, Timestamp(2))
            .with_item(open, Timestamp(3));
        let order: Vec<&str> = list.items_sorted().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn toggle_and_delete_stamp_the_list() {
        let item = Item {
            id: ItemId::from("a"),
            text: "x".into(),
            complete: false,
            updated: Timestamp(1),
        };
        let list = List::new("n").expect("list").with_item(item, Timestamp(10));

        let toggled = list
            .with_item_toggled(&ItemId::from("a"), Timestamp(20))
            .expect("toggled");
        assert!(toggled.items[&ItemId::from("a")].complete);
        assert_eq!(toggled.items[&ItemId::from("a")].updated, Timestamp(20));
        assert_eq!(toggled.updated, Timestamp(20));

        let removed = toggled
            .without_item(&ItemId::from("a"), Timestamp(30))
            .expect("removed");
        assert!(removed.items.is_empty());
        assert_eq!(removed.updated, Timestamp(30));

        assert!(removed.without_item(&ItemId::from("a"), Timestamp(40)).is_none());
    }
}
