#![forbid(unsafe_code)]

//! Roving-tabindex focus zones and post-drop focus handoff.
//!
//! A zone is an ordered list of items of which exactly one is tab-reachable
//! (`tabindex=0`); the rest are `-1`. After a drop, the handler asks the store
//! to move focus into a zone with [`DragStore::request_focus`]; the zone picks
//! the request up on its next [`FocusZone::consume_pending`] call.
//!
//! # Invariants
//!
//! 1. A non-empty zone always has exactly one active item.
//! 2. Item ids are unique; duplicates passed to `set_items` keep the first.
//! 3. A pending request for this zone is cleared once it has been applied.
//!    Requests for other zones are left alone.
//!
//! # Failure Modes
//!
//! - If the requested item is not in the zone, focus goes to the first item.
//! - If the zone has no items yet, the request stays pending until it does.
//! - If the active item is removed, focus moves to the item now at its index,
//!   or the last item when the list got shorter.

use ahash::AHashSet;
use dropline_core::{DragStore, ItemId, ZoneId};

#[cfg(feature = "tracing")]
use tracing::debug;

/// `tabindex` value for the tab-reachable item.
pub const TAB_INDEX_ACTIVE: i32 = 0;
/// `tabindex` value for every other item.
pub const TAB_INDEX_INACTIVE: i32 = -1;

/// One roving-tabindex group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusZone {
    zone_id: ZoneId,
    items: Vec<ItemId>,
    active: Option<usize>,
}

impl FocusZone {
    #[must_use]
    pub fn new(zone_id: ZoneId) -> Self {
        Self {
            zone_id,
            items: Vec::new(),
            active: None,
        }
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemId>) -> Self {
        self.set_items(items);
        self
    }

    #[must_use]
    pub fn zone_id(&self) -> &ZoneId {
        &self.zone_id
    }

    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The tab-reachable item.
    #[must_use]
    pub fn active_item(&self) -> Option<&ItemId> {
        self.active.and_then(|i| self.items.get(i))
    }

    /// `tabindex` for `item`: active items get 0, everything else -1.
    #[must_use]
    pub fn tab_index(&self, item: &ItemId) -> i32 {
        if self.active_item() == Some(item) {
            TAB_INDEX_ACTIVE
        } else {
            TAB_INDEX_INACTIVE
        }
    }

    /// Replace the item list, keeping the active item when it survives.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = ItemId>) {
        let previous = self.active_item().cloned();
        let previous_index = self.active;

        let mut seen = AHashSet::new();
        self.items = items
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        self.active = if self.items.is_empty() {
            None
        } else if let Some(index) = previous
            .as_ref()
            .and_then(|id| self.items.iter().position(|i| i == id))
        {
            Some(index)
        } else {
            Some(previous_index.unwrap_or(0).min(self.items.len() - 1))
        };
    }

    /// Make `item` the active item. Returns `false` if it is not in the zone.
    pub fn focus(&mut self, item: &ItemId) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn focus_first(&mut self) -> Option<&ItemId> {
        self.active = (!self.items.is_empty()).then_some(0);
        self.active_item()
    }

    pub fn focus_last(&mut self) -> Option<&ItemId> {
        self.active = self.items.len().checked_sub(1);
        self.active_item()
    }

    /// Move to the next item, wrapping past the end.
    pub fn focus_next(&mut self) -> Option<&ItemId> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        self.active = Some(self.active.map_or(0, |i| (i + 1) % len));
        self.active_item()
    }

    /// Move to the previous item, wrapping past the start.
    pub fn focus_prev(&mut self) -> Option<&ItemId> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        self.active = Some(self.active.map_or(len - 1, |i| (i + len - 1) % len));
        self.active_item()
    }

    /// Apply a pending focus request addressed to this zone.
    ///
    /// Returns the item that should receive DOM focus, or `None` when there
    /// is no request for this zone or the zone is still empty.
    pub fn consume_pending(&mut self, store: &mut DragStore) -> Option<ItemId> {
        let requested = match store.pending_focus() {
            Some(pending) if pending.zone_id == self.zone_id => pending.item_id.clone(),
            _ => return None,
        };
        if self.items.is_empty() {
            return None;
        }

        let hit = requested.as_ref().is_some_and(|id| self.focus(id));
        if !hit {
            self.focus_first();
        }
        store.clear_pending_focus(&self.zone_id);

        #[cfg(feature = "tracing")]
        debug!(
            zone = %self.zone_id,
            requested = ?requested,
            fallback = !hit,
            "focus handoff applied"
        );

        self.active_item().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::new(n)).collect()
    }

    fn zone(names: &[&str]) -> FocusZone {
        FocusZone::new(ZoneId::new("todo")).with_items(ids(names))
    }

    #[test]
    fn first_item_is_tab_reachable() {
        let z = zone(&["a", "b", "c"]);
        assert_eq!(z.tab_index(&ItemId::new("a")), TAB_INDEX_ACTIVE);
        assert_eq!(z.tab_index(&ItemId::new("b")), TAB_INDEX_INACTIVE);
        assert_eq!(z.tab_index(&ItemId::new("zzz")), TAB_INDEX_INACTIVE);
    }

    #[test]
    fn navigation_wraps() {
        let mut z = zone(&["a", "b", "c"]);
        assert_eq!(z.focus_prev(), Some(&ItemId::new("c")));
        assert_eq!(z.focus_next(), Some(&ItemId::new("a")));
        assert_eq!(z.focus_next(), Some(&ItemId::new("b")));
        assert_eq!(z.focus_last(), Some(&ItemId::new("c")));
        assert_eq!(z.focus_first(), Some(&ItemId::new("a")));
    }

    #[test]
    fn empty_zone_has_no_active_item() {
        let mut z = zone(&[]);
        assert_eq!(z.focus_next(), None);
        assert_eq!(z.focus_prev(), None);
        assert_eq!(z.focus_first(), None);
        assert_eq!(z.focus_last(), None);
    }

    #[test]
    fn set_items_keeps_surviving_active_item() {
        let mut z = zone(&["a", "b", "c"]);
        z.focus(&ItemId::new("b"));
        z.set_items(ids(&["x", "b", "a"]));
        assert_eq!(z.active_item(), Some(&ItemId::new("b")));
    }

    #[test]
    fn set_items_clamps_when_active_removed() {
        let mut z = zone(&["a", "b", "c"]);
        z.focus_last();
        z.set_items(ids(&["a"]));
        assert_eq!(z.active_item(), Some(&ItemId::new("a")));
        z.set_items(ids(&[]));
        assert_eq!(z.active_item(), None);
        z.set_items(ids(&["q"]));
        assert_eq!(z.active_item(), Some(&ItemId::new("q")));
    }

    #[test]
    fn duplicates_keep_first() {
        let z = zone(&["a", "b", "a"]);
        assert_eq!(z.items(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn consume_pending_focuses_requested_item() {
        let mut store = DragStore::new();
        let mut z = zone(&["a", "b", "c"]);
        store.request_focus(ZoneId::new("todo"), Some(ItemId::new("c")));
        assert_eq!(z.consume_pending(&mut store), Some(ItemId::new("c")));
        assert_eq!(store.pending_focus(), None);
        assert_eq!(z.tab_index(&ItemId::new("c")), TAB_INDEX_ACTIVE);
    }

    #[test]
    fn consume_pending_falls_back_to_first() {
        let mut store = DragStore::new();
        let mut z = zone(&["a", "b"]);
        z.focus_last();
        store.request_focus(ZoneId::new("todo"), Some(ItemId::new("gone")));
        assert_eq!(z.consume_pending(&mut store), Some(ItemId::new("a")));

        z.focus_last();
        store.request_focus(ZoneId::new("todo"), None);
        assert_eq!(z.consume_pending(&mut store), Some(ItemId::new("a")));
        assert_eq!(store.pending_focus(), None);
    }

    #[test]
    fn consume_pending_ignores_other_zones() {
        let mut store = DragStore::new();
        let mut z = zone(&["a"]);
        store.request_focus(ZoneId::new("done"), None);
        assert_eq!(z.consume_pending(&mut store), None);
        assert!(store.pending_focus().is_some());
    }

    #[test]
    fn empty_zone_leaves_request_pending() {
        let mut store = DragStore::new();
        let mut z = zone(&[]);
        store.request_focus(ZoneId::new("todo"), Some(ItemId::new("a")));
        assert_eq!(z.consume_pending(&mut store), None);
        assert!(store.pending_focus().is_some());

        z.set_items(ids(&["a"]));
        assert_eq!(z.consume_pending(&mut store), Some(ItemId::new("a")));
    }
}
