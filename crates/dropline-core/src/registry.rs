#![forbid(unsafe_code)]

//! Drop-target registry: keyed, registration-ordered target storage.
//!
//! The registry keeps targets in registration order (the tie-break used by
//! linear hit detection) while still answering id lookups in O(1).
//!
//! # Invariants
//!
//! - `index` and `ordered` always hold the same set of targets.
//! - Re-registering an id replaces the descriptor but keeps its original
//!   position in iteration order.
//! - Unknown ids passed to `unregister`/`update_bounds` are no-ops.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::geometry::Rect;
use crate::id::TargetId;
use crate::item::DragItem;
use crate::target::{DropTargetDescriptor, DropTargetState};

/// Result of [`TargetRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    Replaced,
}

/// Keyed store of drop targets.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    index: AHashMap<TargetId, u64>,
    ordered: BTreeMap<u64, DropTargetState>,
    next_seq: u64,
}

impl TargetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a target.
    pub fn register(&mut self, descriptor: DropTargetDescriptor) -> Registration {
        if let Some(seq) = self.index.get(&descriptor.id)
            && let Some(state) = self.ordered.get_mut(seq)
        {
            state.replace_descriptor(descriptor);
            return Registration::Replaced;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.index.insert(descriptor.id.clone(), seq);
        self.ordered.insert(seq, DropTargetState::new(descriptor));
        Registration::Inserted
    }

    /// Remove a target, returning its last state.
    pub fn unregister(&mut self, id: &TargetId) -> Option<DropTargetState> {
        let seq = self.index.remove(id)?;
        self.ordered.remove(&seq)
    }

    /// Replace a target's bounds. Returns `false` for unknown ids.
    pub fn update_bounds(&mut self, id: &TargetId, bounds: Rect) -> bool {
        match self.get_mut(id) {
            Some(state) => {
                state.set_bounds(bounds);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: &TargetId) -> Option<&DropTargetState> {
        self.index.get(id).and_then(|seq| self.ordered.get(seq))
    }

    pub(crate) fn get_mut(&mut self, id: &TargetId) -> Option<&mut DropTargetState> {
        let seq = self.index.get(id)?;
        self.ordered.get_mut(seq)
    }

    #[must_use]
    pub fn contains(&self, id: &TargetId) -> bool {
        self.index.contains_key(id)
    }

    /// Targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DropTargetState> {
        self.ordered.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Recompute `can_drop` for every target against `item`.
    pub(crate) fn refresh_can_drop(&mut self, item: Option<&DragItem>) {
        for state in self.ordered.values_mut() {
            state.refresh_can_drop(item);
        }
    }

    pub(crate) fn set_over(&mut self, id: &TargetId, over: bool) {
        if let Some(state) = self.get_mut(id) {
            state.set_over(over);
        }
    }

    pub(crate) fn clear_flags(&mut self) {
        for state in self.ordered.values_mut() {
            state.clear_flags();
        }
    }
}
