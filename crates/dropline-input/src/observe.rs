#![forbid(unsafe_code)]

//! Layout observation: keeps registered target bounds in sync with the host.
//!
//! Hosts forward resize, intersection, and scroll notifications; the tracker
//! re-reads bounds through a [`BoundsProvider`] and pushes changes into the
//! store, which re-resolves the active target during a drag.

use std::collections::BTreeMap;

use dropline_core::{DragStore, ElementId, TargetId};

use crate::host::BoundsProvider;

/// One layout notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The element's box changed size.
    Resize(ElementId),
    /// The element entered or left the viewport. Its bounds are re-read like
    /// a resize; visibility itself does not affect hit detection.
    Intersection(ElementId),
    /// Some ancestor scrolled; every tracked box may have moved.
    Scroll,
}

/// Maps drop targets to the host elements that render them.
#[derive(Debug, Clone, Default)]
pub struct BoundsTracker {
    elements: BTreeMap<TargetId, ElementId>,
}

impl BoundsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `target` as rendered by `element`, replacing any previous mapping.
    pub fn track(&mut self, target: TargetId, element: ElementId) {
        self.elements.insert(target, element);
    }

    pub fn untrack(&mut self, target: &TargetId) -> Option<ElementId> {
        self.elements.remove(target)
    }

    #[must_use]
    pub fn element_of(&self, target: &TargetId) -> Option<ElementId> {
        self.elements.get(target).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Apply one notification. Returns how many targets got new bounds.
    pub fn observe<B: BoundsProvider + ?Sized>(
        &self,
        observation: Observation,
        provider: &B,
        store: &mut DragStore,
    ) -> usize {
        match observation {
            Observation::Resize(element) | Observation::Intersection(element) => self
                .elements
                .iter()
                .filter(|&(_, &el)| el == element)
                .filter(|&(id, &el)| refresh(id, el, provider, store))
                .count(),
            Observation::Scroll => self.refresh_all(provider, store),
        }
    }

    /// Re-read every tracked element.
    pub fn refresh_all<B: BoundsProvider + ?Sized>(&self, provider: &B, store: &mut DragStore) -> usize {
        self.elements
            .iter()
            .filter(|&(id, &el)| refresh(id, el, provider, store))
            .count()
    }
}

/// Push fresh bounds for one target if they changed. Elements the host no
/// longer knows keep their last bounds.
fn refresh<B: BoundsProvider + ?Sized>(
    id: &TargetId,
    element: ElementId,
    provider: &B,
    store: &mut DragStore,
) -> bool {
    let Some(bounds) = provider.bounds(element) else {
        return false;
    };
    if store.target(id).is_none_or(|target| target.bounds() == bounds) {
        return false;
    }
    store.update_drop_target(id, bounds);
    true
}
