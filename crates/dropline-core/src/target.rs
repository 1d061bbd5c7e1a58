#![forbid(unsafe_code)]

//! Drop-target descriptors and their derived drag state.

use std::collections::BTreeSet;

use crate::geometry::Rect;
use crate::id::{TargetId, ZoneId};
use crate::item::DragItem;

/// Registration record for a potential drop target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropTargetDescriptor {
    pub id: TargetId,
    pub bounds: Rect,
    /// Item types this target accepts.
    pub accepts: BTreeSet<String>,
    pub zone_id: Option<ZoneId>,
    /// Human-readable name used in screen-reader announcements.
    pub announced_name: Option<String>,
}

impl DropTargetDescriptor {
    /// Create a descriptor accepting no types.
    pub fn new(id: impl Into<TargetId>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            accepts: BTreeSet::new(),
            zone_id: None,
            announced_name: None,
        }
    }

    /// Add an accepted item type.
    #[must_use]
    pub fn accept(mut self, item_type: impl Into<String>) -> Self {
        self.accepts.insert(item_type.into());
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone.into());
        self
    }

    #[must_use]
    pub fn with_announced_name(mut self, name: impl Into<String>) -> Self {
        self.announced_name = Some(name.into());
        self
    }

    /// Acceptance rule: the type matches and the target is not the item's own zone.
    pub fn accepts_item(&self, item: &DragItem) -> bool {
        self.accepts.contains(item.item_type())
            && !item.source_zone().is_some_and(|zone| self.id.is_zone(zone))
    }

    /// Name to announce: the explicit name, else the id.
    pub fn display_name(&self) -> &str {
        self.announced_name
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// A registered target plus the flags derived from the current drag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropTargetState {
    descriptor: DropTargetDescriptor,
    can_drop: bool,
    is_over: bool,
}

impl DropTargetState {
    pub(crate) fn new(descriptor: DropTargetDescriptor) -> Self {
        Self {
            descriptor,
            can_drop: false,
            is_over: false,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &DropTargetDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn id(&self) -> &TargetId {
        &self.descriptor.id
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.descriptor.bounds
    }

    #[inline]
    pub fn zone_id(&self) -> Option<&ZoneId> {
        self.descriptor.zone_id.as_ref()
    }

    /// Whether the current drag item may be dropped here.
    #[inline]
    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    /// Whether this is the active target of the current drag.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub(crate) fn replace_descriptor(&mut self, descriptor: DropTargetDescriptor) {
        self.descriptor = descriptor;
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.descriptor.bounds = bounds;
    }

    pub(crate) fn refresh_can_drop(&mut self, item: Option<&DragItem>) {
        self.can_drop = item.is_some_and(|item| self.descriptor.accepts_item(item));
    }

    pub(crate) fn set_over(&mut self, over: bool) {
        self.is_over = over;
    }

    pub(crate) fn clear_flags(&mut self) {
        self.can_drop = false;
        self.is_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(id: &str) -> DropTargetDescriptor {
        DropTargetDescriptor::new(id, Rect::new(0.0, 0.0, 10.0, 10.0)).accept("card")
    }

    #[test]
    fn accepts_matching_type() {
        assert!(column("done").accepts_item(&DragItem::new("c1", "card")));
        assert!(!column("done").accepts_item(&DragItem::new("t1", "token")));
    }

    #[test]
    fn rejects_drop_back_into_source_zone() {
        let item = DragItem::new("c1", "card").with_source_zone("todo");
        assert!(!column("todo").accepts_item(&item));
        assert!(column("done").accepts_item(&item));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(column("done").display_name(), "done");
        assert_eq!(
            column("done").with_announced_name("Done column").display_name(),
            "Done column"
        );
    }

    #[test]
    fn flags_follow_item() {
        let mut state = DropTargetState::new(column("done"));
        state.refresh_can_drop(Some(&DragItem::new("c1", "card")));
        assert!(state.can_drop());
        state.refresh_can_drop(None);
        assert!(!state.can_drop());
    }
}
