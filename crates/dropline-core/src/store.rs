#![forbid(unsafe_code)]

//! Drag session store: the state machine of record.
//!
//! [`DragStore`] owns the current drag item, its position, the active drop
//! target, the drop-target registry, the hit detector, and the pending
//! focus-handoff record. Input controllers and drop-target consumers only
//! ever mutate state through its operations.
//!
//! # State Machine
//!
//! ```text
//! Idle --start_drag--> Dragging(mode) --end_drag--> Idle
//!                           |  ^
//!                           +--+ update_drag_position / set_active_drop_target
//! ```
//!
//! # Invariants
//!
//! 1. At most one target has `is_over = true`, and only while dragging.
//! 2. `can_drop` always equals the acceptance rule for the current item, and
//!    is `false` for every target while idle.
//! 3. Every operation is total: unknown ids and missing drags are no-ops.
//! 4. Each operation that changes state bumps [`DragStore::revision`] exactly
//!    once, so subscribers never observe a half-applied update.
//!
//! # Two-phase teardown
//!
//! [`DragStore::end_drag`] clears the drag immediately but keeps
//! `active_drop_target_id` until [`DragStore::flush_deferred`] runs on the
//! next tick. Drop-target consumers use that window to run their drop
//! callbacks against the target that was active when the drag ended.

use std::collections::VecDeque;

use crate::geometry::Rect;
use crate::hit::{BoundsDetector, HitDetector, HitStrategyKind};
use crate::id::{ItemId, TargetId, ZoneId};
use crate::item::DragItem;
use crate::registry::{Registration, TargetRegistry};
use crate::session::{DragEnd, DragMode, DragOrigin, DragPosition, PendingFocus, Preview, Session};
use crate::target::{DropTargetDescriptor, DropTargetState};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Maximum number of undrained changes kept; older ones are dropped first.
pub const MAX_PENDING_CHANGES: usize = 1024;

/// One committed store mutation, for rendering-layer subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    DragStarted { item: ItemId, mode: DragMode },
    PositionChanged { x: f64, y: f64 },
    ActiveTargetChanged {
        previous: Option<TargetId>,
        current: Option<TargetId>,
    },
    DragEnded { item: ItemId, target: Option<TargetId> },
    TargetRegistered(TargetId),
    TargetUnregistered(TargetId),
    TargetUpdated(TargetId),
    FocusRequested(PendingFocus),
    FocusCleared(ZoneId),
}

/// Central drag/drop store.
#[derive(Debug)]
pub struct DragStore {
    registry: TargetRegistry,
    detector: Box<dyn HitDetector>,
    session: Session,
    drag_item: Option<DragItem>,
    drag_position: Option<DragPosition>,
    preview: Option<Preview>,
    active_target: Option<TargetId>,
    deferred_clear: bool,
    pending_focus: Option<PendingFocus>,
    revision: u64,
    touched: bool,
    changes: VecDeque<StoreChange>,
}

impl Default for DragStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DragStore {
    /// Store using the geometric bounds strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_detector(Box::new(BoundsDetector))
    }

    /// Store using a strategy that needs no host collaborator.
    #[must_use]
    pub fn with_strategy(kind: HitStrategyKind) -> Self {
        Self::with_detector(kind.build_standalone())
    }

    /// Store using a caller-supplied detector.
    #[must_use]
    pub fn with_detector(detector: Box<dyn HitDetector>) -> Self {
        Self {
            registry: TargetRegistry::new(),
            detector,
            session: Session::Idle,
            drag_item: None,
            drag_position: None,
            preview: None,
            active_target: None,
            deferred_clear: false,
            pending_focus: None,
            revision: 0,
            touched: false,
            changes: VecDeque::new(),
        }
    }

    /// Swap the hit detector, rebuilding its index from the registry.
    pub fn set_detector(&mut self, mut detector: Box<dyn HitDetector>) {
        detector.rebuild(&self.registry);
        self.detector = detector;
    }

    // ---------------------------------------------------------------------
    // Drag lifecycle
    // ---------------------------------------------------------------------

    /// Begin a drag. Always succeeds; an existing drag is silently replaced.
    pub fn start_drag(&mut self, item: DragItem, position: DragPosition, origin: DragOrigin) {
        let mode = origin.mode();
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "dnd.start_drag",
            item = %item.id(),
            item_type = item.item_type(),
            mode = ?mode,
            replaced = self.session.is_dragging()
        )
        .entered();

        let previous = self.active_target.take();
        self.deferred_clear = false;
        self.registry.clear_flags();
        self.registry.refresh_can_drop(Some(&item));

        self.record(StoreChange::DragStarted {
            item: item.id().clone(),
            mode,
        });
        if previous.is_some() {
            self.record(StoreChange::ActiveTargetChanged {
                previous,
                current: None,
            });
        }

        self.session = Session::Dragging(mode);
        self.drag_item = Some(item);
        self.drag_position = Some(position);
        self.preview = origin.preview();
        self.seal();

        #[cfg(feature = "tracing")]
        debug!(
            droppable = self.registry.iter().filter(|t| t.can_drop()).count(),
            "drag started"
        );
    }

    /// Move the drag to `(x, y)` and re-resolve the active target.
    ///
    /// Returns `false` without touching the store when there is no drag, or
    /// when neither the coordinates nor the resolved target changed.
    pub fn update_drag_position(&mut self, x: f64, y: f64) -> bool {
        if self.drag_item.is_none() {
            return false;
        }
        let resolved = self.detector.resolve(x, y, &self.registry);
        let current = self.drag_position.unwrap_or_default();
        let moved = current.x != x || current.y != y;
        if !moved && resolved == self.active_target {
            return false;
        }

        #[cfg(feature = "tracing")]
        trace!(x, y, target_id = ?resolved, "drag position updated");

        if moved {
            self.drag_position = Some(current.with_origin(x, y));
            self.record(StoreChange::PositionChanged { x, y });
        }
        self.apply_active(resolved);
        self.seal();
        true
    }

    /// End the drag. Returns `None` when no drag was active.
    ///
    /// The active target id survives until [`Self::flush_deferred`].
    pub fn end_drag(&mut self) -> Option<DragEnd> {
        let Session::Dragging(mode) = self.session else {
            return None;
        };
        let item = self.drag_item.take()?;
        let target = self.active_target.clone();

        #[cfg(feature = "tracing")]
        debug!(item = %item.id(), target_id = ?target, mode = ?mode, "drag ended");

        self.session = Session::Idle;
        self.drag_position = None;
        self.preview = None;
        self.registry.clear_flags();
        self.deferred_clear = target.is_some();
        self.record(StoreChange::DragEnded {
            item: item.id().clone(),
            target: target.clone(),
        });
        self.seal();

        Some(DragEnd { item, target, mode })
    }

    /// Complete the two-phase teardown started by [`Self::end_drag`].
    ///
    /// Hosts call this on the tick after the drag ended. Returns `true` if an
    /// active target id was cleared.
    pub fn flush_deferred(&mut self) -> bool {
        if !self.deferred_clear {
            return false;
        }
        self.deferred_clear = false;
        let Some(previous) = self.active_target.take() else {
            return false;
        };
        self.record(StoreChange::ActiveTargetChanged {
            previous: Some(previous),
            current: None,
        });
        self.seal();
        true
    }

    /// Force the active target, bypassing hit detection.
    ///
    /// Unknown ids are ignored, and so is any `Some` while idle; `None`
    /// clears the active target.
    pub fn set_active_drop_target(&mut self, id: Option<&TargetId>) {
        if let Some(id) = id
            && (!self.session.is_dragging() || !self.registry.contains(id))
        {
            return;
        }
        self.deferred_clear = false;
        self.apply_active(id.cloned());
        self.seal();
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Register (or re-register) a drop target.
    pub fn register_drop_target(&mut self, descriptor: DropTargetDescriptor) {
        let id = descriptor.id.clone();
        let registration = self.registry.register(descriptor);
        self.registry.refresh_can_drop(self.drag_item.as_ref());
        if let Some(state) = self.registry.get(&id) {
            self.detector.target_registered(state);
        }

        #[cfg(feature = "tracing")]
        trace!(target_id = %id, ?registration, "drop target registered");

        self.record(match registration {
            Registration::Inserted => StoreChange::TargetRegistered(id),
            Registration::Replaced => StoreChange::TargetUpdated(id),
        });
        self.reresolve();
        self.seal();
    }

    /// Remove a drop target. Unregistering the active target clears it.
    pub fn unregister_drop_target(&mut self, id: &TargetId) {
        if self.registry.unregister(id).is_none() {
            return;
        }
        self.detector.target_unregistered(id);
        self.record(StoreChange::TargetUnregistered(id.clone()));
        if self.active_target.as_ref() == Some(id) {
            self.deferred_clear = false;
            let previous = self.active_target.take();
            self.record(StoreChange::ActiveTargetChanged {
                previous,
                current: None,
            });
        }
        self.seal();
    }

    /// Replace a target's bounds after a layout change.
    ///
    /// While dragging, the active target is re-resolved at the last known
    /// position so a target that moved away stops being `is_over`.
    pub fn update_drop_target(&mut self, id: &TargetId, bounds: Rect) {
        if !self.registry.update_bounds(id, bounds) {
            return;
        }
        if let Some(state) = self.registry.get(id) {
            self.detector.target_moved(state);
        }
        self.record(StoreChange::TargetUpdated(id.clone()));
        self.reresolve();
        self.seal();
    }

    /// Rebuild the detector's index from the full registry.
    pub fn rebuild_hit_index(&mut self) {
        self.detector.rebuild(&self.registry);
    }

    // ---------------------------------------------------------------------
    // Focus handoff
    // ---------------------------------------------------------------------

    /// Ask `zone` to focus `item` (or its first item) once it next renders.
    pub fn request_focus(&mut self, zone: ZoneId, item: Option<ItemId>) {
        let pending = PendingFocus {
            zone_id: zone,
            item_id: item,
        };
        self.pending_focus = Some(pending.clone());
        self.record(StoreChange::FocusRequested(pending));
        self.seal();
    }

    /// Clear the pending focus record if it addresses `zone`.
    pub fn clear_pending_focus(&mut self, zone: &ZoneId) {
        if self
            .pending_focus
            .as_ref()
            .is_none_or(|pending| pending.zone_id != *zone)
        {
            return;
        }
        self.pending_focus = None;
        self.record(StoreChange::FocusCleared(zone.clone()));
        self.seal();
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    #[inline]
    pub fn drag_item(&self) -> Option<&DragItem> {
        self.drag_item.as_ref()
    }

    #[inline]
    pub fn drag_position(&self) -> Option<DragPosition> {
        self.drag_position
    }

    #[inline]
    pub fn preview(&self) -> Option<Preview> {
        self.preview
    }

    #[inline]
    pub fn active_drop_target_id(&self) -> Option<&TargetId> {
        self.active_target.as_ref()
    }

    #[inline]
    pub fn pending_focus(&self) -> Option<&PendingFocus> {
        self.pending_focus.as_ref()
    }

    pub fn target(&self, id: &TargetId) -> Option<&DropTargetState> {
        self.registry.get(id)
    }

    /// Targets in registration order.
    pub fn targets(&self) -> impl Iterator<Item = &DropTargetState> {
        self.registry.iter()
    }

    #[inline]
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    #[inline]
    pub fn hit_strategy(&self) -> HitStrategyKind {
        self.detector.kind()
    }

    /// Counter bumped once per committed operation.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take every change recorded since the last drain.
    pub fn drain_changes(&mut self) -> Vec<StoreChange> {
        self.changes.drain(..).collect()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Move `is_over` from the old active target to `next`.
    fn apply_active(&mut self, next: Option<TargetId>) {
        if next == self.active_target {
            return;
        }
        let previous = self.active_target.take();
        if let Some(prev) = previous.as_ref() {
            self.registry.set_over(prev, false);
        }
        if let Some(next) = next.as_ref()
            && self.session.is_dragging()
        {
            self.registry.set_over(next, true);
        }
        self.active_target = next.clone();
        self.record(StoreChange::ActiveTargetChanged {
            previous,
            current: next,
        });
    }

    fn reresolve(&mut self) {
        if !self.session.is_dragging() {
            return;
        }
        let Some(position) = self.drag_position else {
            return;
        };
        let resolved = self.detector.resolve(position.x, position.y, &self.registry);
        self.apply_active(resolved);
    }

    fn record(&mut self, change: StoreChange) {
        if self.changes.len() == MAX_PENDING_CHANGES {
            self.changes.pop_front();
        }
        self.changes.push_back(change);
        self.touched = true;
    }

    fn seal(&mut self) {
        if self.touched {
            self.touched = false;
            self.revision = self.revision.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::BspDetector;

    fn t1() -> DropTargetDescriptor {
        DropTargetDescriptor::new("T1", Rect::new(0.0, 0.0, 100.0, 100.0)).accept("card")
    }

    fn t2() -> DropTargetDescriptor {
        DropTargetDescriptor::new("T2", Rect::new(200.0, 0.0, 100.0, 100.0)).accept("token")
    }

    fn pointer() -> DragOrigin {
        DragOrigin::Pointer { preview: None }
    }

    fn card() -> DragItem {
        DragItem::new("c1", "card")
    }

    fn over_count(store: &DragStore) -> usize {
        store.targets().filter(|t| t.is_over()).count()
    }

    fn active(store: &DragStore) -> Option<&str> {
        store.active_drop_target_id().map(TargetId::as_str)
    }

    #[test]
    fn forcing_a_target_while_idle_is_ignored() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.register_drop_target(t2());
        store.set_active_drop_target(Some(&TargetId::new("T1")));
        assert_eq!(active(&store), None);

        store.start_drag(card(), Rect::new(0.0, 0.0, 10.0, 10.0), pointer());
        store.update_drag_position(50.0, 50.0);
        store.end_drag();
        let revision = store.revision();
        store.set_active_drop_target(Some(&TargetId::new("T2")));
        assert_eq!(store.revision(), revision);
        assert_eq!(active(&store), Some("T1"));

        // The deferred clear still runs.
        assert!(store.flush_deferred());
        assert_eq!(active(&store), None);
    }

    #[test]
    fn card_scenario_resolves_only_accepting_target() {
        for kind in [HitStrategyKind::Bounds, HitStrategyKind::SpatialPartition] {
            let mut store = DragStore::with_strategy(kind);
            store.register_drop_target(t1());
            store.register_drop_target(t2());
            store.start_drag(card(), Rect::new(0.0, 0.0, 10.0, 10.0), pointer());

            store.update_drag_position(50.0, 50.0);
            assert_eq!(active(&store), Some("T1"), "{kind:?}");
            store.update_drag_position(250.0, 50.0);
            assert_eq!(active(&store), None, "{kind:?}");
            assert_eq!(over_count(&store), 0);
        }
    }

    #[test]
    fn update_without_drag_is_noop() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        let revision = store.revision();
        assert!(!store.update_drag_position(50.0, 50.0));
        assert_eq!(store.revision(), revision);
        assert_eq!(active(&store), None);
    }

    #[test]
    fn redundant_update_skips_write() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::new(0.0, 0.0, 10.0, 10.0), pointer());
        assert!(store.update_drag_position(50.0, 50.0));
        let revision = store.revision();
        assert!(!store.update_drag_position(50.0, 50.0));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn position_keeps_drag_dimensions() {
        let mut store = DragStore::new();
        store.start_drag(card(), Rect::new(0.0, 0.0, 40.0, 30.0), pointer());
        store.update_drag_position(5.0, 6.0);
        assert_eq!(store.drag_position(), Some(Rect::new(5.0, 6.0, 40.0, 30.0)));
    }

    #[test]
    fn is_over_moves_between_targets() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.register_drop_target(
            DropTargetDescriptor::new("T3", Rect::new(100.0, 0.0, 100.0, 100.0)).accept("card"),
        );
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(10.0, 10.0);
        assert!(store.target(&"T1".into()).is_some_and(DropTargetState::is_over));
        store.update_drag_position(150.0, 10.0);
        assert!(!store.target(&"T1".into()).is_some_and(DropTargetState::is_over));
        assert!(store.target(&"T3".into()).is_some_and(DropTargetState::is_over));
        assert_eq!(over_count(&store), 1);
    }

    #[test]
    fn end_drag_defers_active_clear() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);

        let end = store.end_drag().expect("drag was active");
        assert_eq!(end.target, Some(TargetId::from("T1")));
        assert_eq!(end.mode, DragMode::Pointer);
        assert!(!store.is_dragging());
        assert!(store.drag_item().is_none());
        assert!(store.drag_position().is_none());
        assert!(store.targets().all(|t| !t.can_drop() && !t.is_over()));
        // Still readable until the next tick.
        assert_eq!(active(&store), Some("T1"));

        assert!(store.flush_deferred());
        assert_eq!(active(&store), None);
        assert!(!store.flush_deferred());
    }

    #[test]
    fn end_drag_without_drag_is_noop() {
        let mut store = DragStore::new();
        assert!(store.end_drag().is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn start_drag_overwrites_previous_session() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.register_drop_target(t2());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);

        store.start_drag(DragItem::new("tok", "token"), Rect::default(), DragOrigin::Keyboard);
        assert_eq!(store.session(), Session::Dragging(DragMode::Keyboard));
        assert_eq!(active(&store), None);
        assert_eq!(over_count(&store), 0);
        assert!(!store.target(&"T1".into()).is_some_and(DropTargetState::can_drop));
        assert!(store.target(&"T2".into()).is_some_and(DropTargetState::can_drop));
        assert_eq!(store.preview(), None);
    }

    #[test]
    fn start_drag_cancels_pending_teardown() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);
        store.end_drag();
        store.start_drag(card(), Rect::default(), pointer());
        assert_eq!(active(&store), None);
        assert!(!store.flush_deferred());
    }

    #[test]
    fn unregister_active_target_clears_activity() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);
        store.unregister_drop_target(&"T1".into());
        assert_eq!(active(&store), None);
        assert_eq!(store.registry().len(), 0);
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        let revision = store.revision();
        store.unregister_drop_target(&"nope".into());
        store.update_drop_target(&"nope".into(), Rect::default());
        store.set_active_drop_target(Some(&"nope".into()));
        store.clear_pending_focus(&"zone".into());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn registering_mid_drag_computes_can_drop() {
        let mut store = DragStore::new();
        store.start_drag(card(), Rect::default(), pointer());
        store.register_drop_target(t1());
        store.register_drop_target(t2());
        assert!(store.target(&"T1".into()).is_some_and(DropTargetState::can_drop));
        assert!(!store.target(&"T2".into()).is_some_and(DropTargetState::can_drop));
    }

    #[test]
    fn moved_target_releases_is_over() {
        let mut store = DragStore::with_detector(Box::new(BspDetector::new()));
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);
        store.update_drop_target(&"T1".into(), Rect::new(500.0, 500.0, 100.0, 100.0));
        assert_eq!(active(&store), None);
        assert_eq!(over_count(&store), 0);
        store.update_drag_position(550.0, 550.0);
        assert_eq!(active(&store), Some("T1"));
    }

    #[test]
    fn set_active_overrides_hit_detection() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), DragOrigin::Keyboard);
        store.set_active_drop_target(Some(&"T1".into()));
        assert_eq!(active(&store), Some("T1"));
        assert_eq!(over_count(&store), 1);
        store.set_active_drop_target(None);
        assert_eq!(active(&store), None);
        assert_eq!(over_count(&store), 0);
    }

    #[test]
    fn focus_handoff_record() {
        let mut store = DragStore::new();
        store.request_focus("done".into(), Some("c1".into()));
        assert_eq!(
            store.pending_focus(),
            Some(&PendingFocus {
                zone_id: "done".into(),
                item_id: Some("c1".into()),
            })
        );
        store.clear_pending_focus(&"todo".into());
        assert!(store.pending_focus().is_some());
        store.clear_pending_focus(&"done".into());
        assert!(store.pending_focus().is_none());
    }

    #[test]
    fn changes_are_drained_in_order() {
        let mut store = DragStore::new();
        store.register_drop_target(t1());
        store.start_drag(card(), Rect::default(), pointer());
        store.update_drag_position(50.0, 50.0);
        let changes = store.drain_changes();
        assert_eq!(
            changes,
            vec![
                StoreChange::TargetRegistered("T1".into()),
                StoreChange::DragStarted {
                    item: "c1".into(),
                    mode: DragMode::Pointer,
                },
                StoreChange::PositionChanged { x: 50.0, y: 50.0 },
                StoreChange::ActiveTargetChanged {
                    previous: None,
                    current: Some("T1".into()),
                },
            ]
        );
        assert!(store.drain_changes().is_empty());
        assert_eq!(store.revision(), 3);
    }
}
