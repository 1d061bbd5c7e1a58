#![forbid(unsafe_code)]

//! The session provider.
//!
//! [`DndSession`] is the one object a host keeps per drag-and-drop scope. It
//! owns the store and both controllers, routes host events to the right one,
//! and turns what happened into live-region text.
//!
//! # Event loop contract
//!
//! ```text
//! host event  -> pointer_* / key_down / on_frame / observe
//! end of turn -> end_turn()    (flushes the deferred active-target clear)
//! timer       -> tick(now)     (expires live-region text)
//! render      -> drain_changes() + drain_live_region_updates()
//! unmount     -> shutdown(host)
//! ```
//!
//! # Invariants
//!
//! 1. At most one modality owns a drag; the other controller refuses to start.
//! 2. The live region is created on the first announcement and removed once,
//!    on shutdown.
//! 3. After shutdown every input is ignored and no listener is held.

use dropline_a11y::{Announcer, LiveRegionUpdate};
use dropline_core::{
    DragEnd, DragStore, DropTargetDescriptor, ElementId, HitDetector, ItemId, Point, Rect,
    StoreChange, TargetId, ZoneId,
};
use dropline_input::{
    Announcements, BoundsProvider, BoundsTracker, FocusedDraggable, FrameHandle, KeyEvent,
    KeyboardController, KeyboardOutcome, ListenerHost, Observation, PointerButton,
    PointerController, PointerDispatch, PointerDown, PointerHost, PointerOutcome,
};
use web_time::Instant;

use crate::config::DndConfig;
use crate::error::Error;

#[cfg(feature = "tracing")]
use tracing::debug;

/// One drag-and-drop scope: store, controllers, and live region.
#[derive(Debug)]
pub struct DndSession {
    config: DndConfig,
    store: DragStore,
    pointer: PointerController,
    keyboard: KeyboardController,
    announcer: Option<Announcer>,
    bounds: BoundsTracker,
    closed: bool,
}

impl DndSession {
    /// Build a session from a validated configuration.
    pub fn new(config: DndConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            store: DragStore::with_strategy(config.hit_strategy),
            pointer: PointerController::new(config.pointer)?,
            keyboard: KeyboardController::new(config.keyboard)?,
            announcer: None,
            bounds: BoundsTracker::new(),
            closed: false,
        })
    }

    /// Replace the announcement texts for both modalities.
    #[must_use]
    pub fn with_announcements(mut self, formatter: Box<dyn Announcements>) -> Self {
        self.keyboard = self.keyboard.with_announcements(formatter);
        self
    }

    /// Use a host-provided hit detector, e.g. a paint-order one.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn HitDetector>) -> Self {
        self.store.set_detector(detector);
        self
    }

    #[must_use]
    pub fn config(&self) -> &DndConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &DragStore {
        &self.store
    }

    /// Direct store access for drop handlers and custom integrations.
    pub fn store_mut(&mut self) -> &mut DragStore {
        &mut self.store
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerController {
        &self.pointer
    }

    #[must_use]
    pub fn keyboard(&self) -> &KeyboardController {
        &self.keyboard
    }

    /// The live region, once something has been announced.
    #[must_use]
    pub fn announcer(&self) -> Option<&Announcer> {
        self.announcer.as_ref()
    }

    #[must_use]
    pub fn bounds_tracker(&self) -> &BoundsTracker {
        &self.bounds
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ---------------------------------------------------------------------
    // Targets and focus
    // ---------------------------------------------------------------------

    /// Register a target, optionally tied to a host element whose layout
    /// changes should refresh its bounds.
    pub fn register_drop_target(
        &mut self,
        descriptor: DropTargetDescriptor,
        element: Option<ElementId>,
    ) {
        if self.closed {
            return;
        }
        match element {
            Some(element) => self.bounds.track(descriptor.id.clone(), element),
            None => {
                self.bounds.untrack(&descriptor.id);
            }
        }
        self.store.register_drop_target(descriptor);
    }

    pub fn unregister_drop_target(&mut self, id: &TargetId) {
        self.bounds.untrack(id);
        self.store.unregister_drop_target(id);
    }

    pub fn update_drop_target(&mut self, id: &TargetId, bounds: Rect) {
        self.store.update_drop_target(id, bounds);
    }

    /// Feed a layout observation; returns how many targets moved.
    pub fn observe<B: BoundsProvider + ?Sized>(
        &mut self,
        observation: Observation,
        provider: &B,
    ) -> usize {
        if self.closed {
            return 0;
        }
        self.bounds.observe(observation, provider, &mut self.store)
    }

    /// Ask `zone` to focus `item` (or its first item) once it re-renders.
    pub fn request_focus(&mut self, zone: ZoneId, item: Option<ItemId>) {
        self.store.request_focus(zone, item);
    }

    // ---------------------------------------------------------------------
    // Pointer routing
    // ---------------------------------------------------------------------

    /// Acquire the pointer controller's global listeners.
    pub fn attach<H: ListenerHost + ?Sized>(&mut self, host: &mut H) {
        if !self.closed {
            self.pointer.attach(host);
        }
    }

    pub fn pointer_down(&mut self, down: PointerDown) -> PointerDispatch {
        self.pointer.pointer_down(down, &self.store)
    }

    pub fn pointer_move<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        position: Point,
        host: &mut H,
        now: Instant,
    ) -> PointerDispatch {
        let dispatch = self
            .pointer
            .pointer_move(pointer_id, position, &mut self.store, host);
        self.announce_pointer(&dispatch, now);
        dispatch
    }

    pub fn pointer_up<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        host: &mut H,
        now: Instant,
    ) -> PointerDispatch {
        let dispatch = self
            .pointer
            .pointer_up(pointer_id, button, position, &mut self.store, host);
        self.announce_pointer(&dispatch, now);
        dispatch
    }

    pub fn pointer_cancel<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: Option<u32>,
        host: &mut H,
        now: Instant,
    ) -> PointerDispatch {
        let dispatch = self.pointer.pointer_cancel(pointer_id, &mut self.store, host);
        self.announce_pointer(&dispatch, now);
        dispatch
    }

    pub fn lost_pointer_capture<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        host: &mut H,
        now: Instant,
    ) -> PointerDispatch {
        let dispatch = self
            .pointer
            .lost_pointer_capture(pointer_id, &mut self.store, host);
        self.announce_pointer(&dispatch, now);
        dispatch
    }

    pub fn on_frame<H: PointerHost + ?Sized>(
        &mut self,
        handle: FrameHandle,
        host: &mut H,
    ) -> PointerDispatch {
        self.pointer.on_frame(handle, &mut self.store, host)
    }

    /// A global resize or scroll happened.
    pub fn viewport_changed<H: PointerHost + ?Sized>(&mut self, host: &mut H) -> PointerDispatch {
        self.pointer.viewport_changed(host)
    }

    /// Whether a click arriving now must be swallowed.
    pub fn take_click(&mut self) -> bool {
        self.pointer.take_click()
    }

    /// Enable or disable pointer drags; disabling cancels one in progress.
    pub fn set_pointer_disabled<H: PointerHost + ?Sized>(
        &mut self,
        disabled: bool,
        host: &mut H,
        now: Instant,
    ) -> Option<DragEnd> {
        let end = self.pointer.set_disabled(disabled, &mut self.store, host);
        if let Some(end) = &end {
            let text = self.keyboard.formatter().cancelled(&end.item);
            self.announce(&text, now);
        }
        end
    }

    // ---------------------------------------------------------------------
    // Keyboard routing
    // ---------------------------------------------------------------------

    /// Route a key press. `focused` is the draggable that has DOM focus.
    pub fn key_down(
        &mut self,
        event: KeyEvent,
        focused: Option<&FocusedDraggable>,
        now: Instant,
    ) -> KeyboardOutcome {
        if self.closed {
            return KeyboardOutcome::Ignored;
        }
        let outcome = self.keyboard.handle_key(event, focused, &mut self.store);
        for text in self.keyboard.drain_announcements() {
            self.announce(&text, now);
        }
        outcome
    }

    /// Window lost focus: cancel whichever drag is active.
    pub fn blur<H: PointerHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> Option<DragEnd> {
        let dispatch = self.pointer.blur(&mut self.store, host);
        self.announce_pointer(&dispatch, now);
        let keyboard_end = self.keyboard.cancel(&mut self.store);
        for text in self.keyboard.drain_announcements() {
            self.announce(&text, now);
        }
        dispatch.drag_end.or(keyboard_end)
    }

    // ---------------------------------------------------------------------
    // Event loop
    // ---------------------------------------------------------------------

    /// Apply the deferred part of `end_drag`. Returns whether anything changed.
    pub fn flush_deferred(&mut self) -> bool {
        self.store.flush_deferred()
    }

    /// The current host turn is over: flush deferred store work and expire
    /// click suppression.
    pub fn end_turn(&mut self) -> bool {
        self.pointer.end_turn();
        self.store.flush_deferred()
    }

    /// Expire live-region text. Returns whether the region was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.announcer
            .as_mut()
            .is_some_and(|announcer| announcer.tick(now))
    }

    pub fn drain_changes(&mut self) -> Vec<StoreChange> {
        self.store.drain_changes()
    }

    pub fn drain_live_region_updates(&mut self) -> Vec<LiveRegionUpdate> {
        self.announcer
            .as_mut()
            .map(Announcer::drain_updates)
            .unwrap_or_default()
    }

    /// Tear the scope down: release listeners and frames, cancel any drag,
    /// and unmount the live region. Idempotent.
    pub fn shutdown<H: PointerHost + ?Sized>(&mut self, host: &mut H) -> Option<DragEnd> {
        if self.closed {
            return None;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("dnd.shutdown", dragging = self.store.is_dragging()).entered();

        let pointer_end = self.pointer.detach(&mut self.store, host);
        let keyboard_end = self.keyboard.cancel(&mut self.store);
        self.keyboard.drain_announcements();
        self.store.flush_deferred();
        if let Some(announcer) = self.announcer.as_mut() {
            announcer.teardown();
        }
        self.closed = true;

        #[cfg(feature = "tracing")]
        debug!(
            cancelled = pointer_end.is_some() || keyboard_end.is_some(),
            "session shut down"
        );

        pointer_end.or(keyboard_end)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn announce_pointer(&mut self, dispatch: &PointerDispatch, now: Instant) {
        let formatter = self.keyboard.formatter();
        let text = match (&dispatch.outcome, &dispatch.drag_end) {
            (PointerOutcome::Dropped, Some(end)) => {
                let name = end
                    .target
                    .as_ref()
                    .and_then(|id| self.store.target(id))
                    .map(|state| state.descriptor().display_name());
                Some(formatter.dropped(&end.item, name))
            }
            (PointerOutcome::Cancelled, Some(end)) => Some(formatter.cancelled(&end.item)),
            _ => None,
        };
        if let Some(text) = text {
            self.announce(&text, now);
        }
    }

    fn announce(&mut self, text: &str, now: Instant) {
        if self.closed {
            return;
        }
        if self.announcer.is_none() {
            // The config was validated in `new`.
            self.announcer = Announcer::new(self.config.announcer).ok();
            #[cfg(feature = "tracing")]
            debug!("live region created");
        }
        if let Some(announcer) = self.announcer.as_mut() {
            announcer.announce(text, now);
        }
    }
}
