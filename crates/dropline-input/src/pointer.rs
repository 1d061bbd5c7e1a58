#![forbid(unsafe_code)]

//! Deterministic pointer drag controller.
//!
//! Bridges host pointer lifecycle signals into [`DragStore`] operations while
//! enforcing:
//! - one active pointer at a time, primary button only,
//! - a movement threshold before a press turns into a drag,
//! - one store position update per animation frame (latest wins), and
//! - cancellation on interruption paths (cancel, blur, lost capture).
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> PendingThreshold --move >= threshold--> Dragging
//!  ^                 |                                      |
//!  +------up---------+ (click passes through)               |
//!  +------up / cancel / blur / lost capture / detach -------+
//! ```
//!
//! Every entry point returns a [`PointerDispatch`] describing what happened,
//! including a typed reason when the signal was ignored.

use std::fmt;

use dropline_core::{
    DragEnd, DragItem, DragMode, DragOrigin, DragStore, ElementId, Point, Preview, Rect, Session,
};

use crate::autoscroll::{AutoScrollConfig, AutoScroller};
use crate::host::{FrameHandle, GlobalListener, ListenerHost, PointerHost};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Default drag threshold, in pixels of Euclidean pointer travel.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// Pointer controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PointerConfig {
    /// Distance the pointer must travel from the press before a drag starts.
    pub drag_threshold: f64,
    pub autoscroll: AutoScrollConfig,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            autoscroll: AutoScrollConfig::default(),
        }
    }
}

impl PointerConfig {
    /// Check every tunable is finite and non-negative.
    pub fn validate(&self) -> Result<(), PointerConfigError> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(self.drag_threshold) {
            return Err(PointerConfigError::InvalidThreshold {
                value: self.drag_threshold,
            });
        }
        if !non_negative(self.autoscroll.edge_zone) {
            return Err(PointerConfigError::InvalidEdgeZone {
                value: self.autoscroll.edge_zone,
            });
        }
        if !non_negative(self.autoscroll.max_speed) {
            return Err(PointerConfigError::InvalidScrollSpeed {
                value: self.autoscroll.max_speed,
            });
        }
        Ok(())
    }
}

/// Invalid pointer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerConfigError {
    InvalidThreshold { value: f64 },
    InvalidEdgeZone { value: f64 },
    InvalidScrollSpeed { value: f64 },
}

impl fmt::Display for PointerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold { value } => {
                write!(f, "drag threshold must be finite and >= 0 (got {value})")
            }
            Self::InvalidEdgeZone { value } => {
                write!(f, "auto-scroll edge zone must be finite and >= 0 (got {value})")
            }
            Self::InvalidScrollSpeed { value } => {
                write!(f, "auto-scroll speed must be finite and >= 0 (got {value})")
            }
        }
    }
}

impl std::error::Error for PointerConfigError {}

/// Pointer button reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Preview to build when the drag commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewRequest {
    #[default]
    None,
    /// Use a host-supplied node.
    Custom(ElementId),
    /// Clone the source, freezing its current dimensions.
    CloneSource,
}

/// A primary press on a draggable element.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDown {
    pub pointer_id: u32,
    pub button: PointerButton,
    pub position: Point,
    /// Element the press landed on; receives pointer capture.
    pub source: ElementId,
    /// Item the drag will carry if it commits.
    pub item: DragItem,
    pub preview: PreviewRequest,
}

/// Observable controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerPhase {
    #[default]
    Idle,
    PendingThreshold,
    Dragging,
}

/// Lifecycle signal recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerLifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    LostPointerCapture,
    Blur,
    Frame,
    ViewportChanged,
}

/// Deterministic reason why a signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerIgnoredReason {
    Detached,
    Disabled,
    ButtonNotAllowed,
    ButtonMismatch,
    KeyboardDragActive,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    UnknownFrame,
}

/// What one dispatch did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Press recorded; waiting for the threshold.
    Armed,
    /// Movement stayed under the threshold.
    BelowThreshold,
    /// Threshold crossed; the store is now dragging.
    DragStarted,
    /// Latest coordinates stored for the next frame. `coalesced` is true when
    /// a frame was already pending.
    PositionQueued { coalesced: bool },
    /// A frame pushed the latest coordinates into the store.
    PositionFlushed { changed: bool },
    /// An auto-scroll frame ran; `None` when nothing needed scrolling.
    AutoScrolled(Option<(f64, f64)>),
    /// Released after a drag; the following click is suppressed.
    Dropped,
    /// Released before the threshold; the click goes through.
    ClickReleased,
    Cancelled,
    Ignored(PointerIgnoredReason),
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDispatch {
    pub phase: PointerLifecyclePhase,
    pub pointer_id: Option<u32>,
    pub position: Option<Point>,
    pub outcome: PointerOutcome,
    /// Present when this dispatch ended a store drag.
    pub drag_end: Option<DragEnd>,
}

impl PointerDispatch {
    fn new(
        phase: PointerLifecyclePhase,
        pointer_id: Option<u32>,
        position: Option<Point>,
        outcome: PointerOutcome,
    ) -> Self {
        Self {
            phase,
            pointer_id,
            position,
            outcome,
            drag_end: None,
        }
    }

    fn ignored(
        phase: PointerLifecyclePhase,
        reason: PointerIgnoredReason,
        pointer_id: Option<u32>,
        position: Option<Point>,
    ) -> Self {
        #[cfg(feature = "tracing")]
        trace!(?phase, ?reason, ?pointer_id, "pointer signal ignored");
        Self::new(phase, pointer_id, position, PointerOutcome::Ignored(reason))
    }

    fn with_drag_end(mut self, drag_end: Option<DragEnd>) -> Self {
        self.drag_end = drag_end;
        self
    }

    /// Whether the signal was ignored.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, PointerOutcome::Ignored(_))
    }
}

#[derive(Debug, Clone)]
struct PendingPointer {
    pointer_id: u32,
    origin: Point,
    source: ElementId,
    item: DragItem,
    preview: PreviewRequest,
}

#[derive(Debug, Clone, Copy)]
struct ActivePointer {
    pointer_id: u32,
    source: ElementId,
    latest: Point,
}

#[derive(Debug, Clone, Default)]
enum PointerState {
    #[default]
    Idle,
    Pending(PendingPointer),
    Dragging(ActivePointer),
}

/// Pointer drag controller.
///
/// Owns no store and no host: both are borrowed per call. While attached and
/// enabled it holds the document-level listeners listed in
/// [`GlobalListener::ALL`]; [`Self::detach`] and disabling release them and
/// cancel every pending frame.
#[derive(Debug, Clone)]
pub struct PointerController {
    config: PointerConfig,
    state: PointerState,
    attached: bool,
    disabled: bool,
    position_frame: Option<FrameHandle>,
    scroller: AutoScroller,
    suppress_click: bool,
}

impl PointerController {
    /// Construct a controller with a validated configuration.
    pub fn new(config: PointerConfig) -> Result<Self, PointerConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: PointerState::Idle,
            attached: false,
            disabled: false,
            position_frame: None,
            scroller: AutoScroller::new(config.autoscroll),
            suppress_click: false,
        })
    }

    #[must_use]
    pub const fn config(&self) -> PointerConfig {
        self.config
    }

    #[must_use]
    pub fn phase(&self) -> PointerPhase {
        match self.state {
            PointerState::Idle => PointerPhase::Idle,
            PointerState::Pending(_) => PointerPhase::PendingThreshold,
            PointerState::Dragging(_) => PointerPhase::Dragging,
        }
    }

    /// Pointer currently tracked, pending or dragging.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        match &self.state {
            PointerState::Idle => None,
            PointerState::Pending(pending) => Some(pending.pointer_id),
            PointerState::Dragging(active) => Some(active.pointer_id),
        }
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether a frame is pending for either position flushing or auto-scroll.
    #[must_use]
    pub fn has_pending_frames(&self) -> bool {
        self.position_frame.is_some() || self.scroller.is_running()
    }

    // ---------------------------------------------------------------------
    // Listener discipline
    // ---------------------------------------------------------------------

    /// Acquire global listeners. Idempotent.
    pub fn attach<H: ListenerHost + ?Sized>(&mut self, host: &mut H) {
        if self.attached {
            return;
        }
        self.attached = true;
        if !self.disabled {
            add_listeners(host);
        }
    }

    /// Release listeners, cancel frames, and cancel any drag in progress.
    pub fn detach<H: PointerHost + ?Sized>(
        &mut self,
        store: &mut DragStore,
        host: &mut H,
    ) -> Option<DragEnd> {
        if !self.attached {
            return None;
        }
        let drag_end = self.abort(store, host, true);
        if !self.disabled {
            remove_listeners(host);
        }
        self.attached = false;
        drag_end
    }

    /// Toggle the disabled flag.
    ///
    /// Disabling an attached controller behaves like a detach that keeps the
    /// attachment, so re-enabling re-acquires the listeners.
    pub fn set_disabled<H: PointerHost + ?Sized>(
        &mut self,
        disabled: bool,
        store: &mut DragStore,
        host: &mut H,
    ) -> Option<DragEnd> {
        if self.disabled == disabled {
            return None;
        }
        self.disabled = disabled;
        if !self.attached {
            return None;
        }
        if disabled {
            let drag_end = self.abort(store, host, true);
            remove_listeners(host);
            drag_end
        } else {
            add_listeners(host);
            None
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle signals
    // ---------------------------------------------------------------------

    /// Handle a press on a draggable element. Never starts a drag by itself.
    pub fn pointer_down(&mut self, down: PointerDown, store: &DragStore) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerDown;
        let (id, position) = (Some(down.pointer_id), Some(down.position));
        let reason = if !self.attached {
            Some(PointerIgnoredReason::Detached)
        } else if self.disabled {
            Some(PointerIgnoredReason::Disabled)
        } else if down.button != PointerButton::Primary {
            Some(PointerIgnoredReason::ButtonNotAllowed)
        } else if !matches!(self.state, PointerState::Idle) {
            Some(PointerIgnoredReason::ActivePointerAlreadyInProgress)
        } else if store.session() == Session::Dragging(DragMode::Keyboard) {
            Some(PointerIgnoredReason::KeyboardDragActive)
        } else {
            None
        };
        if let Some(reason) = reason {
            return PointerDispatch::ignored(phase, reason, id, position);
        }

        self.state = PointerState::Pending(PendingPointer {
            pointer_id: down.pointer_id,
            origin: down.position,
            source: down.source,
            item: down.item,
            preview: down.preview,
        });
        PointerDispatch::new(phase, id, position, PointerOutcome::Armed)
    }

    /// Handle pointer movement.
    pub fn pointer_move<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        position: Point,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerMove;
        let (id, at) = (Some(pointer_id), Some(position));
        match std::mem::take(&mut self.state) {
            PointerState::Idle => {
                PointerDispatch::ignored(phase, PointerIgnoredReason::NoActivePointer, id, at)
            }
            PointerState::Pending(pending) if pending.pointer_id != pointer_id => {
                self.state = PointerState::Pending(pending);
                PointerDispatch::ignored(phase, PointerIgnoredReason::PointerMismatch, id, at)
            }
            PointerState::Pending(pending) => {
                if pending.origin.distance(position) < self.config.drag_threshold {
                    self.state = PointerState::Pending(pending);
                    return PointerDispatch::new(phase, id, at, PointerOutcome::BelowThreshold);
                }
                if store.session() == Session::Dragging(DragMode::Keyboard) {
                    return PointerDispatch::ignored(
                        phase,
                        PointerIgnoredReason::KeyboardDragActive,
                        id,
                        at,
                    );
                }
                self.commit(pending, position, store, host);
                PointerDispatch::new(phase, id, at, PointerOutcome::DragStarted)
            }
            PointerState::Dragging(mut active) => {
                if active.pointer_id != pointer_id {
                    self.state = PointerState::Dragging(active);
                    return PointerDispatch::ignored(
                        phase,
                        PointerIgnoredReason::PointerMismatch,
                        id,
                        at,
                    );
                }
                active.latest = position;
                self.state = PointerState::Dragging(active);
                let coalesced = self.schedule_position(host);
                PointerDispatch::new(phase, id, at, PointerOutcome::PositionQueued { coalesced })
            }
        }
    }

    /// Handle pointer release.
    pub fn pointer_up<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerUp;
        let (id, at) = (Some(pointer_id), Some(position));
        let Some(active_id) = self.active_pointer_id() else {
            return PointerDispatch::ignored(phase, PointerIgnoredReason::NoActivePointer, id, at);
        };
        if active_id != pointer_id {
            return PointerDispatch::ignored(phase, PointerIgnoredReason::PointerMismatch, id, at);
        }
        if button != PointerButton::Primary {
            return PointerDispatch::ignored(phase, PointerIgnoredReason::ButtonMismatch, id, at);
        }

        let PointerState::Dragging(active) = std::mem::take(&mut self.state) else {
            // Released before the threshold.
            return PointerDispatch::new(phase, id, at, PointerOutcome::ClickReleased);
        };
        self.cancel_frames(host);
        host.release(active.source, active.pointer_id);
        self.suppress_click = true;

        let drag_end = if store.session() == Session::Dragging(DragMode::Pointer) {
            store.update_drag_position(position.x, position.y);
            store.end_drag()
        } else {
            None
        };

        #[cfg(feature = "tracing")]
        debug!(
            pointer_id,
            target_id = ?drag_end.as_ref().and_then(|end| end.target.as_ref()),
            "pointer drag dropped"
        );

        PointerDispatch::new(phase, id, at, PointerOutcome::Dropped).with_drag_end(drag_end)
    }

    /// Handle `pointercancel`. `None` cancels whatever pointer is active.
    pub fn pointer_cancel<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: Option<u32>,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::PointerCancel, pointer_id, true, store, host)
    }

    /// Handle `lostpointercapture`; capture is already gone, so no release.
    pub fn lost_pointer_capture<H: PointerHost + ?Sized>(
        &mut self,
        pointer_id: u32,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        self.cancel_active(
            PointerLifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            false,
            store,
            host,
        )
    }

    /// Handle window blur.
    pub fn blur<H: PointerHost + ?Sized>(
        &mut self,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::Blur, None, true, store, host)
    }

    /// Handle a fired animation frame.
    pub fn on_frame<H: PointerHost + ?Sized>(
        &mut self,
        handle: FrameHandle,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::Frame;
        let active = match self.state {
            PointerState::Dragging(active) => Some(active),
            _ => None,
        };

        if self.position_frame == Some(handle) {
            self.position_frame = None;
            let Some(active) = active else {
                return PointerDispatch::ignored(
                    phase,
                    PointerIgnoredReason::NoActivePointer,
                    None,
                    None,
                );
            };
            let changed = store.update_drag_position(active.latest.x, active.latest.y);
            return PointerDispatch::new(
                phase,
                Some(active.pointer_id),
                Some(active.latest),
                PointerOutcome::PositionFlushed { changed },
            );
        }

        if self.scroller.owns(handle) {
            let Some(active) = active else {
                self.scroller.cancel(host);
                return PointerDispatch::ignored(
                    phase,
                    PointerIgnoredReason::NoActivePointer,
                    None,
                    None,
                );
            };
            let delta = self
                .scroller
                .step(handle, active.source, active.latest, host);
            return PointerDispatch::new(
                phase,
                Some(active.pointer_id),
                Some(active.latest),
                PointerOutcome::AutoScrolled(delta),
            );
        }

        PointerDispatch::ignored(phase, PointerIgnoredReason::UnknownFrame, None, None)
    }

    /// Handle a global resize or scroll: targets may have moved under the
    /// pointer, so hit detection is re-run on the next frame.
    pub fn viewport_changed<H: PointerHost + ?Sized>(&mut self, host: &mut H) -> PointerDispatch {
        let phase = PointerLifecyclePhase::ViewportChanged;
        let PointerState::Dragging(active) = self.state else {
            return PointerDispatch::ignored(phase, PointerIgnoredReason::NoActivePointer, None, None);
        };
        let coalesced = self.schedule_position(host);
        PointerDispatch::new(
            phase,
            Some(active.pointer_id),
            Some(active.latest),
            PointerOutcome::PositionQueued { coalesced },
        )
    }

    // ---------------------------------------------------------------------
    // Click suppression
    // ---------------------------------------------------------------------

    /// Whether the host should swallow a click arriving now.
    #[must_use]
    pub const fn suppresses_click(&self) -> bool {
        self.suppress_click
    }

    /// Consume the suppression for a synthetic click; returns whether the
    /// click must be swallowed.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.suppress_click)
    }

    /// The current event-loop turn is over; click suppression expires.
    pub fn end_turn(&mut self) {
        self.suppress_click = false;
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn commit<H: PointerHost + ?Sized>(
        &mut self,
        pending: PendingPointer,
        position: Point,
        store: &mut DragStore,
        host: &mut H,
    ) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "dnd.pointer_commit",
            pointer_id = pending.pointer_id,
            item = %pending.item.id(),
            travel = pending.origin.distance(position)
        )
        .entered();

        host.acquire(pending.source, pending.pointer_id);
        let source_bounds = host.bounds(pending.source);
        let preview = match pending.preview {
            PreviewRequest::None => None,
            PreviewRequest::Custom(element) => Some(Preview::Custom(element)),
            PreviewRequest::CloneSource => source_bounds.map(|bounds| Preview::Clone {
                source: pending.source,
                width: bounds.width,
                height: bounds.height,
            }),
        };
        let size = source_bounds.unwrap_or_default();
        store.start_drag(
            pending.item,
            Rect::new(position.x, position.y, size.width, size.height),
            DragOrigin::Pointer { preview },
        );

        self.state = PointerState::Dragging(ActivePointer {
            pointer_id: pending.pointer_id,
            source: pending.source,
            latest: position,
        });
        self.schedule_position(host);
        self.scroller.start(host);

        #[cfg(feature = "tracing")]
        debug!(preview = ?preview, "pointer drag committed");
    }

    fn cancel_active<H: PointerHost + ?Sized>(
        &mut self,
        phase: PointerLifecyclePhase,
        pointer_id: Option<u32>,
        release_capture: bool,
        store: &mut DragStore,
        host: &mut H,
    ) -> PointerDispatch {
        let Some(active_id) = self.active_pointer_id() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                pointer_id,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != active_id
        {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                pointer_id,
                None,
            );
        }

        #[cfg(feature = "tracing")]
        debug!(?phase, pointer_id = active_id, "pointer drag cancelled");

        let drag_end = self.abort(store, host, release_capture);
        PointerDispatch::new(phase, Some(active_id), None, PointerOutcome::Cancelled)
            .with_drag_end(drag_end)
    }

    /// Drop all pointer state. A committed drag is ended with no target.
    fn abort<H: PointerHost + ?Sized>(
        &mut self,
        store: &mut DragStore,
        host: &mut H,
        release_capture: bool,
    ) -> Option<DragEnd> {
        let state = std::mem::take(&mut self.state);
        self.cancel_frames(host);
        let PointerState::Dragging(active) = state else {
            return None;
        };
        if release_capture {
            host.release(active.source, active.pointer_id);
        }
        if store.session() != Session::Dragging(DragMode::Pointer) {
            return None;
        }
        store.set_active_drop_target(None);
        store.end_drag()
    }

    /// Request a position frame unless one is pending. Returns `true` when
    /// the update was coalesced into an existing frame.
    fn schedule_position<H: PointerHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.position_frame.is_some() {
            return true;
        }
        self.position_frame = Some(host.request_frame());
        false
    }

    fn cancel_frames<H: PointerHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(frame) = self.position_frame.take() {
            host.cancel_frame(frame);
        }
        self.scroller.cancel(host);
    }
}

fn add_listeners<H: ListenerHost + ?Sized>(host: &mut H) {
    for listener in GlobalListener::ALL {
        host.add_listener(listener);
    }
}

fn remove_listeners<H: ListenerHost + ?Sized>(host: &mut H) {
    for listener in GlobalListener::ALL {
        host.remove_listener(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CaptureCall, RecordingHost, ScrollContainer};
    use dropline_core::{DropTargetDescriptor, TargetId};

    const SOURCE: ElementId = ElementId(1);

    fn setup() -> (PointerController, DragStore, RecordingHost) {
        let mut controller = PointerController::new(PointerConfig::default()).expect("valid");
        let mut store = DragStore::new();
        store.register_drop_target(
            DropTargetDescriptor::new("T1", Rect::new(0.0, 0.0, 100.0, 100.0)).accept("card"),
        );
        let mut host = RecordingHost::new();
        host.bounds.insert(SOURCE, Rect::new(10.0, 10.0, 40.0, 20.0));
        controller.attach(&mut host);
        (controller, store, host)
    }

    fn down(pointer_id: u32, x: f64, y: f64) -> PointerDown {
        PointerDown {
            pointer_id,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            source: SOURCE,
            item: DragItem::new("c1", "card"),
            preview: PreviewRequest::CloneSource,
        }
    }

    fn fire_frames(
        controller: &mut PointerController,
        store: &mut DragStore,
        host: &mut RecordingHost,
    ) -> Vec<PointerDispatch> {
        host.take_frames()
            .into_iter()
            .map(|frame| controller.on_frame(frame, store, host))
            .collect()
    }

    #[test]
    fn rejects_invalid_config() {
        let err = PointerController::new(PointerConfig {
            drag_threshold: f64::NAN,
            ..PointerConfig::default()
        })
        .expect_err("NaN threshold");
        assert!(matches!(err, PointerConfigError::InvalidThreshold { .. }));
        assert!(err.to_string().contains("drag threshold"));

        let err = PointerConfig {
            autoscroll: AutoScrollConfig {
                max_speed: -1.0,
                ..AutoScrollConfig::default()
            },
            ..PointerConfig::default()
        }
        .validate()
        .expect_err("negative speed");
        assert_eq!(err, PointerConfigError::InvalidScrollSpeed { value: -1.0 });
    }

    #[test]
    fn attach_and_detach_manage_listeners() {
        let (mut controller, mut store, mut host) = setup();
        assert_eq!(host.listeners.len(), GlobalListener::ALL.len());
        controller.attach(&mut host);
        assert_eq!(host.listeners.len(), GlobalListener::ALL.len());
        controller.detach(&mut store, &mut host);
        assert!(host.listeners.is_empty());
        assert!(!controller.is_attached());
    }

    #[test]
    fn blur_listener_follows_attachment() {
        let (mut controller, mut store, mut host) = setup();
        assert!(host.listeners.contains(&GlobalListener::Blur));
        controller.detach(&mut store, &mut host);
        assert!(!host.listeners.contains(&GlobalListener::Blur));
        controller.attach(&mut host);
        assert!(host.listeners.contains(&GlobalListener::Blur));
    }

    #[test]
    fn press_alone_does_not_start_drag() {
        let (mut controller, mut store, mut host) = setup();
        let dispatch = controller.pointer_down(down(1, 20.0, 20.0), &store);
        assert_eq!(dispatch.outcome, PointerOutcome::Armed);
        assert_eq!(controller.phase(), PointerPhase::PendingThreshold);
        assert!(!store.is_dragging());

        let dispatch = controller.pointer_move(1, Point::new(23.0, 23.0), &mut store, &mut host);
        assert_eq!(dispatch.outcome, PointerOutcome::BelowThreshold);
        assert!(!store.is_dragging());
        assert!(host.captured.is_empty());
    }

    #[test]
    fn travel_equal_to_threshold_starts_drag() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 0.0, 0.0), &store);
        let dispatch = controller.pointer_move(1, Point::new(2.9, 4.0), &mut store, &mut host);
        assert_eq!(dispatch.outcome, PointerOutcome::BelowThreshold);

        // 3-4-5: exactly DEFAULT_DRAG_THRESHOLD away from the press.
        let dispatch = controller.pointer_move(1, Point::new(3.0, 4.0), &mut store, &mut host);
        assert_eq!(dispatch.outcome, PointerOutcome::DragStarted);
        assert!(store.is_dragging());
    }

    #[test]
    fn release_before_threshold_lets_click_through() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 20.0, 20.0), &store);
        let dispatch = controller.pointer_up(
            1,
            PointerButton::Primary,
            Point::new(21.0, 20.0),
            &mut store,
            &mut host,
        );
        assert_eq!(dispatch.outcome, PointerOutcome::ClickReleased);
        assert_eq!(controller.phase(), PointerPhase::Idle);
        assert!(!controller.take_click());
    }

    #[test]
    fn threshold_commit_captures_and_builds_clone_preview() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(7, 20.0, 20.0), &store);
        let dispatch = controller.pointer_move(7, Point::new(23.0, 24.0), &mut store, &mut host);
        assert_eq!(dispatch.outcome, PointerOutcome::DragStarted);
        assert_eq!(store.session(), Session::Dragging(DragMode::Pointer));
        assert_eq!(
            host.capture_log,
            vec![CaptureCall::Acquire {
                element: SOURCE,
                pointer_id: 7
            }]
        );
        assert_eq!(
            store.preview(),
            Some(Preview::Clone {
                source: SOURCE,
                width: 40.0,
                height: 20.0
            })
        );
        // Position flush plus the auto-scroll cycle.
        assert_eq!(host.pending_frames().len(), 2);
    }

    #[test]
    fn moves_are_coalesced_per_frame() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 200.0, 200.0), &store);
        controller.pointer_move(1, Point::new(210.0, 200.0), &mut store, &mut host);
        fire_frames(&mut controller, &mut store, &mut host);

        let first = controller.pointer_move(1, Point::new(60.0, 60.0), &mut store, &mut host);
        let second = controller.pointer_move(1, Point::new(50.0, 50.0), &mut store, &mut host);
        assert_eq!(first.outcome, PointerOutcome::PositionQueued { coalesced: false });
        assert_eq!(second.outcome, PointerOutcome::PositionQueued { coalesced: true });
        // Nothing reaches the store until the frame fires.
        assert_eq!(store.drag_position().map(|p| p.x), Some(210.0));

        let flushed = fire_frames(&mut controller, &mut store, &mut host);
        assert!(flushed.iter().any(|d| d.outcome == PointerOutcome::PositionFlushed { changed: true }));
        assert_eq!(store.drag_position().map(|p| (p.x, p.y)), Some((50.0, 50.0)));
        assert_eq!(store.active_drop_target_id(), Some(&TargetId::from("T1")));
    }

    #[test]
    fn release_after_drag_drops_and_suppresses_click() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 200.0, 200.0), &store);
        controller.pointer_move(1, Point::new(150.0, 150.0), &mut store, &mut host);
        controller.pointer_move(1, Point::new(40.0, 40.0), &mut store, &mut host);

        let dispatch = controller.pointer_up(
            1,
            PointerButton::Primary,
            Point::new(40.0, 40.0),
            &mut store,
            &mut host,
        );
        assert_eq!(dispatch.outcome, PointerOutcome::Dropped);
        let end = dispatch.drag_end.expect("drag ended");
        assert_eq!(end.target, Some(TargetId::from("T1")));
        assert!(!store.is_dragging());
        assert!(host.captured.is_empty());
        assert!(host.pending_frames().is_empty());

        assert!(controller.suppresses_click());
        controller.end_turn();
        assert!(!controller.take_click());
    }

    #[test]
    fn click_suppression_is_consumed_once() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 200.0, 200.0), &store);
        controller.pointer_move(1, Point::new(150.0, 150.0), &mut store, &mut host);
        controller.pointer_up(1, PointerButton::Primary, Point::new(150.0, 150.0), &mut store, &mut host);
        assert!(controller.take_click());
        assert!(!controller.take_click());
    }

    #[test]
    fn cancel_paths_end_drag_without_target() {
        type Cancel = fn(&mut PointerController, &mut DragStore, &mut RecordingHost) -> PointerDispatch;
        let paths: [(Cancel, bool); 3] = [
            (|c, s, h| c.pointer_cancel(Some(1), s, h), true),
            (|c, s, h| c.lost_pointer_capture(1, s, h), false),
            (|c, s, h| c.blur(s, h), true),
        ];
        for (cancel, releases) in paths {
            let (mut controller, mut store, mut host) = setup();
            controller.pointer_down(down(1, 200.0, 200.0), &store);
            controller.pointer_move(1, Point::new(50.0, 50.0), &mut store, &mut host);
            fire_frames(&mut controller, &mut store, &mut host);
            assert!(store.active_drop_target_id().is_some());

            let dispatch = cancel(&mut controller, &mut store, &mut host);
            assert_eq!(dispatch.outcome, PointerOutcome::Cancelled);
            assert_eq!(dispatch.drag_end.and_then(|end| end.target), None);
            assert!(!store.is_dragging());
            assert_eq!(store.active_drop_target_id(), None);
            assert_eq!(host.captured.is_empty(), releases);
            assert!(host.pending_frames().is_empty());
            assert!(!controller.suppresses_click());
        }
    }

    #[test]
    fn ignores_secondary_button_and_foreign_pointers() {
        let (mut controller, mut store, mut host) = setup();
        let mut secondary = down(1, 0.0, 0.0);
        secondary.button = PointerButton::Secondary;
        assert_eq!(
            controller.pointer_down(secondary, &store).outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::ButtonNotAllowed)
        );

        controller.pointer_down(down(1, 0.0, 0.0), &store);
        assert_eq!(
            controller.pointer_down(down(2, 0.0, 0.0), &store).outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::ActivePointerAlreadyInProgress)
        );
        assert_eq!(
            controller
                .pointer_move(2, Point::new(50.0, 50.0), &mut store, &mut host)
                .outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
        assert_eq!(
            controller.pointer_cancel(Some(2), &mut store, &mut host).outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
    }

    #[test]
    fn keyboard_drag_blocks_pointer() {
        let (mut controller, mut store, _host) = setup();
        store.start_drag(DragItem::new("k", "card"), Rect::default(), DragOrigin::Keyboard);
        assert_eq!(
            controller.pointer_down(down(1, 0.0, 0.0), &store).outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::KeyboardDragActive)
        );
    }

    #[test]
    fn disabling_mid_drag_cancels_and_releases_listeners() {
        let (mut controller, mut store, mut host) = setup();
        controller.pointer_down(down(1, 200.0, 200.0), &store);
        controller.pointer_move(1, Point::new(150.0, 150.0), &mut store, &mut host);

        let end = controller.set_disabled(true, &mut store, &mut host);
        assert!(end.is_some());
        assert!(host.listeners.is_empty());
        assert!(host.pending_frames().is_empty());
        assert_eq!(
            controller.pointer_down(down(1, 0.0, 0.0), &store).outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::Disabled)
        );

        controller.set_disabled(false, &mut store, &mut host);
        assert_eq!(host.listeners.len(), GlobalListener::ALL.len());
    }

    #[test]
    fn auto_scroll_runs_while_dragging() {
        let (mut controller, mut store, mut host) = setup();
        host.scroll_containers.insert(
            SOURCE,
            ScrollContainer {
                element: ElementId(50),
                viewport: Rect::new(0.0, 0.0, 300.0, 300.0),
            },
        );
        controller.pointer_down(down(1, 150.0, 150.0), &store);
        controller.pointer_move(1, Point::new(150.0, 290.0), &mut store, &mut host);

        let dispatches = fire_frames(&mut controller, &mut store, &mut host);
        assert!(dispatches
            .iter()
            .any(|d| d.outcome == PointerOutcome::AutoScrolled(Some((0.0, 15.0)))));
        assert_eq!(host.scrolled, vec![(ElementId(50), 0.0, 15.0)]);
        // The scroll cycle re-armed itself.
        assert_eq!(host.pending_frames().len(), 1);
    }

    #[test]
    fn viewport_change_requeues_hit_detection() {
        let (mut controller, mut store, mut host) = setup();
        assert!(controller.viewport_changed(&mut host).is_ignored());
        controller.pointer_down(down(1, 200.0, 200.0), &store);
        controller.pointer_move(1, Point::new(150.0, 150.0), &mut store, &mut host);
        fire_frames(&mut controller, &mut store, &mut host);
        let dispatch = controller.viewport_changed(&mut host);
        assert_eq!(dispatch.outcome, PointerOutcome::PositionQueued { coalesced: false });
    }

    #[test]
    fn unknown_frames_are_ignored() {
        let (mut controller, mut store, mut host) = setup();
        assert_eq!(
            controller
                .on_frame(FrameHandle(999), &mut store, &mut host)
                .outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::UnknownFrame)
        );
    }
}
