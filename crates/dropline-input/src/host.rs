#![forbid(unsafe_code)]

//! Host collaborators injected into the controllers.
//!
//! Each trait is a narrow slice of what a DOM-like host can do. Controllers
//! never hold on to a host; every entry point that needs one borrows it for
//! the duration of the call.

use dropline_core::{ElementId, Rect};

/// Current layout bounds of host elements.
pub trait BoundsProvider {
    /// Bounds of `element` in the shared coordinate space, or `None` if the
    /// element is gone.
    fn bounds(&self, element: ElementId) -> Option<Rect>;
}

/// Exclusive pointer capture on an element.
pub trait PointerCaptureHandle {
    fn acquire(&mut self, element: ElementId, pointer_id: u32);
    fn release(&mut self, element: ElementId, pointer_id: u32);
}

/// Opaque token for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Animation-frame scheduling.
///
/// When a requested frame fires, the host calls the owning controller's
/// `on_frame` with the handle it was given.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scrollable element and its visible viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainer {
    pub element: ElementId,
    pub viewport: Rect,
}

/// Scrolling of ancestor containers.
pub trait ScrollHost {
    /// Nearest scrollable ancestor of `element`, if any.
    fn scrollable_ancestor(&self, element: ElementId) -> Option<ScrollContainer>;
    fn scroll_by(&mut self, container: ElementId, dx: f64, dy: f64);
}

/// Document-level listeners a pointer drag needs while attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalListener {
    PointerMove,
    PointerUp,
    PointerCancel,
    Resize,
    Scroll,
    /// Window blur; the host forwards it to the controller's `blur`.
    Blur,
}

impl GlobalListener {
    pub const ALL: [Self; 6] = [
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerCancel,
        Self::Resize,
        Self::Scroll,
        Self::Blur,
    ];
}

/// Registration of document-level listeners.
pub trait ListenerHost {
    fn add_listener(&mut self, listener: GlobalListener);
    fn remove_listener(&mut self, listener: GlobalListener);
}

/// Everything the pointer controller needs from its host.
pub trait PointerHost:
    BoundsProvider + PointerCaptureHandle + FrameScheduler + ScrollHost + ListenerHost
{
}

impl<T> PointerHost for T where
    T: BoundsProvider + PointerCaptureHandle + FrameScheduler + ScrollHost + ListenerHost
{
}

/// Recording host for tests and headless drivers.
///
/// Frames are handed out from a counter and recorded until cancelled or
/// taken with [`RecordingHost::take_frames`]; bounds and scroll containers are
/// looked up from plain maps.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub bounds: std::collections::BTreeMap<ElementId, Rect>,
    pub scroll_containers: std::collections::BTreeMap<ElementId, ScrollContainer>,
    pub captured: Vec<(ElementId, u32)>,
    pub listeners: std::collections::BTreeSet<GlobalListener>,
    pub scrolled: Vec<(ElementId, f64, f64)>,
    pub capture_log: Vec<CaptureCall>,
    pending_frames: Vec<FrameHandle>,
    next_frame: u64,
}

/// One recorded capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCall {
    Acquire { element: ElementId, pointer_id: u32 },
    Release { element: ElementId, pointer_id: u32 },
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not yet cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> &[FrameHandle] {
        &self.pending_frames
    }

    /// Take every pending frame, as the host would when they fire.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending_frames)
    }
}

impl BoundsProvider for RecordingHost {
    fn bounds(&self, element: ElementId) -> Option<Rect> {
        self.bounds.get(&element).copied()
    }
}

impl PointerCaptureHandle for RecordingHost {
    fn acquire(&mut self, element: ElementId, pointer_id: u32) {
        self.captured.push((element, pointer_id));
        self.capture_log
            .push(CaptureCall::Acquire { element, pointer_id });
    }

    fn release(&mut self, element: ElementId, pointer_id: u32) {
        self.captured
            .retain(|&(e, p)| !(e == element && p == pointer_id));
        self.capture_log
            .push(CaptureCall::Release { element, pointer_id });
    }
}

impl FrameScheduler for RecordingHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending_frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending_frames.retain(|&h| h != handle);
    }
}

impl ScrollHost for RecordingHost {
    fn scrollable_ancestor(&self, element: ElementId) -> Option<ScrollContainer> {
        self.scroll_containers.get(&element).copied()
    }

    fn scroll_by(&mut self, container: ElementId, dx: f64, dy: f64) {
        self.scrolled.push((container, dx, dy));
    }
}

impl ListenerHost for RecordingHost {
    fn add_listener(&mut self, listener: GlobalListener) {
        self.listeners.insert(listener);
    }

    fn remove_listener(&mut self, listener: GlobalListener) {
        self.listeners.remove(&listener);
    }
}
