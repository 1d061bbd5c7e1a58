#![forbid(unsafe_code)]

//! Edge auto-scroll during pointer drags.
//!
//! While a pointer drag is active the scroller runs on its own frame cycle:
//! every frame it looks up the nearest scrollable ancestor of the drag source
//! and, if the pointer is inside an edge zone of that ancestor's viewport,
//! scrolls it by a speed proportional to how deep into the zone the pointer
//! is. Pointers past the edge scroll at full speed.

use dropline_core::{ElementId, Point, Rect};

use crate::host::{FrameHandle, FrameScheduler, ScrollHost};

/// Default width of the edge zone, in pixels.
pub const DEFAULT_EDGE_ZONE: f64 = 40.0;

/// Default maximum scroll speed, in pixels per frame.
pub const DEFAULT_MAX_SCROLL_SPEED: f64 = 20.0;

/// Auto-scroll tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutoScrollConfig {
    /// Distance from a viewport edge within which scrolling starts.
    pub edge_zone: f64,
    /// Scroll delta per frame when the pointer reaches the edge.
    pub max_speed: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_zone: DEFAULT_EDGE_ZONE,
            max_speed: DEFAULT_MAX_SCROLL_SPEED,
        }
    }
}

impl AutoScrollConfig {
    /// Scroll delta `(dx, dy)` for a pointer at `pointer` over `viewport`.
    #[must_use]
    pub fn velocity(&self, viewport: Rect, pointer: Point) -> (f64, f64) {
        (
            self.axis_velocity(pointer.x, viewport.x, viewport.right()),
            self.axis_velocity(pointer.y, viewport.y, viewport.bottom()),
        )
    }

    fn axis_velocity(&self, pos: f64, start: f64, end: f64) -> f64 {
        if self.edge_zone <= 0.0 || self.max_speed <= 0.0 {
            return 0.0;
        }
        let from_start = pos - start;
        let from_end = end - pos;
        if from_start < self.edge_zone {
            -self.max_speed * self.depth(from_start)
        } else if from_end < self.edge_zone {
            self.max_speed * self.depth(from_end)
        } else {
            0.0
        }
    }

    /// How far into the edge zone a point at `distance` from the edge is, in `[0, 1]`.
    fn depth(&self, distance: f64) -> f64 {
        ((self.edge_zone - distance) / self.edge_zone).clamp(0.0, 1.0)
    }
}

/// Frame-driven scroller owned by the pointer controller.
#[derive(Debug, Clone, Default)]
pub struct AutoScroller {
    config: AutoScrollConfig,
    frame: Option<FrameHandle>,
}

impl AutoScroller {
    #[must_use]
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            frame: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> AutoScrollConfig {
        self.config
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    /// Whether `handle` is the scroller's pending frame.
    #[must_use]
    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.frame == Some(handle)
    }

    /// Start the frame cycle if it is not already running.
    pub fn start<H: FrameScheduler + ?Sized>(&mut self, host: &mut H) {
        if self.frame.is_none() {
            self.frame = Some(host.request_frame());
        }
    }

    /// Run one frame and schedule the next.
    ///
    /// Returns the applied delta, or `None` when `handle` is not ours, there
    /// is no scrollable ancestor, or the pointer is outside every edge zone.
    pub fn step<H: FrameScheduler + ScrollHost + ?Sized>(
        &mut self,
        handle: FrameHandle,
        source: ElementId,
        pointer: Point,
        host: &mut H,
    ) -> Option<(f64, f64)> {
        if !self.owns(handle) {
            return None;
        }
        self.frame = Some(host.request_frame());

        let container = host.scrollable_ancestor(source)?;
        let (dx, dy) = self.config.velocity(container.viewport, pointer);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        host.scroll_by(container.element, dx, dy);
        Some((dx, dy))
    }

    /// Stop the frame cycle.
    pub fn cancel<H: FrameScheduler + ?Sized>(&mut self, host: &mut H) {
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
    }
}
