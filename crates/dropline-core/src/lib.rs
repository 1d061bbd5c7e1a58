#![forbid(unsafe_code)]

//! Core: drag session store, drop-target registry, and hit detection.
//!
//! # Role in Dropline
//! `dropline-core` is the state layer. It owns the single drag session, the
//! set of registered drop targets, and the strategy used to resolve a point
//! to the target under it. Input controllers (`dropline-input`) and the
//! accessibility layer (`dropline-a11y`) drive and observe it; nothing here
//! touches a renderer or the event loop.
//!
//! # Primary responsibilities
//! - **DragStore**: `Idle -> Dragging(mode) -> Idle` with two-phase teardown.
//! - **TargetRegistry**: ordered registry with derived `can_drop` / `is_over`.
//! - **HitDetector**: paint-order, bounds, and BSP spatial-index strategies.
//! - **StoreChange**: change feed drained by the rendering layer.

pub mod geometry;
pub mod hit;
pub mod id;
pub mod item;
pub mod logging;
pub mod registry;
pub mod session;
pub mod store;
pub mod target;

pub use geometry::{Axis, Point, Rect};
pub use hit::{
    BoundsDetector, BspDetector, BspTree, HitDetector, HitStrategyKind, PaintOrder,
    PaintOrderDetector,
};
pub use id::{ElementId, ItemId, TargetId, ZoneId};
pub use item::DragItem;
pub use registry::{Registration, TargetRegistry};
pub use session::{DragEnd, DragMode, DragOrigin, DragPosition, PendingFocus, Preview, Session};
pub use store::{DragStore, StoreChange};
pub use target::{DropTargetDescriptor, DropTargetState};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
