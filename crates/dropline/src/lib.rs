#![forbid(unsafe_code)]

//! Dropline: a headless drag-and-drop coordination engine.
//!
//! # Role in Dropline
//! This is the public facade. It re-exports the building blocks from
//! `dropline-core`, `dropline-input`, and `dropline-a11y`, and adds
//! [`DndSession`], which ties one store, one pointer controller, one keyboard
//! controller, and one live region together for a host.
//!
//! # Example
//! ```
//! use dropline::{DndConfig, DndSession, DragItem, DropTargetDescriptor, Rect};
//!
//! let mut session = DndSession::new(DndConfig::default()).expect("valid config");
//! session.register_drop_target(
//!     DropTargetDescriptor::new("done", Rect::new(0.0, 0.0, 100.0, 100.0)).accept("card"),
//!     None,
//! );
//! assert_eq!(session.store().targets().count(), 1);
//! # let _ = DragItem::new("c1", "card");
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::DndConfig;
pub use error::Error;
pub use session::DndSession;

pub use dropline_a11y::{
    Announcer, AnnouncerConfig, AnnouncerConfigError, FocusZone, LiveRegionAttributes,
    LiveRegionUpdate,
};
pub use dropline_core::{
    DragEnd, DragItem, DragMode, DragOrigin, DragPosition, DragStore, DropTargetDescriptor,
    DropTargetState, ElementId, HitDetector, HitStrategyKind, ItemId, PaintOrder,
    PaintOrderDetector, PendingFocus, Point, Preview, Rect, Session, StoreChange, TargetId,
    ZoneId,
};
pub use dropline_input::{
    Announcements, AutoScrollConfig, BoundsProvider, BoundsTracker, EnglishAnnouncements,
    FocusedDraggable, FrameHandle, FrameScheduler, GlobalListener, KeyChord, KeyCode, KeyEvent,
    KeyboardConfig, KeyboardConfigError, KeyboardController, KeyboardOutcome, ListenerHost,
    Modifiers, Observation, PointerButton, PointerCaptureHandle, PointerConfig,
    PointerConfigError, PointerController, PointerDispatch, PointerDown, PointerHost,
    PointerIgnoredReason, PointerOutcome, PointerPhase, PreviewRequest, RecordingHost,
    ScrollContainer, ScrollHost,
};

#[cfg(feature = "tracing-json")]
pub use dropline_core::logging::init_json;
