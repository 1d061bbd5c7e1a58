#![forbid(unsafe_code)]

//! Input: pointer and keyboard controllers that drive a [`DragStore`].
//!
//! # Role in Dropline
//! `dropline-input` turns host input into store operations. Both controllers
//! converge on the same store semantics; the store's [`Session`] decides which
//! modality owns the current drag, and each controller refuses to start while
//! the other one is active.
//!
//! # Primary responsibilities
//! - **PointerController**: threshold gating, pointer capture, frame-coalesced
//!   position updates, click suppression, auto-scroll.
//! - **KeyboardController**: entry chord, candidate cycling, announcements.
//! - **BoundsTracker**: layout observation feeding target bounds back in.
//! - **Host traits**: the narrow DOM-like surface the controllers need.
//!
//! [`DragStore`]: dropline_core::DragStore
//! [`Session`]: dropline_core::Session

pub mod announce;
pub mod autoscroll;
pub mod host;
pub mod key;
pub mod keyboard;
pub mod observe;
pub mod pointer;

pub use announce::{Announcements, EnglishAnnouncements, item_label};
pub use autoscroll::{AutoScrollConfig, AutoScroller};
pub use host::{
    BoundsProvider, FrameHandle, FrameScheduler, GlobalListener, ListenerHost, PointerCaptureHandle,
    PointerHost, RecordingHost, ScrollContainer, ScrollHost,
};
pub use key::{KeyChord, KeyCode, KeyEvent, Modifiers};
pub use keyboard::{
    FocusedDraggable, KeyboardConfig, KeyboardConfigError, KeyboardController, KeyboardOutcome,
};
pub use observe::{BoundsTracker, Observation};
pub use pointer::{
    PointerButton, PointerConfig, PointerConfigError, PointerController, PointerDispatch,
    PointerDown, PointerIgnoredReason, PointerLifecyclePhase, PointerOutcome, PointerPhase,
    PreviewRequest,
};
