#![forbid(unsafe_code)]

//! Accessibility: live-region announcements and roving focus.
//!
//! # Role in Dropline
//! Keyboard and pointer drags describe themselves in text; the
//! [`Announcer`] turns that text into updates for one polite live region.
//! After a drop, [`FocusZone`]s pick up the focus request the drop handler
//! left in the `DragStore` so keyboard users land on the moved item.

pub mod announcer;
pub mod focus_zone;

pub use announcer::{
    Announcer, AnnouncerConfig, AnnouncerConfigError, DEFAULT_CLEAR_DELAY, LiveRegionAttributes,
    LiveRegionUpdate, MAX_PENDING_UPDATES,
};
pub use focus_zone::{FocusZone, TAB_INDEX_ACTIVE, TAB_INDEX_INACTIVE};
