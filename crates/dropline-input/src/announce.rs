#![forbid(unsafe_code)]

//! Screen-reader announcement texts.
//!
//! Controllers never hard-code user-facing strings; they ask an
//! [`Announcements`] implementation. Every method has an English default, so a
//! localized formatter only overrides what it translates.

use std::fmt;

use dropline_core::DragItem;

/// Metadata key consulted for an item's human-readable label.
pub const LABEL_METADATA_KEY: &str = "label";

/// Human-readable label for `item`: its `label` metadata, else its id.
#[must_use]
pub fn item_label(item: &DragItem) -> &str {
    item.meta(LABEL_METADATA_KEY)
        .unwrap_or_else(|| item.id().as_str())
}

/// Formatter for drag announcements.
pub trait Announcements: fmt::Debug {
    fn picked_up(&self, item: &DragItem, targets: usize) -> String {
        let label = item_label(item);
        match targets {
            0 => format!("Picked up {label}. No drop targets available. Press Escape to cancel."),
            1 => format!(
                "Picked up {label}. 1 drop target available. Use arrow keys to choose it, Enter to drop, Escape to cancel."
            ),
            n => format!(
                "Picked up {label}. {n} drop targets available. Use arrow keys to move, Enter to drop, Escape to cancel."
            ),
        }
    }

    fn over_target(&self, name: &str, position: usize, total: usize) -> String {
        format!("Over {name}, {position} of {total}.")
    }

    fn no_targets(&self) -> String {
        "No drop targets available.".to_owned()
    }

    fn dropped(&self, item: &DragItem, target: Option<&str>) -> String {
        let label = item_label(item);
        match target {
            Some(name) => format!("Dropped {label} on {name}."),
            None => format!("Dropped {label}. It was not over a drop target."),
        }
    }

    fn cancelled(&self, item: &DragItem) -> String {
        format!("Drag cancelled. {} returned to its original position.", item_label(item))
    }
}

/// Default English texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishAnnouncements;

impl Announcements for EnglishAnnouncements {}
