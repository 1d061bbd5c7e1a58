#![forbid(unsafe_code)]

//! Session-level types: drag modality, previews, focus handoff records.

use crate::geometry::Rect;
use crate::id::{ElementId, ItemId, TargetId, ZoneId};
use crate::item::DragItem;

/// Last known bounds of the dragged item, in the shared coordinate space.
pub type DragPosition = Rect;

/// Input modality driving a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragMode {
    Pointer,
    Keyboard,
}

/// Drag session state.
///
/// ```text
/// Idle -> Dragging(mode) -> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Idle,
    Dragging(DragMode),
}

impl Session {
    #[inline]
    pub const fn is_dragging(self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// Modality of the active drag, if any.
    #[inline]
    pub const fn mode(self) -> Option<DragMode> {
        match self {
            Self::Idle => None,
            Self::Dragging(mode) => Some(mode),
        }
    }
}

/// Visual stand-in that follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preview {
    /// Host-supplied custom node.
    Custom(ElementId),
    /// Copy of the source element with its dimensions frozen at drag start.
    Clone {
        source: ElementId,
        width: f64,
        height: f64,
    },
}

/// How a drag was started.
///
/// Only pointer drags carry a preview; keyboard drags move focus between
/// targets instead of a floating node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOrigin {
    Pointer { preview: Option<Preview> },
    Keyboard,
}

impl DragOrigin {
    #[inline]
    pub const fn mode(&self) -> DragMode {
        match self {
            Self::Pointer { .. } => DragMode::Pointer,
            Self::Keyboard => DragMode::Keyboard,
        }
    }

    #[inline]
    pub const fn preview(&self) -> Option<Preview> {
        match self {
            Self::Pointer { preview } => *preview,
            Self::Keyboard => None,
        }
    }
}

/// Ephemeral request for a zone to move focus after a drop.
///
/// `item_id: None` asks the zone to focus its first item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingFocus {
    pub zone_id: ZoneId,
    pub item_id: Option<ItemId>,
}

/// Snapshot handed back by `end_drag`.
///
/// `target` is the active target at the moment the drag ended, i.e. the
/// drop the consumers should honor (or `None` for a cancelled/missed drop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub item: DragItem,
    pub target: Option<TargetId>,
    pub mode: DragMode,
}
