#![forbid(unsafe_code)]

//! Identifiers for drag items, drop targets, zones, and host elements.
//!
//! Item, target, and zone ids are cheap-to-clone string newtypes. Zone ids
//! and target ids live in one namespace: a drag item's source zone is
//! compared against target ids when deciding whether a drop is allowed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATED: AtomicU64 = AtomicU64::new(1);

fn next_generated() -> u64 {
    NEXT_GENERATED.fetch_add(1, Ordering::Relaxed)
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create an id from any string-like value.
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(Arc::from(value.as_ref()))
            }

            /// Generate a process-unique id.
            #[must_use]
            pub fn generate() -> Self {
                Self::new(format!(concat!($prefix, "-{}"), next_generated()))
            }

            /// Borrow the id as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:?})"), &*self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a dragged item.
    ItemId,
    "item"
);

string_id!(
    /// Identifier of a registered drop target.
    TargetId,
    "target"
);

string_id!(
    /// Identifier of a logical zone (a group of items and targets).
    ZoneId,
    "zone"
);

impl TargetId {
    /// Whether this target is the zone `zone`.
    #[inline]
    pub fn is_zone(&self, zone: &ZoneId) -> bool {
        self.as_str() == zone.as_str()
    }
}

/// Opaque handle to a host element (DOM node, widget, ...).
///
/// The engine never dereferences it; it is only passed back to host
/// collaborators such as bounds providers and preview builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);
