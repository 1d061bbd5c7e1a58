#![forbid(unsafe_code)]

//! Hit detection: resolving which drop target a point currently hits.
//!
//! Every strategy implements [`HitDetector`]. The store owns exactly one
//! detector, keeps it informed of registry changes, and asks it to resolve
//! the active target on every position update.
//!
//! | Strategy | Type | Order | Needs a renderer |
//! |----------|------|-------|------------------|
//! | DOM order | [`PaintOrderDetector`] | paint order, top-most first | yes ([`PaintOrder`]) |
//! | Bounds | [`BoundsDetector`] | registration order | no |
//! | Spatial partition | [`BspDetector`] | tree order | no |
//!
//! All strategies only ever return targets whose `can_drop` flag is set.

mod bounds;
mod bsp;
mod dom_order;

pub use bounds::BoundsDetector;
pub use bsp::{BspDetector, BspTree};
pub use dom_order::{PaintOrder, PaintOrderDetector};

use std::fmt;

use crate::id::TargetId;
use crate::registry::TargetRegistry;
use crate::target::DropTargetState;

/// Point-in-target resolver.
///
/// Detectors that maintain their own index override the notification hooks;
/// stateless detectors can ignore them.
pub trait HitDetector: fmt::Debug {
    /// Resolve the droppable target under `(x, y)`, if any.
    fn resolve(&self, x: f64, y: f64, registry: &TargetRegistry) -> Option<TargetId>;

    /// Strategy tag, for diagnostics.
    fn kind(&self) -> HitStrategyKind;

    /// A target was inserted or its descriptor replaced.
    fn target_registered(&mut self, _target: &DropTargetState) {}

    /// A target was removed.
    fn target_unregistered(&mut self, _id: &TargetId) {}

    /// A target's bounds changed.
    fn target_moved(&mut self, _target: &DropTargetState) {}

    /// Discard any index and rebuild it from the full registry.
    fn rebuild(&mut self, _registry: &TargetRegistry) {}
}

/// Configurable hit-detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HitStrategyKind {
    /// Paint-order enumeration through a host renderer.
    DomOrder,
    /// Linear geometric scan; overlapping targets resolve by registration order.
    #[default]
    Bounds,
    /// Binary-space-partition index over target centers.
    SpatialPartition,
}

impl HitStrategyKind {
    /// Build a detector for strategies that need no host collaborator.
    ///
    /// `DomOrder` needs a [`PaintOrder`] implementation, so it falls back to
    /// [`BoundsDetector`] here; use [`PaintOrderDetector::new`] directly when a
    /// renderer is available.
    #[must_use]
    pub fn build_standalone(self) -> Box<dyn HitDetector> {
        match self {
            Self::DomOrder | Self::Bounds => Box::new(BoundsDetector),
            Self::SpatialPartition => Box::new(BspDetector::default()),
        }
    }
}
