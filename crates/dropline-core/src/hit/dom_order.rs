#![forbid(unsafe_code)]

//! Paint-order enumeration through a host renderer.

use std::fmt;

use super::{HitDetector, HitStrategyKind};
use crate::id::TargetId;
use crate::registry::TargetRegistry;

/// Host renderer view of what is painted at a point.
pub trait PaintOrder {
    /// Target ids of the elements painted at `(x, y)`, top-most first.
    ///
    /// Elements that do not carry a target id are simply left out; ids that
    /// are not registered are skipped by the detector.
    fn targets_at(&self, x: f64, y: f64) -> Vec<TargetId>;
}

impl<F> PaintOrder for F
where
    F: Fn(f64, f64) -> Vec<TargetId>,
{
    fn targets_at(&self, x: f64, y: f64) -> Vec<TargetId> {
        self(x, y)
    }
}

/// Picks the top-most painted element that maps to a droppable target.
///
/// Models real visual stacking, so overlapping targets resolve the way the
/// user sees them. Only meaningful when a renderer exists.
pub struct PaintOrderDetector<P> {
    paint: P,
}

impl<P: PaintOrder> PaintOrderDetector<P> {
    pub fn new(paint: P) -> Self {
        Self { paint }
    }

    pub fn paint_order(&self) -> &P {
        &self.paint
    }
}

impl<P> fmt::Debug for PaintOrderDetector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaintOrderDetector").finish_non_exhaustive()
    }
}

impl<P: PaintOrder> HitDetector for PaintOrderDetector<P> {
    fn resolve(&self, x: f64, y: f64, registry: &TargetRegistry) -> Option<TargetId> {
        self.paint
            .targets_at(x, y)
            .into_iter()
            .find(|id| registry.get(id).is_some_and(|target| target.can_drop()))
    }

    fn kind(&self) -> HitStrategyKind {
        HitStrategyKind::DomOrder
    }
}
