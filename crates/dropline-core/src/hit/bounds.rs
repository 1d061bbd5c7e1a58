#![forbid(unsafe_code)]

//! Linear geometric scan.

use super::{HitDetector, HitStrategyKind};
use crate::id::TargetId;
use crate::registry::TargetRegistry;

/// Returns the first target, in registration order, whose bounds contain the
/// point and which accepts the current item.
///
/// Render-independent and deterministic. When targets overlap the earliest
/// registered one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsDetector;

impl HitDetector for BoundsDetector {
    fn resolve(&self, x: f64, y: f64, registry: &TargetRegistry) -> Option<TargetId> {
        registry
            .iter()
            .find(|target| target.can_drop() && target.bounds().contains(x, y))
            .map(|target| target.id().clone())
    }

    fn kind(&self) -> HitStrategyKind {
        HitStrategyKind::Bounds
    }
}
