#![forbid(unsafe_code)]

//! Session configuration.

use dropline_a11y::AnnouncerConfig;
use dropline_core::HitStrategyKind;
use dropline_input::{KeyboardConfig, PointerConfig};

use crate::error::Error;

/// Everything a [`DndSession`](crate::DndSession) is built from.
///
/// Missing fields take their defaults when deserialized, so hosts can ship a
/// partial settings file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DndConfig {
    pub pointer: PointerConfig,
    pub keyboard: KeyboardConfig,
    pub announcer: AnnouncerConfig,
    pub hit_strategy: HitStrategyKind,
}

impl DndConfig {
    /// Check every section, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), Error> {
        self.pointer.validate()?;
        self.keyboard.validate()?;
        self.announcer.validate()?;
        Ok(())
    }
}
