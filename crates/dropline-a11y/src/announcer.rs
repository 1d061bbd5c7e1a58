#![forbid(unsafe_code)]

//! Screen-reader live region.
//!
//! The announcer models a single polite, atomic live region. The host owns
//! the actual DOM node and replays [`LiveRegionUpdate`]s drained from here.
//!
//! # Invariants
//!
//! 1. The region is mounted exactly once, on construction, and unmounted
//!    exactly once, on [`Announcer::teardown`].
//! 2. A message stays in the region for `clear_delay`, then a `Clear` is
//!    emitted so that the same text announced again is read again.
//! 3. Announcing the text currently shown emits `Clear` before `SetText`.
//! 4. Nothing is emitted after teardown.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use web_time::Instant;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Default time a message stays in the region before it is cleared.
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_secs(1);

/// Maximum undrained updates kept; older ones are dropped first.
pub const MAX_PENDING_UPDATES: usize = 32;

/// Announcer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnouncerConfig {
    pub clear_delay: Duration,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            clear_delay: DEFAULT_CLEAR_DELAY,
        }
    }
}

impl AnnouncerConfig {
    pub fn validate(&self) -> Result<(), AnnouncerConfigError> {
        if self.clear_delay.is_zero() {
            return Err(AnnouncerConfigError::ZeroClearDelay);
        }
        Ok(())
    }
}

/// Rejected announcer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncerConfigError {
    ZeroClearDelay,
}

impl fmt::Display for AnnouncerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroClearDelay => write!(f, "announcer clear delay must be non-zero"),
        }
    }
}

impl std::error::Error for AnnouncerConfigError {}

/// Static attributes of the live-region element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRegionAttributes {
    pub role: &'static str,
    pub aria_live: &'static str,
    pub aria_atomic: bool,
    /// The region is visually hidden but stays in the accessibility tree.
    pub visually_hidden: bool,
}

impl LiveRegionAttributes {
    pub const POLITE: Self = Self {
        role: "status",
        aria_live: "polite",
        aria_atomic: true,
        visually_hidden: true,
    };
}

/// One change the host applies to its live-region element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRegionUpdate {
    Mount(LiveRegionAttributes),
    SetText(String),
    Clear,
    Unmount,
}

/// Polite live region with timed clearing.
#[derive(Debug, Clone)]
pub struct Announcer {
    config: AnnouncerConfig,
    text: Option<String>,
    clear_at: Option<Instant>,
    mounted: bool,
    updates: VecDeque<LiveRegionUpdate>,
}

impl Announcer {
    /// Create the region. The first drained update is its `Mount`.
    pub fn new(config: AnnouncerConfig) -> Result<Self, AnnouncerConfigError> {
        config.validate()?;
        let mut updates = VecDeque::new();
        updates.push_back(LiveRegionUpdate::Mount(LiveRegionAttributes::POLITE));
        Ok(Self {
            config,
            text: None,
            clear_at: None,
            mounted: true,
            updates,
        })
    }

    #[must_use]
    pub fn config(&self) -> AnnouncerConfig {
        self.config
    }

    #[must_use]
    pub fn attributes(&self) -> LiveRegionAttributes {
        LiveRegionAttributes::POLITE
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Text currently in the region.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// When the current text will be cleared, if any.
    #[must_use]
    pub fn clear_deadline(&self) -> Option<Instant> {
        self.clear_at
    }

    /// Put `text` in the region and schedule its clear.
    ///
    /// Blank text is ignored. Returns whether an update was queued.
    pub fn announce(&mut self, text: &str, now: Instant) -> bool {
        let text = text.trim();
        if !self.mounted || text.is_empty() {
            return false;
        }
        if self.text.as_deref() == Some(text) {
            self.push(LiveRegionUpdate::Clear);
        }
        #[cfg(feature = "tracing")]
        trace!(text, "announce");
        self.text = Some(text.to_owned());
        self.clear_at = Some(now + self.config.clear_delay);
        self.push(LiveRegionUpdate::SetText(text.to_owned()));
        true
    }

    /// Clear the region once its deadline has passed. Returns whether it cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.clear_at = None;
                self.text = None;
                self.push(LiveRegionUpdate::Clear);
                true
            }
            _ => false,
        }
    }

    /// Remove the region. Idempotent.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        #[cfg(feature = "tracing")]
        debug!(pending = self.updates.len(), "live region torn down");
        self.mounted = false;
        self.text = None;
        self.clear_at = None;
        self.updates.push_back(LiveRegionUpdate::Unmount);
    }

    pub fn drain_updates(&mut self) -> Vec<LiveRegionUpdate> {
        self.updates.drain(..).collect()
    }

    fn push(&mut self, update: LiveRegionUpdate) {
        if self.updates.len() >= MAX_PENDING_UPDATES {
            self.updates.pop_front();
        }
        self.updates.push_back(update);
    }
}
