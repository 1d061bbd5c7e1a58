#![forbid(unsafe_code)]

//! Structured logging helpers.
//!
//! With the `tracing` feature the usual macros are re-exported so dependent
//! crates can log through `dropline_core` without naming `tracing` directly.
//! The `tracing-json` feature adds [`init_json`], a one-line JSON subscriber
//! for production hosts.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable consulted by [`init_json`] for the filter directive.
pub const LOG_FILTER_ENV: &str = "DROPLINE_LOG";

/// Filter used when [`LOG_FILTER_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "dropline=info,dropline_core=info";

/// Install a global JSON subscriber.
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
