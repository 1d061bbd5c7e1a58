#![forbid(unsafe_code)]

use std::fmt;

use dropline_a11y::AnnouncerConfigError;
use dropline_input::{KeyboardConfigError, PointerConfigError};

/// Invalid session configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    Pointer(PointerConfigError),
    Keyboard(KeyboardConfigError),
    Announcer(AnnouncerConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer(err) => write!(f, "invalid pointer config: {err}"),
            Self::Keyboard(err) => write!(f, "invalid keyboard config: {err}"),
            Self::Announcer(err) => write!(f, "invalid announcer config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pointer(err) => Some(err),
            Self::Keyboard(err) => Some(err),
            Self::Announcer(err) => Some(err),
        }
    }
}

impl From<PointerConfigError> for Error {
    fn from(err: PointerConfigError) -> Self {
        Self::Pointer(err)
    }
}

impl From<KeyboardConfigError> for Error {
    fn from(err: KeyboardConfigError) -> Self {
        Self::Keyboard(err)
    }
}

impl From<AnnouncerConfigError> for Error {
    fn from(err: AnnouncerConfigError) -> Self {
        Self::Announcer(err)
    }
}
