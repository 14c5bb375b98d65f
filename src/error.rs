//! Crate-level error types.

use std::fmt;

/// Errors produced by the cruise crate.
///
/// The controller itself never fails once constructed; these cover
/// construction, configuration loading and the tooling around it.
#[derive(Debug)]
pub enum CruiseError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML/JSON options parsing or serialization failure.
    OptionsParse(String),
    /// Options parsed but failed validation.
    InvalidOptions(String),
    /// A color string could not be decoded.
    InvalidColor(String),
    /// No built-in preset with this name.
    UnknownPreset(String),
    /// Attaching an event listener to the input surface failed.
    Listener(String),
    /// A replay script was malformed.
    Replay(String),
}

impl fmt::Display for CruiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color: {value:?}")
            }
            Self::UnknownPreset(name) => write!(f, "unknown preset: {name}"),
            Self::Listener(msg) => {
                write!(f, "failed to attach listener: {msg}")
            }
            Self::Replay(msg) => write!(f, "replay error: {msg}"),
        }
    }
}

impl std::error::Error for CruiseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CruiseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
