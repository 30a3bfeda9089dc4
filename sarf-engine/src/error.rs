//! Engine error types
//!
//! Core failures are wrapped unchanged so callers can still ask for their
//! [`ErrorKind`](sarf_core::ErrorKind).

use sarf_core::MorphError;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Morphology core error
    #[error("morphology error: {0}")]
    Core(#[from] MorphError),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl EngineError {
    /// True when the error came from a fixed capacity bound
    pub fn is_capacity(&self) -> bool {
        matches!(self, EngineError::Core(e) if e.kind() == sarf_core::ErrorKind::Capacity)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
