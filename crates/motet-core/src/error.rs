//! Error types for motet-core.
//!
//! Only configuration can fail. Numeric problems on the dispatch path are
//! coerced (see [`crate::util`]) and never surface as errors.

use thiserror::Error;

/// Error type for motet-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be a positive finite BPM")]
    InvalidTempo(f64),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
