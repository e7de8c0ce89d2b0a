//! Error types for motet-ugen.
//!
//! Everything here is a build-time configuration error. It is returned from
//! [`UGen::build`](crate::UGen::build) before the generator is attached to
//! anything outside its own subgraph.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UGenError {
    #[error("Invalid ugen name: {0}")]
    InvalidName(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Ugen '{0}' did not return a unit with an outlet")]
    MalformedUnit(String),

    #[error("Invalid parameter name: {0}")]
    InvalidParamName(String),

    #[error("Ugen construction failed: {0}")]
    ConstructionFailed(String),

    #[error("Forward reference #{0} is already resolved")]
    AlreadyResolved(String),

    #[error(transparent)]
    Core(#[from] motet_core::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, UGenError>;
