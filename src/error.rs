//! Centralized error type for the motet umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate
//! boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] motet_core::Error),

    #[error(transparent)]
    UGen(#[from] motet_ugen::UGenError),
}

pub type Result<T> = std::result::Result<T, Error>;
