//! Shared types and error definitions for the trade scorer.

pub mod dates;
pub mod error;
pub mod types;

pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
