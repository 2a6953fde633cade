//! Error types shared across Stepflow crates.

use thiserror::Error;

/// Result alias using the common [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type.
#[derive(Error, Debug)]
pub enum Error {
    /// An entity or named object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A named object already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
}
