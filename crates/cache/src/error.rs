//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. These are the errors the front-end
//! sees; extraction and storage errors are raised into one of these kinds.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be fetched. The stored snapshot is left as it was.
    #[display("could not fetch source: {_0}")]
    Transport(#[error(not(source))] String),
    /// The fetched body isn't a document that can be parsed.
    #[display("source document could not be parsed")]
    Parse,
    /// The document parsed, but the ranking container is missing: the page
    /// layout has changed.
    #[display("ranking container not found in source document")]
    ContainerNotFound,
    /// Maintenance operation on the storage backend failed.
    #[display("storage error")]
    Storage,
    /// Serialization/deserialization error.
    #[display("invalid snapshot data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Storage)
    }
}
