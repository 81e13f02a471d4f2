//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is not markup at all (empty body, binary, plain text).
    #[display("malformed HTML: {_0}")]
    MalformedHtml(#[error(not(source))] &'static str),
    /// No element carries the ranking container class. Either the page
    /// layout changed, or the wrong page was fetched.
    #[display("ranking container `.{_0}` not found")]
    ContainerNotFound(#[error(not(source))] &'static str),
    /// A single ranking entry didn't have the expected shape. Recovered
    /// locally by the extractor; the entry is skipped.
    #[display("malformed ranking entry: no {field} at position {position}")]
    MalformedEntry {
        /// The field that could not be decoded (`owner` or `name`).
        field: &'static str,
        /// Child offset (or anchor index) that was inspected.
        position: usize,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The same document always extracts the same way.
        false
    }
}
