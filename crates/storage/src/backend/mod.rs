//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! byte-blob key/value interface across different backends (local filesystem,
//! SQLite, in-memory).

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteBackend;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for storage backends.
///
/// Values are opaque bytes; backends never interpret them. A `put` replaces
/// the whole value for a key, so readers see either the previous value or
/// the new one, never a mix.
///
/// # Keys
/// All keys must be validated using [`validate_key`](crate::validate_key)
/// before use. Implementations should enforce this validation.
///
/// # Examples
///
/// ```
/// use trendinghubs_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_hardcoded_key(backend: &dyn StorageBackend) -> Result<u64> {
///     match backend.get("feed/cache.json").await? {
///         Some(data) => Ok(data.len() as u64),
///         None => Ok(0),
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Read the value stored under `key`, or `None` if there isn't one.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `data` under `key`, replacing any previous value.
    ///
    /// ```no_run
    /// # use trendinghubs_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// backend.put("feed/cache.json", br#"{"ts":0,"repos":[]}"#).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Delete the value stored under `key`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is
    /// no such key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a value exists under `key`.
    ///
    /// Default implementation reads the whole value; backends that can answer
    /// more cheaply should override it.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
