//! SQLite storage backend.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, key::validate as validate_key};
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use time::UtcDateTime;
use tracing::instrument;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// A handful of concurrent requests at most; they all touch the same row.
const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// SQLite-backed storage: one `blobs` table keyed by the storage key.
///
/// Gives atomic replacement of values for free, and survives being shared
/// between several processes on the same host.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    name: String,
    pool: SqlitePool,
}

impl SqliteBackend {
    async fn new(name: String, options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Runs for every new pooled connection, not just the first one.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let backend = Self { name, pool };
        backend.migrate().await?;
        Ok(backend)
    }

    /// Open (or create) the database file at `path` and bring its schema up to date.
    pub async fn connect(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(name.into(), options, None).await
    }

    /// Throwaway database that lives as long as the backend.
    ///
    /// Left public, and not test-only, for other crates' tests.
    pub async fn connect_in_memory(name: impl Into<String>) -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Each `:memory:` connection is its own database, so there can only be one.
        Self::new(name.into(), options, Some(1)).await
    }

    /// Options common to file-backed and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Concurrent cache misses may all try to write the snapshot at once.
            .busy_timeout(BUSY_TIMEOUT)
    }

    /// PRAGMAs with no `SqliteConnectOptions` setter.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA locking_mode = NORMAL;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("migrating blob store", skip(self), fields(backend = %self.name))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for checked-out connections and closes the pool. The backend
    /// is unusable afterwards.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = validate_key(key)?;
        let row: Option<(Vec<u8>,)> = sqlx::query_as(include_str!("../../queries/get_blob.sql"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.map(|(data,)| data))
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let key = validate_key(key)?;
        sqlx::query(include_str!("../../queries/put_blob.sql"))
            .bind(key)
            .bind(data)
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        let result = sqlx::query(include_str!("../../queries/delete_blob.sql"))
            .bind(&key)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NotFound(key));
        }
        Ok(())
    }
}
