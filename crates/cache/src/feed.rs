use crate::clock::ClockHandle;
use crate::error::{ErrorKind, Result};
use crate::snapshot::FeedSnapshot;
use crate::source::SourceHandle;
use exn::ResultExt;
use time::{Duration, UtcDateTime};
use tracing::instrument;
use trendinghubs_extract::error::ErrorKind as ExtractErrorKind;
use trendinghubs_extract::models::RepositoryRecord;
use trendinghubs_extract::{EntryLayout, extract_with};
use trendinghubs_storage::BackendHandle;
use trendinghubs_storage::error::ErrorKind as StorageErrorKind;

/// How long a snapshot is served before the source is fetched again.
pub const MAX_AGE: Duration = Duration::hours(2);
/// The cache holds exactly one snapshot, always under this key.
pub const SNAPSHOT_KEY: &str = "feed/cache.json";

/// Serves the trending ranking, refetching it at most once per validity window.
///
/// There's no locking: concurrent misses may each refresh and the last
/// writer wins. Every refresh replaces the whole snapshot.
pub struct FeedCache {
    storage: BackendHandle,
    source: SourceHandle,
    clock: ClockHandle,
    max_age: Duration,
    layout: EntryLayout,
}

impl FeedCache {
    pub fn new(storage: BackendHandle, source: SourceHandle, clock: ClockHandle) -> Self {
        Self {
            storage,
            source,
            clock,
            max_age: MAX_AGE,
            layout: EntryLayout::default(),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_layout(mut self, layout: EntryLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn now(&self) -> UtcDateTime {
        self.clock.now()
    }

    /// [`get_at`](Self::get_at) the injected clock's current time.
    pub async fn get(&self) -> Result<FeedSnapshot> {
        self.get_at(self.clock.now()).await
    }

    /// Returns the stored snapshot if it is still valid at `now`, otherwise
    /// refreshes it.
    ///
    /// A stored snapshot that can't be read or decoded counts as a miss.
    ///
    /// # Errors
    ///
    /// Only a failed refresh is an error, see [`refresh_at`](Self::refresh_at).
    #[instrument(skip(self), fields(backend = self.storage.name()))]
    pub async fn get_at(&self, now: UtcDateTime) -> Result<FeedSnapshot> {
        if let Some(snapshot) = self.load().await {
            let age = snapshot.age_at(now);
            if snapshot.is_valid_at(now, self.max_age) {
                tracing::debug!(age = ?age, records = snapshot.records.len(), "Serving cached snapshot");
                return Ok(snapshot);
            }
            tracing::debug!(age = ?age, max_age = ?self.max_age, "Cached snapshot expired");
        }
        self.refresh_at(now).await
    }

    /// [`refresh_at`](Self::refresh_at) the injected clock's current time.
    pub async fn refresh(&self) -> Result<FeedSnapshot> {
        self.refresh_at(self.clock.now()).await
    }

    /// Fetches and extracts the ranking, stamps it with `now` (truncated to
    /// whole seconds) and stores it, whatever is currently stored.
    ///
    /// Failing to store the new snapshot is logged, and the snapshot is
    /// returned anyway.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Transport`], [`ErrorKind::Parse`] or
    /// [`ErrorKind::ContainerNotFound`]. The stored snapshot is untouched.
    #[instrument(skip(self), fields(source = self.source.location()))]
    pub async fn refresh_at(&self, now: UtcDateTime) -> Result<FeedSnapshot> {
        // Stored blobs keep whole seconds, so a fresh snapshot must too.
        let now = now - Duration::nanoseconds(now.nanosecond().into());
        let html = self.source.fetch().await?;
        let snapshot = FeedSnapshot::new(now, self.extract(&html)?);
        tracing::info!(records = snapshot.records.len(), "Refreshed snapshot");
        match snapshot.to_bytes() {
            Ok(bytes) => {
                if let Err(err) = self.storage.put(SNAPSHOT_KEY, &bytes).await {
                    tracing::warn!(backend = self.storage.name(), error = ?err, "Could not store snapshot");
                }
            },
            Err(err) => tracing::warn!(error = ?err, "Could not serialize snapshot"),
        }
        Ok(snapshot)
    }

    fn extract(&self, html: &[u8]) -> Result<Vec<RepositoryRecord>> {
        match extract_with(html, self.layout) {
            Ok(extraction) => Ok(extraction.repositories),
            Err(err) => {
                let kind = match &*err {
                    ExtractErrorKind::ContainerNotFound(_) => ErrorKind::ContainerNotFound,
                    _ => ErrorKind::Parse,
                };
                Err(err.raise(kind))
            },
        }
    }

    /// Reads the stored snapshot, valid or not, without fetching anything.
    ///
    /// Unlike [`get_at`](Self::get_at), a read or decode failure is reported.
    pub async fn peek(&self) -> Result<Option<FeedSnapshot>> {
        let Some(bytes) = self.storage.get(SNAPSHOT_KEY).await.or_raise(|| ErrorKind::Storage)? else {
            return Ok(None);
        };
        Ok(Some(FeedSnapshot::from_bytes(&bytes)?))
    }

    async fn load(&self) -> Option<FeedSnapshot> {
        match self.peek().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = ?err, "Ignoring unreadable cached snapshot");
                None
            },
        }
    }

    /// Deletes the stored snapshot. Returns `false` if there wasn't one.
    #[instrument(skip(self), fields(backend = self.storage.name()))]
    pub async fn purge(&self) -> Result<bool> {
        match self.storage.delete(SNAPSHOT_KEY).await {
            Ok(()) => Ok(true),
            Err(err) if matches!(&*err, StorageErrorKind::NotFound(_)) => Ok(false),
            Err(err) => Err(err.raise(ErrorKind::Storage)),
        }
    }
}
