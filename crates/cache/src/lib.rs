//! Staleness-bounded cache of the trending repositories ranking.
//!
//! The cache holds exactly one [`FeedSnapshot`]: the whole ranking as it was
//! extracted at a point in time. It is persisted as an opaque blob through a
//! [`StorageBackend`](trendinghubs_storage::StorageBackend), and served
//! unchanged until it is older than the validity window. There is no
//! background refresh; staleness is only checked when a snapshot is asked for.
//!
//! Everything the cache talks to is injected: where the page comes from
//! ([`Source`]), where the snapshot is kept ([`BackendHandle`]) and what time
//! it is ([`Clock`]).

mod clock;
pub mod error;
mod feed;
mod snapshot;
mod source;

pub use crate::clock::{Clock, ClockHandle, FixedClock, SystemClock};
pub use crate::feed::{FeedCache, MAX_AGE, SNAPSHOT_KEY};
pub use crate::snapshot::FeedSnapshot;
pub use crate::source::{DEFAULT_TIMEOUT, DEFAULT_URL, DEFAULT_USER_AGENT, HttpSource, Source, SourceHandle};
pub use trendinghubs_storage::BackendHandle;
