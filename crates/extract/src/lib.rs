//! Structure-based extraction of the trending repositories ranking.
//!
//! The trending page is an uncontrolled document, so nothing here relies on
//! a schema. The extractor finds the ranking container by class, walks its
//! direct children in order, and decodes each entry's heading with an
//! [`EntryLayout`]. Rows that don't look like entries are skipped; only a
//! missing container is fatal.

mod consts;
pub mod error;
mod extract;
pub mod matcher;
pub mod models;

use tracing::instrument;

pub use crate::consts::{CONTAINER_CLASS, HEADING_TAG, NAME_OFFSET, OWNER_OFFSET, SENTINEL_CLASS};
use crate::error::Result;
pub use crate::extract::{EntryLayout, Extraction, Extractor, Report};
use crate::models::RepositoryRecord;

/// Easy, top-level entrypoint for extracting the ranking from raw HTML bytes,
/// using the default [`EntryLayout`].
///
/// Accepts raw bytes, instead of requiring HTML to be valid UTF-8. Invalid byte
/// sequences are replaced with U+FFFD during parsing. See [`Extractor`] for
/// more details.
///
/// # Examples
///
/// ```rust
/// let html = r#"
///     <ol class="ranked-repositories">
///         <li><h3> <a href="/alice">alice</a> / <a href="/alice/proj1">proj1</a></h3></li>
///         <li class="last"></li>
///     </ol>
/// "#;
/// let repositories = trendinghubs_extract::extract(html).unwrap();
/// assert_eq!(repositories.len(), 1);
/// assert_eq!(repositories[0].to_string(), "alice/proj1");
/// ```
pub fn extract(html: impl AsRef<[u8]>) -> Result<Vec<RepositoryRecord>> {
    Ok(extract_with(html, EntryLayout::default())?.repositories)
}

/// Extracts the ranking with a specific [`EntryLayout`], keeping the
/// [`Report`] of skipped rows.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn extract_with(html: impl AsRef<[u8]>, layout: EntryLayout) -> Result<Extraction> {
    Extractor::from_bytes(html.as_ref())?.with_layout(layout).extraction()
}
