//! Main extraction logic for the trending page.

mod layout;
mod report;

use std::convert::Infallible;
use std::str::FromStr;

pub use self::layout::EntryLayout;
pub use self::report::Report;
use crate::consts;
use crate::error::{Error, ErrorKind, Result};
use crate::matcher::{find_first_with_class, find_first_with_tag, has_class};
use crate::models::RepositoryRecord;
use exn::OptionExt;
use scraper::{ElementRef, Html};
use tracing::instrument;

/// Repositories decoded from one document, plus what was skipped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// In the page's own ranking order.
    pub repositories: Vec<RepositoryRecord>,
    pub report: Report,
}

#[derive(Debug)]
pub struct Extractor {
    document: Html,
    layout: EntryLayout,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self {
            document,
            layout: EntryLayout::default(),
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::from_document(Html::parse_document(html))
    }

    /// Construct an [`Extractor`] from a raw response body.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD. HTML parsing itself
    /// never fails, so the only rejected input is a body that doesn't contain
    /// any markup at all.
    pub fn from_bytes(html: &[u8]) -> Result<Self> {
        if html.iter().all(u8::is_ascii_whitespace) {
            exn::bail!(ErrorKind::MalformedHtml("empty document"));
        }
        if memchr::memchr(b'<', html).is_none() {
            exn::bail!(ErrorKind::MalformedHtml("no markup found"));
        }
        Ok(Self::from_html(&String::from_utf8_lossy(html)))
    }

    pub fn with_layout(mut self, layout: EntryLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Quick check for the ranking container without decoding any entries.
    pub fn has_container(&self) -> bool {
        self.container().is_ok()
    }

    fn container(&self) -> Result<ElementRef<'_>> {
        find_first_with_class(self.document.root_element(), consts::CONTAINER_CLASS)
            .ok_or_raise(|| ErrorKind::ContainerNotFound(consts::CONTAINER_CLASS))
    }

    /// Decodes every ranking entry inside the container.
    ///
    /// Entries are returned in document order. The sentinel row, children
    /// without a heading, and headings that don't match the [`EntryLayout`]
    /// are skipped and counted in the [`Report`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ContainerNotFound`] if the document has no
    /// ranking container. An empty container is not an error.
    #[instrument(skip(self), fields(layout = ?self.layout))]
    pub fn extraction(&self) -> Result<Extraction> {
        let container = self.container()?;
        let mut report = Report::default();
        let mut repositories = Vec::new();
        for (position, child) in container.children().filter_map(ElementRef::wrap).enumerate() {
            report.children += 1;
            if has_class(consts::SENTINEL_CLASS, &child) {
                report.sentinels += 1;
                continue;
            }
            let Some(heading) = find_first_with_tag(child, consts::HEADING_TAG) else {
                report.ignored += 1;
                continue;
            };
            match self.layout.decode(heading) {
                Ok(repository) => {
                    report.entries += 1;
                    repositories.push(repository);
                },
                Err(err) => {
                    report.malformed += 1;
                    tracing::warn!(position, error = ?err, "Skipping malformed ranking entry");
                },
            }
        }
        if report.is_suspicious() {
            tracing::warn!(%report, "Ranking container found but no entries decoded, page structure may have changed");
        } else {
            tracing::debug!(%report, "Extracted ranking");
        }
        Ok(Extraction { repositories, report })
    }

    /// Like [`extraction`](Self::extraction), without the report.
    pub fn repositories(&self) -> Result<Vec<RepositoryRecord>> {
        Ok(self.extraction()?.repositories)
    }
}
impl FromStr for Extractor {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_html(s))
    }
}
impl From<Html> for Extractor {
    fn from(document: Html) -> Self {
        Self::from_document(document)
    }
}

impl TryFrom<Extractor> for Extraction {
    type Error = Error;
    fn try_from(extractor: Extractor) -> Result<Self> {
        extractor.extraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(owner: &str, name: &str) -> String {
        format!("<li><div class=\"meta\">stars</div><h3>\n  <a href=\"/{owner}\">{owner}</a> / <a href=\"/{owner}/{name}\">{name}</a>\n</h3></li>")
    }

    fn page(items: &str) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>Explore</title></head><body><div id=\"main\"><ol class=\"ranked-repositories list\">{items}</ol></div></body></html>"
        )
    }

    #[test]
    fn test_two_entries_and_sentinel() {
        let html = page(&format!(
            "{}{}<li class=\"last\"><h3> <a>carol</a> / <a>proj3</a></h3></li>",
            entry("alice", "proj1"),
            entry("bob", "proj2")
        ));
        let extraction = Extractor::from_html(&html).extraction().unwrap();
        assert_eq!(
            extraction.repositories,
            vec![RepositoryRecord::new("alice", "proj1"), RepositoryRecord::new("bob", "proj2")]
        );
        assert_eq!(
            extraction.report,
            Report {
                children: 3,
                entries: 2,
                sentinels: 1,
                ignored: 0,
                malformed: 0
            }
        );
    }

    #[test]
    fn test_preserves_document_order() {
        let names = ["zeta", "alpha", "mu", "beta", "omega"];
        let items: String = names.iter().map(|n| entry("owner", n)).collect();
        let repositories = Extractor::from_html(&page(&items)).repositories().unwrap();
        let extracted: Vec<_> = repositories.iter().map(RepositoryRecord::name).collect();
        assert_eq!(extracted, names);
    }

    #[test]
    fn test_sentinel_excluded_anywhere() {
        let html = page(&format!(
            "<li class=\"item last\"><h3> <a>first</a> / <a>row</a></h3></li>{}",
            entry("bob", "proj2")
        ));
        let repositories = Extractor::from_html(&html).repositories().unwrap();
        assert_eq!(repositories, vec![RepositoryRecord::new("bob", "proj2")]);
    }

    #[test]
    fn test_children_without_heading_are_skipped() {
        let html = page(&format!("<li class=\"header\">Trending today</li>{}<li></li>", entry("alice", "proj1")));
        let extraction = Extractor::from_html(&html).extraction().unwrap();
        assert_eq!(extraction.repositories, vec![RepositoryRecord::new("alice", "proj1")]);
        assert_eq!(extraction.report.ignored, 2);
    }

    #[test]
    fn test_malformed_entry_does_not_abort() {
        let html = page(&format!(
            "{}<li><h3><a>lonely</a></h3></li>{}",
            entry("alice", "proj1"),
            entry("bob", "proj2")
        ));
        let extraction = Extractor::from_html(&html).extraction().unwrap();
        assert_eq!(
            extraction.repositories,
            vec![RepositoryRecord::new("alice", "proj1"), RepositoryRecord::new("bob", "proj2")]
        );
        assert_eq!(extraction.report.malformed, 1);
    }

    #[test]
    fn test_empty_container() {
        let extraction = Extractor::from_html(&page("")).extraction().unwrap();
        assert!(extraction.repositories.is_empty());
        assert!(!extraction.report.is_suspicious());
    }

    #[test]
    fn test_container_found_but_nothing_decoded() {
        let html = page("<li><h3>no links here</h3></li><li class=\"last\"></li>");
        let extraction = Extractor::from_html(&html).extraction().unwrap();
        assert!(extraction.repositories.is_empty());
        assert!(extraction.report.is_suspicious());
    }

    #[test]
    fn test_container_not_found() {
        let extractor = Extractor::from_html("<html><body><ol class=\"repositories\"></ol></body></html>");
        assert!(!extractor.has_container());
        let err = extractor.extraction().unwrap_err();
        assert_eq!(*err, ErrorKind::ContainerNotFound("ranked-repositories"));
    }

    #[test]
    fn test_container_may_be_any_element() {
        let html = format!("<html><body><section><div class=\"ranked-repositories\">{}</div></section></body></html>", entry("alice", "proj1"));
        let repositories = Extractor::from_html(&html).repositories().unwrap();
        assert_eq!(repositories, vec![RepositoryRecord::new("alice", "proj1")]);
    }

    #[test]
    fn test_anchor_layout() {
        let html = page("<li><h3><a>alice</a><span>/</span><a>proj1</a></h3></li>");
        let positional = Extractor::from_html(&html).extraction().unwrap();
        assert_eq!(positional.report.malformed, 1);
        let anchors = Extractor::from_html(&html).with_layout(EntryLayout::Anchors).repositories().unwrap();
        assert_eq!(anchors, vec![RepositoryRecord::new("alice", "proj1")]);
    }

    #[test]
    fn test_from_bytes_rejects_non_markup() {
        assert_eq!(*Extractor::from_bytes(b"").unwrap_err(), ErrorKind::MalformedHtml("empty document"));
        assert_eq!(*Extractor::from_bytes(b"  \n\t").unwrap_err(), ErrorKind::MalformedHtml("empty document"));
        assert_eq!(*Extractor::from_bytes(b"{\"json\": true}").unwrap_err(), ErrorKind::MalformedHtml("no markup found"));
    }

    #[test]
    fn test_from_bytes_tolerates_invalid_utf8() {
        let mut html = page(&entry("alice", "proj1")).into_bytes();
        html.splice(0..0, [0xff, 0xfe]);
        let repositories = Extractor::from_bytes(&html).unwrap().repositories().unwrap();
        assert_eq!(repositories, vec![RepositoryRecord::new("alice", "proj1")]);
    }
}
