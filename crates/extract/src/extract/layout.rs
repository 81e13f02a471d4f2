use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::RepositoryRecord;
use exn::OptionExt;
use scraper::ElementRef;

/// How an entry's heading encodes the owner and the repository name.
///
/// Both layouts share the same failure policy: if the expected shape isn't
/// there, decoding fails with [`ErrorKind::MalformedEntry`] and the caller
/// skips that single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLayout {
    /// Read the text of the heading's child nodes at fixed offsets. Child
    /// nodes include text nodes, so the default offsets (1 and 3) address
    /// `text, owner-link, separator, name-link`.
    Positional { owner: usize, name: usize },
    /// Read the text of the first two non-empty `<a>` descendants of the
    /// heading, wherever they are.
    Anchors,
}
impl Default for EntryLayout {
    fn default() -> Self {
        Self::Positional {
            owner: consts::OWNER_OFFSET,
            name: consts::NAME_OFFSET,
        }
    }
}

impl EntryLayout {
    /// Decodes one repository from an entry's heading element.
    pub fn decode(&self, heading: ElementRef<'_>) -> Result<RepositoryRecord> {
        match *self {
            Self::Positional { owner, name } => Ok(RepositoryRecord::new(
                child_text(heading, owner, "owner")?,
                child_text(heading, name, "name")?,
            )),
            Self::Anchors => {
                let mut texts = heading.select(&consts::ANCHOR_SELECTOR).filter_map(text_of);
                let owner = texts.next().ok_or_raise(|| ErrorKind::MalformedEntry {
                    field: "owner",
                    position: 0,
                })?;
                let name = texts.next().ok_or_raise(|| ErrorKind::MalformedEntry {
                    field: "name",
                    position: 1,
                })?;
                Ok(RepositoryRecord::new(owner, name))
            },
        }
    }
}

/// Trimmed text content of an element, `None` if there isn't any.
fn text_of(element: ElementRef<'_>) -> Option<String> {
    Some(element.text().collect::<String>().trim().to_string()).filter(|s| !s.is_empty())
}

/// Text of the heading's child node at `index`. The node must be an element;
/// a bare text node at that offset means the layout has shifted.
fn child_text(heading: ElementRef<'_>, index: usize, field: &'static str) -> Result<String> {
    heading
        .children()
        .nth(index)
        .and_then(ElementRef::wrap)
        .and_then(text_of)
        .ok_or_raise(|| ErrorKind::MalformedEntry { field, position: index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_first_with_tag;
    use rstest::rstest;
    use scraper::Html;

    fn decode(html: &str, layout: EntryLayout) -> Result<RepositoryRecord> {
        let document = Html::parse_fragment(html);
        let heading = find_first_with_tag(document.root_element(), "h3").unwrap();
        layout.decode(heading)
    }

    #[rstest]
    #[case(EntryLayout::default())]
    #[case(EntryLayout::Anchors)]
    fn test_decodes_standard_heading(#[case] layout: EntryLayout) {
        let html = "<h3>\n  <a href=\"/alice\">alice</a> / <a href=\"/alice/proj1\">proj1</a>\n</h3>";
        assert_eq!(decode(html, layout).unwrap(), RepositoryRecord::new("alice", "proj1"));
    }

    #[test]
    fn test_positional_trims_link_text() {
        let html = "<h3> <a>  alice\n</a> / <a>\n proj1 </a></h3>";
        assert_eq!(decode(html, EntryLayout::default()).unwrap(), RepositoryRecord::new("alice", "proj1"));
    }

    #[test]
    fn test_positional_missing_name_offset() {
        let html = "<h3> <a>alice</a> / </h3>";
        let err = decode(html, EntryLayout::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedEntry { field: "name", position: 3 });
    }

    #[test]
    fn test_positional_text_node_at_offset() {
        // Without the leading whitespace every element shifts one position left.
        let html = "<h3><a>alice</a> / <a>proj1</a></h3>";
        let err = decode(html, EntryLayout::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedEntry { field: "owner", position: 1 });
    }

    #[test]
    fn test_positional_custom_offsets() {
        let html = "<h3><a>alice</a> / <a>proj1</a></h3>";
        let layout = EntryLayout::Positional { owner: 0, name: 2 };
        assert_eq!(decode(html, layout).unwrap(), RepositoryRecord::new("alice", "proj1"));
    }

    #[test]
    fn test_positional_empty_link() {
        let html = "<h3> <a>alice</a> / <a> </a></h3>";
        assert!(decode(html, EntryLayout::default()).is_err());
    }

    #[test]
    fn test_anchors_ignore_surrounding_markup() {
        let html = "<h3><span class=\"icon\"></span><a><em>alice</em></a><span> / </span><a>proj1</a><a>extra</a></h3>";
        assert_eq!(decode(html, EntryLayout::Anchors).unwrap(), RepositoryRecord::new("alice", "proj1"));
    }

    #[test]
    fn test_anchors_single_link() {
        let html = "<h3><a>alice</a></h3>";
        let err = decode(html, EntryLayout::Anchors).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedEntry { field: "name", position: 1 });
    }
}
