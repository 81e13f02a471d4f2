//! RSS 2.0 rendering of a [`FeedSnapshot`].
//!
//! The document is produced from an [upon] template. Everything that comes
//! from the trending page or from configuration goes through the `xml`
//! formatter, so owner and repository names are escaped here and nowhere else.
//!
//! | Variable              | Type     | Description                               |
//! |-----------------------|----------|-------------------------------------------|
//! | `channel.title`       | `String` | Channel title                             |
//! | `channel.link`        | `String` | Channel link                              |
//! | `channel.description` | `String` | Channel description                       |
//! | `channel.language`    | `String` | Channel language tag                      |
//! | `built`               | `String` | Snapshot timestamp, RFC 2822              |
//! | `items[].owner`       | `String` | Repository owner                          |
//! | `items[].name`        | `String` | Repository name                           |
//! | `items[].link`        | `String` | Repository URL                            |

mod channel;
pub mod error;

pub use crate::channel::{Channel, DEFAULT_DESCRIPTION, DEFAULT_LANGUAGE, DEFAULT_LINK, DEFAULT_TITLE};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;
use tracing::instrument;
use trendinghubs_cache::FeedSnapshot;
use trendinghubs_extract::models::RepositoryRecord;
use upon::{Engine, Template};

pub const CONTENT_TYPE: &str = "application/rss+xml";
const TEMPLATE: &str = include_str!("../templates/rss.xml");

/// Renders snapshots into RSS documents for one [`Channel`].
///
/// The template is compiled once on construction, then reused for every
/// [`render`](Self::render) call.
pub struct FeedRenderer {
    engine: Engine<'static>,
    template: Template<'static>,
    channel: Channel,
}

impl FeedRenderer {
    pub fn new(channel: Channel) -> Result<Self> {
        channel.validate()?;
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(TEMPLATE).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, channel })
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Renders the whole document, items in ranking order.
    #[instrument(skip_all, fields(records = snapshot.records.len()))]
    pub fn render(&self, snapshot: &FeedSnapshot) -> Result<String> {
        self.template
            .render(&self.engine, self.parameters(snapshot)?)
            .to_string()
            .or_raise(|| ErrorKind::Template)
    }

    fn parameters(&self, snapshot: &FeedSnapshot) -> Result<upon::Value> {
        let built = OffsetDateTime::from_unix_timestamp(snapshot.timestamp.unix_timestamp())
            .or_raise(|| ErrorKind::Date)?
            .format(&Rfc2822)
            .or_raise(|| ErrorKind::Date)?;
        let items: Vec<upon::Value> = snapshot.records.iter().map(Self::item).collect();
        Ok(upon::value! {
            channel: self.channel.to_value(),
            built: built,
            items: items,
        })
    }

    fn item(record: &RepositoryRecord) -> upon::Value {
        upon::value! {
            owner: record.owner(),
            name: record.name(),
            link: record.url(),
        }
    }
}

/// Custom [`upon`] extensions for XML output.
mod addons {
    use quick_xml::escape::escape;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    fn xml_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", escape(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Registers the `xml` formatter on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("xml", xml_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::UtcDateTime;

    fn snapshot(records: &[(&str, &str)]) -> FeedSnapshot {
        FeedSnapshot::new(
            UtcDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            records.iter().map(|&(owner, name)| RepositoryRecord::new(owner, name)).collect(),
        )
    }

    fn renderer() -> FeedRenderer {
        FeedRenderer::new(Channel::default()).unwrap()
    }

    #[test]
    fn test_channel_header() {
        let xml = renderer().render(&snapshot(&[])).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<rss version=\"2.0\">"));
        assert!(xml.contains("<title>GitHub - Trending GitHub Repositories</title>"));
        assert!(xml.contains("<link>https://www.github.com</link>"));
        assert!(xml.contains("<description>The daily trending repositories</description>"));
        assert!(xml.contains("<language>en-US</language>"));
        assert!(xml.contains("<lastBuildDate>Tue, 14 Nov 2023 22:13:20 +0000</lastBuildDate>"));
        assert!(!xml.contains("<item>"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn test_items_in_ranking_order() {
        let xml = renderer().render(&snapshot(&[("alice", "proj1"), ("bob", "proj2")])).unwrap();
        assert_eq!(xml.matches("<item>").count(), 2);
        let alice = xml.find("<title>alice / proj1</title>").unwrap();
        let bob = xml.find("<title>bob / proj2</title>").unwrap();
        assert!(alice < bob);
        assert!(xml.contains("<link>https://github.com/alice/proj1</link>"));
        assert!(xml.contains("<author>bob</author>"));
    }

    #[test]
    fn test_escapes_untrusted_text() {
        let xml = renderer().render(&snapshot(&[("a&b", "<script>\"x\"</script>")])).unwrap();
        assert!(xml.contains("<title>a&amp;b / &lt;script&gt;&quot;x&quot;&lt;/script&gt;</title>"));
        assert!(xml.contains("<author>a&amp;b</author>"));
        assert!(!xml.contains("<script>"));
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("Tom & Jerry", "Tom &amp; Jerry")]
    #[case("it's", "it&apos;s")]
    #[case("ünïcödé", "ünïcödé")]
    fn test_escapes_owner(#[case] owner: &str, #[case] expected: &str) {
        let xml = renderer().render(&snapshot(&[(owner, "proj")])).unwrap();
        assert!(xml.contains(&format!("<author>{expected}</author>")), "{xml}");
    }

    #[test]
    fn test_custom_channel() {
        let channel = Channel {
            title: "Trending & more".into(),
            link: "https://example.com/trending".into(),
            ..Channel::default()
        };
        let renderer = FeedRenderer::new(channel).unwrap();
        assert_eq!(renderer.channel().link, "https://example.com/trending");
        let xml = renderer.render(&snapshot(&[])).unwrap();
        assert!(xml.contains("<title>Trending &amp; more</title>"));
        assert!(xml.contains("<link>https://example.com/trending</link>"));
    }

    #[test]
    fn test_rejects_invalid_channel() {
        let channel = Channel { link: "github".into(), ..Channel::default() };
        assert!(FeedRenderer::new(channel).is_err());
    }
}
