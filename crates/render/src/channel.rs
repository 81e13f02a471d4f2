use crate::error::{ErrorKind, Result};

pub const DEFAULT_TITLE: &str = "GitHub - Trending GitHub Repositories";
pub const DEFAULT_LINK: &str = "https://www.github.com";
pub const DEFAULT_DESCRIPTION: &str = "The daily trending repositories";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Metadata of the published RSS channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// RFC 5646 language tag.
    pub language: String,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            link: DEFAULT_LINK.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Channel {
    /// RSS requires a title, an absolute link and a description.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidChannel("title"));
        }
        if !(self.link.starts_with("https://") || self.link.starts_with("http://")) {
            exn::bail!(ErrorKind::InvalidChannel("link"));
        }
        if self.description.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidChannel("description"));
        }
        if self.language.trim().is_empty() || self.language.contains(char::is_whitespace) {
            exn::bail!(ErrorKind::InvalidChannel("language"));
        }
        Ok(())
    }

    pub(crate) fn to_value(&self) -> upon::Value {
        upon::value! {
            title: &self.title,
            link: &self.link,
            description: &self.description,
            language: &self.language,
        }
    }
}
