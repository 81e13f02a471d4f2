use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trendinghubs_cache::{DEFAULT_TIMEOUT, DEFAULT_URL, DEFAULT_USER_AGENT, MAX_AGE};
use trendinghubs_extract::{EntryLayout, NAME_OFFSET, OWNER_OFFSET};
use trendinghubs_render::Channel;

pub(crate) const APP_NAME: &str = "trendinghubs";
const SQLITE_FILE: &str = "cache.sqlite";

/// Where the trending page is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub user_agent: String,
    /// Whole-request timeout, in seconds.
    pub timeout: u32,
}
impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: u32::try_from(DEFAULT_TIMEOUT.as_secs()).unwrap_or(u32::MAX),
        }
    }
}
impl SourceConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.timeout))
    }

    fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            exn::bail!(ErrorKind::Invalid("source.url"));
        }
        if self.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("source.user_agent"));
        }
        if self.timeout == 0 {
            exn::bail!(ErrorKind::Invalid("source.timeout"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a snapshot is served before refetching, in seconds.
    pub max_age: u32,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: u32::try_from(MAX_AGE.whole_seconds()).unwrap_or(u32::MAX),
        }
    }
}
impl CacheConfig {
    pub fn max_age(&self) -> time::Duration {
        time::Duration::seconds(i64::from(self.max_age))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One file per key under a directory.
    #[default]
    Local,
    /// One SQLite database file.
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Directory for `local`, database file for `sqlite`. Defaults to the
    /// platform cache directory.
    pub path: Option<PathBuf>,
    /// Serve and refresh, but never write the snapshot back.
    pub read_only: bool,
}
impl StorageConfig {
    /// The configured path, or the default for the configured backend.
    pub fn location(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "", APP_NAME).ok_or_raise(|| ErrorKind::NoDirectories)?;
        let cache_dir = dirs.cache_dir().to_path_buf();
        Ok(match self.backend {
            BackendKind::Local => cache_dir,
            BackendKind::Sqlite => cache_dir.join(SQLITE_FILE),
        })
    }

    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path
            && !path.is_absolute()
        {
            exn::bail!(ErrorKind::Invalid("storage.path"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Positional,
    Anchors,
}

/// How ranking entries are decoded. Offsets only apply to `positional`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub layout: LayoutKind,
    pub owner_offset: usize,
    pub name_offset: usize,
}
impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::default(),
            owner_offset: OWNER_OFFSET,
            name_offset: NAME_OFFSET,
        }
    }
}
impl ExtractConfig {
    pub fn layout(&self) -> EntryLayout {
        match self.layout {
            LayoutKind::Positional => EntryLayout::Positional {
                owner: self.owner_offset,
                name: self.name_offset,
            },
            LayoutKind::Anchors => EntryLayout::Anchors,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.layout == LayoutKind::Positional && self.owner_offset == self.name_offset {
            exn::bail!(ErrorKind::Invalid("extract.name_offset"));
        }
        Ok(())
    }
}

/// Published channel metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
}
impl Default for FeedConfig {
    fn default() -> Self {
        let channel = Channel::default();
        Self {
            title: channel.title,
            link: channel.link,
            description: channel.description,
            language: channel.language,
        }
    }
}
impl FeedConfig {
    pub fn channel(&self) -> Channel {
        Channel {
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            language: self.language.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        self.channel().validate().or_raise(|| ErrorKind::Invalid("feed"))
    }
}

/// Complete configuration, every section optional in every layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub extract: ExtractConfig,
    pub feed: FeedConfig,
}
impl Config {
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        if self.cache.max_age == 0 {
            exn::bail!(ErrorKind::Invalid("cache.max_age"));
        }
        self.storage.validate()?;
        self.extract.validate()?;
        self.feed.validate()
    }
}
