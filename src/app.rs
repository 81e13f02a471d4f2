//! Command implementations, wired from configuration.

use crate::cli::Command;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcDateTime};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use trendinghubs_cache::{BackendHandle, FeedCache, FeedSnapshot, HttpSource, SystemClock};
use trendinghubs_config::{BackendKind, Config, StorageConfig};
use trendinghubs_extract::{EntryLayout, Extraction, extract_with};
use trendinghubs_render::FeedRenderer;
use trendinghubs_storage::backend::{LocalBackend, ReadOnlyBackend, SqliteBackend};

pub struct App {
    cache: FeedCache,
    renderer: FeedRenderer,
    layout: EntryLayout,
    read_only: bool,
}

impl App {
    pub fn new(cache: FeedCache, renderer: FeedRenderer, layout: EntryLayout) -> Self {
        Self {
            cache,
            renderer,
            layout,
            read_only: false,
        }
    }

    /// Marks the storage as read-only, so commands don't report writes that
    /// never happen.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage = backend(&config.storage).await?;
        let source = HttpSource::new(&config.source.url, &config.source.user_agent, config.source.timeout())
            .or_raise(|| ErrorKind::Config)?;
        let layout = config.extract.layout();
        let cache = FeedCache::new(storage, Arc::new(source), Arc::new(SystemClock))
            .with_max_age(config.cache.max_age())
            .with_layout(layout);
        let renderer = FeedRenderer::new(config.feed.channel()).or_raise(|| ErrorKind::Config)?;
        Ok(Self::new(cache, renderer, layout).with_read_only(config.storage.read_only))
    }

    pub async fn run(&self, command: &Command, out: &mut (impl AsyncWrite + Unpin)) -> Result<()> {
        match command {
            Command::Feed { output, refresh } => {
                let snapshot = self.snapshot(*refresh).await?;
                let xml = self.renderer.render(&snapshot).or_raise(|| ErrorKind::Render)?;
                match output {
                    Some(path) => {
                        tokio::fs::write(path, xml).await.or_raise(|| ErrorKind::Output)?;
                        tracing::info!(path = %path.display(), records = snapshot.records.len(), "Wrote feed");
                    },
                    None => write(out, &xml).await?,
                }
            },
            Command::List { refresh } => write(out, &list(&self.snapshot(*refresh).await?)).await?,
            Command::Extract { file } => extract(file, self.layout, out).await?,
            Command::Status => {
                let snapshot = self.cache.peek().await.or_raise(|| ErrorKind::Cache)?;
                let report = status(snapshot.as_ref(), self.cache.now(), self.cache.max_age())?;
                write(out, &report).await?;
            },
            Command::Purge if self.read_only => {
                tracing::info!("Storage is read-only, not purging");
                write(out, "Storage is read-only, cached ranking left in place\n").await?;
            },
            Command::Purge => {
                let message = match self.cache.purge().await.or_raise(|| ErrorKind::Cache)? {
                    true => "Purged cached ranking\n",
                    false => "No cached ranking to purge\n",
                };
                write(out, message).await?;
            },
        }
        Ok(())
    }

    async fn snapshot(&self, refresh: bool) -> Result<FeedSnapshot> {
        let snapshot = match refresh {
            true => self.cache.refresh().await,
            false => self.cache.get().await,
        };
        snapshot.or_raise(|| ErrorKind::Cache)
    }
}

/// Runs the extractor over a saved page. Needs neither storage nor network.
pub async fn extract(file: &Path, layout: EntryLayout, out: &mut (impl AsyncWrite + Unpin)) -> Result<()> {
    let html = tokio::fs::read(file).await.or_raise(|| ErrorKind::Input)?;
    let extraction = extract_with(&html, layout).or_raise(|| ErrorKind::Extract)?;
    write(out, &extraction_report(&extraction)).await
}

async fn backend(config: &StorageConfig) -> Result<BackendHandle> {
    let location = config.location().or_raise(|| ErrorKind::Config)?;
    let backend: BackendHandle = match config.backend {
        BackendKind::Local => Arc::new(LocalBackend::new("local", &location).or_raise(|| ErrorKind::Storage)?),
        BackendKind::Sqlite => {
            if let Some(parent) = location.parent() {
                tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Storage)?;
            }
            Arc::new(SqliteBackend::connect("sqlite", &location).await.or_raise(|| ErrorKind::Storage)?)
        },
    };
    tracing::debug!(backend = backend.name(), location = %location.display(), read_only = config.read_only, "Opened storage");
    Ok(match config.read_only {
        true => Arc::new(ReadOnlyBackend::new(backend)),
        false => backend,
    })
}

async fn write(out: &mut (impl AsyncWrite + Unpin), text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await.or_raise(|| ErrorKind::Output)?;
    out.flush().await.or_raise(|| ErrorKind::Output)
}

fn list(snapshot: &FeedSnapshot) -> String {
    snapshot
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| format!("{:>3}. {record}\n", index + 1))
        .collect()
}

fn extraction_report(extraction: &Extraction) -> String {
    let mut report = String::new();
    for (index, record) in extraction.repositories.iter().enumerate() {
        report.push_str(&format!("{:>3}. {record}\n", index + 1));
    }
    report.push_str(&format!("\n{}\n", extraction.report));
    if extraction.report.is_suspicious() {
        report.push_str("warning: ranking container found but no entry could be decoded\n");
    }
    report
}

fn status(snapshot: Option<&FeedSnapshot>, now: UtcDateTime, max_age: Duration) -> Result<String> {
    let Some(snapshot) = snapshot else {
        return Ok("No cached ranking\n".to_string());
    };
    let fetched = OffsetDateTime::from_unix_timestamp(snapshot.timestamp.unix_timestamp())
        .or_raise(|| ErrorKind::Output)?
        .format(&Rfc3339)
        .or_raise(|| ErrorKind::Output)?;
    let age = snapshot.age_at(now);
    let state = match snapshot.is_valid_at(now, max_age) {
        true => format!("valid, expires in {}", human(max_age - age)),
        false => format!("expired {} ago", human(age - max_age)),
    };
    Ok(format!(
        "fetched:      {fetched}\nage:          {}\nrepositories: {}\nstatus:       {state}\n",
        human(age),
        snapshot.records.len()
    ))
}

fn human(duration: Duration) -> String {
    let sign = if duration.is_negative() { "-" } else { "" };
    let seconds = duration.whole_seconds().unsigned_abs();
    format!("{sign}{}h{:02}m{:02}s", seconds / 3600, seconds % 3600 / 60, seconds % 60)
}
