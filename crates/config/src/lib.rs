//! Layered configuration.
//!
//! Values are resolved from, lowest to highest priority:
//! 1. built-in defaults,
//! 2. a configuration file (`--config`, or `config.toml` in the platform
//!    configuration directory if it exists); YAML and JSON are accepted when
//!    the file extension says so,
//! 3. environment variables prefixed `TRENDINGHUBS_`, with `__` separating
//!    nested keys: `TRENDINGHUBS_CACHE__MAX_AGE=600`.

pub mod error;
mod sections;

use crate::error::{ErrorKind, Result};
use crate::sections::APP_NAME;
pub use crate::sections::{
    BackendKind, CacheConfig, Config, ExtractConfig, FeedConfig, LayoutKind, SourceConfig, StorageConfig,
};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "TRENDINGHUBS_";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Loads, merges and validates every layer.
    ///
    /// An explicit `file` must exist. Without one, the default location is
    /// used only if there's a file there.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_file().filter(|path| path.is_file()),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file, using defaults and environment"),
        }
        Self::from_figment(Self::figment(file.as_deref()))
    }

    /// Where the configuration file is looked for when none is given.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Builds the layered provider without reading anything yet.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }
}
