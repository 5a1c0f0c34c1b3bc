//! Shared configuration for the wlanstore CLI and embedders.
//!
//! Repository tunables and CLI defaults come from built-in defaults, a TOML
//! file in the platform config directory, and `WLANSTORE_` environment
//! variables (`__` separates nested keys), lowest precedence first.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wlanstore_core::RepositoryConfig;

const ENV_PREFIX: &str = "WLANSTORE_";
const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "store.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// CLI presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Where the profile store lives.
    #[serde(default)]
    pub store: StoreSettings,

    /// Repository tunables.
    #[serde(default)]
    pub repository: RepositoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreSettings {
    /// JSON store file. Defaults to `store.json` in the platform data dir.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Reject tunables the repository cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let repo = &self.repository;
        if repo.scan_cache_max_entries == 0 {
            return Err(ConfigError::Validation {
                field: "repository.scan_cache_max_entries".into(),
                reason: "must be at least 1".into(),
            });
        }
        if repo.scan_cache_trim_entries > repo.scan_cache_max_entries {
            return Err(ConfigError::Validation {
                field: "repository.scan_cache_trim_entries".into(),
                reason: format!(
                    "{} exceeds scan_cache_max_entries ({})",
                    repo.scan_cache_trim_entries, repo.scan_cache_max_entries
                ),
            });
        }
        if repo.max_num_active_channels_for_partial_scans == 0 {
            return Err(ConfigError::Validation {
                field: "repository.max_num_active_channels_for_partial_scans".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// The configured store file, or the platform default.
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(default_store_path)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "wlanstore", "wlanstore")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join(CONFIG_FILE),
        |dirs| dirs.config_dir().join(CONFIG_FILE),
    )
}

/// Default location of the JSON profile store.
pub fn default_store_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join(STORE_FILE),
        |dirs| dirs.data_dir().join(STORE_FILE),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wlanstore");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider stack for a given config file.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is not
/// an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    config.validate()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "configuration saved");
    Ok(())
}
