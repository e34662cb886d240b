//! Application configuration loaded from a TOML file.
//!
//! The core treats [`Config`] as read-only; only the bootstrap loads it
//! and, on first run, writes the defaults back to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level application configuration.
///
/// All fields have defaults so shlf works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Folder to watch. A leading `~` expands to `$HOME`.
    #[serde(default = "default_watched_folder")]
    pub watched_folder: String,
    #[serde(default)]
    pub show_hidden_files: bool,
    /// Upper bound on snapshot length. Must be positive.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watched_folder: default_watched_folder(),
            show_hidden_files: false,
            max_items: default_max_items(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed or `max_items` is `0`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, writing the defaults there first if it does not exist.
    ///
    /// An unreadable or malformed file falls back to the defaults (and is
    /// left untouched), so a bad config never prevents startup.
    pub fn load_or_create(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::NotFound(_)) => {
                let config = Self::default();
                if let Err(e) = config.save(path) {
                    tracing::warn!("could not write default config to {}: {e}", path.display());
                }
                config
            }
            Err(e) => {
                tracing::warn!("ignoring config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Writes this configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`CoreError::Io`] if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the watched folder with a leading `~` expanded.
    pub fn resolved_folder(&self) -> PathBuf {
        expand_tilde(&self.watched_folder)
    }

    /// The default config file location: `$HOME/.config/shlf/config.toml`.
    pub fn default_path() -> PathBuf {
        home_dir().join(".config").join("shlf").join("config.toml")
    }

    fn validate(&self) -> CoreResult<()> {
        if self.max_items == 0 {
            return Err(CoreError::ConfigParse(
                "max_items must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        return home_dir();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(raw),
    }
}

fn default_watched_folder() -> String {
    "~/Desktop".to_string()
}

fn default_max_items() -> usize {
    50
}
