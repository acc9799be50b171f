/// TOML parsing and validation of the configuration file
pub mod parser;

use crate::commands::{DEFAULT_IGNORE_NAME, StowOptions};
use crate::utils::paths::expand_tilde;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file path relative to the home directory
pub const DEFAULT_CONFIG_PATH: &str = ".config/nzmstow/config.toml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "NZMSTOW_CONFIG_PATH";

/// Defaults read from the optional configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Ignore file name and default target
    #[serde(default)]
    pub core: CoreConfig,

    /// Link kind
    #[serde(default)]
    pub link: LinkConfig,

    /// Worker pool size
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// `[core]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    /// Name of the per-directory ignore files
    #[serde(default = "default_ignore_file_name")]
    pub ignore_file_name: String,
    /// Target used when `-t` is not given
    #[serde(default)]
    pub default_target: Option<PathBuf>,
}

/// `[link]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LinkConfig {
    /// Create hard links instead of symlinks
    #[serde(default)]
    pub hard: bool,
    /// Store absolute paths in symlinks
    #[serde(default)]
    pub absolute: bool,
}

/// `[performance]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PerformanceConfig {
    /// Workers for parallel phases, 0 for one per CPU
    #[serde(default)]
    pub parallel_threads: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ignore_file_name: default_ignore_file_name(),
            default_target: None,
        }
    }
}

impl Config {
    /// Resolve the configuration file path.
    ///
    /// An explicit path wins, then `NZMSTOW_CONFIG_PATH`, then
    /// `~/.config/nzmstow/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return expand_tilde(path);
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return expand_tilde(Path::new(&path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a file; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        parser::parse_config_file(path)
    }

    /// Target directory from the file, with `~` expanded
    ///
    /// # Errors
    ///
    /// Returns an error if `~` is used and the home directory is unknown
    pub fn default_target(&self) -> Result<Option<PathBuf>> {
        self.core
            .default_target
            .as_deref()
            .map(expand_tilde)
            .transpose()
    }

    /// Options seeded from this file, before command-line overrides
    #[must_use]
    pub fn to_options(&self) -> StowOptions {
        StowOptions {
            create_hardlink: self.link.hard,
            create_absolute_link: self.link.absolute,
            ignore_file_name: self.core.ignore_file_name.clone(),
            parallel_threads: self.performance.parallel_threads,
            ..StowOptions::default()
        }
    }
}

fn default_ignore_file_name() -> String {
    DEFAULT_IGNORE_NAME.to_string()
}
