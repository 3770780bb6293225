//! Configuration module for Vidixy
//!
//! Configuration is a small TOML file naming the node directory, the node
//! file extension, the log filter and the script engine limits. Every field
//! has a default, so an absent or partial file is fine.
//!
//! # Config Location
//!
//! When no explicit path is given, the file is looked up in the
//! platform-appropriate config directory:
//! - **Linux**: `~/.config/vidixy/config.toml`
//! - **macOS**: `~/Library/Application Support/vidixy/config.toml`
//! - **Windows**: `%APPDATA%\vidixy\config.toml`
//!
//! # Example
//!
//! ```toml
//! nodes_dir = "nodes"
//! extension = "rhai"
//! log_filter = "info,vidixy=debug"
//!
//! [limits]
//! max_operations = 500000
//! ```

use crate::error::{Result, VidixyError};
use crate::scripting::ScriptLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "vidixy";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default node directory, relative to the working directory
pub const DEFAULT_NODES_DIR: &str = "nodes";

/// Default node-definition file extension
pub const DEFAULT_EXTENSION: &str = "rhai";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info,vidixy=debug";

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VidixyConfig {
    /// Directory scanned for node-definition files
    #[serde(default = "default_nodes_dir")]
    pub nodes_dir: PathBuf,

    /// Extension of node-definition files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Tracing filter directive; `RUST_LOG` takes precedence
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Script engine limits
    #[serde(default)]
    pub limits: ScriptLimits,
}

fn default_nodes_dir() -> PathBuf {
    PathBuf::from(DEFAULT_NODES_DIR)
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for VidixyConfig {
    fn default() -> Self {
        Self {
            nodes_dir: default_nodes_dir(),
            extension: default_extension(),
            log_filter: None,
            limits: ScriptLimits::default(),
        }
    }
}

impl VidixyConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| VidixyError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VidixyError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml(&content).map_err(|e| e.with_context(format!("{:?}", path)))
    }

    /// Load the config from the default location, defaulting when absent
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the default config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VidixyError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Log filter to use when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(VidixyError::Config(format!(
                "Node file extension must be non-empty and given without a dot, got {:?}",
                self.extension
            )));
        }
        Ok(())
    }
}
