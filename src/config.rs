//! Configuration.
//!
//! Connection profiles are parsed from a TOML file and keyed by a
//! logical connection name; the model layer resolves its connection by
//! that name through a process-wide installed configuration.
//!
//! ```toml
//! storage_root = "storage"
//!
//! [connections.default]
//! driver = "sqlite"
//! path = "app.db"
//!
//! [connections.analytics]
//! driver = "mysql"
//! host = "db.example.com"
//! port = 3306
//! database = "analytics"
//! user = "reporting"
//! password = "secret"
//! ```

use crate::core::db::ConnectionConfig;
use crate::core::{ReliteError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Prefix under which file-based database paths resolve; profiles
    /// may override it individually.
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
    /// Connection profiles keyed by logical name.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

static INSTALLED: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

impl Config {
    /// Loads configuration from a TOML file at the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ReliteError::Config(format!("invalid configuration: {}", e)))
    }

    /// The conventional location of the user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("relite").join("config.toml"))
    }

    /// Loads the configuration from its conventional location.
    pub fn load_default() -> Result<Config> {
        let path = Config::default_path()
            .ok_or_else(|| ReliteError::Config("no user configuration directory".to_string()))?;
        Config::load(path)
    }

    /// Resolves a connection profile by name, applying the
    /// configuration-wide storage root to profiles without their own.
    pub fn connection(&self, name: &str) -> Result<ConnectionConfig> {
        let mut profile = self
            .connections
            .get(name)
            .cloned()
            .ok_or_else(|| {
                ReliteError::Config(format!("connection '{}' is not configured", name))
            })?;
        if profile.storage_root.is_none() {
            profile.storage_root = self.storage_root.clone();
        }
        Ok(profile)
    }

    /// Merges this configuration into the process-wide one the model
    /// layer resolves connections from. Profiles with the same name
    /// replace earlier ones.
    pub fn install(self) {
        let mut installed = INSTALLED.write().unwrap_or_else(|e| e.into_inner());
        if self.storage_root.is_some() {
            installed.storage_root = self.storage_root;
        }
        installed.connections.extend(self.connections);
    }
}

/// Resolves a connection profile from the installed configuration.
pub fn connection(name: &str) -> Result<ConnectionConfig> {
    INSTALLED
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .connection(name)
}
