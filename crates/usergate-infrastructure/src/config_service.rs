//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (by default
//! `~/.config/usergate/config.toml`), creating it with defaults if missing.

use crate::paths::UsergatePaths;
use crate::storage::{AtomicFile, Toml};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use usergate_core::UsergateError;
use usergate_core::config::RootConfig;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform config file.
    pub fn new() -> Result<Self, UsergateError> {
        let path = UsergatePaths::config_file().map_err(|e| UsergateError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading an explicit config file.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A missing file is created with default values.
    pub fn get_config(&self) -> Result<RootConfig, UsergateError> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RootConfig, UsergateError> {
        let file = AtomicFile::<RootConfig, Toml>::new(self.path.clone());

        match file.load() {
            Ok(Some(config)) => Ok(config),
            Ok(None) => {
                let default_config = RootConfig::default();
                file.save(&default_config)
                    .map_err(|e| UsergateError::config(format!("Failed to save default config: {}", e)))?;
                tracing::info!(path = %self.path.display(), "Created default configuration");
                Ok(default_config)
            }
            Err(e) => Err(UsergateError::config(format!(
                "Failed to load {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
