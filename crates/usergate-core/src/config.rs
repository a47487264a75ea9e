//! Configuration model loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend the console talks to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Credentials and documents persisted under the data directory.
    #[default]
    File,
    /// Everything held in memory and lost on exit.
    Memory,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Overrides the platform data directory for the file backend.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    /// Collection holding account profile documents.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

fn default_collection() -> String {
    "users".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModerationConfig {
    /// Maximum number of directory writes in flight for one batch action.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

fn default_batch_concurrency() -> usize {
    8
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CredentialsConfig {
    /// Shortest password the local credential backend accepts.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
        }
    }
}

fn default_min_password_length() -> usize {
    6
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}
