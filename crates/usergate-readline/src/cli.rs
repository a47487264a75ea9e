use clap::Parser;
use std::path::PathBuf;
use usergate_core::config::{BackendKind, RootConfig};

/// Account console: sign in, register, and moderate accounts.
#[derive(Parser, Debug, Default)]
#[command(name = "usergate", version, about)]
pub struct Args {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the file backend rooted at this directory
    #[arg(long, value_name = "PATH", conflicts_with = "memory")]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long)]
    pub memory: bool,

    /// Log filter, e.g. "debug" or "usergate_application=trace"
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut RootConfig) {
        if self.memory {
            config.backend.kind = BackendKind::Memory;
        }
        if let Some(dir) = &self.data_dir {
            config.backend.kind = BackendKind::File;
            config.backend.data_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
