//! Unified path management for usergate files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/usergate/          # Config directory
//! ├── config.toml              # Application configuration
//! └── logs/                    # Application logs
//!     └── usergate.log.YYYY-MM-DD
//!
//! ~/.local/share/usergate/     # Data directory (file backend)
//! ├── credentials.toml         # Local credential store
//! └── documents/               # One JSON file per collection
//!     └── users.json
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "usergate";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for usergate.
///
/// Platform directories come from the `dirs` crate (XDG on Linux, the
/// native locations on macOS and Windows).
pub struct UsergatePaths;

impl UsergatePaths {
    /// Returns the usergate configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the usergate data directory used by the file backend.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory rolling log files are written to.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Credential file inside a data directory.
    pub fn credentials_file(data_dir: &Path) -> PathBuf {
        data_dir.join("credentials.toml")
    }

    /// Document collections directory inside a data directory.
    pub fn documents_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("documents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_layout_is_relative_to_data_dir() {
        let root = Path::new("/tmp/usergate-test");
        assert_eq!(
            UsergatePaths::credentials_file(root),
            root.join("credentials.toml")
        );
        assert_eq!(UsergatePaths::documents_dir(root), root.join("documents"));
    }

    #[test]
    fn test_config_file_lives_in_config_dir() {
        if let (Ok(dir), Ok(file)) = (UsergatePaths::config_dir(), UsergatePaths::config_file()) {
            assert_eq!(file, dir.join("config.toml"));
            assert!(dir.ends_with(APP_DIR));
        }
    }
}
