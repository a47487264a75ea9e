//! Atomic file operations with ACID guarantees.
//!
//! Provides a thin layer for safe concurrent access to TOML and JSON files.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// The file content could not be parsed.
    ParseError { format: &'static str, message: String },
    /// The value could not be serialized.
    SerializeError { format: &'static str, message: String },
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::ParseError { format, message } => {
                write!(f, "{} parse error: {}", format, message)
            }
            AtomicFileError::SerializeError { format, message } => {
                write!(f, "{} serialization error: {}", format, message)
            }
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

/// On-disk encoding used by an [`AtomicFile`].
pub trait FileFormat {
    const NAME: &'static str;

    fn encode<T: Serialize>(value: &T) -> Result<String, AtomicFileError>;

    fn decode<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError>;
}

/// Pretty-printed TOML. Used for configuration and credentials.
pub struct Toml;

impl FileFormat for Toml {
    const NAME: &'static str = "TOML";

    fn encode<T: Serialize>(value: &T) -> Result<String, AtomicFileError> {
        toml::to_string_pretty(value).map_err(|e| AtomicFileError::SerializeError {
            format: Self::NAME,
            message: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError> {
        toml::from_str(content).map_err(|e| AtomicFileError::ParseError {
            format: Self::NAME,
            message: e.to_string(),
        })
    }
}

/// Pretty-printed JSON. Used for document collections, whose field values
/// are arbitrary JSON.
pub struct Json;

impl FileFormat for Json {
    const NAME: &'static str = "JSON";

    fn encode<T: Serialize>(value: &T) -> Result<String, AtomicFileError> {
        serde_json::to_string_pretty(value).map_err(|e| AtomicFileError::SerializeError {
            format: Self::NAME,
            message: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError> {
        serde_json::from_str(content).map_err(|e| AtomicFileError::ParseError {
            format: Self::NAME,
            message: e.to_string(),
        })
    }
}

/// A handle to an atomic file with ACID guarantees.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Consistency**: Schema validation on load/save
/// - **Isolation**: File locking prevents concurrent modifications
/// - **Durability**: Explicit fsync before rename
pub struct AtomicFile<T, F = Toml> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> (T, F)>,
}

impl<T, F> AtomicFile<T, F>
where
    T: Serialize + DeserializeOwned,
    F: FileFormat,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        F::decode(&content).map(Some)
    }

    /// Saves data to the file atomically.
    ///
    /// Each call writes its own uniquely named temporary file in the target
    /// directory, then renames it over the target.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let parent = self.parent_dir();
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let encoded = F::encode(data)?;

        let mut tmp_file = NamedTempFile::new_in(parent)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.as_file().sync_all()?;
        tmp_file.persist(&self.path).map_err(|e| AtomicFileError::IoError(e.error))?;

        Ok(())
    }

    /// Performs a transactional update with file locking.
    ///
    /// The update function receives a mutable reference to the current data.
    /// If it returns `Ok(value)`, the changes are atomically written back and
    /// `value` is returned. If it returns `Err`, nothing is written.
    pub fn update<R, E, U>(&self, default_value: T, f: U) -> Result<R, E>
    where
        E: From<AtomicFileError>,
        U: FnOnce(&mut T) -> Result<R, E>,
    {
        let _lock = self.acquire_lock()?;

        let mut data = self.load()?.unwrap_or(default_value);

        let result = f(&mut data)?;

        self.save(&data)?;

        Ok(result)
    }

    /// Directory the temporary file goes in; a bare file name means `.`.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn acquire_lock(&self) -> Result<FileLock, AtomicFileError> {
        FileLock::acquire(&self.path)
    }
}

/// An exclusive lock on `<path>.lock`, released when dropped.
///
/// The lock file is never removed, so every writer locks the same inode.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|e| AtomicFileError::LockError(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
