//! File system abstraction shared by the session and patch persistence.
//!
//! Transformations read source files and the request handler persists diff
//! artefacts through a [`FileSystem`] handle rather than touching `std::fs`
//! directly, so a session can be backed by the local disk or by an
//! in-memory tree.

mod local;
mod memory;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::local::LocalFileSystem;
pub use self::memory::MemoryFileSystem;

/// Errors raised by [`FileSystem`] implementations.
#[derive(Debug, Clone, Error)]
pub enum FileSystemError {
    /// The file could not be read.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// Resolved path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The file could not be created or written.
    #[error("failed to write file {path}: {source}")]
    Write {
        /// Resolved path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Resolved path that was looked up.
        path: PathBuf,
    },
}

impl FileSystemError {
    /// Builds a read error.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Builds a write error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// Handle onto the files a session operates on.
///
/// Relative paths are resolved against the implementation's root; absolute
/// paths are used as given.
pub trait FileSystem: std::fmt::Debug + Send + Sync {
    /// Joins `path` onto the file system root.
    fn resolve(&self, path: &Path) -> PathBuf;

    /// Reads a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] when the file is missing or unreadable.
    fn read_to_string(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Creates (or truncates) a file with the given contents.
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::Write`] when the file cannot be written.
    fn create_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError>;

    /// Returns `true` when a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// A filesystem mutation proposed by a transformation.
///
/// These are reported to the client, never applied by the service itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FsOperation {
    /// Create a new file with the given contents.
    Create {
        /// Path of the new file.
        path: PathBuf,
        /// Initial file contents.
        contents: String,
    },
    /// Delete a file or directory.
    Remove {
        /// Path to remove.
        path: PathBuf,
    },
    /// Rename a file or directory.
    Rename {
        /// Current path.
        path: PathBuf,
        /// New name for the entry.
        new_name: String,
    },
}

#[cfg(test)]
mod tests;
