use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{FileSystem, FileSystemError};

/// [`FileSystem`] backed by the local disk, rooted at a working directory.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Creates a file system rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for LocalFileSystem {
    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FileSystemError> {
        let resolved = self.resolve(path);
        fs::read_to_string(&resolved).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FileSystemError::NotFound { path: resolved.clone() },
            _ => FileSystemError::read(&resolved, source),
        })
    }

    fn create_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let resolved = self.resolve(path);
        fs::write(&resolved, contents).map_err(|source| FileSystemError::write(&resolved, source))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }
}
