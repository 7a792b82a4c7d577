use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{FileSystem, FileSystemError};

/// In-memory [`FileSystem`] for embedders and tests.
///
/// Every path is resolved against a virtual root, so `foo.go` and
/// `/workspace/foo.go` name the same entry when the root is `/workspace`.
#[derive(Debug)]
pub struct MemoryFileSystem {
    root: PathBuf,
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// Creates an empty file system rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Adds a file, replacing any previous contents.
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        let resolved = self.resolve(path.as_ref());
        self.lock().insert(resolved, contents.into());
        self
    }

    /// Returns a snapshot of a file's contents.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().get(&self.resolve(path.as_ref())).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FileSystemError> {
        let resolved = self.resolve(path);
        self.lock()
            .get(&resolved)
            .cloned()
            .ok_or(FileSystemError::NotFound { path: resolved })
    }

    fn create_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let resolved = self.resolve(path);
        let text = String::from_utf8(contents.to_vec()).map_err(|error| {
            FileSystemError::write(
                &resolved,
                std::io::Error::new(std::io::ErrorKind::InvalidData, error),
            )
        })?;
        self.lock().insert(resolved, text);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(&self.resolve(path))
    }
}
