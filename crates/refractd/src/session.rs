//! Per-process session state.
//!
//! A session moves through readiness levels as the client issues setup
//! commands. The level never decreases: reopening an already configured
//! session leaves its working directory in place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use refract_engine::FileSystem;

/// Readiness of a session, ordered from least to most ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionLevel {
    /// No `open` command has been accepted yet.
    #[default]
    Uninitialised,
    /// The protocol handshake completed.
    Open,
    /// A working directory and file system handle are configured.
    FilesystemConfigured,
}

impl SessionLevel {
    /// Numeric level reported in precondition errors.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Uninitialised => 0,
            Self::Open => 1,
            Self::FilesystemConfigured => 2,
        }
    }

    /// Human-readable name of the level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uninitialised => "uninitialised",
            Self::Open => "open",
            Self::FilesystemConfigured => "file system configured",
        }
    }
}

impl fmt::Display for SessionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State shared by every request on one protocol connection.
#[derive(Debug, Default)]
pub struct Session {
    level: SessionLevel,
    directory: Option<PathBuf>,
    filesystem: Option<Arc<dyn FileSystem>>,
}

impl Session {
    /// Creates an uninitialised session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current readiness level.
    #[must_use]
    pub const fn level(&self) -> SessionLevel {
        self.level
    }

    /// Returns `true` when the session has reached at least `level`.
    #[must_use]
    pub fn is_at_least(&self, level: SessionLevel) -> bool {
        self.level >= level
    }

    /// Working directory set by `setdir`.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// File system handle set by `setdir`.
    #[must_use]
    pub const fn filesystem(&self) -> Option<&Arc<dyn FileSystem>> {
        self.filesystem.as_ref()
    }

    /// Records a completed handshake.
    pub fn open(&mut self) {
        self.advance(SessionLevel::Open);
    }

    /// Installs the working directory and the file system rooted at it.
    pub fn configure_filesystem(&mut self, directory: PathBuf, filesystem: Arc<dyn FileSystem>) {
        self.directory = Some(directory);
        self.filesystem = Some(filesystem);
        self.advance(SessionLevel::FilesystemConfigured);
    }

    fn advance(&mut self, level: SessionLevel) {
        self.level = self.level.max(level);
    }
}
