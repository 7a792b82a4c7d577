//! Domain errors raised by the refactoring engine.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint and keep the enums `Clone`.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from registry management and external plugin execution.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A transformation with the same short name is already registered.
    #[error("transformation '{name}' is already registered")]
    DuplicateTransformation {
        /// Short name that collided.
        name: String,
    },

    /// A plugin manifest failed validation.
    #[error("manifest error: {message}")]
    Manifest {
        /// Description of the validation failure.
        message: String,
    },

    /// The plugin manifest file could not be read.
    #[error("failed to read plugin manifest {path}: {source}")]
    ManifestRead {
        /// Path of the manifest file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The plugin manifest file is not valid JSON.
    #[error("failed to parse plugin manifest {path}: {source}")]
    ManifestParse {
        /// Path of the manifest file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The plugin process could not be spawned.
    #[error("plugin '{name}' failed to start: {message}")]
    SpawnFailed {
        /// Plugin short name.
        name: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// The plugin did not complete within the configured timeout.
    #[error("plugin '{name}' timed out after {timeout_secs}s")]
    Timeout {
        /// Plugin short name.
        name: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The plugin exited with a non-zero status code.
    #[error("plugin '{name}' exited with non-zero status {status}")]
    NonZeroExit {
        /// Plugin short name.
        name: String,
        /// Process exit status.
        status: i32,
    },

    /// The plugin request could not be serialized to JSON.
    #[error("failed to serialise plugin request: {0}")]
    SerializeRequest(#[source] Arc<serde_json::Error>),

    /// The plugin produced output that does not conform to the protocol.
    #[error("plugin '{name}' wrote invalid output: {message}")]
    InvalidOutput {
        /// Plugin short name.
        name: String,
        /// Description of the protocol violation.
        message: String,
    },

    /// An I/O error occurred while communicating with the plugin process.
    #[error("I/O error communicating with plugin '{name}': {source}")]
    Io {
        /// Plugin short name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl EngineError {
    /// Builds an I/O error for the named plugin.
    #[must_use]
    pub fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_owned(),
            source: Arc::new(source),
        }
    }

    /// Builds a manifest validation error.
    #[must_use]
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }
}
