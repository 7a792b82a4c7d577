//! Wire format exchanged with external transformation processes.
//!
//! The exchange is a single JSONL round trip over stdio. The service writes
//! one [`PluginRequest`] line to the process's stdin and closes it; the
//! process writes one [`TransformationResult`](crate::TransformationResult)
//! line to stdout and exits. Stderr is captured for diagnostic logging only.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::selection::TextSelection;

/// Request sent to an external transformation on stdin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRequest {
    transformation: String,
    selection: TextSelection,
    #[serde(default)]
    arguments: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Vec<PathBuf>>,
    #[serde(default)]
    files: Vec<FilePayload>,
}

impl PluginRequest {
    /// Creates a request for the named transformation.
    #[must_use]
    pub fn new(
        transformation: impl Into<String>,
        selection: TextSelection,
        arguments: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            transformation: transformation.into(),
            selection,
            arguments,
            scope: None,
            files: Vec::new(),
        }
    }

    /// Restricts the files the transformation may inspect.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<Vec<PathBuf>>) -> Self {
        self.scope = scope;
        self
    }

    /// Attaches in-band file content.
    #[must_use]
    pub fn with_files(mut self, files: Vec<FilePayload>) -> Self {
        self.files = files;
        self
    }

    /// Transformation short name.
    #[must_use]
    pub fn transformation(&self) -> &str {
        &self.transformation
    }

    /// Resolved selection.
    #[must_use]
    pub const fn selection(&self) -> &TextSelection {
        &self.selection
    }

    /// Opaque arguments.
    #[must_use]
    pub fn arguments(&self) -> &[serde_json::Value] {
        &self.arguments
    }

    /// In-band file payloads.
    #[must_use]
    pub fn files(&self) -> &[FilePayload] {
        &self.files
    }
}

/// File content passed in the request body so the external process sees
/// the same text the service will diff against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    path: PathBuf,
    content: String,
}

impl FilePayload {
    /// Creates a file payload.
    #[must_use]
    pub fn new(path: PathBuf, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    /// File path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// File content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
