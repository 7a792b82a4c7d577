//! The transformation seam between the request handler and the engine.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::edit::EditSet;
use crate::filesystem::{FileSystem, FsOperation};
use crate::log::LogEntry;
use crate::selection::TextSelection;

/// A parameter a transformation prompts for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Short label shown next to the input.
    pub label: String,
    /// Longer prompt text.
    pub prompt: String,
    /// Value used when the client supplies none.
    #[serde(default)]
    pub default: serde_json::Value,
}

/// Human-facing description of a transformation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Display name, for example `Rename`.
    pub name: String,
    /// One-line summary.
    #[serde(default)]
    pub synopsis: String,
    /// Usage string listing the expected arguments.
    #[serde(default)]
    pub usage: String,
    /// Whether the transformation may edit files other than the selected one.
    #[serde(default)]
    pub multifile: bool,
    /// Parameters the client should collect before running.
    #[serde(default)]
    pub params: Vec<Parameter>,
}

impl Description {
    /// Creates a description with only a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Everything a transformation needs to run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// File system the transformation reads from.
    pub filesystem: Arc<dyn FileSystem>,
    /// Files the transformation may inspect; `None` lets it decide.
    pub scope: Option<Vec<PathBuf>>,
    /// Resolved selection.
    pub selection: TextSelection,
    /// Transformation-specific arguments, passed through untouched.
    pub args: Vec<serde_json::Value>,
}

/// Output of one transformation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationResult {
    /// Messages in emission order.
    #[serde(default)]
    pub log: Vec<LogEntry>,
    /// Edits keyed by file path, iterated in path order.
    #[serde(default)]
    pub edits: BTreeMap<PathBuf, EditSet>,
    /// Filesystem mutations in the order they must be applied.
    #[serde(default, rename = "fsChanges")]
    pub fs_changes: Vec<FsOperation>,
}

impl TransformationResult {
    /// Builds a result holding a single fatal log entry and no changes.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            log: vec![LogEntry::fatal(message)],
            ..Self::default()
        }
    }

    /// Returns `true` when any log entry is fatal.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.log.iter().any(LogEntry::is_fatal)
    }
}

/// A named source transformation.
///
/// Implementations never fail outright: problems are reported through the
/// result log, and a fatal entry tells the caller to discard any edits.
pub trait Transformation: Send + Sync {
    /// Describes the transformation for listings and replies.
    fn description(&self) -> &Description;

    /// Runs the transformation.
    fn run(&self, config: &RunConfig) -> TransformationResult;
}
