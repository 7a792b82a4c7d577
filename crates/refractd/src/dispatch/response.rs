//! Reply serialization for the dispatch loop.
//!
//! Every request produces exactly one [`Reply`], written as a single JSONL
//! line. Replies serialize with `reply` first and the remaining keys in a
//! fixed order per shape, so clients that diff transcripts see stable
//! output.

use std::io::Write;

use refract_engine::{FsOperation, LogEntry, Parameter, Severity};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::errors::DispatchError;

/// A protocol reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Bare acknowledgement.
    Ok,
    /// The request failed.
    Error {
        /// Client-facing explanation.
        message: String,
    },
    /// Reply to `about`.
    About {
        /// Lines of descriptive text.
        text: Vec<String>,
    },
    /// Reply to `list`.
    Transformations {
        /// Registered transformations, sorted by short name.
        transformations: Vec<TransformationSummary>,
    },
    /// Reply to `params`.
    Params {
        /// Parameters the transformation prompts for.
        params: Vec<Parameter>,
    },
    /// A transformation logged a fatal entry, so no changes are reported.
    Aborted {
        /// Display name of the transformation.
        description: String,
        /// Encoded transformation log.
        log: Vec<LogLine>,
    },
    /// A transformation completed and its changes were encoded.
    Applied {
        /// Display name of the transformation.
        description: String,
        /// Encoded transformation log.
        log: Vec<LogLine>,
        /// One entry per changed file, in path order.
        files: Vec<FileChange>,
        /// Filesystem mutations in the order the transformation proposed them.
        fs_changes: Vec<FsChange>,
    },
}

impl Reply {
    /// Creates an error reply.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns `true` for [`Reply::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    const fn status(&self) -> &'static str {
        match self {
            Self::Error { .. } => "Error",
            _ => "OK",
        }
    }
}

impl From<&DispatchError> for Reply {
    fn from(error: &DispatchError) -> Self {
        Self::error(error.to_string())
    }
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("reply", self.status())?;
        match self {
            Self::Ok => {}
            Self::Error { message } => map.serialize_entry("message", message)?,
            Self::About { text } => map.serialize_entry("text", text)?,
            Self::Transformations { transformations } => {
                map.serialize_entry("transformations", transformations)?;
            }
            Self::Params { params } => map.serialize_entry("params", params)?,
            Self::Aborted { description, log } => {
                map.serialize_entry("description", description)?;
                map.serialize_entry("log", log)?;
            }
            Self::Applied {
                description,
                log,
                files,
                fs_changes,
            } => {
                map.serialize_entry("description", description)?;
                map.serialize_entry("log", log)?;
                map.serialize_entry("files", files)?;
                if !fs_changes.is_empty() {
                    map.serialize_entry("fsChanges", fs_changes)?;
                }
            }
        }
        map.end()
    }
}

/// Entry in a `list` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationSummary {
    /// Registry key used in `xrun` and `params`.
    #[serde(rename = "shortName")]
    pub short_name: String,
    /// Display name.
    pub name: String,
}

/// Wire form of a transformation log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// Encoded severity; informational entries carry an empty string.
    pub severity: &'static str,
    /// Entry text.
    pub message: String,
}

impl From<&LogEntry> for LogLine {
    fn from(entry: &LogEntry) -> Self {
        Self {
            severity: severity_label(entry.severity()),
            message: entry.message().to_owned(),
        }
    }
}

/// Maps a severity onto its wire label.
#[must_use]
pub const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "",
        Severity::Warning => "warning",
        Severity::Error => "error",
        Severity::Fatal => "fatal",
    }
}

/// Wire form of one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileChange {
    /// Patch mode: the diff was persisted next to the file.
    Patch {
        /// File the edits apply to.
        filename: String,
        /// Path of the persisted unified diff.
        #[serde(rename = "patchFile")]
        patch_file: String,
    },
    /// Text mode: the full edited content.
    Content {
        /// File the edits apply to.
        filename: String,
        /// Content after applying the edits.
        content: String,
    },
}

/// Wire form of a proposed filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum FsChange {
    /// A new file.
    Create {
        /// Path of the new file.
        file: String,
        /// Initial contents.
        content: String,
    },
    /// A removed file or directory.
    Delete {
        /// Removed path.
        path: String,
    },
    /// A renamed file or directory.
    Rename {
        /// Current path.
        from: String,
        /// New name.
        to: String,
    },
}

impl From<&FsOperation> for FsChange {
    fn from(operation: &FsOperation) -> Self {
        match operation {
            FsOperation::Create { path, contents } => Self::Create {
                file: path.display().to_string(),
                content: contents.clone(),
            },
            FsOperation::Remove { path } => Self::Delete {
                path: path.display().to_string(),
            },
            FsOperation::Rename { path, new_name } => Self::Rename {
                from: path.display().to_string(),
                to: new_name.clone(),
            },
        }
    }
}

/// Writer that serializes replies to a stream.
///
/// Each reply is written as one line and flushed immediately, since the
/// client waits for it before sending the next request.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a reply as a JSONL line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write_reply(&mut self, reply: &Reply) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, reply)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the error reply for a failed request.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_reply(&Reply::from(error))
    }
}
