//! Error types for request dispatch failures.
//!
//! Every variant is reported to the client as an `Error` reply carrying the
//! display text, after which the dispatch loop reads the next request.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::xrun::XrunError;
use crate::session::SessionLevel;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line could not be parsed as valid JSON.
    #[error("malformed JSONL: {message}")]
    MalformedJsonl {
        /// Parser diagnostic.
        message: String,
        /// Underlying parser error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request JSON is not an object with a `command` string.
    #[error("invalid request structure: {message}")]
    InvalidStructure {
        /// What was wrong with the request shape.
        message: String,
    },

    /// The `command` field names no known command.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// Command as sent by the client.
        command: String,
    },

    /// Command arguments are missing or have the wrong type.
    #[error("invalid arguments for {command}: {message}")]
    InvalidArguments {
        /// Command whose arguments were rejected.
        command: &'static str,
        /// Deserialisation diagnostic.
        message: String,
    },

    /// The session has not reached the level this command needs.
    #[error("State of {} ({}) is required", .required.ordinal(), .required)]
    NotReady {
        /// Minimum level for the command.
        required: SessionLevel,
    },

    /// `open` named a protocol version this daemon does not speak.
    #[error("unsupported protocol version: {version}")]
    UnsupportedVersion {
        /// Version requested by the client.
        version: String,
    },

    /// `setdir` asked for a file system mode other than `local`.
    #[error("unsupported file system mode: {mode}")]
    UnsupportedMode {
        /// Mode requested by the client.
        mode: String,
    },

    /// `setdir` named a path that is not an existing directory.
    #[error("directory does not exist: {}", .path.display())]
    DirectoryNotFound {
        /// Path requested by the client.
        path: PathBuf,
    },

    /// `params` named an unregistered transformation.
    #[error("unknown transformation: {name}")]
    UnknownTransformation {
        /// Name requested by the client.
        name: String,
    },

    /// The `xrun` command failed.
    #[error(transparent)]
    Xrun(#[from] XrunError),

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Reply serialisation failed.
    #[error("failed to serialize reply: {0}")]
    SerializeReply(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns `true` when the error concerns the transport rather than a
    /// single request, so the dispatch loop cannot continue.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::SerializeReply(_))
    }

    /// Creates a malformed JSONL error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJsonl {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed JSONL error with a custom message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJsonl {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid structure error.
    #[must_use]
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates an unknown command error.
    #[must_use]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(command: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command,
            message: message.into(),
        }
    }

    /// Creates a precondition error for the given level.
    #[must_use]
    pub const fn not_ready(required: SessionLevel) -> Self {
        Self::NotReady { required }
    }
}
