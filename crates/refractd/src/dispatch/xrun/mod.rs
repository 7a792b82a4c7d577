//! The `xrun` command: run a transformation and encode its changes.
//!
//! Handling follows a fixed sequence. The request is validated without side
//! effects, the transformation runs against the session's file system, and
//! its log is scanned for fatal entries. A fatal entry short-circuits the
//! reply to the log alone. Otherwise each edited file is encoded according
//! to the request mode and proposed filesystem mutations are appended.

mod encode;

use std::path::PathBuf;

use refract_engine::{EditError, RunConfig, TransformationRegistry};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use self::encode::{encode_edits, encode_fs_changes, encode_log};
use super::response::Reply;
use super::router::DISPATCH_TARGET;
use crate::session::{Session, SessionLevel};

/// Accepted values for the `mode` key.
pub const MODES: &[&str] = &["text", "patch"];

/// Arguments of the `xrun` command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrunRequest {
    /// Short name of the transformation to run.
    pub transformation: String,
    /// Files the client considers in scope. Not forwarded to the engine.
    #[serde(default)]
    pub fileselection: Vec<PathBuf>,
    /// Selection the transformation acts on, relative to the session directory.
    #[serde(default)]
    pub textselection: refract_engine::TextSelection,
    /// Transformation arguments, forwarded verbatim.
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
    /// Optional limit; must not be negative.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Output mode, `patch` when omitted.
    #[serde(default)]
    pub mode: Option<String>,
}

/// How edits are reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Persist a unified diff next to each file and report its path.
    Patch,
    /// Report the full edited content of each file.
    Text,
}

impl Mode {
    /// Effective mode for an optional `mode` value.
    #[must_use]
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode {
            None | Some("patch") => Self::Patch,
            Some(_) => Self::Text,
        }
    }
}

/// Errors that end an `xrun` request with an `Error` reply.
#[derive(Debug, Error)]
pub enum XrunError {
    /// The session is not ready for transformations.
    #[error("State of {} ({}) is required", .required.ordinal(), .required)]
    NotReady {
        /// Minimum level for `xrun`.
        required: SessionLevel,
    },

    /// The transformation is not registered.
    #[error("Transformation given is not a valid refactoring name")]
    UnknownTransformation,

    /// A request key has an unacceptable value.
    #[error("{message}")]
    InvalidArgument {
        /// Client-facing explanation.
        message: String,
    },

    /// Building, applying or persisting the changes for a file failed.
    #[error("failed to encode changes for {}: {source}", .path.display())]
    Encoding {
        /// File whose edits could not be encoded.
        path: PathBuf,
        /// Underlying edit or file system error.
        #[source]
        source: EditError,
    },
}

impl XrunError {
    fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn encoding(path: impl Into<PathBuf>, source: impl Into<EditError>) -> Self {
        Self::Encoding {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Checks an `xrun` request against the session and registry.
///
/// The first failing check wins. `textselection`, `fileselection` and
/// `arguments` are passed through unchecked.
///
/// # Errors
///
/// Returns [`XrunError::NotReady`], [`XrunError::UnknownTransformation`] or
/// [`XrunError::InvalidArgument`].
pub fn validate(
    session: &Session,
    registry: &TransformationRegistry,
    request: &XrunRequest,
) -> Result<(), XrunError> {
    if !session.is_at_least(SessionLevel::FilesystemConfigured) {
        return Err(XrunError::NotReady {
            required: SessionLevel::FilesystemConfigured,
        });
    }
    if !registry.is_known(&request.transformation) {
        return Err(XrunError::UnknownTransformation);
    }
    if request.limit.is_some_and(|limit| limit < 0) {
        return Err(XrunError::invalid_argument(
            "\"limit\" key must be a positive integer",
        ));
    }
    if request
        .mode
        .as_deref()
        .is_some_and(|mode| !MODES.contains(&mode))
    {
        return Err(XrunError::invalid_argument("\"mode\" key must be \"text|patch\""));
    }
    Ok(())
}

/// Runs an `xrun` request to completion.
///
/// In patch mode one `<file>.diff` is written through the session file
/// system for every edited file. Diffs written before a later failure are
/// left in place.
///
/// # Errors
///
/// Returns the validation error, or [`XrunError::Encoding`] when a file's
/// changes cannot be encoded.
pub fn execute(
    session: &Session,
    registry: &TransformationRegistry,
    request: &XrunRequest,
) -> Result<Reply, XrunError> {
    validate(session, registry, request)?;

    let (Some(directory), Some(filesystem)) = (session.directory(), session.filesystem()) else {
        return Err(XrunError::NotReady {
            required: SessionLevel::FilesystemConfigured,
        });
    };
    let transformation = registry
        .get(&request.transformation)
        .ok_or(XrunError::UnknownTransformation)?;

    let config = RunConfig {
        filesystem: filesystem.clone(),
        scope: None,
        selection: request.textselection.resolved_against(directory),
        args: request.arguments.clone(),
    };

    debug!(
        target: DISPATCH_TARGET,
        transformation = %request.transformation,
        selection = %config.selection.filename.display(),
        "running transformation"
    );
    let result = transformation.run(&config);
    let description = transformation.description().name.clone();
    let (log, fatal) = encode_log(&result.log);

    if fatal {
        info!(
            target: DISPATCH_TARGET,
            transformation = %request.transformation,
            "transformation reported a fatal error"
        );
        return Ok(Reply::Aborted { description, log });
    }

    let mode = Mode::from_request(request.mode.as_deref());
    let files = encode_edits(filesystem.as_ref(), &result.edits, mode)?;
    let fs_changes = encode_fs_changes(&result.fs_changes);

    info!(
        target: DISPATCH_TARGET,
        transformation = %request.transformation,
        files = files.len(),
        fs_changes = fs_changes.len(),
        "transformation applied"
    );
    Ok(Reply::Applied {
        description,
        log,
        files,
        fs_changes,
    })
}
