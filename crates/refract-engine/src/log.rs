//! Log entries emitted by a transformation run.

use serde::{Deserialize, Serialize};

/// Severity attached to a [`LogEntry`].
///
/// Ordered from least to most severe so callers can compare levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational note.
    Info,
    /// Something the user should review.
    Warning,
    /// A problem the transformation worked around.
    Error,
    /// The transformation could not complete safely.
    Fatal,
}

/// A single message in a transformation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    severity: Severity,
    message: String,
}

impl LogEntry {
    /// Creates a log entry.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Creates an informational entry.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Creates a fatal entry.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Entry severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Entry text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` for [`Severity::Fatal`] entries.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}
