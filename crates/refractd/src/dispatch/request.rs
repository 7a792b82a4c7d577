//! Request deserialization for the dispatch loop.
//!
//! Each JSONL line is a JSON object whose `command` key selects the handler.
//! The remaining keys are the command's arguments and are decoded by the
//! handler into its own typed struct.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Parsed command request from a client.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    command: String,
    payload: Map<String, Value>,
}

impl CommandRequest {
    /// Parses a JSONL line into a command request.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedJsonl` if the line is empty or is not
    /// valid JSON, and `DispatchError::InvalidStructure` if it is not an
    /// object carrying a non-empty `command` string.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }

        let value: Value = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
        let Value::Object(payload) = value else {
            return Err(DispatchError::invalid_structure("request must be a JSON object"));
        };
        let command = match payload.get("command") {
            Some(Value::String(command)) if !command.trim().is_empty() => command.trim().to_owned(),
            Some(Value::String(_)) => {
                return Err(DispatchError::invalid_structure("command field is empty"));
            }
            Some(_) => {
                return Err(DispatchError::invalid_structure("command field must be a string"));
            }
            None => return Err(DispatchError::invalid_structure("missing command field")),
        };

        Ok(Self { command, payload })
    }

    /// Returns the normalised command name.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Decodes the request object into a command-specific argument struct.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidArguments` when the payload does not
    /// match `T`.
    pub fn arguments<T: DeserializeOwned>(&self, command: &'static str) -> Result<T, DispatchError> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .map_err(|error| DispatchError::invalid_arguments(command, error.to_string()))
    }
}

/// Arguments of the `open` command.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenArguments {
    /// Protocol version the client speaks.
    pub version: String,
}

/// Arguments of the `setdir` command.
#[derive(Debug, Clone, Deserialize)]
pub struct SetdirArguments {
    /// File system mode; only `local` is supported.
    pub mode: String,
    /// Working directory for the session.
    pub directory: std::path::PathBuf,
}

/// Arguments of the `params` command.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamsArguments {
    /// Short name of the transformation to describe.
    pub transformation: String,
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_name() {
        let request = CommandRequest::parse(br#"{"command":"about"}"#).expect("parse about");
        assert_eq!(request.command(), "about");
    }

    #[test]
    fn trims_trailing_whitespace() {
        let request =
            CommandRequest::parse(b"{\"command\":\"list\"}  \n").expect("parse with whitespace");
        assert_eq!(request.command(), "list");
    }

    #[test]
    fn decodes_command_arguments() {
        let request = CommandRequest::parse(br#"{"command":"open","version":"0.1"}"#)
            .expect("parse open");
        let arguments: OpenArguments = request.arguments("open").expect("decode open");
        assert_eq!(arguments.version, "0.1");
    }

    #[test]
    fn reports_missing_arguments() {
        let request = CommandRequest::parse(br#"{"command":"open"}"#).expect("parse open");
        let result = request.arguments::<OpenArguments>("open");
        assert!(matches!(
            result,
            Err(DispatchError::InvalidArguments { command: "open", .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let result = CommandRequest::parse(b"   \n");
        assert!(matches!(result, Err(DispatchError::MalformedJsonl { .. })));
    }

    #[test]
    fn rejects_invalid_json() {
        let result = CommandRequest::parse(b"not json");
        assert!(matches!(result, Err(DispatchError::MalformedJsonl { .. })));
    }

    #[test]
    fn rejects_non_object_requests() {
        let result = CommandRequest::parse(b"[1, 2]");
        assert!(matches!(result, Err(DispatchError::InvalidStructure { .. })));
    }

    #[test]
    fn rejects_missing_command() {
        let result = CommandRequest::parse(br#"{"version":"0.1"}"#);
        assert!(matches!(result, Err(DispatchError::InvalidStructure { .. })));
    }

    #[test]
    fn rejects_blank_command() {
        let result = CommandRequest::parse(br#"{"command":"  "}"#);
        assert!(matches!(result, Err(DispatchError::InvalidStructure { .. })));
    }
}
