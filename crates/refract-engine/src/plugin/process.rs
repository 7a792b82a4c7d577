//! Process-based plugin execution.
//!
//! [`ProcessExecutor`] spawns the manifest's executable with stdin and stdout
//! piped, writes the request as a single JSONL line, reads the result line,
//! and waits for exit. The timeout covers the whole exchange: a plugin that
//! stalls before answering is killed once the deadline passes.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{PLUGIN_TARGET, PluginExecutor};
use crate::error::EngineError;
use crate::manifest::PluginManifest;
use crate::protocol::PluginRequest;
use crate::transformation::TransformationResult;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executes plugins by spawning child processes.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExecutor {
    default_timeout_secs: u64,
}

impl ProcessExecutor {
    /// Creates an executor applying `default_timeout_secs` to manifests that
    /// do not declare their own timeout.
    #[must_use]
    pub const fn new(default_timeout_secs: u64) -> Self {
        Self {
            default_timeout_secs,
        }
    }
}

impl PluginExecutor for ProcessExecutor {
    fn execute(
        &self,
        manifest: &PluginManifest,
        request: &PluginRequest,
    ) -> Result<TransformationResult, EngineError> {
        let timeout_secs = manifest.timeout_secs().unwrap_or(self.default_timeout_secs);
        execute_process(manifest, request, timeout_secs)
    }
}

/// Point in time after which a running plugin is killed.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Option<Instant>,
    timeout_secs: u64,
}

impl Deadline {
    fn starting_now(timeout_secs: u64) -> Self {
        Self {
            at: Instant::now().checked_add(Duration::from_secs(timeout_secs)),
            timeout_secs,
        }
    }

    fn remaining(self) -> Duration {
        self.at
            .map_or(Duration::MAX, |at| at.saturating_duration_since(Instant::now()))
    }

    fn expired(self) -> bool {
        self.remaining().is_zero()
    }

    fn error(self, name: &str) -> EngineError {
        EngineError::Timeout {
            name: name.to_owned(),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn execute_process(
    manifest: &PluginManifest,
    request: &PluginRequest,
    timeout_secs: u64,
) -> Result<TransformationResult, EngineError> {
    let name = manifest.short_name();
    let json = serde_json::to_string(request)
        .map_err(|err| EngineError::SerializeRequest(Arc::new(err)))?;

    debug!(
        target: PLUGIN_TARGET,
        plugin = name,
        executable = %manifest.executable().display(),
        "spawning plugin process"
    );

    let deadline = Deadline::starting_now(timeout_secs);
    let mut child = Command::new(manifest.executable())
        .args(manifest.args())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| EngineError::SpawnFailed {
            name: name.to_owned(),
            message: err.to_string(),
            source: Some(Arc::new(err)),
        })?;

    let outcome = converse(name, &mut child, json, deadline);
    if outcome.is_err() {
        terminate(name, &mut child);
    }
    outcome
}

/// Runs the request/response exchange with a spawned plugin.
///
/// Stdin, stdout and stderr are each serviced on their own thread so no pipe
/// can stall the caller past the deadline.
fn converse(
    name: &str,
    child: &mut Child,
    json: String,
    deadline: Deadline,
) -> Result<TransformationResult, EngineError> {
    let stdin = child.stdin.take().ok_or_else(|| capture_failed(name, "stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| capture_failed(name, "stdout"))?;
    let stderr = child.stderr.take().map(spawn_stderr_drain);

    debug!(
        target: PLUGIN_TARGET,
        plugin = name,
        request_bytes = json.len(),
        "writing request to plugin stdin"
    );
    let writer = thread::spawn(move || write_request(stdin, &json));
    let lines = spawn_line_reader(stdout);

    let line = receive_line(name, &lines, deadline)?;
    finish_write(name, writer)?;
    wait_for_exit(name, child, deadline)?;
    if let Some(handle) = stderr {
        log_stderr(name, handle);
    }
    parse_response(name, &line)
}

fn capture_failed(name: &str, stream: &str) -> EngineError {
    EngineError::SpawnFailed {
        name: name.to_owned(),
        message: format!("failed to capture {stream}"),
        source: None,
    }
}

/// Writes the request line and closes stdin by dropping it.
fn write_request(mut stdin: impl Write, json: &str) -> io::Result<()> {
    stdin.write_all(json.as_bytes())?;
    stdin.write_all(b"\n")?;
    stdin.flush()
}

/// Collects the writer thread's result. A plugin that answers without
/// reading its stdin closes the pipe early, which is not a failure.
fn finish_write(name: &str, writer: JoinHandle<io::Result<()>>) -> Result<(), EngineError> {
    match writer.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(err)) => Err(EngineError::io(name, err)),
        Err(_) => Err(EngineError::io(
            name,
            io::Error::other("stdin writer thread panicked"),
        )),
    }
}

fn spawn_line_reader(stdout: ChildStdout) -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let outcome = BufReader::new(stdout).read_line(&mut line).map(|_| line);
        // The receiver is gone once the caller has timed out.
        drop(sender.send(outcome));
    });
    receiver
}

/// Waits for the first stdout line until the deadline passes.
fn receive_line(
    name: &str,
    lines: &Receiver<io::Result<String>>,
    deadline: Deadline,
) -> Result<String, EngineError> {
    let start = Instant::now();
    let line = match lines.recv_timeout(deadline.remaining()) {
        Ok(read) => read.map_err(|err| EngineError::io(name, err))?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                target: PLUGIN_TARGET,
                plugin = name,
                timeout_secs = deadline.timeout_secs,
                "plugin did not answer before the deadline"
            );
            return Err(deadline.error(name));
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(EngineError::io(
                name,
                io::Error::other("stdout reader thread stopped"),
            ));
        }
    };

    debug!(
        target: PLUGIN_TARGET,
        plugin = name,
        bytes_read = line.len(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "read response from plugin stdout"
    );

    if line.is_empty() {
        return Err(EngineError::InvalidOutput {
            name: name.to_owned(),
            message: String::from("plugin produced no output on stdout"),
        });
    }
    Ok(line)
}

/// Drains stderr so the child never blocks on a full pipe buffer.
fn spawn_stderr_drain(stderr: ChildStderr) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        drop(BufReader::new(stderr).read_to_string(&mut buffer));
        buffer
    })
}

fn log_stderr(name: &str, handle: JoinHandle<String>) {
    let Ok(buffer) = handle.join() else {
        return;
    };
    if !buffer.trim().is_empty() {
        debug!(
            target: PLUGIN_TARGET,
            plugin = name,
            stderr = %buffer.trim(),
            "plugin stderr output"
        );
    }
}

/// Polls for the child's exit status until the deadline passes.
fn wait_for_exit(name: &str, child: &mut Child, deadline: Deadline) -> Result<(), EngineError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(target: PLUGIN_TARGET, plugin = name, ?status, "plugin process exited");
                if status.success() {
                    return Ok(());
                }
                return Err(EngineError::NonZeroExit {
                    name: name.to_owned(),
                    status: status.code().unwrap_or(-1),
                });
            }
            Ok(None) if deadline.expired() => {
                warn!(
                    target: PLUGIN_TARGET,
                    plugin = name,
                    timeout_secs = deadline.timeout_secs,
                    "plugin did not exit before the deadline"
                );
                return Err(deadline.error(name));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL.min(deadline.remaining())),
            Err(err) => return Err(EngineError::io(name, err)),
        }
    }
}

/// Kills and reaps the child. Both calls fail harmlessly when the process
/// has already exited.
fn terminate(name: &str, child: &mut Child) {
    debug!(target: PLUGIN_TARGET, plugin = name, "terminating plugin process");
    drop(child.kill());
    drop(child.wait());
}

/// Parses a JSONL response line into a [`TransformationResult`].
fn parse_response(name: &str, line: &str) -> Result<TransformationResult, EngineError> {
    serde_json::from_str(line.trim()).map_err(|err| EngineError::InvalidOutput {
        name: name.to_owned(),
        message: format!("invalid JSON: {err}"),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::{Path, PathBuf};

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::selection::TextSelection;

    /// Runs `body` through `/bin/sh` so the test never executes a file it
    /// has just written.
    fn shell_plugin(dir: &Path, body: &str) -> PluginManifest {
        let path = dir.join("plugin.sh");
        std::fs::write(&path, format!("{body}\n")).expect("write script");
        PluginManifest::new("rename", "Rename", PathBuf::from("/bin/sh"))
            .with_args(vec![path.display().to_string()])
    }

    fn request() -> PluginRequest {
        PluginRequest::new("rename", TextSelection::default(), Vec::new())
    }

    #[test]
    fn reads_result_line_from_stdout() {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(
            dir.path(),
            r#"cat > /dev/null
echo '{"log":[{"severity":"info","message":"ok"}]}'"#,
        );

        let result = ProcessExecutor::new(5)
            .execute(&manifest, &request())
            .expect("execute");
        assert_eq!(result.log.len(), 1);
        assert!(!result.has_fatal());
    }

    #[test]
    fn reports_non_zero_exit() {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(dir.path(), "cat > /dev/null\necho '{}'\nexit 3");

        let error = ProcessExecutor::new(5)
            .execute(&manifest, &request())
            .expect_err("non-zero exit");
        assert!(matches!(error, EngineError::NonZeroExit { status: 3, .. }));
    }

    #[test]
    fn reports_empty_output() {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(dir.path(), "cat > /dev/null");

        let error = ProcessExecutor::new(5)
            .execute(&manifest, &request())
            .expect_err("no output");
        assert!(matches!(error, EngineError::InvalidOutput { .. }));
    }

    #[test]
    fn reports_invalid_json() {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(dir.path(), "cat > /dev/null\necho 'not json'");

        let error = ProcessExecutor::new(5)
            .execute(&manifest, &request())
            .expect_err("invalid json");
        assert!(error.to_string().contains("invalid JSON"), "got: {error}");
    }

    #[rstest]
    #[case::slow_answer("cat > /dev/null\nsleep 5\necho '{}'")]
    #[case::never_reads_stdin("sleep 5")]
    fn kills_plugin_that_misses_the_deadline(#[case] body: &str) {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(dir.path(), body);

        let start = Instant::now();
        let error = ProcessExecutor::new(1)
            .execute(&manifest, &request())
            .expect_err("timeout");
        assert!(
            matches!(error, EngineError::Timeout { timeout_secs: 1, .. }),
            "got: {error}"
        );
        assert!(
            start.elapsed() < Duration::from_secs(3),
            "timed out after {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn manifest_timeout_overrides_default() {
        let dir = TempDir::new().expect("temp dir");
        let manifest = shell_plugin(dir.path(), "cat > /dev/null\nsleep 5").with_timeout_secs(1);

        let start = Instant::now();
        let error = ProcessExecutor::new(30)
            .execute(&manifest, &request())
            .expect_err("timeout");
        assert!(matches!(error, EngineError::Timeout { timeout_secs: 1, .. }));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn reports_missing_executable() {
        let manifest = PluginManifest::new(
            "rename",
            "Rename",
            PathBuf::from("/nonexistent/refract-plugin"),
        );
        let error = ProcessExecutor::new(5)
            .execute(&manifest, &request())
            .expect_err("spawn failure");
        assert!(matches!(error, EngineError::SpawnFailed { .. }));
    }
}
