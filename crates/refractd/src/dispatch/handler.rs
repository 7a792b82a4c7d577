//! The stdio dispatch loop.
//!
//! [`Dispatcher`] owns the session and the transformation registry for the
//! lifetime of the process. It reads one JSONL request at a time, routes it,
//! and writes exactly one reply line before reading the next request.

use std::io::{BufRead, Write};

use refract_engine::TransformationRegistry;
use tracing::{debug, warn};

use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::{Reply, ResponseWriter};
use super::router::{CommandRouter, DISPATCH_TARGET, DispatchResult};
use crate::session::Session;

/// Request loop bound to one session.
#[derive(Debug)]
pub struct Dispatcher {
    router: CommandRouter,
    session: Session,
    registry: TransformationRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher with a fresh session over `registry`.
    #[must_use]
    pub fn new(registry: TransformationRegistry) -> Self {
        Self {
            router: CommandRouter::new(),
            session: Session::new(),
            registry,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one request line and returns the reply to send.
    ///
    /// Request failures are folded into an `Error` reply.
    pub fn handle_line(&mut self, line: &[u8]) -> DispatchResult {
        let request = match CommandRequest::parse(line) {
            Ok(request) => request,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                return DispatchResult::reply(Reply::from(&error));
            }
        };

        match self
            .router
            .route(&request, &mut self.session, &self.registry)
        {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    command = request.command(),
                    %error,
                    "request failed"
                );
                DispatchResult::reply(Reply::from(&error))
            }
        }
    }

    /// Serves requests from `input` until EOF or a `close` command.
    ///
    /// # Errors
    ///
    /// Returns an error when reading a request or writing a reply fails.
    pub fn serve<R: BufRead, W: Write>(&mut self, mut input: R, output: W) -> Result<(), DispatchError> {
        let mut writer = ResponseWriter::new(output);
        let mut line = Vec::new();

        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                debug!(target: DISPATCH_TARGET, "input closed");
                return Ok(());
            }

            let result = self.handle_line(&line);
            writer.write_reply(&result.reply)?;
            debug!(
                target: DISPATCH_TARGET,
                error = result.reply.is_error(),
                "reply written"
            );
            if result.close {
                debug!(target: DISPATCH_TARGET, "session closed by client");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::session::SessionLevel;

    fn serve(input: &str) -> (Dispatcher, Vec<String>) {
        let mut dispatcher = Dispatcher::new(TransformationRegistry::new());
        let mut output = Vec::new();
        dispatcher
            .serve(Cursor::new(input.as_bytes()), &mut output)
            .expect("serve");
        let lines = String::from_utf8(output)
            .expect("valid utf8")
            .lines()
            .map(str::to_owned)
            .collect();
        (dispatcher, lines)
    }

    #[test]
    fn replies_once_per_line() {
        let (_, lines) = serve(
            "{\"command\":\"about\"}\n{\"command\":\"open\",\"version\":\"0.1\"}\n",
        );
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with("{\"reply\":\"OK\"")));
    }

    #[test]
    fn errors_do_not_end_the_loop() {
        let (dispatcher, lines) = serve(
            "not json\n{\"command\":\"bogus\"}\n{\"command\":\"open\",\"version\":\"0.1\"}\n",
        );
        assert_eq!(lines.len(), 3);
        assert!(lines.first().is_some_and(|line| line.contains("malformed JSONL")));
        assert!(lines.get(1).is_some_and(|line| line.contains("unknown command: bogus")));
        assert_eq!(dispatcher.session().level(), SessionLevel::Open);
    }

    #[test]
    fn xrun_before_setdir_reports_the_state_error() {
        let (dispatcher, lines) = serve(concat!(
            "{\"command\":\"xrun\"}\n",
            "{\"command\":\"xrun\",\"transformation\":\"rename\",\"mode\":5}\n",
            "{\"command\":\"xrun\",\"transformation\":\"rename\",\"limit\":-1.5}\n",
        ));
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(
                line,
                "{\"reply\":\"Error\",\"message\":\"State of 2 (file system configured) is required\"}"
            );
        }
        assert_eq!(dispatcher.session().level(), SessionLevel::Uninitialised);
    }

    #[test]
    fn close_stops_reading() {
        let (_, lines) = serve("{\"command\":\"close\"}\n{\"command\":\"about\"}\n");
        assert_eq!(lines, vec!["{\"reply\":\"OK\"}".to_owned()]);
    }

    #[test]
    fn final_line_without_newline_is_handled() {
        let (_, lines) = serve("{\"command\":\"close\"}");
        assert_eq!(lines.len(), 1);
    }
}
