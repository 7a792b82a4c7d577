//! Command routing for the dispatch loop.
//!
//! The router maps the `command` key of a request onto its handler. Setup
//! commands (`open`, `setdir`) advance the session; query commands (`about`,
//! `list`, `params`) only read it; `xrun` runs a transformation.

use std::sync::Arc;

use refract_engine::{LocalFileSystem, TransformationRegistry};
use tracing::{debug, info};

use super::errors::DispatchError;
use super::request::{CommandRequest, OpenArguments, ParamsArguments, SetdirArguments};
use super::response::{Reply, TransformationSummary};
use super::xrun::{self, XrunRequest};
use crate::session::{Session, SessionLevel};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Protocol version accepted by `open`.
pub const PROTOCOL_VERSION: &str = "0.1";

/// File system mode accepted by `setdir`.
const LOCAL_MODE: &str = "local";

/// Known protocol commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Describe the daemon.
    About,
    /// Protocol handshake.
    Open,
    /// Configure the working directory.
    Setdir,
    /// List registered transformations.
    List,
    /// Describe a transformation's parameters.
    Params,
    /// Run a transformation.
    Xrun,
    /// End the session.
    Close,
}

impl Command {
    /// Parses a command name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownCommand` if the value names no command.
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        match value.to_ascii_lowercase().as_str() {
            "about" => Ok(Self::About),
            "open" => Ok(Self::Open),
            "setdir" => Ok(Self::Setdir),
            "list" => Ok(Self::List),
            "params" => Ok(Self::Params),
            "xrun" => Ok(Self::Xrun),
            "close" => Ok(Self::Close),
            _ => Err(DispatchError::unknown_command(value)),
        }
    }

    /// Returns the canonical command name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Open => "open",
            Self::Setdir => "setdir",
            Self::List => "list",
            Self::Params => "params",
            Self::Xrun => "xrun",
            Self::Close => "close",
        }
    }
}

/// Result of routing and dispatching a command.
#[derive(Debug)]
pub struct DispatchResult {
    /// Reply to send to the client.
    pub reply: Reply,
    /// Whether the dispatch loop should stop after sending the reply.
    pub close: bool,
}

impl DispatchResult {
    /// A reply after which the loop continues.
    #[must_use]
    pub const fn reply(reply: Reply) -> Self {
        Self {
            reply,
            close: false,
        }
    }

    /// A reply after which the loop stops.
    #[must_use]
    pub const fn closing(reply: Reply) -> Self {
        Self { reply, close: true }
    }
}

/// Routes commands to their handlers.
#[derive(Debug, Default)]
pub struct CommandRouter;

impl CommandRouter {
    /// Creates a new command router.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Routes a request to the handler for its command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is unknown, its arguments are invalid,
    /// the session is not ready, or the handler fails.
    pub fn route(
        &self,
        request: &CommandRequest,
        session: &mut Session,
        registry: &TransformationRegistry,
    ) -> Result<DispatchResult, DispatchError> {
        let command = Command::parse(request.command())?;

        debug!(
            target: DISPATCH_TARGET,
            command = command.as_str(),
            level = %session.level(),
            "routing command"
        );

        let reply = match command {
            Command::About => Self::about(),
            Command::Open => Self::open(request, session)?,
            Command::Setdir => Self::setdir(request, session)?,
            Command::List => Self::list(session, registry)?,
            Command::Params => Self::params(request, session, registry)?,
            Command::Xrun => {
                require(session, SessionLevel::FilesystemConfigured)?;
                let arguments: XrunRequest = request.arguments(Command::Xrun.as_str())?;
                xrun::execute(session, registry, &arguments)?
            }
            Command::Close => return Ok(DispatchResult::closing(Reply::Ok)),
        };
        Ok(DispatchResult::reply(reply))
    }

    fn about() -> Reply {
        Reply::About {
            text: vec![
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                "Runs source transformations over a line-delimited JSON protocol.".to_owned(),
                format!("Protocol version {PROTOCOL_VERSION}"),
            ],
        }
    }

    fn open(request: &CommandRequest, session: &mut Session) -> Result<Reply, DispatchError> {
        let arguments: OpenArguments = request.arguments(Command::Open.as_str())?;
        if arguments.version != PROTOCOL_VERSION {
            return Err(DispatchError::UnsupportedVersion {
                version: arguments.version,
            });
        }
        session.open();
        info!(target: DISPATCH_TARGET, version = PROTOCOL_VERSION, "session opened");
        Ok(Reply::Ok)
    }

    fn setdir(request: &CommandRequest, session: &mut Session) -> Result<Reply, DispatchError> {
        require(session, SessionLevel::Open)?;
        let arguments: SetdirArguments = request.arguments(Command::Setdir.as_str())?;
        if arguments.mode != LOCAL_MODE {
            return Err(DispatchError::UnsupportedMode {
                mode: arguments.mode,
            });
        }
        if !arguments.directory.is_dir() {
            return Err(DispatchError::DirectoryNotFound {
                path: arguments.directory,
            });
        }

        info!(
            target: DISPATCH_TARGET,
            directory = %arguments.directory.display(),
            "working directory configured"
        );
        let filesystem = Arc::new(LocalFileSystem::new(arguments.directory.clone()));
        session.configure_filesystem(arguments.directory, filesystem);
        Ok(Reply::Ok)
    }

    fn list(
        session: &Session,
        registry: &TransformationRegistry,
    ) -> Result<Reply, DispatchError> {
        require(session, SessionLevel::Open)?;
        let transformations = registry
            .descriptions()
            .map(|(short_name, description)| TransformationSummary {
                short_name: short_name.to_owned(),
                name: description.name.clone(),
            })
            .collect();
        Ok(Reply::Transformations { transformations })
    }

    fn params(
        request: &CommandRequest,
        session: &Session,
        registry: &TransformationRegistry,
    ) -> Result<Reply, DispatchError> {
        require(session, SessionLevel::Open)?;
        let arguments: ParamsArguments = request.arguments(Command::Params.as_str())?;
        let transformation = registry.get(&arguments.transformation).ok_or_else(|| {
            DispatchError::UnknownTransformation {
                name: arguments.transformation.clone(),
            }
        })?;
        Ok(Reply::Params {
            params: transformation.description().params.clone(),
        })
    }
}

fn require(session: &Session, level: SessionLevel) -> Result<(), DispatchError> {
    if session.is_at_least(level) {
        Ok(())
    } else {
        Err(DispatchError::not_ready(level))
    }
}
