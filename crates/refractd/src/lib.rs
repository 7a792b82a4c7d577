//! Protocol daemon for the refract refactoring service.
//!
//! `refractd` speaks a line-delimited JSON protocol on stdin and stdout. A
//! client opens a session, points it at a working directory, and then asks
//! for transformations to be run with `xrun`. Transformations come from the
//! [`refract_engine`] registry, populated at bootstrap from the plugin
//! manifest named in [`refract_config::Config`].
//!
//! Each request is handled to completion before the next line is read:
//!
//! 1. The request is validated against the [`Session`] readiness level.
//! 2. The transformation runs and its log is inspected for fatal entries.
//! 3. Edits are encoded either as unified diffs persisted next to the
//!    original file (`patch` mode) or as rewritten content (`text` mode).
//!
//! Logs go to stderr so stdout carries nothing but protocol replies.

mod bootstrap;
pub mod dispatch;
pub mod session;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
    build_registry,
};
pub use dispatch::{DispatchError, Dispatcher, Reply};
pub use session::{Session, SessionLevel};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
