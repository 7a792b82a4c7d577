//! Transformation engine interface for the refract protocol service.
//!
//! The `refract-engine` crate defines what the request handler consumes from
//! a refactoring engine: a [`TransformationRegistry`] of named
//! [`Transformation`]s, the [`TransformationResult`] each run produces, and
//! the text-editing primitives ([`EditSet`], [`Patch`]) that turn a result
//! into diffs or rewritten content. Files are reached through the
//! [`FileSystem`] trait.
//!
//! Transformations themselves live outside the service. A
//! [`PluginManifest`] describes an executable that speaks a single-line JSON
//! protocol over stdio, and [`PluginTransformation`] adapts it to the
//! [`Transformation`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use refract_engine::{PluginManifest, PluginTransformation, ProcessExecutor, TransformationRegistry};
//! use std::path::PathBuf;
//!
//! let manifest = PluginManifest::new("rename", "Rename", PathBuf::from("/usr/bin/go-rename"));
//! let mut registry = TransformationRegistry::new();
//! registry
//!     .register(
//!         manifest.short_name().to_owned(),
//!         Box::new(PluginTransformation::new(manifest, ProcessExecutor::new(30))),
//!     )
//!     .expect("registration succeeds");
//! assert!(registry.is_known("rename"));
//! ```

pub mod edit;
pub mod error;
pub mod filesystem;
pub mod log;
pub mod manifest;
pub mod plugin;
pub mod protocol;
pub mod registry;
pub mod selection;
pub mod transformation;

#[cfg(test)]
mod tests;

pub use self::edit::{EditError, EditSet, Patch, TextEdit};
pub use self::error::EngineError;
pub use self::filesystem::{
    FileSystem, FileSystemError, FsOperation, LocalFileSystem, MemoryFileSystem,
};
pub use self::log::{LogEntry, Severity};
pub use self::manifest::{PluginManifest, load_manifests};
pub use self::plugin::{PluginExecutor, PluginTransformation, ProcessExecutor};
pub use self::protocol::{FilePayload, PluginRequest};
pub use self::registry::TransformationRegistry;
pub use self::selection::TextSelection;
pub use self::transformation::{
    Description, Parameter, RunConfig, Transformation, TransformationResult,
};
