//! Transformations implemented by external processes.
//!
//! [`PluginTransformation`] adapts a [`PluginManifest`] to the
//! [`Transformation`] trait. Running it builds a [`PluginRequest`] from the
//! run configuration and hands it to a [`PluginExecutor`]; the production
//! executor is [`ProcessExecutor`], and tests substitute doubles that return
//! canned results.

mod process;

use tracing::warn;

use crate::error::EngineError;
use crate::manifest::PluginManifest;
use crate::protocol::{FilePayload, PluginRequest};
use crate::transformation::{Description, RunConfig, Transformation, TransformationResult};

pub use self::process::ProcessExecutor;

/// Tracing target for plugin operations.
pub(crate) const PLUGIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::plugin");

/// Trait abstracting plugin process execution for testability.
pub trait PluginExecutor: Send + Sync {
    /// Executes the plugin described by `manifest`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the plugin cannot be spawned, times out,
    /// exits with a non-zero status, or produces invalid output.
    fn execute(
        &self,
        manifest: &PluginManifest,
        request: &PluginRequest,
    ) -> Result<TransformationResult, EngineError>;
}

/// A transformation delegated to an external process.
#[derive(Debug)]
pub struct PluginTransformation<E> {
    manifest: PluginManifest,
    description: Description,
    executor: E,
}

impl<E> PluginTransformation<E> {
    /// Wraps a manifest with the executor used to run it.
    #[must_use]
    pub fn new(manifest: PluginManifest, executor: E) -> Self {
        let description = manifest.description();
        Self {
            manifest,
            description,
            executor,
        }
    }

    /// Manifest backing this transformation.
    #[must_use]
    pub const fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn build_request(&self, config: &RunConfig) -> Result<PluginRequest, EngineError> {
        let path = &config.selection.filename;
        let content = config
            .filesystem
            .read_to_string(path)
            .map_err(|error| EngineError::InvalidOutput {
                name: self.manifest.short_name().to_owned(),
                message: format!("cannot read selected file: {error}"),
            })?;
        Ok(PluginRequest::new(
            self.manifest.short_name(),
            config.selection.clone(),
            config.args.clone(),
        )
        .with_scope(config.scope.clone())
        .with_files(vec![FilePayload::new(path.clone(), content)]))
    }
}

impl<E: PluginExecutor> Transformation for PluginTransformation<E> {
    fn description(&self) -> &Description {
        &self.description
    }

    fn run(&self, config: &RunConfig) -> TransformationResult {
        let outcome = self
            .build_request(config)
            .and_then(|request| self.executor.execute(&self.manifest, &request));
        match outcome {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    target: PLUGIN_TARGET,
                    plugin = self.manifest.short_name(),
                    %error,
                    "transformation plugin failed"
                );
                TransformationResult::fatal(error.to_string())
            }
        }
    }
}
