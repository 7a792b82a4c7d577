//! Daemon bootstrap orchestration.
//!
//! Bootstrapping loads configuration, installs telemetry and registers the
//! external transformations named in the plugin manifest. The resulting
//! [`Daemon`] owns a [`Dispatcher`] ready to serve stdin.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use refract_config::Config;
use refract_engine::{
    EngineError, PluginTransformation, ProcessExecutor, TransformationRegistry, load_manifests,
};
use thiserror::Error;
use tracing::{error, info};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when no configuration can be resolved.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The plugin manifest could not be loaded or registered.
    #[error("failed to register transformations: {source}")]
    Plugins {
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Accessor for the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serves protocol requests until EOF or `close`.
    ///
    /// # Errors
    ///
    /// Returns an error when the input or output stream fails.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<(), DispatchError> {
        self.dispatcher.serve(input, output)
    }
}

/// Builds the transformation registry described by `config`.
///
/// Without a configured manifest the registry is empty.
///
/// # Errors
///
/// Returns [`EngineError`] when the manifest cannot be read or two plugins
/// share a short name.
pub fn build_registry(config: &Config) -> Result<TransformationRegistry, EngineError> {
    let mut registry = TransformationRegistry::new();
    let Some(path) = config.plugin_manifest() else {
        info!(
            target: BOOTSTRAP_TARGET,
            "no plugin manifest configured; no transformations registered"
        );
        return Ok(registry);
    };

    let executor_timeout = config.plugin_timeout_secs();
    for manifest in load_manifests(path.as_std_path())? {
        let short_name = manifest.short_name().to_owned();
        registry.register(
            short_name,
            Box::new(PluginTransformation::new(
                manifest,
                ProcessExecutor::new(executor_timeout),
            )),
        )?;
    }

    info!(
        target: BOOTSTRAP_TARGET,
        manifest = %path,
        transformations = registry.len(),
        "transformations registered"
    );
    Ok(registry)
}

/// Bootstraps the daemon using the supplied configuration loader.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first stage that fails.
pub fn bootstrap_with(loader: &dyn ConfigLoader) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;

    let telemetry = telemetry::initialise(&config)
        .map_err(|source| BootstrapError::Telemetry { source })?;

    let registry = build_registry(&config).map_err(|source| {
        let failure = BootstrapError::Plugins { source };
        error!(target: BOOTSTRAP_TARGET, error = %failure, "daemon bootstrap failed");
        failure
    })?;

    info!(
        target: BOOTSTRAP_TARGET,
        log_filter = %config.log_filter(),
        log_format = %config.log_format(),
        "daemon bootstrap completed"
    );
    Ok(Daemon {
        config,
        dispatcher: Dispatcher::new(registry),
        telemetry,
    })
}
