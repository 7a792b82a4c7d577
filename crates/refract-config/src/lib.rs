//! Shared configuration for the refract protocol daemon.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then a
//! TOML file (`--config-path` or `REFRACT_CONFIG_PATH`), then `REFRACT_*`
//! environment variables, then command-line flags. The resulting [`Config`]
//! controls telemetry and where external transformation plugins are
//! declared.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PLUGIN_TIMEOUT_SECS, default_log_filter,
    default_log_filter_string, default_log_format, default_plugin_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REFRACT")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `refractd=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// JSON file listing the external transformations to register.
    pub plugin_manifest: Option<Utf8PathBuf>,
    /// Seconds an external transformation may run before it is killed.
    #[ortho_config(default = default_plugin_timeout_secs())]
    pub plugin_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            plugin_manifest: None,
            plugin_timeout_secs: default_plugin_timeout_secs(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Structured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Location of the plugin manifest file, when one is configured.
    #[must_use]
    pub fn plugin_manifest(&self) -> Option<&Utf8Path> {
        self.plugin_manifest.as_deref()
    }

    /// Timeout applied to each external transformation run.
    #[must_use]
    pub const fn plugin_timeout_secs(&self) -> u64 {
        self.plugin_timeout_secs
    }
}
