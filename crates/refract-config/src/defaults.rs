//! Default values shared by the configuration loader and its callers.

use crate::logging::LogFormat;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default time budget, in seconds, granted to an external transformation.
pub const DEFAULT_PLUGIN_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the daemon.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default plugin timeout in seconds.
#[must_use]
pub const fn default_plugin_timeout_secs() -> u64 {
    DEFAULT_PLUGIN_TIMEOUT_SECS
}
