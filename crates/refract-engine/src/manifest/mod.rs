//! Manifests describing externally implemented transformations.
//!
//! A [`PluginManifest`] declares everything the service needs to expose a
//! transformation that runs in a separate process: its short name, the
//! description shown to clients, and the executable to spawn. Manifests are
//! loaded from a JSON array at bootstrap and validated before registration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::transformation::{Description, Parameter};

/// Declarative description of an external transformation.
///
/// # Example
///
/// ```
/// use refract_engine::PluginManifest;
/// use std::path::PathBuf;
///
/// let manifest = PluginManifest::new("rename", "Rename", PathBuf::from("/usr/bin/go-rename"));
/// assert_eq!(manifest.short_name(), "rename");
/// assert_eq!(manifest.description().name, "Rename");
/// assert!(manifest.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    short_name: String,
    name: String,
    #[serde(default)]
    synopsis: String,
    #[serde(default)]
    usage: String,
    #[serde(default)]
    multifile: bool,
    #[serde(default)]
    params: Vec<Parameter>,
    executable: PathBuf,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl PluginManifest {
    /// Creates a manifest with no parameters, arguments or timeout override.
    #[must_use]
    pub fn new(short_name: impl Into<String>, name: impl Into<String>, executable: PathBuf) -> Self {
        Self {
            short_name: short_name.into(),
            name: name.into(),
            synopsis: String::new(),
            usage: String::new(),
            multifile: false,
            params: Vec::new(),
            executable,
            args: Vec::new(),
            timeout_secs: None,
        }
    }

    /// Sets the arguments passed to the executable.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Overrides the service-wide timeout for this plugin.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Declares the parameters the transformation prompts for.
    #[must_use]
    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    /// Validates the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Manifest`] if the short name or display name is
    /// blank, or the executable path is not absolute.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.short_name.trim().is_empty() {
            return Err(EngineError::manifest("plugin short name must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(EngineError::manifest(format!(
                "plugin '{}' must declare a display name",
                self.short_name
            )));
        }
        if !self.executable.is_absolute() {
            return Err(EngineError::manifest(format!(
                "plugin executable must be an absolute path, got '{}'",
                self.executable.display()
            )));
        }
        Ok(())
    }

    /// Short name clients use in requests.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Builds the client-facing description.
    #[must_use]
    pub fn description(&self) -> Description {
        Description {
            name: self.name.clone(),
            synopsis: self.synopsis.clone(),
            usage: self.usage.clone(),
            multifile: self.multifile,
            params: self.params.clone(),
        }
    }

    /// Executable to spawn.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Timeout override, if any.
    #[must_use]
    pub const fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

/// Reads and validates the manifests listed in a JSON file.
///
/// The file holds a JSON array of manifest objects.
///
/// # Errors
///
/// Returns [`EngineError::ManifestRead`] or [`EngineError::ManifestParse`]
/// when the file cannot be loaded, and [`EngineError::Manifest`] for the
/// first manifest that fails validation.
pub fn load_manifests(path: &Path) -> Result<Vec<PluginManifest>, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::ManifestRead {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    let manifests: Vec<PluginManifest> =
        serde_json::from_str(&text).map_err(|source| EngineError::ManifestParse {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
    for manifest in &manifests {
        manifest.validate()?;
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests;
