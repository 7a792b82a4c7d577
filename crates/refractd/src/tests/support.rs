//! Shared test doubles.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use refract_config::Config;
use refract_engine::{Description, RunConfig, Transformation, TransformationResult};

use crate::bootstrap::ConfigLoader;

/// Transformation that returns a fixed result regardless of its input.
pub struct ScriptedTransformation {
    description: Description,
    result: TransformationResult,
}

impl ScriptedTransformation {
    pub fn new(name: &str, result: TransformationResult) -> Self {
        Self {
            description: Description::named(name),
            result,
        }
    }
}

impl Transformation for ScriptedTransformation {
    fn description(&self) -> &Description {
        &self.description
    }

    fn run(&self, _config: &RunConfig) -> TransformationResult {
        self.result.clone()
    }
}

/// Loader that intentionally fails by passing an invalid CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("refractd"),
            OsString::from("--plugin-timeout-secs"),
            OsString::from("soon"),
        ];
        Config::load_from_iter(args)
    }
}
