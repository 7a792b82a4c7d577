//! Registry of transformations keyed by short name.
//!
//! The [`TransformationRegistry`] owns every transformation the service can
//! run. Lookups are by the short name clients send in `xrun` requests, and
//! iteration is in short-name order so listings are stable.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::transformation::{Description, Transformation};

/// Registry of available transformations.
#[derive(Default)]
pub struct TransformationRegistry {
    transformations: BTreeMap<String, Box<dyn Transformation>>,
}

impl std::fmt::Debug for TransformationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationRegistry")
            .field("transformations", &self.transformations.keys())
            .finish()
    }
}

impl TransformationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transformation under `short_name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Manifest`] for a blank name and
    /// [`EngineError::DuplicateTransformation`] when the name is taken.
    pub fn register(
        &mut self,
        short_name: impl Into<String>,
        transformation: Box<dyn Transformation>,
    ) -> Result<(), EngineError> {
        let name = short_name.into();
        if name.trim().is_empty() {
            return Err(EngineError::manifest("transformation name must not be empty"));
        }
        if self.transformations.contains_key(&name) {
            return Err(EngineError::DuplicateTransformation { name });
        }
        self.transformations.insert(name, transformation);
        Ok(())
    }

    /// Returns `true` when `short_name` is registered.
    #[must_use]
    pub fn is_known(&self, short_name: &str) -> bool {
        self.transformations.contains_key(short_name)
    }

    /// Looks up a transformation by short name.
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<&dyn Transformation> {
        self.transformations.get(short_name).map(|transformation| &**transformation)
    }

    /// Iterates over `(short name, description)` pairs in name order.
    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &Description)> {
        self.transformations
            .iter()
            .map(|(name, transformation)| (name.as_str(), transformation.description()))
    }

    /// Returns the number of registered transformations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}
