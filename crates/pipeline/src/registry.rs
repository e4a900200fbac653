//! A name-keyed registry of transform factories.
//!
//! Rather than dynamically loading stages from separate compilation
//! units, this crate resolves them through an in-process map from a
//! CLI-supplied stage name to a constructor for that name's
//! [`Transform`]. Every built-in transformation registers itself here.

use std::collections::BTreeMap;

use crate::transform::Transform;

/// Constructs a fresh [`Transform`] instance for one stage occurrence.
/// A factory rather than a shared instance because a pipeline may use
/// the same stage name more than once (e.g. `logger logger logger`),
/// and each occurrence needs its own, independently-owned transform
/// state.
pub type TransformFactory = Box<dyn Fn() -> Box<dyn Transform> + Send + Sync>;

/// Maps stage names to the factories that build them.
#[derive(Default)]
pub struct StageRegistry {
    factories: BTreeMap<String, TransformFactory>,
}

impl StageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`. Re-registering the same name
    /// replaces the previous factory.
    pub fn register(&mut self, name: impl Into<String>, factory: TransformFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Builds a new transform instance for `name`, or `None` if no
    /// factory is registered under that name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Transform>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// The names currently registered, in sorted order, used to build
    /// helpful "unknown stage" error messages.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
