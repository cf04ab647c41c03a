//! Name-to-builder registry.
//!
//! Rule definitions refer to stages (`normalize`, `check`) and helpers
//! (`+s_up`, `+json_delete_fields`) by name. The registry maps each name to
//! the function that compiles a definition into a [`Lifter`]. It is filled
//! once, before any pipeline is built, and only read afterwards.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{BuildError, Result};
use crate::helpers;
use crate::lifter::Lifter;
use crate::stages;
use crate::tracer::Tracer;

/// Compiles a definition into a lifter.
///
/// Stage builders use the registry argument to build the definitions they
/// contain.
pub type BuilderFn = fn(&Value, &Registry, &Tracer) -> Result<Lifter>;

/// A table of named builders.
#[derive(Clone, Default)]
pub struct Registry {
    builders: HashMap<String, BuilderFn>,
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_defaults);

/// The process-wide registry holding every built-in stage and helper.
///
/// Initialized on first use and read-only from then on.
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            builders: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in stage and helper builder.
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        for (name, builder) in stages::BUILDERS.iter().chain(helpers::BUILDERS) {
            // Built-in names are unique, see test_defaults_cover_every_builtin.
            if let Err(e) = registry.register(name, *builder) {
                log::error!("{e}");
            }
        }
        registry
    }

    /// Register a builder under `name`. Names are unique.
    pub fn register(&mut self, name: &str, builder: BuilderFn) -> Result<()> {
        if self.builders.contains_key(name) {
            return Err(BuildError::DuplicateBuilder(name.to_string()));
        }
        log::debug!("registered builder '{name}'");
        self.builders.insert(name.to_string(), builder);
        Ok(())
    }

    /// Look up a builder.
    pub fn get(&self, name: &str) -> Result<BuilderFn> {
        self.builders
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownBuilder(name.to_string()))
    }

    /// Returns `true` if a builder is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered builders.
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Look up `name` and build `definition` with it.
    pub fn build(&self, name: &str, definition: &Value, tracer: &Tracer) -> Result<Lifter> {
        let builder = self.get(name)?;
        builder(definition, self, tracer)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("builders", &self.names())
            .finish()
    }
}
