//! Spec registry - the rule table for each entity kind.
//!
//! Holds one bound [`TransformationSpec`] per entity kind, built once at
//! startup. Call sites pick the governing spec with [`SpecRegistry::spec_for`];
//! the engine itself never infers a kind from the parameter shape.
//!
//! Definitions can be registered programmatically or loaded from a
//! directory of JSON files, one `<kind>.json` per entity kind. Binding
//! errors (an unknown lookup name, a rename rule without an output key)
//! surface at registration, never during an `organize` call.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{RegistryError, RegistryResult};
use crate::lookup::LookupSet;
use crate::organize::rules::{SpecDef, TransformationSpec};

/// Registry of bound specs, keyed by entity kind.
#[derive(Debug, Default)]
pub struct SpecRegistry {
    specs: HashMap<String, TransformationSpec>,
}

impl SpecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-bound spec under a kind, replacing any previous
    /// entry.
    pub fn register(&mut self, kind: impl Into<String>, spec: TransformationSpec) {
        self.specs.insert(kind.into(), spec);
    }

    /// Bind a declarative definition against `lookups` and register it.
    pub fn register_def(
        &mut self,
        kind: impl Into<String>,
        def: &SpecDef,
        lookups: &LookupSet,
    ) -> RegistryResult<()> {
        let spec = def.bind(lookups)?;
        self.register(kind, spec);
        Ok(())
    }

    /// Load every `<kind>.json` definition in `dir` and register it.
    ///
    /// The file stem is the entity kind. Unlike a best-effort cache load,
    /// a file that fails to parse or bind aborts the whole load: a broken
    /// rule table is a startup configuration error.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>, lookups: &LookupSet) -> RegistryResult<usize> {
        let mut loaded = 0;

        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }

            let kind = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    RegistryError::InvalidDef(format!("unreadable file name: {}", path.display()))
                })?
                .to_string();

            let content = fs::read_to_string(&path)?;
            let def = SpecDef::from_json(&content)?;
            self.register_def(kind, &def, lookups)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Get the spec governing `kind`.
    pub fn spec_for(&self, kind: &str) -> RegistryResult<&TransformationSpec> {
        self.specs
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_string()))
    }

    /// Registered kinds, unordered.
    pub fn kinds(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }
}
