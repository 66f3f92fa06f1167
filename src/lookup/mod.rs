//! Lookup collaborators - resolve entity ids to stored entities.
//!
//! A [`Lookup`] is the only boundary the organizer has to the outside
//! world. It resolves a single id ([`Lookup::find`]) or an ordered batch
//! ([`Lookup::where_ids`]) to entities, where "no matching entity" is a
//! normal `None` result and an `Err` means the backing store itself failed.
//!
//! Two pieces ship with the crate:
//!
//! - [`TableLookup`] - a generic in-memory keyed table, enough for any
//!   entity kind whose reference data fits in a map
//! - [`LookupSet`] - named lookup handles, used when binding declarative
//!   spec definitions to their collaborators at startup

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::LookupResult;

/// Identifier type for entities referenced by foreign-key parameters.
pub type EntityId = i64;

// =============================================================================
// Lookup Contract
// =============================================================================

/// Capability to resolve entity ids to entities.
///
/// Implementations must be deterministic per call and must not mutate
/// shared state: concurrent `organize` calls hold shared references.
pub trait Lookup: Send + Sync + fmt::Debug {
    /// Resolve a single id.
    ///
    /// `Ok(None)` means no entity matches; it is not an error.
    fn find(&self, id: EntityId) -> LookupResult<Option<Value>>;

    /// Resolve an ordered batch of ids.
    ///
    /// The result has the same length and order as `ids`, with `None` at
    /// every position whose id has no match. An empty input yields an
    /// empty output.
    fn where_ids(&self, ids: &[EntityId]) -> LookupResult<Vec<Option<Value>>> {
        ids.iter().map(|id| self.find(*id)).collect()
    }
}

// =============================================================================
// In-memory Table Lookup
// =============================================================================

/// A generic keyed-table lookup backed by an in-memory map.
///
/// Covers every entity kind whose reference data is a plain id-keyed table
/// (the shipped category and person lookups are both instances of this).
/// Never returns a [`crate::error::LookupError`].
#[derive(Debug, Clone, Default)]
pub struct TableLookup {
    entries: HashMap<EntityId, Value>,
}

impl TableLookup {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity under its id.
    pub fn insert(&mut self, id: EntityId, entity: Value) {
        self.entries.insert(id, entity);
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(EntityId, Value)> for TableLookup {
    fn from_iter<I: IntoIterator<Item = (EntityId, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Lookup for TableLookup {
    fn find(&self, id: EntityId) -> LookupResult<Option<Value>> {
        Ok(self.entries.get(&id).cloned())
    }
}

// =============================================================================
// Named Lookup Set
// =============================================================================

/// Named registry of lookup collaborators.
///
/// Declarative spec definitions reference their lookups by name
/// (e.g. `"lookup": "categories"`); a `LookupSet` supplies the handles
/// those names bind to. Populated once at startup.
#[derive(Debug, Default)]
pub struct LookupSet {
    lookups: HashMap<String, Arc<dyn Lookup>>,
}

impl LookupSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lookup under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, lookup: Arc<dyn Lookup>) {
        self.lookups.insert(name.into(), lookup);
    }

    /// Get a handle by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Lookup>> {
        self.lookups.get(name).cloned()
    }

    /// Registered names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.lookups.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> TableLookup {
        [
            (1, json!({"id": 1, "name": "Advertising"})),
            (2, json!({"id": 2, "name": "Marketing"})),
            (3, json!({"id": 3, "name": "Finance"})),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_find_present_and_missing() {
        let table = categories();
        assert_eq!(
            table.find(2).unwrap(),
            Some(json!({"id": 2, "name": "Marketing"}))
        );
        assert_eq!(table.find(99).unwrap(), None);
    }

    #[test]
    fn test_where_ids_preserves_order_and_length() {
        let table = categories();
        let resolved = table.where_ids(&[3, 99, 1, 3]).unwrap();
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0], Some(json!({"id": 3, "name": "Finance"})));
        assert_eq!(resolved[1], None);
        assert_eq!(resolved[2], Some(json!({"id": 1, "name": "Advertising"})));
        assert_eq!(resolved[3], resolved[0]);
    }

    #[test]
    fn test_where_ids_empty() {
        let table = categories();
        assert_eq!(table.where_ids(&[]).unwrap(), Vec::new());
    }

    #[test]
    fn test_lookup_set_register_and_get() {
        let mut set = LookupSet::new();
        set.register("categories", Arc::new(categories()));

        assert!(set.get("categories").is_some());
        assert!(set.get("writers").is_none());
    }
}
