//! # Parameterizer - declarative request-parameter organization
//!
//! Parameterizer turns loosely-shaped client input (flat key/value maps
//! referencing foreign-key ids) into a consistent, strongly-shaped record
//! ready to apply to a persisted entity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  ParameterMap │────▶│  Organizer  │────▶│  ResultMap   │
//! │ (client input)│     │ (rule table)│     │ (normalized) │
//! └──────────────┘     └──────┬──────┘     └──────────────┘
//!                             │ find / where_ids
//!                      ┌──────▼──────┐
//!                      │   Lookups   │
//!                      └─────────────┘
//! ```
//!
//! Each entity kind has an ordered table of field rules: copy a value,
//! copy it under a new key, or replace a foreign-key id (or list of ids)
//! with the entity it references. Input keys no rule claims pass through
//! verbatim, so new client parameters need no code changes; keys absent
//! from the input never appear in the output.
//!
//! ## Quick Start
//!
//! ```rust
//! use parameterizer::{organize, FieldRule, TableLookup, TransformationSpec};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let people = Arc::new(TableLookup::from_iter([(1, json!({"id": 1, "name": "Harry"}))]));
//! let spec = TransformationSpec::new(vec![
//!     FieldRule::rename("name", "title"),
//!     FieldRule::resolve_one("writer_id", "writer", people),
//! ]);
//!
//! let params = json!({"id": 1, "name": "n", "writer_id": 1}).as_object().cloned().unwrap();
//! let result = organize(&params, &spec).unwrap();
//! assert_eq!(result["writer"], json!({"id": 1, "name": "Harry"}));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`lookup`] - Lookup collaborator contract and in-memory table
//! - [`organize`] - Field rules and the organizer engine
//! - [`registry`] - Per-kind spec registry

// Core modules
pub mod error;

// Collaborators
pub mod lookup;

// Organization
pub mod organize;

// Registry
pub mod registry;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    LookupError, LookupResult, OrganizeError, OrganizeResult, RegistryError, RegistryResult,
};

// =============================================================================
// Re-exports - Lookups
// =============================================================================

pub use lookup::{EntityId, Lookup, LookupSet, TableLookup};

// =============================================================================
// Re-exports - Organization
// =============================================================================

pub use organize::{
    example_defs, organize, FieldRule, ParameterMap, ResultMap, RuleDef, RuleKind, RuleKindDef,
    SpecDef, TransformationSpec, ASSIGNMENT_KIND, PUBLICATION_KIND,
};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use registry::SpecRegistry;
