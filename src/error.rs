//! Error types for the parameter organization pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`RegistryError`] - Spec registration and lookup-binding errors
//! - [`LookupError`] - Collaborator (backing store) failures
//! - [`OrganizeError`] - Errors surfaced by an `organize` call
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Note what is *not* an error: an input key missing from the parameters,
//! an explicit null value, or an id with no matching entity. Those are all
//! normal outcomes of organizing loosely-shaped client input.

use thiserror::Error;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the transformation-spec registry.
///
/// Malformed rule configuration (e.g. a resolve rule naming a lookup that
/// was never registered) is detected here, when a spec is registered,
/// never at `organize` time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No spec registered for the requested entity kind.
    #[error("No spec registered for kind: {0}")]
    UnknownKind(String),

    /// A resolve rule names a lookup that is not in the lookup set.
    #[error("Rule for '{source}' names unknown lookup: {lookup}")]
    UnknownLookup { r#source: String, lookup: String },

    /// Spec definition is structurally invalid.
    #[error("Invalid spec definition: {0}")]
    InvalidDef(String),

    /// IO error while loading spec definitions.
    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while parsing a spec definition.
    #[error("Registry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Lookup Errors
// =============================================================================

/// Infrastructure failure in a lookup collaborator.
///
/// Distinct from "no matching entity", which is a normal `Ok(None)` result.
/// The in-memory [`crate::lookup::TableLookup`] never fails; collaborators
/// backed by real storage may.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The backing store reported a failure.
    #[error("Lookup backend failure: {0}")]
    Backend(String),

    /// The backing store is unreachable.
    #[error("Lookup backend unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Organize Errors (call-time)
// =============================================================================

/// Errors surfaced by [`crate::organize`].
///
/// A collaborator failure propagates unchanged: it is never retried and
/// never converted into a null result.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// A lookup collaborator failed.
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LookupError -> OrganizeError
        let lookup_err = LookupError::Unavailable("connection refused".into());
        let organize_err: OrganizeError = lookup_err.into();
        assert!(organize_err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_unknown_lookup_format() {
        let err = RegistryError::UnknownLookup {
            source: "writer_id".into(),
            lookup: "writers".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("writer_id"));
        assert!(msg.contains("writers"));
    }

    #[test]
    fn test_unknown_kind_format() {
        let err = RegistryError::UnknownKind("article".into());
        assert!(err.to_string().contains("article"));
    }
}
