//! Field rule definitions.
//!
//! A [`TransformationSpec`] is an ordered table of [`FieldRule`]s describing
//! how output fields derive from input parameters: copy, rename, or replace
//! a foreign-key id (or list of ids) with the entity it references.
//!
//! Rules exist in two forms:
//!
//! - [`RuleDef`] / [`SpecDef`] - the declarative, serde-(de)serializable
//!   form, where resolve rules name their lookup by string
//! - [`FieldRule`] - the bound runtime form, holding a shared lookup handle
//!
//! Binding happens once at registration ([`SpecDef::bind`]); a def naming
//! an unknown lookup fails there, never during an `organize` call.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::lookup::{Lookup, LookupSet};

// =============================================================================
// Runtime Rules
// =============================================================================

/// How a rule computes its output value.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Pass the value through unchanged.
    Copy,
    /// Pass the value through under the output key.
    Rename,
    /// Treat the value as a single entity id and resolve it.
    ResolveOne(Arc<dyn Lookup>),
    /// Treat the value as a list of entity ids and resolve each in order.
    ResolveMany(Arc<dyn Lookup>),
}

/// A single bound field rule.
///
/// Rules are cheap to clone (resolve kinds hold an `Arc` handle), so two
/// specs that need identical behavior share one rule value rather than
/// duplicating its definition.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Input key this rule consumes.
    pub source_key: String,
    /// Output key this rule produces.
    pub output_key: String,
    /// Value computation.
    pub kind: RuleKind,
}

impl FieldRule {
    /// Pass `source` through unchanged.
    pub fn copy(source: &str) -> Self {
        Self {
            source_key: source.to_string(),
            output_key: source.to_string(),
            kind: RuleKind::Copy,
        }
    }

    /// Copy the value of `source` under `output`.
    pub fn rename(source: &str, output: &str) -> Self {
        Self {
            source_key: source.to_string(),
            output_key: output.to_string(),
            kind: RuleKind::Rename,
        }
    }

    /// Resolve a single id under `source` into the entity it references.
    pub fn resolve_one(source: &str, output: &str, lookup: Arc<dyn Lookup>) -> Self {
        Self {
            source_key: source.to_string(),
            output_key: output.to_string(),
            kind: RuleKind::ResolveOne(lookup),
        }
    }

    /// Resolve a list of ids under `source` into an ordered entity list.
    pub fn resolve_many(source: &str, output: &str, lookup: Arc<dyn Lookup>) -> Self {
        Self {
            source_key: source.to_string(),
            output_key: output.to_string(),
            kind: RuleKind::ResolveMany(lookup),
        }
    }
}

/// An ordered rule table for one entity kind.
#[derive(Debug, Clone, Default)]
pub struct TransformationSpec {
    rules: Vec<FieldRule>,
}

impl TransformationSpec {
    /// Build a spec from rules, applied in the given order.
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

impl FromIterator<FieldRule> for TransformationSpec {
    fn from_iter<I: IntoIterator<Item = FieldRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Declarative Definitions
// =============================================================================

/// Declarative form of a rule kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKindDef {
    /// Pass through unchanged.
    Copy,
    /// Copy under the rule's `output` key.
    Rename,
    /// Resolve a single id via the named lookup.
    ResolveOne { lookup: String },
    /// Resolve a list of ids via the named lookup.
    ResolveMany { lookup: String },
}

/// Declarative form of a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Input key to consume.
    pub source: String,

    /// Output key to produce (defaults to `source` when omitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Value computation.
    #[serde(flatten)]
    pub kind: RuleKindDef,
}

/// Declarative form of a complete rule table.
///
/// ```json
/// {
///   "description": "Assignment update parameters",
///   "rules": [
///     {"type": "rename", "source": "name", "output": "title"},
///     {"type": "resolve_one", "source": "writer_id", "output": "writer", "lookup": "people"},
///     {"type": "resolve_many", "source": "category_ids", "output": "categories", "lookup": "categories"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDef {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Ordered rule definitions.
    pub rules: Vec<RuleDef>,
}

impl SpecDef {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Bind every rule against the lookup set, producing a runtime spec.
    ///
    /// Fails when a resolve rule names a lookup absent from `lookups` or a
    /// rename rule omits its output key. This is the registration-time
    /// configuration check: a spec that binds cleanly cannot fail over its
    /// own configuration later.
    pub fn bind(&self, lookups: &LookupSet) -> RegistryResult<TransformationSpec> {
        self.rules
            .iter()
            .map(|def| def.bind(lookups))
            .collect::<RegistryResult<Vec<_>>>()
            .map(TransformationSpec::new)
    }

    /// Lookup names referenced by this definition, in rule order.
    pub fn lookup_names(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter_map(|r| match &r.kind {
                RuleKindDef::ResolveOne { lookup } | RuleKindDef::ResolveMany { lookup } => {
                    Some(lookup.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

impl RuleDef {
    fn bind(&self, lookups: &LookupSet) -> RegistryResult<FieldRule> {
        let output_key = match (&self.output, &self.kind) {
            (Some(output), _) => output.clone(),
            (None, RuleKindDef::Rename) => {
                return Err(RegistryError::InvalidDef(format!(
                    "rename rule for '{}' has no output key",
                    self.source
                )));
            }
            (None, _) => self.source.clone(),
        };

        let kind = match &self.kind {
            RuleKindDef::Copy => RuleKind::Copy,
            RuleKindDef::Rename => RuleKind::Rename,
            RuleKindDef::ResolveOne { lookup } => {
                RuleKind::ResolveOne(self.lookup_handle(lookups, lookup)?)
            }
            RuleKindDef::ResolveMany { lookup } => {
                RuleKind::ResolveMany(self.lookup_handle(lookups, lookup)?)
            }
        };

        Ok(FieldRule {
            source_key: self.source.clone(),
            output_key,
            kind,
        })
    }

    fn lookup_handle(&self, lookups: &LookupSet, name: &str) -> RegistryResult<Arc<dyn Lookup>> {
        lookups.get(name).ok_or_else(|| RegistryError::UnknownLookup {
            source: self.source.clone(),
            lookup: name.to_string(),
        })
    }
}

// =============================================================================
// Shipped Example Definitions
// =============================================================================

/// Entity kind for assignment update parameters.
pub const ASSIGNMENT_KIND: &str = "assignment";

/// Entity kind for publication update parameters.
pub const PUBLICATION_KIND: &str = "publication";

// Both kinds resolve `category_ids` the same way; the rule is defined once
// and reused in both tables.
fn categories_rule() -> RuleDef {
    RuleDef {
        source: "category_ids".to_string(),
        output: Some("categories".to_string()),
        kind: RuleKindDef::ResolveMany {
            lookup: "categories".to_string(),
        },
    }
}

static EXAMPLE_DEFS: Lazy<Vec<(&'static str, SpecDef)>> = Lazy::new(|| {
    let assignment = SpecDef {
        description: "Assignment update parameters".to_string(),
        rules: vec![
            RuleDef {
                source: "name".to_string(),
                output: Some("title".to_string()),
                kind: RuleKindDef::Rename,
            },
            RuleDef {
                source: "writer_id".to_string(),
                output: Some("writer".to_string()),
                kind: RuleKindDef::ResolveOne {
                    lookup: "people".to_string(),
                },
            },
            categories_rule(),
        ],
    };

    let publication = SpecDef {
        description: "Publication update parameters".to_string(),
        rules: vec![
            RuleDef {
                source: "owner_id".to_string(),
                output: Some("owner".to_string()),
                kind: RuleKindDef::ResolveOne {
                    lookup: "people".to_string(),
                },
            },
            categories_rule(),
            RuleDef {
                source: "url".to_string(),
                output: None,
                kind: RuleKindDef::Copy,
            },
        ],
    };

    vec![(ASSIGNMENT_KIND, assignment), (PUBLICATION_KIND, publication)]
});

/// The two shipped rule tables ("assignment" and "publication").
///
/// Both expect a lookup set with `"categories"` and `"people"` registered.
pub fn example_defs() -> &'static [(&'static str, SpecDef)] {
    &EXAMPLE_DEFS
}
