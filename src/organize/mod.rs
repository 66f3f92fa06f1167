//! Parameter organization.
//!
//! - Rules: declarative field rules and rule tables
//! - Engine: applies a rule table to a raw parameter map

pub mod engine;
pub mod rules;

pub use engine::{organize, ParameterMap, ResultMap};
pub use rules::{
    example_defs, FieldRule, RuleDef, RuleKind, RuleKindDef, SpecDef, TransformationSpec,
    ASSIGNMENT_KIND, PUBLICATION_KIND,
};
