//! Organizer engine.
//!
//! Applies a [`TransformationSpec`] to a raw parameter map: rule outputs
//! first, then every unclaimed input key verbatim. The pass-through step is
//! what lets new client parameters flow through without code changes.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::OrganizeResult;
use crate::lookup::{EntityId, Lookup};
use crate::organize::rules::{RuleKind, TransformationSpec};

/// Raw input parameters, as decoded from a request body.
pub type ParameterMap = Map<String, Value>;

/// Organized output, ready to apply to a persisted entity.
pub type ResultMap = Map<String, Value>;

/// Organize a raw parameter map according to a rule table.
///
/// For each rule, in declared order: if the input contains the rule's
/// source key, the key is claimed and the rule's output is emitted; an
/// absent source key produces nothing at all. Every input key no rule
/// claimed is copied through unchanged. The input is never mutated.
///
/// An explicit null input value stays an explicit null output value, for
/// resolve rules included. An id with no matching entity resolves to null;
/// only a collaborator infrastructure failure is an error.
pub fn organize(params: &ParameterMap, spec: &TransformationSpec) -> OrganizeResult<ResultMap> {
    let mut result = ResultMap::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for rule in spec.rules() {
        let Some(value) = params.get(&rule.source_key) else {
            continue;
        };
        claimed.insert(rule.source_key.as_str());

        let output = match &rule.kind {
            RuleKind::Copy | RuleKind::Rename => value.clone(),
            RuleKind::ResolveOne(lookup) => resolve_one(value, lookup.as_ref())?,
            RuleKind::ResolveMany(lookup) => resolve_many(value, lookup.as_ref())?,
        };
        result.insert(rule.output_key.clone(), output);
    }

    for (key, value) in params {
        if claimed.contains(key.as_str()) {
            continue;
        }
        // A rule output takes precedence over a colliding input key.
        result.entry(key.clone()).or_insert_with(|| value.clone());
    }

    Ok(result)
}

/// Resolve a single-id value.
///
/// Null stays null; a value that is not an integer id resolves to null
/// without consulting the collaborator.
fn resolve_one(value: &Value, lookup: &dyn Lookup) -> OrganizeResult<Value> {
    let Some(id) = as_id(value) else {
        return Ok(Value::Null);
    };
    Ok(lookup.find(id)?.unwrap_or(Value::Null))
}

/// Resolve an id-list value.
///
/// Output is parallel to the input list: same length, same order,
/// duplicates intact, null at every unresolved position. Null input stays
/// null, and a non-array value resolves to null. An empty list yields an
/// empty list.
fn resolve_many(value: &Value, lookup: &dyn Lookup) -> OrganizeResult<Value> {
    let Some(items) = value.as_array() else {
        return Ok(Value::Null);
    };

    let ids: Vec<Option<EntityId>> = items.iter().map(as_id).collect();
    let present: Vec<EntityId> = ids.iter().copied().flatten().collect();
    let mut resolved = lookup.where_ids(&present)?.into_iter();

    // Re-interleave: positions holding a malformed id stay null.
    let entities = ids
        .into_iter()
        .map(|id| match id {
            Some(_) => resolved.next().flatten().unwrap_or(Value::Null),
            None => Value::Null,
        })
        .collect();

    Ok(Value::Array(entities))
}

fn as_id(value: &Value) -> Option<EntityId> {
    value.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LookupError, LookupResult, OrganizeError};
    use crate::lookup::TableLookup;
    use crate::organize::rules::FieldRule;
    use serde_json::json;
    use std::sync::Arc;

    fn people() -> Arc<dyn Lookup> {
        Arc::new(TableLookup::from_iter([
            (1, json!({"id": 1, "name": "Harry"})),
            (2, json!({"id": 2, "name": "Ron"})),
            (3, json!({"id": 3, "name": "Hermoine"})),
        ]))
    }

    fn params(value: Value) -> ParameterMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_copy_and_rename() {
        let spec = TransformationSpec::new(vec![
            FieldRule::rename("name", "title"),
            FieldRule::copy("url"),
        ]);
        let input = params(json!({"name": "n", "url": "https://x"}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"title": "n", "url": "https://x"}));
    }

    #[test]
    fn test_absent_source_produces_nothing() {
        let spec = TransformationSpec::new(vec![
            FieldRule::rename("name", "title"),
            FieldRule::resolve_one("writer_id", "writer", people()),
        ]);
        let input = params(json!({"id": 7}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"id": 7}));
    }

    #[test]
    fn test_explicit_null_is_preserved() {
        let spec = TransformationSpec::new(vec![
            FieldRule::rename("name", "title"),
            FieldRule::resolve_one("writer_id", "writer", people()),
            FieldRule::resolve_many("category_ids", "categories", people()),
        ]);
        let input = params(json!({
            "name": null,
            "writer_id": null,
            "category_ids": null
        }));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"title": null, "writer": null, "categories": null})
        );
    }

    #[test]
    fn test_resolve_one_missing_entity_is_null() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_one(
            "writer_id", "writer", people(),
        )]);
        let input = params(json!({"writer_id": 99}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"writer": null}));
    }

    #[test]
    fn test_resolve_one_malformed_id_is_null() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_one(
            "writer_id", "writer", people(),
        )]);
        let input = params(json!({"writer_id": "three"}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"writer": null}));
    }

    #[test]
    fn test_resolve_many_preserves_order_length_duplicates() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_many(
            "person_ids", "persons", people(),
        )]);
        let input = params(json!({"person_ids": [3, 99, 1, 3, "x"]}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"persons": [
                {"id": 3, "name": "Hermoine"},
                null,
                {"id": 1, "name": "Harry"},
                {"id": 3, "name": "Hermoine"},
                null
            ]})
        );
    }

    #[test]
    fn test_resolve_many_empty_list() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_many(
            "person_ids", "persons", people(),
        )]);
        let input = params(json!({"person_ids": []}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"persons": []}));
    }

    #[test]
    fn test_resolve_many_non_array_is_null() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_many(
            "person_ids", "persons", people(),
        )]);
        let input = params(json!({"person_ids": 3}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"persons": null}));
    }

    #[test]
    fn test_unclaimed_keys_pass_through() {
        let spec = TransformationSpec::new(vec![FieldRule::rename("name", "title")]);
        let input = params(json!({
            "id": 1,
            "name": "n",
            "keywords": ["Energetic"]
        }));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"id": 1, "title": "n", "keywords": ["Energetic"]})
        );
    }

    #[test]
    fn test_rule_output_wins_over_colliding_input_key() {
        let spec = TransformationSpec::new(vec![FieldRule::rename("name", "title")]);
        let input = params(json!({"name": "renamed", "title": "stale"}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(result.get("title"), Some(&json!("renamed")));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let spec = TransformationSpec::new(vec![FieldRule::rename("name", "title")]);
        let input = params(json!({"name": "n"}));
        let snapshot = input.clone();

        organize(&input, &spec).unwrap();
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let spec = TransformationSpec::default();
        let input = params(json!({"a": 1, "b": null}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(result, input);
    }

    #[derive(Debug)]
    struct FailingLookup;

    impl Lookup for FailingLookup {
        fn find(&self, _id: EntityId) -> LookupResult<Option<Value>> {
            Err(LookupError::Unavailable("store offline".into()))
        }
    }

    #[test]
    fn test_collaborator_failure_propagates() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_one(
            "writer_id",
            "writer",
            Arc::new(FailingLookup),
        )]);
        let input = params(json!({"writer_id": 3}));

        let err = organize(&input, &spec).unwrap_err();
        assert!(matches!(err, OrganizeError::Lookup(_)));
        assert!(err.to_string().contains("store offline"));
    }

    #[test]
    fn test_failure_not_raised_when_source_absent() {
        let spec = TransformationSpec::new(vec![FieldRule::resolve_one(
            "writer_id",
            "writer",
            Arc::new(FailingLookup),
        )]);
        let input = params(json!({"id": 1}));

        let result = organize(&input, &spec).unwrap();
        assert_eq!(Value::Object(result), json!({"id": 1}));
    }
}
