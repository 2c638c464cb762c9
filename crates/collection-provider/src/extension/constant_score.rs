//! Term and match filters applied as a non-scoring `constant_score` query.

use serde_json::{Map, Value, json};

use crate::body::{QUERY, QueryBody};
use crate::error::ExtensionError;
use crate::operation::{Context, FilterKind, Operation, request_filters};

use super::CollectionExtension;

/// Turns the operation's `term` and `match` filters into a `constant_score`
/// query built from the request filters.
///
/// Clauses for every filtered property are ANDed under
/// `query.constant_score.filter.bool.must`. A `constant_score` clause already
/// present in the body is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantScoreFilterExtension;

impl ConstantScoreFilterExtension {
    /// Builds the clauses for all filtered properties present in the request.
    fn build_clauses(
        operation: &Operation,
        filters: &Map<String, Value>,
    ) -> Result<Vec<Value>, ExtensionError> {
        let mut clauses = Vec::new();

        for property in operation.filter_properties(FilterKind::Term) {
            let Some(raw) = filters.get(property) else {
                continue;
            };
            let values = filter_values(property, raw)?;
            if !values.is_empty() {
                clauses.push(json!({ "terms": { property: values } }));
            }
        }

        for property in operation.filter_properties(FilterKind::Match) {
            let Some(raw) = filters.get(property) else {
                continue;
            };
            let mut matches: Vec<Value> = filter_values(property, raw)?
                .into_iter()
                .map(|value| json!({ "match": { property: value } }))
                .collect();
            match matches.len() {
                0 => {}
                1 => clauses.push(matches.remove(0)),
                _ => clauses.push(json!({ "bool": { "should": matches } })),
            }
        }

        Ok(clauses)
    }
}

impl CollectionExtension for ConstantScoreFilterExtension {
    fn apply_to_collection(
        &self,
        mut body: QueryBody,
        _resource_class: &str,
        operation: &Operation,
        context: &Context,
    ) -> Result<QueryBody, ExtensionError> {
        let Some(filters) = request_filters(context) else {
            return Ok(body);
        };

        let clauses = Self::build_clauses(operation, filters)?;
        if clauses.is_empty() {
            return Ok(body);
        }

        let mut query = match body.remove(QUERY) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ExtensionError::Failed {
                    extension: "constant_score_filter".to_string(),
                    message: format!("query must be an object, found {}", other),
                });
            }
        };
        query
            .entry("constant_score")
            .or_insert_with(|| json!({ "filter": { "bool": { "must": clauses } } }));
        body.insert(QUERY, Value::Object(query));

        Ok(body)
    }
}

/// Collects the scalar values of a request filter.
fn filter_values(property: &str, raw: &Value) -> Result<Vec<Value>, ExtensionError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| scalar(property, item))
            .collect(),
        other => Ok(vec![scalar(property, other)?]),
    }
}

fn scalar(property: &str, value: &Value) -> Result<Value, ExtensionError> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
        _ => Err(ExtensionError::InvalidFilter {
            parameter: property.to_string(),
            message: format!("expected a scalar value, found {}", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::FilterDefinition;

    fn operation() -> Operation {
        Operation::new("app::Book", "Book")
            .with_filter(FilterDefinition::new(FilterKind::Term, ["author", "genre"]))
            .with_filter(FilterDefinition::new(FilterKind::Match, ["title"]))
    }

    fn context_with(filters: Value) -> Context {
        let mut context = Context::new();
        context.insert("filters".to_string(), filters);
        context
    }

    fn apply(context: &Context) -> Result<QueryBody, ExtensionError> {
        ConstantScoreFilterExtension.apply_to_collection(
            QueryBody::new(),
            "app::Book",
            &operation(),
            context,
        )
    }

    #[test]
    fn test_no_filters_leaves_body_untouched() {
        let body = apply(&Context::new()).unwrap();
        assert!(body.is_empty());

        let body = apply(&context_with(json!({ "unrelated": "x" }))).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_term_and_match_clauses() {
        let body = apply(&context_with(json!({
            "author": ["Tolkien", "Le Guin"],
            "title": "ring"
        })))
        .unwrap();

        let must = &body.get(QUERY).unwrap()["constant_score"]["filter"]["bool"]["must"];
        assert_eq!(
            must,
            &json!([
                { "terms": { "author": ["Tolkien", "Le Guin"] } },
                { "match": { "title": "ring" } }
            ])
        );
    }

    #[test]
    fn test_multiple_match_values_are_ored() {
        let body = apply(&context_with(json!({ "title": ["ring", "sea"] }))).unwrap();
        let must = &body.get(QUERY).unwrap()["constant_score"]["filter"]["bool"]["must"];
        assert_eq!(
            must[0]["bool"]["should"],
            json!([{ "match": { "title": "ring" } }, { "match": { "title": "sea" } }])
        );
    }

    #[test]
    fn test_existing_constant_score_is_kept() {
        let mut body = QueryBody::new();
        body.insert(QUERY, json!({ "constant_score": { "filter": { "term": { "x": 1 } } } }));

        let body = ConstantScoreFilterExtension
            .apply_to_collection(
                body,
                "app::Book",
                &operation(),
                &context_with(json!({ "genre": "fantasy" })),
            )
            .unwrap();
        assert_eq!(
            body.get(QUERY).unwrap(),
            &json!({ "constant_score": { "filter": { "term": { "x": 1 } } } })
        );
    }

    #[test]
    fn test_object_filter_value_is_rejected() {
        let err = apply(&context_with(json!({ "author": { "nested": true } }))).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFilter { ref parameter, .. } if parameter == "author"));
    }
}
