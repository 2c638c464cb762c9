//! Sorting extensions.

use serde_json::{Value, json};

use crate::body::{QueryBody, SORT};
use crate::error::ExtensionError;
use crate::operation::{Context, FilterKind, Operation, SortOrder, request_filters};

use super::CollectionExtension;

/// Request filter holding client ordering, e.g. `{"order": {"title": "desc"}}`.
const ORDER_PARAMETER: &str = "order";

/// Applies client-requested ordering for properties whitelisted by the
/// operation's `order` filter.
///
/// Unknown properties and unparsable directions are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortFilterExtension;

impl CollectionExtension for SortFilterExtension {
    fn apply_to_collection(
        &self,
        body: QueryBody,
        _resource_class: &str,
        operation: &Operation,
        context: &Context,
    ) -> Result<QueryBody, ExtensionError> {
        let Some(requested) = request_filters(context)
            .and_then(|filters| filters.get(ORDER_PARAMETER))
            .and_then(Value::as_object)
        else {
            return Ok(body);
        };

        let mut clauses = Vec::new();
        for (property, direction) in requested {
            if !operation
                .filter_properties(FilterKind::Order)
                .any(|allowed| allowed == property)
            {
                tracing::debug!("Ignoring order on non-sortable property '{}'", property);
                continue;
            }
            match direction.as_str().and_then(SortOrder::parse) {
                Some(order) => clauses.push(sort_clause(property, order)),
                None => tracing::debug!(
                    "Ignoring invalid order direction {} for '{}'",
                    direction,
                    property
                ),
            }
        }

        append_sort(body, clauses)
    }
}

/// Applies the operation's default ordering when nothing sorted the body yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortExtension;

impl CollectionExtension for SortExtension {
    fn apply_to_collection(
        &self,
        body: QueryBody,
        _resource_class: &str,
        operation: &Operation,
        _context: &Context,
    ) -> Result<QueryBody, ExtensionError> {
        if operation.order.is_empty() || body.contains(SORT) {
            return Ok(body);
        }

        let clauses = operation
            .order
            .iter()
            .map(|directive| sort_clause(&directive.property, directive.direction))
            .collect();

        append_sort(body, clauses)
    }
}

fn sort_clause(property: &str, order: SortOrder) -> Value {
    json!({ property: { "order": order.as_str() } })
}

/// Appends sort clauses after any already present.
fn append_sort(mut body: QueryBody, clauses: Vec<Value>) -> Result<QueryBody, ExtensionError> {
    if clauses.is_empty() {
        return Ok(body);
    }

    let mut sort = match body.remove(SORT) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(existing)) => existing,
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            return Err(ExtensionError::Failed {
                extension: "sort".to_string(),
                message: format!("sort must be an array or object, found {}", other),
            });
        }
    };
    sort.extend(clauses);
    body.insert(SORT, Value::Array(sort));

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::FilterDefinition;

    fn context_with(filters: Value) -> Context {
        let mut context = Context::new();
        context.insert("filters".to_string(), filters);
        context
    }

    #[test]
    fn test_default_order() {
        let op = Operation::new("app::Book", "Book")
            .with_order("published_at", SortOrder::Desc)
            .with_order("title", SortOrder::Asc);

        let body = SortExtension
            .apply_to_collection(QueryBody::new(), "app::Book", &op, &Context::new())
            .unwrap();
        assert_eq!(
            body.get(SORT).unwrap(),
            &json!([
                { "published_at": { "order": "desc" } },
                { "title": { "order": "asc" } }
            ])
        );
    }

    #[test]
    fn test_default_order_yields_to_existing_sort() {
        let op = Operation::new("app::Book", "Book").with_order("title", SortOrder::Asc);
        let mut body = QueryBody::new();
        body.insert(SORT, json!([{ "rating": { "order": "desc" } }]));

        let body = SortExtension
            .apply_to_collection(body, "app::Book", &op, &Context::new())
            .unwrap();
        assert_eq!(body.get(SORT).unwrap(), &json!([{ "rating": { "order": "desc" } }]));
    }

    #[test]
    fn test_sort_filter_whitelist() {
        let op = Operation::new("app::Book", "Book")
            .with_filter(FilterDefinition::new(FilterKind::Order, ["title", "rating"]));
        let context = context_with(json!({
            "order": { "title": "DESC", "secret": "asc", "rating": "upwards" }
        }));

        let body = SortFilterExtension
            .apply_to_collection(QueryBody::new(), "app::Book", &op, &context)
            .unwrap();
        assert_eq!(body.get(SORT).unwrap(), &json!([{ "title": { "order": "desc" } }]));
    }

    #[test]
    fn test_sort_filter_appends() {
        let op = Operation::new("app::Book", "Book")
            .with_filter(FilterDefinition::new(FilterKind::Order, ["title"]));
        let mut body = QueryBody::new();
        body.insert(SORT, json!({ "_score": { "order": "desc" } }));

        let body = SortFilterExtension
            .apply_to_collection(
                body,
                "app::Book",
                &op,
                &context_with(json!({ "order": { "title": "asc" } })),
            )
            .unwrap();
        assert_eq!(
            body.get(SORT).unwrap(),
            &json!([{ "_score": { "order": "desc" } }, { "title": { "order": "asc" } }])
        );
    }

    #[test]
    fn test_sort_filter_keeps_request_order() {
        let op = Operation::new("app::Book", "Book")
            .with_filter(FilterDefinition::new(FilterKind::Order, ["title", "author"]));
        let context = context_with(json!({
            "order": { "title": "desc", "author": "asc" }
        }));

        let body = SortFilterExtension
            .apply_to_collection(QueryBody::new(), "app::Book", &op, &context)
            .unwrap();
        assert_eq!(
            body.get(SORT).unwrap().as_array().unwrap(),
            &vec![
                json!({ "title": { "order": "desc" } }),
                json!({ "author": { "order": "asc" } })
            ]
        );
    }

    #[test]
    fn test_sort_filter_without_request_order() {
        let op = Operation::new("app::Book", "Book")
            .with_filter(FilterDefinition::new(FilterKind::Order, ["title"]));
        let body = SortFilterExtension
            .apply_to_collection(QueryBody::new(), "app::Book", &op, &Context::new())
            .unwrap();
        assert!(!body.contains(SORT));
    }
}
