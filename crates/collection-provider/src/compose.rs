//! Query composition.
//!
//! Folds the registered extensions over an empty [`QueryBody`], then makes
//! sure the body always carries a query (or aggregations) and exactly one
//! `size`/`from` pair. Values set by an extension are never overwritten.

use std::sync::Arc;

use serde_json::Value;

use crate::body::{self, AGGS, FROM, QUERY, QueryBody, SIZE};
use crate::error::{ProviderError, ProviderResult};
use crate::extension::CollectionExtension;
use crate::operation::{Context, Operation};
use crate::pagination::PaginationResolver;

/// A composed request body with the limit and offset it ended up with.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    /// The request body.
    pub body: QueryBody,
    /// The value stored at `size`.
    pub limit: u64,
    /// The value stored at `from`.
    pub offset: u64,
}

/// Builds collection request bodies from an ordered extension chain.
#[derive(Clone)]
pub struct QueryComposer {
    extensions: Vec<Arc<dyn CollectionExtension>>,
    pagination: Arc<dyn PaginationResolver>,
}

impl QueryComposer {
    /// Creates a composer. Extensions run in the given order.
    pub fn new(
        extensions: Vec<Arc<dyn CollectionExtension>>,
        pagination: Arc<dyn PaginationResolver>,
    ) -> Self {
        Self {
            extensions,
            pagination,
        }
    }

    /// Returns the number of registered extensions.
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Composes the request body for a collection operation.
    ///
    /// # Errors
    ///
    /// * `ProviderError::Extension` - an extension failed; it is returned unchanged
    /// * `ProviderError::InvalidPagination` - `size` or `from` is not a non-negative integer
    pub fn compose(&self, operation: &Operation, context: &Context) -> ProviderResult<ComposedQuery> {
        let resource_class = operation.class();

        let mut body = QueryBody::new();
        for extension in &self.extensions {
            body = extension.apply_to_collection(body, resource_class, operation, context)?;
        }

        if !body.contains(QUERY) && !body.contains(AGGS) {
            body.insert(QUERY, body::match_all());
        }

        // Resolvers are only consulted for keys the extensions left unset
        let limit = pagination_value(
            SIZE,
            body.set_if_absent_with(SIZE, || self.pagination.limit(operation, context)),
        )?;
        let offset = pagination_value(
            FROM,
            body.set_if_absent_with(FROM, || self.pagination.offset(operation, context)),
        )?;

        tracing::debug!(
            resource_class,
            limit,
            offset,
            extensions = self.extensions.len(),
            "Composed collection query"
        );

        Ok(ComposedQuery {
            body,
            limit,
            offset,
        })
    }
}

impl std::fmt::Debug for QueryComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryComposer")
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

fn pagination_value(key: &str, value: &Value) -> ProviderResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| ProviderError::InvalidPagination {
            key: key.to_string(),
            value: value.clone(),
        })
}
