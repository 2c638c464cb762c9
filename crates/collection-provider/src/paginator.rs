//! Paginated search results.
//!
//! A [`Paginator`] holds the raw response documents together with the limit
//! and offset the request was composed with. Hits are turned into domain
//! objects lazily, one at a time, by a [`Denormalizer`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DenormalizeError;
use crate::operation::Context;

/// Turns one search hit into a domain object.
pub trait Denormalizer<T>: Send + Sync {
    /// Denormalizes a single hit (`{"_id": .., "_source": {..}, ..}`).
    fn denormalize(
        &self,
        hit: &Value,
        resource_class: &str,
        context: &Context,
    ) -> Result<T, DenormalizeError>;
}

/// Deserializes a hit's `_source` with serde.
///
/// The hit's `_id` is copied into the source as `id` when the source does not
/// carry one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceDenormalizer;

impl<T: DeserializeOwned> Denormalizer<T> for SourceDenormalizer {
    fn denormalize(
        &self,
        hit: &Value,
        resource_class: &str,
        _context: &Context,
    ) -> Result<T, DenormalizeError> {
        let id = hit.get("_id").cloned().unwrap_or(Value::Null);

        let mut source = match hit.get("_source") {
            Some(source) if !source.is_null() => source.clone(),
            _ => {
                return Err(DenormalizeError::MissingSource {
                    id: match &id {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                });
            }
        };

        if let Value::Object(fields) = &mut source
            && !id.is_null()
        {
            fields.entry("id").or_insert(id);
        }

        serde_json::from_value(source).map_err(|source| DenormalizeError::Deserialize {
            resource_class: resource_class.to_string(),
            source,
        })
    }
}

/// One page of search results.
pub struct Paginator<T> {
    denormalizer: Arc<dyn Denormalizer<T>>,
    documents: Value,
    resource_class: String,
    limit: u64,
    offset: u64,
    context: Context,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Paginator<T> {
    /// Creates a paginator over a plain search response.
    pub fn new(
        denormalizer: Arc<dyn Denormalizer<T>>,
        documents: Value,
        resource_class: impl Into<String>,
        limit: u64,
        offset: u64,
        context: Context,
    ) -> Self {
        Self {
            denormalizer,
            documents,
            resource_class: resource_class.into(),
            limit,
            offset,
            context,
            _marker: PhantomData,
        }
    }

    /// Returns the raw response mapping.
    pub fn documents(&self) -> &Value {
        &self.documents
    }

    /// Returns the resource class the hits belong to.
    pub fn resource_class(&self) -> &str {
        &self.resource_class
    }

    /// Returns the `size` the request was sent with.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the `from` the request was sent with.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the request context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the raw hits of this page.
    pub fn hits(&self) -> &[Value] {
        self.documents
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of hits on this page.
    pub fn count(&self) -> usize {
        self.hits().len()
    }

    /// Total number of matching documents.
    ///
    /// Reads `hits.total.value`, or `hits.total` when the cluster reports a
    /// bare integer. Missing totals count as zero.
    pub fn total_items(&self) -> u64 {
        match self.documents.pointer("/hits/total") {
            Some(Value::Number(total)) => total.as_u64().unwrap_or(0),
            Some(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            None => 0,
        }
    }

    /// Same as [`limit`](Self::limit).
    pub fn items_per_page(&self) -> u64 {
        self.limit
    }

    /// 1-based page number derived from offset and limit.
    pub fn current_page(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.offset / self.limit + 1
    }

    /// Last page number, never below 1.
    pub fn last_page(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.total_items().div_ceil(self.limit).max(1)
    }

    /// Returns the `aggregations` section of the response, if any.
    pub fn aggregations(&self) -> Option<&Value> {
        self.documents.get("aggregations")
    }

    /// Lazily denormalizes each hit in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<T, DenormalizeError>> + '_ {
        self.hits().iter().map(move |hit| {
            self.denormalizer
                .denormalize(hit, &self.resource_class, &self.context)
        })
    }

    /// Denormalizes every hit, stopping at the first failure.
    pub fn items(&self) -> Result<Vec<T>, DenormalizeError> {
        self.iter().collect()
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("resource_class", &self.resource_class)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("count", &self.count())
            .field("total_items", &self.total_items())
            .finish_non_exhaustive()
    }
}
