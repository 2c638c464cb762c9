//! Operation metadata supplied by the surrounding resource framework.
//!
//! An [`Operation`] describes the resource collection being requested. The
//! provider only reads it: the index override, pagination settings, default
//! ordering, and declared filters all flow from here into the query pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary request context passed through to extensions, the pagination
/// resolver, and the resulting page view.
///
/// Request filters (query-string parameters) live under the `"filters"` key.
pub type Context = Map<String, Value>;

/// URI variables of the matched route. Not used for collections, but part of
/// the provider contract.
pub type UriVariables = HashMap<String, Value>;

/// Key under which request filters are stored in the [`Context`].
pub const FILTERS_KEY: &str = "filters";

/// Returns the request filters carried by the context, if any.
pub fn request_filters(context: &Context) -> Option<&Map<String, Value>> {
    context.get(FILTERS_KEY).and_then(Value::as_object)
}

/// Metadata describing a collection operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Fully qualified resource type identifier (e.g., `"app::BlogPost"`).
    pub class: String,

    /// Short display name of the resource (e.g., `"BlogPost"`).
    pub short_name: String,

    /// Backend-specific state options.
    #[serde(default)]
    pub state_options: Option<StateOptions>,

    /// Number of items per page for this operation.
    #[serde(default)]
    pub items_per_page: Option<u64>,

    /// Whether clients may choose the page size for this operation.
    #[serde(default)]
    pub client_items_per_page: Option<bool>,

    /// Upper bound on the page size for this operation.
    #[serde(default)]
    pub maximum_items_per_page: Option<u64>,

    /// Default ordering applied when the request does not sort.
    #[serde(default)]
    pub order: Vec<OrderDirective>,

    /// Filters exposed by this operation.
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
}

impl Operation {
    /// Creates an operation for the given resource class and short name.
    pub fn new(class: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    /// Sets an explicit index name.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.state_options = Some(StateOptions::new(index));
        self
    }

    /// Sets the state options.
    pub fn with_state_options(mut self, options: StateOptions) -> Self {
        self.state_options = Some(options);
        self
    }

    /// Sets the page size.
    pub fn with_items_per_page(mut self, items_per_page: u64) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    /// Allows or forbids client-chosen page sizes.
    pub fn with_client_items_per_page(mut self, enabled: bool) -> Self {
        self.client_items_per_page = Some(enabled);
        self
    }

    /// Caps the page size.
    pub fn with_maximum_items_per_page(mut self, maximum: u64) -> Self {
        self.maximum_items_per_page = Some(maximum);
        self
    }

    /// Appends a default ordering directive.
    pub fn with_order(mut self, property: impl Into<String>, direction: SortOrder) -> Self {
        self.order.push(OrderDirective {
            property: property.into(),
            direction,
        });
        self
    }

    /// Declares a filter.
    pub fn with_filter(mut self, filter: FilterDefinition) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns the resource class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the short resource name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns the explicit index, ignoring empty values.
    pub fn explicit_index(&self) -> Option<&str> {
        self.state_options
            .as_ref()
            .and_then(|options| options.index.as_deref())
            .filter(|index| !index.is_empty())
    }

    /// Iterates the properties declared by filters of the given kind.
    pub fn filter_properties(&self, kind: FilterKind) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .filter(move |filter| filter.kind == kind)
            .flat_map(|filter| filter.properties.iter().map(String::as_str))
    }
}

/// Elasticsearch-specific per-operation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOptions {
    /// Explicit index name; when absent the index is derived from the short name.
    #[serde(default)]
    pub index: Option<String>,
}

impl StateOptions {
    /// Creates options with an explicit index.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Parses a direction case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// Returns the query DSL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A default ordering entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDirective {
    /// Document property to sort on.
    pub property: String,
    /// Sort direction.
    pub direction: SortOrder,
}

/// The kind of a declared filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Exact-value match on keyword fields.
    Term,
    /// Full-text match.
    Match,
    /// Client-controlled sorting.
    Order,
}

/// A filter declared on an operation, restricted to a set of properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Filter kind.
    pub kind: FilterKind,
    /// Properties the filter applies to.
    pub properties: Vec<String>,
}

impl FilterDefinition {
    /// Creates a filter of the given kind over the given properties.
    pub fn new<I, S>(kind: FilterKind, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}
