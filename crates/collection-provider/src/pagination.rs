//! Pagination resolution.
//!
//! A [`PaginationResolver`] decides the page size (`limit`) and the number of
//! documents to skip (`offset`) for a collection request. The default
//! [`Pagination`] reads the page number and, when allowed, the page size from
//! the request filters stored in the context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::{Context, Operation, request_filters};

/// Resolves the limit and offset of a collection request.
pub trait PaginationResolver: Send + Sync {
    /// Returns the maximum number of documents to return.
    fn limit(&self, operation: &Operation, context: &Context) -> u64;

    /// Returns the number of documents to skip.
    fn offset(&self, operation: &Operation, context: &Context) -> u64;
}

/// Global pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationOptions {
    /// Default page size (default: 30).
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u64,

    /// Name of the page-number request parameter (default: `"page"`).
    #[serde(default = "default_page_parameter_name")]
    pub page_parameter_name: String,

    /// Name of the page-size request parameter (default: `"itemsPerPage"`).
    #[serde(default = "default_items_per_page_parameter_name")]
    pub items_per_page_parameter_name: String,

    /// Whether clients may choose the page size (default: false).
    #[serde(default)]
    pub client_items_per_page: bool,

    /// Upper bound on the page size.
    #[serde(default)]
    pub maximum_items_per_page: Option<u64>,
}

fn default_items_per_page() -> u64 {
    30
}

fn default_page_parameter_name() -> String {
    "page".to_string()
}

fn default_items_per_page_parameter_name() -> String {
    "itemsPerPage".to_string()
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            page_parameter_name: default_page_parameter_name(),
            items_per_page_parameter_name: default_items_per_page_parameter_name(),
            client_items_per_page: false,
            maximum_items_per_page: None,
        }
    }
}

/// Default page-number based pagination.
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    options: PaginationOptions,
}

impl Pagination {
    /// Creates a resolver with the given settings.
    pub fn new(options: PaginationOptions) -> Self {
        Self { options }
    }

    /// Returns the settings.
    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    /// Returns the requested page number, falling back to 1.
    pub fn page(&self, context: &Context) -> u64 {
        let page = self
            .parameter(context, &self.options.page_parameter_name)
            .unwrap_or(1);
        if page < 1 {
            tracing::debug!("Ignoring page number {} below 1", page);
            return 1;
        }
        page
    }

    fn parameter(&self, context: &Context, name: &str) -> Option<u64> {
        request_filters(context)
            .and_then(|filters| filters.get(name))
            .and_then(parse_unsigned)
    }
}

impl PaginationResolver for Pagination {
    fn limit(&self, operation: &Operation, context: &Context) -> u64 {
        let mut limit = operation
            .items_per_page
            .unwrap_or(self.options.items_per_page);

        let client_enabled = operation
            .client_items_per_page
            .unwrap_or(self.options.client_items_per_page);
        if client_enabled {
            if let Some(requested) =
                self.parameter(context, &self.options.items_per_page_parameter_name)
            {
                limit = requested;
            }
        }

        let maximum = operation
            .maximum_items_per_page
            .or(self.options.maximum_items_per_page);
        if let Some(maximum) = maximum {
            limit = limit.min(maximum);
        }

        limit
    }

    fn offset(&self, operation: &Operation, context: &Context) -> u64 {
        (self.page(context) - 1).saturating_mul(self.limit(operation, context))
    }
}

/// Parses a non-negative integer from a JSON number or a numeric string.
fn parse_unsigned(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
