//! Query extensions.
//!
//! Extensions each contribute a fragment to the request body of a collection
//! search. They are registered once, in order, and folded over a fresh
//! [`QueryBody`] for every request:
//!
//! - [`ConstantScoreFilterExtension`] - term and match filters as non-scoring clauses
//! - [`SortFilterExtension`] - client-controlled ordering (`order[field]=desc`)
//! - [`SortExtension`] - the operation's default ordering
//!
//! Any closure with the right signature is an extension too:
//!
//! ```
//! use helios_collection_provider::body::QueryBody;
//! use helios_collection_provider::error::ExtensionError;
//! use helios_collection_provider::extension::CollectionExtension;
//! use helios_collection_provider::operation::{Context, Operation};
//!
//! let published_only = |mut body: QueryBody, _: &str, _: &Operation, _: &Context| {
//!     body.insert("post_filter", serde_json::json!({ "term": { "published": true } }));
//!     Ok::<_, ExtensionError>(body)
//! };
//!
//! let op = Operation::new("app::BlogPost", "BlogPost");
//! let body = published_only
//!     .apply_to_collection(QueryBody::new(), "app::BlogPost", &op, &Context::new())
//!     .unwrap();
//! assert!(body.contains("post_filter"));
//! ```

mod constant_score;
mod sort;

pub use constant_score::ConstantScoreFilterExtension;
pub use sort::{SortExtension, SortFilterExtension};

use crate::body::QueryBody;
use crate::error::ExtensionError;
use crate::operation::{Context, Operation};

/// A pluggable contributor to the collection search body.
pub trait CollectionExtension: Send + Sync {
    /// Returns `body` extended with this extension's fragment.
    fn apply_to_collection(
        &self,
        body: QueryBody,
        resource_class: &str,
        operation: &Operation,
        context: &Context,
    ) -> Result<QueryBody, ExtensionError>;
}

impl<F> CollectionExtension for F
where
    F: Fn(QueryBody, &str, &Operation, &Context) -> Result<QueryBody, ExtensionError>
        + Send
        + Sync,
{
    fn apply_to_collection(
        &self,
        body: QueryBody,
        resource_class: &str,
        operation: &Operation,
        context: &Context,
    ) -> Result<QueryBody, ExtensionError> {
        self(body, resource_class, operation, context)
    }
}
