//! Helios Elasticsearch Collection Provider
//!
//! This crate turns a generic "list resources" request into an Elasticsearch
//! search, executes it, and returns a paginated, lazily denormalized result
//! set. Query bodies are built by a chain of independent extensions, each
//! contributing a fragment; the provider then fills in the default query and
//! the `size`/`from` pagination pair.
//!
//! # Features
//!
//! - **Composable queries**: ordered [`CollectionExtension`] chain, closures included
//! - **Pagination**: configurable page size, client-controlled page size, maximums
//! - **Index resolution**: explicit per-operation index, else the tableized short name
//! - **Two client protocols**: current (`elasticsearch` crate) and legacy (plain REST)
//! - **Uniform errors**: backend failures translated into one [`ApiError`] shape
//!
//! Client features:
//! - `elasticsearch` (default) - current-protocol client
//! - `legacy` (default) - legacy-protocol client over `reqwest`
//! - `es-integration` - Docker-backed integration tests
//!
//! # Architecture
//!
//! - [`operation`] - Operation metadata and request context
//! - [`body`] - The request body under construction
//! - [`extension`] - Query extensions
//! - [`pagination`] - Limit and offset resolution
//! - [`index`] - Index name resolution
//! - [`compose`] - Folds extensions into a complete request body
//! - [`client`] - Search clients and their configuration
//! - [`executor`] - Issues the search and normalizes the response
//! - [`paginator`] - The page view handed back to callers
//! - [`provider`] - Ties it all together
//! - [`error`] - Error types and translation
//!
//! # Quick Start
//!
//! ```no_run
//! use helios_collection_provider::client::{ElasticsearchConfig, connect};
//! use helios_collection_provider::operation::{Context, Operation, UriVariables};
//! use helios_collection_provider::CollectionProvider;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct BlogPost {
//!     id: String,
//!     title: String,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = connect(&ElasticsearchConfig::default())?;
//! let provider: CollectionProvider<BlogPost> = CollectionProvider::new(client);
//!
//! // Searches the `blog_posts` index with `{"query":{"match_all":{}},"size":30,"from":0}`
//! let page = provider
//!     .provide(
//!         &Operation::new("app::BlogPost", "BlogPost"),
//!         &UriVariables::new(),
//!         &Context::new(),
//!     )
//!     .await?;
//!
//! println!("page {} of {}", page.current_page(), page.last_page());
//! for post in page.iter() {
//!     let post = post?;
//!     println!("{}: {}", post.id, post.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Legacy not-found failures and current-protocol response failures become an
//! [`ApiError`] carrying status, title, detail, and the original trace:
//!
//! ```
//! use helios_collection_provider::error::{ClientError, ProviderError};
//!
//! let err: ProviderError = ClientError::not_found(404, "no such index").into();
//! match err {
//!     ProviderError::Api(api) => {
//!         assert_eq!(api.status(), 404);
//!         assert_eq!(api.title(), "no such index");
//!     }
//!     other => panic!("unexpected {other}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod body;
pub mod client;
pub mod compose;
pub mod error;
pub mod executor;
pub mod extension;
pub mod index;
pub mod operation;
pub mod pagination;
pub mod paginator;
pub mod provider;

// Re-export commonly used types at crate root
pub use body::QueryBody;
pub use compose::{ComposedQuery, QueryComposer};
pub use error::{ApiError, ClientError, ProviderError, ProviderResult};
pub use extension::CollectionExtension;
pub use operation::{Context, Operation, StateOptions, UriVariables};
pub use pagination::{Pagination, PaginationOptions, PaginationResolver};
pub use paginator::{Denormalizer, Paginator, SourceDenormalizer};
pub use provider::{CollectionProvider, ProviderOptions};

// Re-export client types
pub use client::{
    ClientProtocol, ElasticsearchConfig, RawSearchResponse, SearchClient, SearchRequest, connect,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
