//! The collection provider.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::SearchClient;
use crate::compose::{ComposedQuery, QueryComposer};
use crate::error::ProviderResult;
use crate::executor::SearchExecutor;
use crate::extension::{
    CollectionExtension, ConstantScoreFilterExtension, SortExtension, SortFilterExtension,
};
use crate::index::{DefaultInflector, IndexResolver, Inflector};
use crate::operation::{Context, Operation, UriVariables};
use crate::pagination::{Pagination, PaginationResolver};
use crate::paginator::{Denormalizer, Paginator, SourceDenormalizer};

/// Optional collaborators for a [`CollectionProvider`].
///
/// Anything left as `None` falls back to the crate default when the provider
/// is built.
pub struct ProviderOptions<T> {
    /// Turns hits into `T`. Default: [`SourceDenormalizer`].
    pub denormalizer: Option<Arc<dyn Denormalizer<T>>>,
    /// Resolves limit and offset. Default: [`Pagination::default`].
    pub pagination: Option<Arc<dyn PaginationResolver>>,
    /// Ordered extension chain. Default: constant-score filtering, then
    /// client ordering, then default ordering.
    pub extensions: Option<Vec<Arc<dyn CollectionExtension>>>,
    /// Tableizes short names into index names. Default: [`DefaultInflector`].
    pub inflector: Option<Arc<dyn Inflector>>,
}

impl<T> Default for ProviderOptions<T> {
    fn default() -> Self {
        Self {
            denormalizer: None,
            pagination: None,
            extensions: None,
            inflector: None,
        }
    }
}

/// The built-in extension chain.
pub fn default_extensions() -> Vec<Arc<dyn CollectionExtension>> {
    vec![
        Arc::new(ConstantScoreFilterExtension),
        Arc::new(SortFilterExtension),
        Arc::new(SortExtension),
    ]
}

/// Retrieves resource collections from Elasticsearch.
///
/// Each call to [`provide`](Self::provide) composes a request body, resolves
/// the index, issues exactly one search and wraps the response in a
/// [`Paginator`]. Collaborators are shared read-only, so a provider can be
/// used from many tasks at once.
pub struct CollectionProvider<T> {
    executor: SearchExecutor,
    composer: QueryComposer,
    index_resolver: IndexResolver,
    denormalizer: Arc<dyn Denormalizer<T>>,
}

impl<T: DeserializeOwned + 'static> CollectionProvider<T> {
    /// Creates a provider with the default collaborators.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self::with_options(client, ProviderOptions::default())
    }

    /// Creates a provider, filling unset options with defaults.
    pub fn with_options(client: Arc<dyn SearchClient>, options: ProviderOptions<T>) -> Self {
        let denormalizer = options
            .denormalizer
            .unwrap_or_else(|| Arc::new(SourceDenormalizer));
        let pagination = options
            .pagination
            .unwrap_or_else(|| Arc::new(Pagination::default()));
        let extensions = options.extensions.unwrap_or_else(default_extensions);
        let inflector = options
            .inflector
            .unwrap_or_else(|| Arc::new(DefaultInflector));

        Self::from_parts(
            SearchExecutor::new(client),
            QueryComposer::new(extensions, pagination),
            IndexResolver::new(inflector),
            denormalizer,
        )
    }
}

impl<T> CollectionProvider<T> {
    /// Assembles a provider from explicit collaborators.
    pub fn from_parts(
        executor: SearchExecutor,
        composer: QueryComposer,
        index_resolver: IndexResolver,
        denormalizer: Arc<dyn Denormalizer<T>>,
    ) -> Self {
        Self {
            executor,
            composer,
            index_resolver,
            denormalizer,
        }
    }

    /// Returns the query composer.
    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    /// Returns the index resolver.
    pub fn index_resolver(&self) -> &IndexResolver {
        &self.index_resolver
    }

    /// Retrieves one page of the collection described by `operation`.
    ///
    /// `uri_variables` is accepted for contract compatibility and ignored.
    ///
    /// # Errors
    ///
    /// * `ProviderError::Extension` - an extension failed during composition
    /// * `ProviderError::InvalidPagination` - `size` or `from` is not an integer
    /// * `ProviderError::Api` - the backend reported a not-found or response failure
    /// * `ProviderError::Backend` - any other backend failure, untranslated
    pub async fn provide(
        &self,
        operation: &Operation,
        _uri_variables: &UriVariables,
        context: &Context,
    ) -> ProviderResult<Paginator<T>> {
        let resource_class = operation.class();

        let ComposedQuery {
            body,
            limit,
            offset,
        } = self.composer.compose(operation, context)?;
        let index = self.index_resolver.resolve(operation);

        tracing::debug!(resource_class, index = %index, limit, offset, "Providing collection");

        let documents = self.executor.execute(&index, body).await?;

        Ok(Paginator::new(
            Arc::clone(&self.denormalizer),
            documents,
            resource_class,
            limit,
            offset,
            context.clone(),
        ))
    }
}

impl<T> std::fmt::Debug for CollectionProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionProvider")
            .field("executor", &self.executor)
            .field("composer", &self.composer)
            .field("index_resolver", &self.index_resolver)
            .finish_non_exhaustive()
    }
}
