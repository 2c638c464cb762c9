//! Search execution.

use std::sync::Arc;

use serde_json::Value;

use crate::body::QueryBody;
use crate::client::{RawSearchResponse, SearchClient, SearchRequest};
use crate::error::ClientError;

/// Issues exactly one search request per call and normalizes the response.
#[derive(Clone)]
pub struct SearchExecutor {
    client: Arc<dyn SearchClient>,
}

impl SearchExecutor {
    /// Creates an executor over a search client.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Arc<dyn SearchClient> {
        &self.client
    }

    /// Searches `index` with `body` and returns the plain response mapping.
    ///
    /// Client failures are returned untranslated.
    pub async fn execute(&self, index: &str, body: QueryBody) -> Result<Value, ClientError> {
        tracing::debug!(index, protocol = ?self.client.protocol(), "Executing search");

        let response = self
            .client
            .search(SearchRequest::new(index, body))
            .await
            .inspect_err(|e| tracing::debug!("Search on index {} failed: {}", index, e))?;

        if let RawSearchResponse::Envelope(envelope) = &response {
            for warning in envelope.warnings() {
                tracing::warn!(index, "Search backend warning: {}", warning);
            }
        }

        Ok(response.into_plain())
    }
}

impl std::fmt::Debug for SearchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchExecutor")
            .field("protocol", &self.client.protocol())
            .finish()
    }
}
