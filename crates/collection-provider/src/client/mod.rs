//! Search backend clients.
//!
//! The provider talks to Elasticsearch through the [`SearchClient`]
//! capability. Two adapters implement it, one per client protocol generation:
//!
//! - [`ElasticsearchClient`] - the current protocol, built on the official
//!   `elasticsearch` crate. Responses arrive as a [`ResponseEnvelope`] and
//!   failures as [`ClientError::Response`](crate::error::ClientError::Response).
//! - [`LegacyElasticsearchClient`] - the legacy protocol, plain REST over
//!   `reqwest`. Responses arrive as a bare JSON mapping and missing indices as
//!   [`ClientError::NotFound`](crate::error::ClientError::NotFound).
//!
//! Callers never see the difference: [`RawSearchResponse::into_plain`]
//! normalizes both response shapes to the same JSON value.

mod config;
#[cfg(feature = "elasticsearch")]
mod current;
#[cfg(feature = "legacy")]
mod legacy;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::body::QueryBody;
use crate::error::ClientError;

pub use config::{ClientProtocol, ElasticsearchAuth, ElasticsearchConfig};
#[cfg(feature = "elasticsearch")]
pub use current::ElasticsearchClient;
#[cfg(feature = "legacy")]
pub use legacy::LegacyElasticsearchClient;

/// A single search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// The index to search.
    pub index: String,
    /// The request body.
    pub body: QueryBody,
}

impl SearchRequest {
    /// Creates a search request.
    pub fn new(index: impl Into<String>, body: QueryBody) -> Self {
        Self {
            index: index.into(),
            body,
        }
    }
}

/// A search response as returned by a client, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSearchResponse {
    /// A bare JSON mapping (legacy protocol).
    Plain(Value),
    /// A response object wrapping the mapping (current protocol).
    Envelope(ResponseEnvelope),
}

impl RawSearchResponse {
    /// Returns the plain JSON mapping, unwrapping an envelope if needed.
    pub fn into_plain(self) -> Value {
        match self {
            RawSearchResponse::Plain(value) => value,
            RawSearchResponse::Envelope(envelope) => envelope.into_plain(),
        }
    }
}

/// A richer response object carrying transport metadata around the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    status: u16,
    warnings: Vec<String>,
    body: Value,
}

impl ResponseEnvelope {
    /// Creates an envelope.
    pub fn new(status: u16, warnings: Vec<String>, body: Value) -> Self {
        Self {
            status,
            warnings,
            body,
        }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the deprecation warnings sent by the cluster.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the body as a plain mapping.
    pub fn as_plain(&self) -> &Value {
        &self.body
    }

    /// Converts into the plain mapping.
    pub fn into_plain(self) -> Value {
        self.body
    }
}

/// The capability of issuing one search request.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns the protocol generation this client speaks.
    fn protocol(&self) -> ClientProtocol;

    /// Sends a single search request. No retries.
    async fn search(&self, request: SearchRequest) -> Result<RawSearchResponse, ClientError>;
}

/// Returns the body of an error response, or an empty string when the body
/// could not be read.
pub(crate) fn error_body_text<E: std::fmt::Display>(
    status: u16,
    body: Result<String, E>,
) -> String {
    body.unwrap_or_else(|e| {
        tracing::warn!(status, "Failed to read search error response body: {}", e);
        String::new()
    })
}

/// Builds the client matching `config.protocol`.
///
/// # Errors
///
/// * `ClientError::Configuration` - invalid node URL, or the protocol's
///   client feature is not enabled
pub fn connect(config: &ElasticsearchConfig) -> Result<Arc<dyn SearchClient>, ClientError> {
    match config.protocol {
        #[cfg(feature = "elasticsearch")]
        ClientProtocol::Current => Ok(Arc::new(ElasticsearchClient::new(config)?)),
        #[cfg(feature = "legacy")]
        ClientProtocol::Legacy => Ok(Arc::new(LegacyElasticsearchClient::new(config)?)),
        #[allow(unreachable_patterns)]
        protocol => Err(ClientError::Configuration {
            message: format!("client for protocol {:?} is not enabled", protocol),
        }),
    }
}
