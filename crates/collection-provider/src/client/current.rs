//! Current-protocol client built on the official `elasticsearch` crate.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::StatusCode;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{Elasticsearch, SearchParts};
use serde_json::Value;

use crate::error::ClientError;

use super::{
    ClientProtocol, ElasticsearchAuth, ElasticsearchConfig, RawSearchResponse, ResponseEnvelope,
    SearchClient, SearchRequest, error_body_text,
};

/// Search client for the current Elasticsearch protocol.
///
/// Successful responses are returned as a [`ResponseEnvelope`]; any non-2xx
/// response becomes [`ClientError::Response`] carrying the status, reason
/// phrase and body text.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Elasticsearch,
}

impl ElasticsearchClient {
    /// Creates a client from configuration. Does not connect.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: Self::build_client(config)?,
        })
    }

    /// Wraps an already configured `elasticsearch` client.
    pub fn from_client(client: Elasticsearch) -> Self {
        Self { client }
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ElasticsearchConfig) -> Result<Elasticsearch, ClientError> {
        let parsed_url: elasticsearch::http::Url =
            config
                .primary_node()
                .parse()
                .map_err(|e| ClientError::Configuration {
                    message: format!("Invalid URL: {}", e),
                })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| ClientError::Configuration {
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    fn protocol(&self) -> ClientProtocol {
        ClientProtocol::Current
    }

    async fn search(&self, request: SearchRequest) -> Result<RawSearchResponse, ClientError> {
        let SearchRequest { index, body } = request;

        let response = self
            .client
            .search(SearchParts::Index(&[&index]))
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                message: format!("Search on index {} failed: {}", index, e),
                source: Some(Box::new(e)),
            })?;

        let status = response.status_code();
        let warnings: Vec<String> = response.warning_headers().map(str::to_string).collect();

        if !status.is_success() {
            let body = error_body(response).await;
            return Err(response_error(status, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                message: format!("Failed to parse search response: {}", e),
            })?;

        Ok(RawSearchResponse::Envelope(ResponseEnvelope::new(
            status.as_u16(),
            warnings,
            body,
        )))
    }
}

async fn error_body(response: Response) -> String {
    let status = response.status_code().as_u16();
    error_body_text(status, response.text().await)
}

/// Builds the failure for a non-2xx response.
fn response_error(status: StatusCode, body: String) -> ClientError {
    ClientError::response(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        body,
    )
}
