//! Legacy-protocol client: plain REST over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::error::ClientError;

use super::{
    ClientProtocol, ElasticsearchAuth, ElasticsearchConfig, RawSearchResponse, SearchClient,
    SearchRequest, error_body_text,
};

/// Search client for the legacy Elasticsearch protocol.
///
/// Responses come back as bare JSON mappings. A 404 becomes
/// [`ClientError::NotFound`]; other non-2xx statuses become
/// [`ClientError::UnexpectedStatus`].
#[derive(Debug, Clone)]
pub struct LegacyElasticsearchClient {
    http: reqwest::Client,
    node: Url,
    auth: Option<ElasticsearchAuth>,
}

impl LegacyElasticsearchClient {
    /// Creates a client from configuration. Does not connect.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, ClientError> {
        let node = Url::parse(config.primary_node()).map_err(|e| ClientError::Configuration {
            message: format!("Invalid URL: {}", e),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .danger_accept_invalid_certs(config.disable_certificate_validation)
            .build()
            .map_err(|e| ClientError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            node,
            auth: config.auth.clone(),
        })
    }

    /// Returns the `_search` endpoint for an index.
    ///
    /// The index is pushed as a single path segment, so `/`, `?` and `#` in
    /// it are percent-encoded.
    fn search_url(&self, index: &str) -> Result<Url, ClientError> {
        let mut url = self.node.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Configuration {
                message: format!("Node URL {} cannot carry a path", self.node),
            })?
            .pop_if_empty()
            .push(index)
            .push("_search");
        Ok(url)
    }
}

#[async_trait]
impl SearchClient for LegacyElasticsearchClient {
    fn protocol(&self) -> ClientProtocol {
        ClientProtocol::Legacy
    }

    async fn search(&self, request: SearchRequest) -> Result<RawSearchResponse, ClientError> {
        let url = self.search_url(&request.index)?;

        let mut builder = self.http.post(url).json(&request.body);
        builder = match &self.auth {
            Some(ElasticsearchAuth::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            Some(ElasticsearchAuth::Bearer { token }) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| ClientError::Transport {
            message: format!("Search on index {} failed: {}", request.index, e),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(status_error(status, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                message: format!("Failed to parse search response: {}", e),
            })?;

        Ok(RawSearchResponse::Plain(body))
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status().as_u16();
    error_body_text(status, response.text().await)
}

/// Maps a non-2xx legacy response to a client failure.
fn status_error(status: StatusCode, body: String) -> ClientError {
    if status == StatusCode::NOT_FOUND {
        ClientError::not_found(status.as_u16(), error_reason(&body))
    } else {
        ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
    }
}

/// Extracts `error.reason` (or a string `error`) from an Elasticsearch error
/// body, falling back to the raw text.
fn error_reason(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match parsed.get("error") {
        Some(Value::String(reason)) => reason.clone(),
        Some(error) => error
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_url() {
        let config = ElasticsearchConfig {
            nodes: vec!["http://es.local:9200/".to_string()],
            protocol: ClientProtocol::Legacy,
            ..Default::default()
        };
        let client = LegacyElasticsearchClient::new(&config).unwrap();
        assert_eq!(
            client.search_url("blog_posts").unwrap().as_str(),
            "http://es.local:9200/blog_posts/_search"
        );
        assert_eq!(client.protocol(), ClientProtocol::Legacy);
    }

    #[test]
    fn test_search_url_escapes_index() {
        let client = LegacyElasticsearchClient::new(&ElasticsearchConfig::default()).unwrap();
        assert_eq!(
            client.search_url("logs/_doc?x#y").unwrap().as_str(),
            "http://localhost:9200/logs%2F_doc%3Fx%23y/_search"
        );
        assert_eq!(
            client.search_url("books,authors").unwrap().path(),
            "/books,authors/_search"
        );
    }

    #[test]
    fn test_search_url_keeps_node_path() {
        let config = ElasticsearchConfig {
            nodes: vec!["http://proxy.local/es/".to_string()],
            ..Default::default()
        };
        let client = LegacyElasticsearchClient::new(&config).unwrap();
        assert_eq!(
            client.search_url("books").unwrap().as_str(),
            "http://proxy.local/es/books/_search"
        );
    }

    #[test]
    fn test_invalid_node_url() {
        let config = ElasticsearchConfig {
            nodes: vec!["::".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            LegacyElasticsearchClient::new(&config),
            Err(ClientError::Configuration { .. })
        ));
    }

    #[test]
    fn test_not_found_uses_error_reason() {
        let body = json!({
            "error": { "type": "index_not_found_exception", "reason": "no such index [books]" },
            "status": 404
        })
        .to_string();

        match status_error(StatusCode::NOT_FOUND, body) {
            ClientError::NotFound { code, message, .. } => {
                assert_eq!(code, 404);
                assert_eq!(message, "no such index [books]");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_plain_body() {
        match status_error(StatusCode::NOT_FOUND, "no such index".to_string()) {
            ClientError::NotFound { message, .. } => assert_eq!(message, "no such index"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_other_statuses_are_unexpected() {
        let err = status_error(StatusCode::BAD_REQUEST, "parsing_exception".to_string());
        assert!(matches!(
            err,
            ClientError::UnexpectedStatus { status: 400, ref body } if body == "parsing_exception"
        ));
    }

    #[test]
    fn test_error_reason_string_error() {
        assert_eq!(error_reason(r#"{"error":"IndexMissingException"}"#), "IndexMissingException");
        assert_eq!(error_reason(r#"{"status":404}"#), r#"{"status":404}"#);
    }
}
