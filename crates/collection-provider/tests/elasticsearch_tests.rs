//! Search client tests.
//!
//! Configuration and connection tests run without a cluster. Tests that
//! need a running Elasticsearch instance use testcontainers to start one in
//! Docker and are gated behind the `es-integration` feature.
//!
//! Run with: `cargo test -p helios-collection-provider --features es-integration -- es_integration`

#![cfg(all(feature = "elasticsearch", feature = "legacy"))]

use helios_collection_provider::client::{
    ClientProtocol, ElasticsearchAuth, ElasticsearchClient, ElasticsearchConfig,
    LegacyElasticsearchClient, SearchClient, connect,
};
use helios_collection_provider::error::ClientError;

// ============================================================================
// Client Configuration Tests (no ES instance required)
// ============================================================================

#[test]
fn test_elasticsearch_config_serialization() {
    let config = ElasticsearchConfig {
        nodes: vec!["http://es1:9200".to_string()],
        protocol: ClientProtocol::Legacy,
        auth: Some(ElasticsearchAuth::Bearer {
            token: "abc".to_string(),
        }),
        ..Default::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: ElasticsearchConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.nodes, config.nodes);
    assert_eq!(deserialized.protocol, ClientProtocol::Legacy);
    assert_eq!(deserialized.auth, config.auth);
}

#[test]
fn test_client_creation() {
    // This just creates the clients, doesn't connect
    let config = ElasticsearchConfig::default();
    assert_eq!(
        ElasticsearchClient::new(&config).unwrap().protocol(),
        ClientProtocol::Current
    );
    assert_eq!(
        LegacyElasticsearchClient::new(&config).unwrap().protocol(),
        ClientProtocol::Legacy
    );
}

#[test]
fn test_connect_rejects_bad_node() {
    let config = ElasticsearchConfig {
        nodes: vec!["no scheme here".to_string()],
        protocol: ClientProtocol::Legacy,
        ..Default::default()
    };
    assert!(matches!(
        connect(&config),
        Err(ClientError::Configuration { .. })
    ));
}

// ============================================================================
// Integration Tests (requires Docker for testcontainers)
// ============================================================================

/// Integration tests that require a real Elasticsearch instance via testcontainers.
///
/// Run with:
///   cargo test -p helios-collection-provider --features es-integration -- es_integration
#[cfg(feature = "es-integration")]
mod es_integration {
    use std::sync::Arc;

    use elasticsearch::http::transport::Transport;
    use elasticsearch::params::Refresh;
    use elasticsearch::{Elasticsearch, IndexParts};
    use serde::Deserialize;
    use serde_json::json;

    use helios_collection_provider::client::{
        ClientProtocol, ElasticsearchConfig, SearchClient, connect,
    };
    use helios_collection_provider::error::ProviderError;
    use helios_collection_provider::operation::{Context, Operation, UriVariables};
    use helios_collection_provider::CollectionProvider;

    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::elastic_search::ElasticSearch;
    use tokio::sync::OnceCell;

    /// Shared Elasticsearch container reused across all tests in this module.
    struct SharedEs {
        url: String,
        /// Kept alive for the duration of the test binary; dropped at process exit.
        _container: testcontainers::ContainerAsync<ElasticSearch>,
    }

    static SHARED_ES: OnceCell<SharedEs> = OnceCell::const_new();

    async fn shared_es() -> &'static SharedEs {
        SHARED_ES
            .get_or_init(|| async {
                let container = ElasticSearch::default()
                    .with_env_var("ES_JAVA_OPTS", "-Xms256m -Xmx256m")
                    .with_startup_timeout(std::time::Duration::from_secs(120))
                    .start()
                    .await
                    .expect("Failed to start Elasticsearch container");

                let port = container
                    .get_host_port_ipv4(9200)
                    .await
                    .expect("Failed to get host port");
                let host = container.get_host().await.expect("Failed to get host");

                SharedEs {
                    url: format!("http://{}:{}", host, port),
                    _container: container,
                }
            })
            .await
    }

    #[derive(Debug, Deserialize)]
    struct Article {
        id: String,
        title: String,
    }

    /// Creates a uniquely named index holding `count` articles.
    async fn seed_index(count: usize) -> String {
        let es = shared_es().await;
        let index = format!("articles_{}", uuid::Uuid::new_v4().simple());
        let client = Elasticsearch::new(Transport::single_node(&es.url).unwrap());

        for i in 0..count {
            let response = client
                .index(IndexParts::IndexId(&index, &i.to_string()))
                .body(json!({ "title": format!("Article {}", i) }))
                .refresh(Refresh::True)
                .send()
                .await
                .expect("Failed to index document");
            assert!(response.status_code().is_success());
        }

        index
    }

    async fn client_for(protocol: ClientProtocol) -> Arc<dyn SearchClient> {
        let es = shared_es().await;
        connect(&ElasticsearchConfig {
            nodes: vec![es.url.clone()],
            protocol,
            ..Default::default()
        })
        .expect("Failed to build search client")
    }

    #[tokio::test]
    async fn es_integration_provide_page() {
        let index = seed_index(3).await;

        for protocol in [ClientProtocol::Current, ClientProtocol::Legacy] {
            let provider: CollectionProvider<Article> =
                CollectionProvider::new(client_for(protocol).await);
            let page = provider
                .provide(
                    &Operation::new("app::Article", "Article").with_index(index.clone()),
                    &UriVariables::new(),
                    &Context::new(),
                )
                .await
                .unwrap();

            assert_eq!(page.total_items(), 3);
            assert_eq!(page.count(), 3);
            let articles = page.items().unwrap();
            assert!(articles.iter().all(|a| a.title.starts_with("Article")));
            assert!(articles.iter().any(|a| a.id == "0"));
        }
    }

    #[tokio::test]
    async fn es_integration_missing_index() {
        let missing = Operation::new("app::Article", "Article")
            .with_index(format!("missing_{}", uuid::Uuid::new_v4().simple()));

        for protocol in [ClientProtocol::Current, ClientProtocol::Legacy] {
            let provider: CollectionProvider<Article> =
                CollectionProvider::new(client_for(protocol).await);
            let err = provider
                .provide(&missing, &UriVariables::new(), &Context::new())
                .await
                .unwrap_err();

            match err {
                ProviderError::Api(api) => assert_eq!(api.status(), 404),
                other => panic!("expected ApiError for {:?}, got {:?}", protocol, other),
            }
        }
    }
}
