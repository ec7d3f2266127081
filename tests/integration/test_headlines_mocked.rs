//! Integration tests for chunked headline retrieval using mocked HTTP responses

mod common;

use common::{articles_page, create_mock_client, ids};
use newscatcher_client_rs::{RetrievalOptions, blocking};
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_headlines(
    mock_server: &MockServer,
    when: &str,
    page: u32,
    ids: &[&str],
    total_pages: u32,
) {
    Mock::given(method("POST"))
        .and(path("/api/latest_headlines"))
        .and(body_partial_json(json!({"when": when, "page": page})))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(ids, page, total_pages)))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
#[traced_test]
async fn test_headlines_lookback_per_chunk() {
    let mock_server = MockServer::start().await;
    mount_headlines(&mock_server, "2d", 1, &["h1", "h2"], 1).await;
    mount_headlines(&mock_server, "1d", 1, &["h2", "h3"], 1).await;

    let client = create_mock_client(&mock_server);
    let options = RetrievalOptions::new().time_chunk_size("1d");
    let headlines = client
        .get_all_headlines("2d", &options)
        .await
        .expect("headline retrieval should succeed");

    assert_eq!(ids(&headlines), ["h1", "h2", "h3"]);
}

#[tokio::test]
#[traced_test]
async fn test_headlines_paginate() {
    let mock_server = MockServer::start().await;
    mount_headlines(&mock_server, "1d", 1, &["h1"], 3).await;
    mount_headlines(&mock_server, "1d", 2, &["h2"], 3).await;
    mount_headlines(&mock_server, "1d", 3, &["h3"], 3).await;

    let client = create_mock_client(&mock_server);
    let report = client
        .get_all_headlines_with_report("1d", &RetrievalOptions::new().time_chunk_size("1d"))
        .await
        .unwrap();

    assert_eq!(ids(&report.articles), ["h1", "h2", "h3"]);
    assert_eq!(report.chunks_processed, 1);
    assert!(report.is_complete());
}

#[tokio::test]
#[traced_test]
async fn test_headlines_ignore_query_validation() {
    let mock_server = MockServer::start().await;
    mount_headlines(&mock_server, "1d", 1, &["h1"], 1).await;

    let client = create_mock_client(&mock_server);
    // `q` is owned by the search endpoint and dropped from headline requests
    let options = RetrievalOptions::new()
        .time_chunk_size("1d")
        .filter("q", "[not validated]");
    let headlines = client.get_all_headlines("1d", &options).await.unwrap();

    assert_eq!(headlines.len(), 1);
}

#[test]
fn test_blocking_headlines() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(async {
        let mock_server = MockServer::start().await;
        mount_headlines(&mock_server, "12h", 1, &["h1", "h2"], 1).await;
        mock_server
    });

    let config = newscatcher_client_rs::ClientConfig::new()
        .with_api_key(common::TEST_TOKEN)
        .with_base_url(mock_server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(newscatcher_client_rs::RetryConfig::disabled());
    let client = blocking::NewsCatcherClient::with_config(config).unwrap();

    let headlines = client
        .get_all_headlines("12h", &RetrievalOptions::new().time_chunk_size("12h"))
        .unwrap();
    assert_eq!(ids(&headlines), ["h1", "h2"]);

    runtime.block_on(mock_server.verify());
}
