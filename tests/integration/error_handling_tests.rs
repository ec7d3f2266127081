//! Retry and error propagation against a mocked API

mod common;

use chrono::{TimeZone, Utc};
use common::{articles_page, create_mock_client, create_retrying_client, ids};
use newscatcher_client_rs::retry::RetryableError;
use newscatcher_client_rs::{
    Filters, NewsCatcherError, RetrievalOptions, SearchRequest, TimeWindow,
};
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> SearchRequest {
    let window = TimeWindow::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
    )
    .unwrap();
    SearchRequest::new("python", &window, &Filters::new()).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["r1"], 1, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_retrying_client(&mock_server, 3);
    let page = client
        .search_page(&request())
        .await
        .expect("request should succeed after retries");

    assert_eq!(ids(&page.articles), ["r1"]);
}

#[tokio::test]
#[traced_test]
async fn test_rate_limited_response_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["r1"], 1, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_retrying_client(&mock_server, 2);
    assert!(client.search_page(&request()).await.is_ok());
}

#[tokio::test]
#[traced_test]
async fn test_retries_are_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_retrying_client(&mock_server, 2);
    let err = client.search_page(&request()).await.unwrap_err();

    assert!(matches!(err, NewsCatcherError::ApiError { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
#[traced_test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API token"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_retrying_client(&mock_server, 3);
    let err = client.search_page(&request()).await.unwrap_err();

    match err {
        NewsCatcherError::ApiError { status, ref message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API token");
        }
        ref other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
#[traced_test]
async fn test_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client.search_page(&request()).await.unwrap_err();

    assert!(matches!(err, NewsCatcherError::JsonError(_)));
}

#[tokio::test]
#[traced_test]
async fn test_every_chunk_failing_returns_empty_report() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(422).set_body_string("[q] parameter is invalid"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let options = RetrievalOptions::new()
        .from("2024-01-01 00:00:00")
        .to("2024-01-01 03:00:00")
        .time_chunk_size("1h")
        .validate_query(false);

    let report = client
        .get_all_articles_with_report("python", &options)
        .await
        .expect("chunk failures are reported, not returned");

    assert!(report.articles.is_empty());
    assert_eq!(report.failures.len(), 3);
    assert_eq!(report.chunks_processed, 3);
    assert!(!report.limit_reached);
}
