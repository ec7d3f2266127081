//! Integration tests for single-page search calls using mocked HTTP responses

mod common;

use chrono::{TimeZone, Utc};
use common::{TEST_TOKEN, articles_page, create_mock_client};
use newscatcher_client_rs::{
    Filters, HeadlinesRequest, NewsCatcherError, SearchRequest, TimeWindow,
};
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn january_first() -> TimeWindow {
    TimeWindow::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_search_page_sends_token_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(header("x-api-token", TEST_TOKEN))
        .and(body_json(json!({
            "q": "renewable energy",
            "from_": "2024-01-01 00:00:00",
            "to": "2024-01-02 00:00:00",
            "page": 1,
            "page_size": 100,
            "lang": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["a1", "a2"], 1, 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let mut filters = Filters::new();
    filters.insert("lang".to_string(), json!("en"));
    filters.insert("page".to_string(), json!(4));

    let request = SearchRequest::new("renewable energy", &january_first(), &filters).unwrap();
    let page = client.search_page(&request).await.expect("search should succeed");

    assert_eq!(page.page_count(), 3);
    assert_eq!(page.articles.len(), 2);
    assert_eq!(page.articles[0].id.as_deref(), Some("a1"));
    assert_eq!(page.articles[0].title.as_deref(), Some("Article a1"));
    assert_eq!(page.articles[0].extra["domain_url"], json!("example.com"));
}

#[tokio::test]
#[traced_test]
async fn test_search_page_number() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({"page": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["b1"], 2, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let request = SearchRequest::new("python", &january_first(), &Filters::new())
        .unwrap()
        .with_page(2);
    let page = client.search_page(&request).await.unwrap();

    assert_eq!(page.page, Some(2));
    assert_eq!(page.articles.len(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_no_matches_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "No matches for your search.",
            "total_hits": 0,
            "page": 1,
            "page_size": 100,
            "user_input": {"q": "zzzz"}
        })))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let request = SearchRequest::new("zzzz", &january_first(), &Filters::new()).unwrap();
    let page = client.search_page(&request).await.unwrap();

    assert!(page.articles.is_empty());
    assert_eq!(page.page_count(), 1);
    assert!(page.user_input.is_some());
}

#[tokio::test]
#[traced_test]
async fn test_latest_headlines_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/latest_headlines"))
        .and(header("x-api-token", TEST_TOKEN))
        .and(body_partial_json(json!({"when": "12h", "page": 1, "countries": "US"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["h1"], 1, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let mut filters = Filters::new();
    filters.insert("countries".to_string(), json!("US"));

    let page = client
        .latest_headlines_page(&HeadlinesRequest::new("12h", &filters).unwrap())
        .await
        .unwrap();

    assert_eq!(page.articles[0].id.as_deref(), Some("h1"));
}

#[tokio::test]
#[traced_test]
async fn test_validation_error_from_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string("[q] parameter should not be empty"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let request = SearchRequest::new("", &january_first(), &Filters::new()).unwrap();
    let err = client.search_page(&request).await.unwrap_err();

    match err {
        NewsCatcherError::ApiError { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("should not be empty"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}
