//! Query validation through the public API

mod common;

use common::{articles_page, create_mock_client};
use newscatcher_client_rs::{NewsCatcherError, QueryValidator, RetrievalOptions, validate_query};
use rstest::rstest;
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[rstest]
#[case("*", true)]
#[case("foo*", true)]
#[case("foo AND bar", true)]
#[case("AI OR \"artificial intelligence\"", true)]
#[case("(elon AND musk) OR twitter", true)]
#[case("**", false)]
#[case("*foo", false)]
#[case("foo *", false)]
#[case("AND foo", false)]
#[case("foo AND", false)]
#[case("foo OR", false)]
#[case("foo OR OR bar", false)]
#[case("foo ()", false)]
#[case("foo \"bar", false)]
#[case("foo (bar", false)]
#[case("AI OR artificial intelligence", false)]
#[case("news/politics", false)]
#[case("title:election", false)]
fn test_validation_outcome(#[case] query: &str, #[case] expected: bool) {
    let (is_valid, message) = validate_query(query);
    assert_eq!(is_valid, expected, "{query:?}: {message}");
    assert_eq!(message.is_empty(), expected);
}

#[rstest]
#[case("**", "wildcard (*) character")]
#[case("*foo", "wildcard (*) character")]
#[case("foo *", "wildcard (*) character")]
#[case("foo OR OR bar", "used without keywords")]
#[case("foo ()", "used without keywords")]
#[case("foo \"bar", "unclosed quote")]
#[case("foo (bar", "unclosed round bracket")]
#[case("AI OR artificial intelligence", "not allowed at same level")]
#[case("market [update]", "must not include")]
#[case("a\\b", "must not include")]
#[case("AND foo", "unexpected  \"AND\" at position 0")]
#[case("foo AND", "ends with an operator AND")]
fn test_rejection_messages(#[case] query: &str, #[case] expected: &str) {
    let (_, message) = validate_query(query);
    assert!(message.contains(expected), "{query:?}: {message}");
}

#[test]
fn test_accepted_queries_are_stable() {
    let validator = QueryValidator::new();
    for query in [
        "*",
        "foo*",
        "(elon AND musk) OR twitter",
        "\"Elon Musk\" AND (Tesla OR SpaceX)",
    ] {
        for _ in 0..3 {
            assert_eq!(validator.validate(query), (true, String::new()));
        }
    }
}

#[tokio::test]
#[traced_test]
async fn test_invalid_query_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["1"], 1, 1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let options = RetrievalOptions::new()
        .from("2024-01-01")
        .to("2024-01-02");

    let err = client
        .get_all_articles("machine [learning]", &options)
        .await
        .unwrap_err();

    match err {
        NewsCatcherError::InvalidQuery(message) => {
            assert!(message.contains("[q] parameter must not include"));
        }
        other => panic!("expected InvalidQuery, got {other:?}"),
    }
}

#[tokio::test]
#[traced_test]
async fn test_disabled_validation_sends_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({"q": "AND python"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_page(&["1"], 1, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let options = RetrievalOptions::new()
        .from("2024-01-01")
        .to("2024-01-02")
        .time_chunk_size("1d")
        .validate_query(false);

    let articles = client.get_all_articles("AND python", &options).await.unwrap();
    assert_eq!(articles.len(), 1);
}
