//! Integration tests for ciboard-perf

use ciboard_http::HttpClient;
use ciboard_perf::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NEW_REVISION: &str = "abcdef123456";

fn model(server: &MockServer) -> PerfModel {
    PerfModel::new(HttpClient::with_base_url(format!("{}/api/", server.uri())).unwrap())
}

#[tokio::test]
async fn test_compare_against_time_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "mozilla-central"))
        .and(query_param("interval", "604800"))
        .and(query_param("framework", "1"))
        .and(query_param("no_subtests", "true"))
        .and(query_param_is_missing("revision"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"signature_id": 1, "name": "tp5o opt e10s", "platform": "linux64", "values": [100.0, 101.0, 99.0]},
            {"signature_id": 2, "name": "tp5o opt e10s", "platform": "windows10-64", "values": [200.0, 202.0]}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "try"))
        .and(query_param("revision", NEW_REVISION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"signature_id": 3, "name": "tp5o opt e10s", "platform": "linux64", "values": [130.0, 131.0, 129.0]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", NEW_REVISION).time_range(604_800);
    let comparison = model(&server).compare(&query).await.unwrap();

    assert_eq!(
        comparison.title,
        "Comparison between mozilla-central and abcdef123456 (try)"
    );
    assert_eq!(comparison.table_names, vec!["tp5o opt e10s"]);
    assert_eq!(comparison.row_names, vec!["linux64", "windows10-64"]);

    let rows = &comparison.tables[0].rows;
    assert!(rows[0].is_regression);
    assert_eq!(rows[1].original_value, Some(201.0));
    assert_eq!(rows[1].new_value, None);
    assert_eq!(comparison.regressions().count(), 1);
}

#[tokio::test]
async fn test_compare_subtests_uses_both_parents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "mozilla-central"))
        .and(query_param("revision", "012345abcdef"))
        .and(query_param("parent_signature", "1647"))
        .and(query_param_is_missing("interval"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "tp5o opt e10s", "platform": "linux64", "test": "yahoo.com", "values": [10.0, 11.0]}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "try"))
        .and(query_param("parent_signature", "1650"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "tp5o opt e10s", "platform": "linux64", "test": "yahoo.com", "values": [10.0, 12.0]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", NEW_REVISION)
        .original_revision("012345abcdef")
        .subtests("1647", "1650");
    let comparison = model(&server).compare(&query).await.unwrap();

    assert_eq!(comparison.title, "linux64: tp5o e10s");
    assert_eq!(comparison.tables[0].name, "tp5o e10s");
    assert_eq!(comparison.tables[0].rows[0].name, "yahoo.com");
}

#[tokio::test]
async fn test_compare_without_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", NEW_REVISION);
    let comparison = model(&server).compare(&query).await.unwrap();
    assert!(comparison.is_empty());
    assert!(comparison.row_names.is_empty());
}

#[tokio::test]
async fn test_original_failure_is_reported_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", NEW_REVISION);
    let err = model(&server).compare(&query).await.unwrap_err();

    assert!(matches!(err, PerfError::Summary { side: Side::Original, .. }));
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_new_side_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "try"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance/summary/"))
        .and(query_param("repository", "mozilla-central"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", NEW_REVISION);
    let err = model(&server).compare(&query).await.unwrap_err();

    assert!(matches!(err, PerfError::Summary { side: Side::New, .. }));
    assert_eq!(
        err.to_string(),
        "Error fetching new performance data: 404: Not Found"
    );
}

#[tokio::test]
async fn test_incomplete_query_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let query = CompareQuery::new("mozilla-central", "try", "");
    let err = model(&server).compare(&query).await.unwrap_err();
    assert!(matches!(err, PerfError::InvalidQuery(_)));
}
