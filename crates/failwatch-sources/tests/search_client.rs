//! Search backend client against a mock server

use failwatch_core::{Engine, RunResult};
use failwatch_sources::{fetch_batch, FailureSource, SearchClient, SearchConfig, SourceError};
use failwatch_test_utils::{build_url, job_name};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SearchClient {
    SearchClient::new(SearchConfig::new(
        format!("{}/events/_search", server.uri()),
        format!("{}/refs/_search", server.uri()),
    ))
    .unwrap()
}

fn hits(sources: Vec<serde_json::Value>) -> serde_json::Value {
    let hits: Vec<_> = sources.into_iter().map(|s| json!({ "_source": s })).collect();
    json!({ "hits": { "hits": hits } })
}

async fn mount_events(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/events/_search"))
        .and(body_partial_json(json!({
            "query": { "bool": { "must": [
                { "range": { "uploaded": { "gte": "now-7d/d", "lt": "now/d" } } },
                { "term": { "result.keyword": "FAIL" } }
            ] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_references(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/refs/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_and_decodes_events() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        hits(vec![
            json!({
                "job_name": job_name("AuthSuite", "101"),
                "build_url": build_url("AuthSuite", "101"),
                "description": "login_timeout",
                "uploaded": "2026-10-12T08:30:00Z"
            }),
            json!({
                "job_name": job_name("AuthSuite", "102"),
                "build_url": build_url("AuthSuite", "102")
            }),
        ]),
    )
    .await;

    let events = client(&server).fetch_failures().await.unwrap().items;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job_identifier, "InsightsAuthSuite_101");
    assert_eq!(events[0].description, "login_timeout");
    assert!(events[0].uploaded_at.is_some());
    assert_eq!(events[1].description, "");
    assert!(events[1].uploaded_at.is_none());
}

#[tokio::test]
async fn fetches_references() {
    let server = MockServer::start().await;
    mount_references(
        &server,
        hits(vec![
            json!({ "link": build_url("AuthSuite", "101"), "result": "FAIL" }),
            json!({ "link": build_url("AuthSuite", "102"), "result": "pass" }),
        ]),
    )
    .await;

    let references = client(&server).fetch_references().await.unwrap().items;

    assert_eq!(references.len(), 2);
    assert_eq!(references[0].result, RunResult::Fail);
    assert_eq!(references[1].result, RunResult::Pass);
}

#[tokio::test]
async fn error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_failures().await.unwrap_err();

    match err {
        SourceError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refs/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "took": 3 })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_references().await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn batch_fails_when_either_query_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(vec![])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refs/_search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = fetch_batch(&client(&server)).await;
    assert!(matches!(result, Err(SourceError::Api { status: 500, .. })));
}

#[tokio::test]
async fn batch_feeds_the_engine() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        hits(vec![
            json!({
                "job_name": job_name("AuthSuite", "101"),
                "build_url": build_url("AuthSuite", "101"),
                "description": "login_timeout"
            }),
            json!({
                "job_name": job_name("Billing", "7"),
                "build_url": build_url("Billing", "7"),
                "description": "flaky_db"
            }),
        ]),
    )
    .await;
    mount_references(
        &server,
        hits(vec![
            json!({ "link": build_url("AuthSuite", "101"), "result": "FAIL" }),
            json!({ "link": build_url("Billing", "7"), "result": "PASS" }),
        ]),
    )
    .await;

    let batch = fetch_batch(&client(&server)).await.unwrap();
    let outcome = Engine::default().run(&batch.events, batch.references);

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].family.as_str(), "AuthSuite");
    assert_eq!(outcome.stats.unconfirmed, 1);
}

#[tokio::test]
async fn unreadable_documents_do_not_sink_the_batch() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        hits(vec![
            json!({
                "job_name": job_name("AuthSuite", "101"),
                "build_url": build_url("AuthSuite", "101"),
                "description": "login_timeout"
            }),
            json!({
                "job_name": job_name("AuthSuite", "102"),
                "build_url": build_url("AuthSuite", "102"),
                "description": null
            }),
            json!({
                "job_name": job_name("AuthSuite", "103"),
                "description": "login_timeout"
            }),
        ]),
    )
    .await;
    mount_references(
        &server,
        hits(vec![
            json!({ "link": build_url("AuthSuite", "101"), "result": "FAIL" }),
            json!({ "link": build_url("AuthSuite", "102"), "result": "FAIL" }),
            json!({ "link": build_url("AuthSuite", "103"), "result": null }),
            json!({ "result": "FAIL" }),
        ]),
    )
    .await;

    let batch = fetch_batch(&client(&server)).await.unwrap();

    assert_eq!(batch.events.len(), 2);
    assert_eq!(batch.skipped_events, 1);
    assert_eq!(batch.references.len(), 3);
    assert_eq!(batch.skipped_references, 1);
    assert_eq!(batch.events[1].description, "");

    let mut outcome = Engine::default().run(&batch.events, batch.references);
    outcome.stats.record_unreadable(batch.skipped_events);

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(
        outcome.reports[0].summary,
        "AuthSuite: 2 runs failing due to login_timeout  going out of bounds"
    );
    assert_eq!(
        outcome.reports[0].description,
        "Runs failing : 102,101\nlogin_timeout failed in 1 run"
    );
    assert_eq!(outcome.stats.confirmed, 2);
    assert_eq!(outcome.stats.malformed, 1);
    assert_eq!(outcome.stats.total, 3);
}

#[tokio::test]
async fn broken_envelope_is_still_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "total": 0 } })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_failures().await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}
