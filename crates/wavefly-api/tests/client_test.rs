#![allow(clippy::unwrap_used)]
// Integration tests for `Client` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wavefly_api::{
    Client, Error, Event, EventSearch, QueryFilter, SourcePayload, TimeRange, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let token = SecretString::from("test-token".to_string());
    let client = Client::new(&server.uri(), &token, &TransportConfig::default()).unwrap();
    (server, client)
}

fn not_found(what: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "status": {
            "result": "ERROR",
            "message": format!("{what} does not exist"),
            "code": 404
        }
    }))
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/alert/1234"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200},
            "response": {"id": "1234", "name": "CPU high"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let alert = client.get_alert("1234").await.unwrap().unwrap();
    assert_eq!(alert["name"], json!("CPU high"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/alert/1234"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.get_alert("1234").await.unwrap_err();
    assert!(matches!(err, Error::InvalidToken), "got: {err:?}");
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_does_not_exist_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/alert/missing"))
        .respond_with(not_found("Alert missing"))
        .mount(&server)
        .await;

    let err = client.get_alert("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_plain_404_is_not_classified_as_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/event/x"))
        .respond_with(ResponseTemplate::new(404).set_body_string("resource does not exist"))
        .mount(&server)
        .await;

    let err = client.get_event("x").await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("resource does not exist"));
}

#[tokio::test]
async fn test_already_exists_classified() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/source"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": {"result": "ERROR", "message": "Source web-1 already exists", "code": 400}
        })))
        .mount(&server)
        .await;

    let payload = SourcePayload::new("web-1", ["prod"], "");
    let err = client.create_source(&payload).await.unwrap_err();
    assert!(err.is_already_exists());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_invalid_json_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/alert/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.get_alert("1").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_event_with_encoded_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/event/1507307331000:CPU%20high"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200},
            "response": {
                "id": "1507307331000:CPU high",
                "name": "CPU high",
                "startTime": 1_507_307_331_000_i64,
                "annotations": {"severity": "warn"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let event = client
        .get_event("1507307331000:CPU high")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.name.as_deref(), Some("CPU high"));
    assert_eq!(event.start_time, Some(1_507_307_331_000));
}

#[tokio::test]
async fn test_search_events_sends_time_range() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/search/event"))
        .and(body_json(json!({
            "limit": 10,
            "query": [{"key": "name", "value": "ERROR", "matchingMethod": "STARTSWITH"}],
            "timeRange": {
                "earliestStartTimeEpochMillis": 1000,
                "latestStartTimeEpochMillis": 2000
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200},
            "response": {"items": [{"id": "1500:ERROR disk"}], "moreItems": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = EventSearch {
        limit: 10,
        query: vec![QueryFilter {
            key: "name".into(),
            value: Some("ERROR".into()),
            values: Vec::new(),
            matching_method: Some("STARTSWITH".into()),
            negated: None,
        }],
        time_range: TimeRange {
            earliest_start_time_epoch_millis: 1000,
            latest_start_time_epoch_millis: 2000,
        },
    };
    let page = client.search_events(&search).await.unwrap().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.more_items, Some(false));
}

#[tokio::test]
async fn test_create_event_posts_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/event"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "deploy", "annotations": {}, "startTime": 5, "endTime": 6})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200},
            "response": {"id": "5:deploy", "name": "deploy"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = Event {
        name: Some("deploy".into()),
        annotations: Some(serde_json::Map::new()),
        start_time: Some(5),
        end_time: Some(6),
        ..Event::default()
    };
    let created = client.create_event(&body).await.unwrap().unwrap();
    assert_eq!(created.id.as_deref(), Some("5:deploy"));
}

// ── Source tags ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_source_tags() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/source/web-1/tag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200},
            "response": {"items": ["prod", "nginx"]}
        })))
        .mount(&server)
        .await;

    let tags = client.list_source_tags("web-1").await.unwrap();
    assert_eq!(tags, vec!["prod".to_string(), "nginx".to_string()]);
}

#[tokio::test]
async fn test_add_and_remove_source_tag() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v2/source/web-1/tag/dc-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"result": "OK", "code": 200}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/source/web-1/tag/old"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.add_source_tag("web-1", "dc-3").await.unwrap();
    client.remove_source_tag("web-1", "old").await.unwrap();
}
