#![allow(clippy::unwrap_used)]
// Integration tests for `RtkeyClient` using wiremock.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rtkey_api::{Error, EventQuery, RtkeyClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with(transport: TransportConfig) -> (MockServer, RtkeyClient) {
    let server = MockServer::start().await;
    let household = format!("{}/api/v2/app", server.uri());
    let events = format!("{}/events-api/v2", server.uri());
    let token = SecretString::from("test-token".to_string());
    let client = RtkeyClient::new(&household, &events, &token, transport).unwrap();
    (server, client)
}

async fn setup() -> (MockServer, RtkeyClient) {
    setup_with(TransportConfig::default()).await
}

// ── Device listing ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_sends_bearer_token() {
    let (server, client) = setup().await;

    let body = json!({ "data": { "devices": [{ "id": 1, "device_type": "intercom" }] } });

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.list_devices().await.unwrap();
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_list_devices_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_devices_server_error_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match client.list_devices().await {
        Err(Error::Server { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_devices_invalid_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_devices_timeout() {
    let transport = TransportConfig {
        request_timeout: Duration::from_millis(100),
        ..TransportConfig::default()
    };
    let (server, client) = setup_with(transport).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "devices": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(result.as_ref().is_err_and(Error::is_timeout), "got: {result:?}");
}

#[tokio::test]
async fn test_connection_refused() {
    let token = SecretString::from("t".to_string());
    let client = RtkeyClient::new(
        "http://127.0.0.1:9/api",
        "http://127.0.0.1:9/events",
        &token,
        TransportConfig::default(),
    )
    .unwrap();

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::ConnectionFailed { .. })),
        "expected ConnectionFailed, got: {result:?}"
    );
}

// ── Open action ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_listing_status_passes_every_status_through() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert_eq!(client.device_listing_status().await.unwrap().as_u16(), 401);
    assert_eq!(client.device_listing_status().await.unwrap().as_u16(), 204);
}

#[tokio::test]
async fn test_open_device_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/app/devices/42/open"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "status": true } })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.open_device("42").await.unwrap();
    assert!(resp.is_ok());
}

#[tokio::test]
async fn test_open_device_rejected_returns_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/app/devices/42/open"))
        .respond_with(ResponseTemplate::new(403).set_body_string("device offline"))
        .mount(&server)
        .await;

    let resp = client.open_device("42").await.unwrap();
    assert!(!resp.is_ok());
    assert_eq!(resp.status.as_u16(), 403);
    assert_eq!(resp.body, "device offline");
}

#[tokio::test]
async fn test_open_device_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/app/devices/42/open"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.open_device("42").await;
    assert!(result.as_ref().is_err_and(Error::is_unauthorized), "got: {result:?}");
}

// ── Event listing ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_events_query_parameters() {
    let (server, client) = setup().await;

    let now = Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).single().unwrap();
    let query = EventQuery::trailing(
        now,
        chrono::Duration::days(7),
        vec!["10".into(), "11".into()],
        vec!["api_open_remote".into(), "rfid_open_local".into()],
        100,
    );

    Mock::given(method("GET"))
        .and(path("/events-api/v2/events/list"))
        .and(query_param("begin_raised_at", "2025-10-10T12:00:00Z"))
        .and(query_param("end_raised_at", "2025-10-17T12:00:00Z"))
        .and(query_param("device_ids", "10,11"))
        .and(query_param("event_types", "api_open_remote,rfid_open_local"))
        .and(query_param("sort_by", "raised_at"))
        .and(query_param("sort_order", "desc"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "items": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client.list_events(&query).await.unwrap();
    assert_eq!(value, json!({ "data": { "items": [] } }));
}

#[tokio::test]
async fn test_list_events_validation_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/events-api/v2/events/list"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "limit must be <= 100" })),
        )
        .mount(&server)
        .await;

    let query = EventQuery::trailing(Utc::now(), chrono::Duration::days(7), vec!["1".into()], vec![], 100);
    let result = client.list_events(&query).await;
    assert_eq!(result.as_ref().err().and_then(Error::status), Some(400));
}
