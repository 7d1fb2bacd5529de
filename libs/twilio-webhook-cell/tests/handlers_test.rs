use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};
use twilio_webhook_cell::webhook_routes;

fn create_test_config() -> shared_config::AppConfig {
    TestConfig::default().to_app_config()
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/status-callback")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mock_consultation(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![body]))
        .mount(mock_server)
        .await;
}

async fn mock_consultation_patch(mock_server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_probe_returns_ok() {
    let app = webhook_routes(Arc::new(create_test_config()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/status-callback")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_callback_acknowledges_test_room() {
    // No Supabase mock: test rooms must never reach the record store
    let app = webhook_routes(Arc::new(create_test_config()));

    let response = app
        .oneshot(form_request(
            "StatusCallbackEvent=room-created&RoomName=test",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["received"], true);
    assert_eq!(json["outcome"], "test-acknowledged");
}

#[tokio::test]
async fn test_callback_rejects_foreign_room_name() {
    let app = webhook_routes(Arc::new(create_test_config()));

    let response = app
        .oneshot(form_request(
            "StatusCallbackEvent=room-created&RoomName=lobby-123",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_rejects_non_uuid_suffix() {
    let app = webhook_routes(Arc::new(create_test_config()));

    let response = app
        .oneshot(form_request(
            "StatusCallbackEvent=room-ended&RoomName=consultation-not-a-uuid",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_rejects_missing_event() {
    let app = webhook_routes(Arc::new(create_test_config()));

    let response = app.oneshot(form_request("RoomName=test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_acks_unknown_consultation() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config();
    config.supabase_url = mock_server.uri();

    // Well-formed room name, but no matching record
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = webhook_routes(Arc::new(config));

    let response = app
        .oneshot(form_request(&format!(
            "StatusCallbackEvent=room-ended&RoomName=consultation-{}",
            Uuid::new_v4()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["received"], true);
    assert_eq!(json["outcome"], "unknown-consultation");
}

#[tokio::test]
async fn test_room_created_applies_to_record() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config();
    config.supabase_url = mock_server.uri();

    let appointment_id = Uuid::new_v4();
    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(&appointment_id.to_string(), "empty"),
    )
    .await;
    mock_consultation_patch(&mock_server).await;

    let app = webhook_routes(Arc::new(config));

    let response = app
        .oneshot(form_request(&format!(
            "StatusCallbackEvent=room-created&RoomName=consultation-{}&RoomSid=RMtestroomsid&RoomStatus=in-progress",
            appointment_id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["outcome"], "applied");
}

#[tokio::test]
async fn test_store_failure_returns_server_error() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config();
    config.supabase_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection refused", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let app = webhook_routes(Arc::new(config));

    let response = app
        .oneshot(form_request(&format!(
            "StatusCallbackEvent=room-ended&RoomName=consultation-{}",
            Uuid::new_v4()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
