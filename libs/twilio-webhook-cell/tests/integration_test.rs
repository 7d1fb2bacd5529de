use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};
use twilio_webhook_cell::{ReconcileOutcome, StatusCallback, StatusCallbackService, WebhookError};

fn callback(event: &str, room_name: &str) -> StatusCallback {
    StatusCallback {
        event: Some(event.to_string()),
        room_name: Some(room_name.to_string()),
        ..StatusCallback::default()
    }
}

fn room_for(appointment_id: Uuid) -> String {
    format!("consultation-{}", appointment_id)
}

fn service_against(mock_server: &MockServer) -> StatusCallbackService {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    StatusCallbackService::new(&config)
}

async fn mock_consultation(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![body]))
        .mount(mock_server)
        .await;
}

async fn mock_appointment(mock_server: &MockServer, appointment_id: Uuid, status: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            MockSupabaseResponses::appointment_response(
                &appointment_id.to_string(),
                "client@example.com",
                "artist@example.com",
                status,
            ),
        ]))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_test_room_skips_record_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let outcome = service
        .reconcile(&callback("room-created", "test-connectivity"))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::TestAcknowledged);
}

#[tokio::test]
async fn test_malformed_room_name_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server);

    let result = service.reconcile(&callback("room-created", "lobby-123")).await;

    assert_matches!(result, Err(WebhookError::MalformedRoomName { .. }));
}

#[tokio::test]
async fn test_missing_room_name_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = service_against(&mock_server);

    let incomplete = StatusCallback {
        event: Some("room-created".to_string()),
        ..StatusCallback::default()
    };
    let result = service.reconcile(&incomplete).await;

    assert_matches!(result, Err(WebhookError::MissingField { field: "RoomName" }));
}

#[tokio::test]
async fn test_unknown_consultation_fails_open() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let outcome = service
        .reconcile(&callback("room-ended", &room_for(Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::UnknownConsultation);
}

#[tokio::test]
async fn test_room_created_stores_status_and_sid() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(&appointment_id.to_string(), "empty"),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(body_partial_json(json!({
            "twilio_room_status": "created",
            "twilio_room_sid": "RMtestroomsid",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut created = callback("room-created", &room_for(appointment_id));
    created.room_sid = Some("RMtestroomsid".to_string());

    let outcome = service.reconcile(&created).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_client_connection_marks_empty_room_waiting() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(&appointment_id.to_string(), "empty"),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(body_partial_json(json!({
            "waiting_room_status": "client-waiting",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut connected = callback("participant-connected", &room_for(appointment_id));
    connected.participant_identity = Some("client-client@example.com".to_string());

    let outcome = service.reconcile(&connected).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_client_connection_leaves_occupied_room_alone() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(
            &appointment_id.to_string(),
            "artist-waiting",
        ),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut connected = callback("participant-connected", &room_for(appointment_id));
    connected.participant_identity = Some("client-client@example.com".to_string());

    let outcome = service.reconcile(&connected).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Ignored);
}

#[tokio::test]
async fn test_client_connection_after_session_end_leaves_record_untouched() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::ended_consultation_response(&appointment_id.to_string()),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut connected = callback("participant-connected", &room_for(appointment_id));
    connected.participant_identity = Some("client-client@example.com".to_string());

    let outcome = service.reconcile(&connected).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Ignored);
}

#[tokio::test]
async fn test_artist_connection_never_mutates() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(&appointment_id.to_string(), "empty"),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut connected = callback("participant-connected", &room_for(appointment_id));
    connected.participant_identity = Some("artist-artist@example.com".to_string());

    let outcome = service.reconcile(&connected).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Ignored);
}

#[tokio::test]
async fn test_room_ended_stamps_and_completes_appointment() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::active_consultation_response(&appointment_id.to_string()),
    )
    .await;
    mock_appointment(&mock_server, appointment_id, "in_progress").await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(body_partial_json(json!({ "twilio_room_status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let outcome = service
        .reconcile(&callback("room-ended", &room_for(appointment_id)))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_duplicate_room_ended_restamps_without_touching_appointment() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    // Consultation already carries end timestamps from the first delivery
    mock_consultation(
        &mock_server,
        MockSupabaseResponses::ended_consultation_response(&appointment_id.to_string()),
    )
    .await;
    mock_appointment(&mock_server, appointment_id, "completed").await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(body_partial_json(json!({ "twilio_room_status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let outcome = service
        .reconcile(&callback("room-ended", &room_for(appointment_id)))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_recording_started_captures_sid() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::active_consultation_response(&appointment_id.to_string()),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(body_partial_json(json!({ "recording_sid": "RTtestrecording" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);

    let mut recording = callback("recording-started", &room_for(appointment_id));
    recording.recording_sid = Some("RTtestrecording".to_string());

    let outcome = service.reconcile(&recording).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_observational_events_do_not_mutate() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::active_consultation_response(&appointment_id.to_string()),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let room = room_for(appointment_id);

    for event in ["room-updated", "participant-disconnected", "recording-completed"] {
        let outcome = service.reconcile(&callback(event, &room)).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Ignored, "event {}", event);
    }
}

#[tokio::test]
async fn test_unrecognized_event_is_ignored() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mock_consultation(
        &mock_server,
        MockSupabaseResponses::consultation_response(&appointment_id.to_string(), "empty"),
    )
    .await;

    let service = service_against(&mock_server);
    let outcome = service
        .reconcile(&callback("room-migrated", &room_for(appointment_id)))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Ignored);
}

#[tokio::test]
async fn test_store_failure_surfaces_as_database_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection refused", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server);
    let result = service
        .reconcile(&callback("room-ended", &room_for(Uuid::new_v4())))
        .await;

    assert_matches!(result, Err(WebhookError::DatabaseError { .. }));
}
