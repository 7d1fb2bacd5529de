// libs/consultation-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AccessTokenResponse, ConsultationError, UpdateWaitingStatusRequest,
    UpdateWaitingStatusResponse, WaitingStatusResponse,
};
use crate::services::{SessionLifecycleService, TwilioVideoService, WaitingRoomService};

// ==============================================================================
// WAITING ROOM HANDLERS
// ==============================================================================

/// Read the waiting-room view of a consultation
#[axum::debug_handler]
pub async fn get_waiting_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<WaitingStatusResponse>, AppError> {
    let token = auth.token();

    let waiting_room = WaitingRoomService::new(&state);

    let response = waiting_room
        .get_status(appointment_id, &user, token)
        .await
        .map_err(|e| match e {
            ConsultationError::ConsultationNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            ConsultationError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            ConsultationError::NotParticipant => {
                AppError::Forbidden("Not a party to this consultation".to_string())
            }
            ConsultationError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(response))
}

/// Join or leave the waiting room, or override the stored status
#[axum::debug_handler]
pub async fn update_waiting_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateWaitingStatusRequest>,
) -> Result<Json<UpdateWaitingStatusResponse>, AppError> {
    let token = auth.token();

    let waiting_room = WaitingRoomService::new(&state);

    let response = waiting_room
        .apply_update(appointment_id, request, &user, token)
        .await
        .map_err(|e| match e {
            ConsultationError::ConsultationNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            ConsultationError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            ConsultationError::NotParticipant => {
                AppError::Forbidden("Not a party to this consultation".to_string())
            }
            ConsultationError::AlreadyEnded => {
                AppError::Conflict("Consultation already ended".to_string())
            }
            ConsultationError::ValidationError { message } => AppError::BadRequest(message),
            ConsultationError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(response))
}

// ==============================================================================
// SESSION LIFECYCLE HANDLERS
// ==============================================================================

/// Start the session (artist only)
#[axum::debug_handler]
pub async fn start_session(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<WaitingStatusResponse>, AppError> {
    let token = auth.token();

    let lifecycle = SessionLifecycleService::new(&state);

    let response = lifecycle
        .start_session(appointment_id, &user, token)
        .await
        .map_err(|e| match e {
            ConsultationError::ConsultationNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            ConsultationError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            ConsultationError::NotParticipant => {
                AppError::Forbidden("Not a party to this consultation".to_string())
            }
            ConsultationError::NotSessionHost => {
                AppError::Forbidden("Only the artist can start the session".to_string())
            }
            ConsultationError::AlreadyStarted => {
                AppError::Conflict("Session already started".to_string())
            }
            ConsultationError::AlreadyEnded => {
                AppError::Conflict("Consultation already ended".to_string())
            }
            ConsultationError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(response))
}

/// End the session (either party)
#[axum::debug_handler]
pub async fn end_session(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<WaitingStatusResponse>, AppError> {
    let token = auth.token();

    let lifecycle = SessionLifecycleService::new(&state);

    let response = lifecycle
        .end_session(appointment_id, &user, token)
        .await
        .map_err(|e| match e {
            ConsultationError::ConsultationNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            ConsultationError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            ConsultationError::NotParticipant => {
                AppError::Forbidden("Not a party to this consultation".to_string())
            }
            ConsultationError::AlreadyEnded => {
                AppError::Conflict("Consultation already ended".to_string())
            }
            ConsultationError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(response))
}

// ==============================================================================
// ACCESS TOKEN HANDLER
// ==============================================================================

/// Mint a Twilio room access token for the caller
#[axum::debug_handler]
pub async fn get_access_token(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let token = auth.token();

    let twilio = TwilioVideoService::new(&state).map_err(|e| match e {
        ConsultationError::NotConfigured => {
            AppError::Internal("Twilio video not configured".to_string())
        }
        _ => AppError::Internal(e.to_string()),
    })?;

    let response = twilio
        .create_room_token(appointment_id, &user, token)
        .await
        .map_err(|e| match e {
            ConsultationError::ConsultationNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            ConsultationError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            ConsultationError::NotParticipant => {
                AppError::Forbidden("Not a party to this consultation".to_string())
            }
            ConsultationError::TwilioApiError { message } => AppError::ExternalService(message),
            ConsultationError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(response))
}

// ==============================================================================
// SYSTEM HANDLERS
// ==============================================================================

/// Health check for the consultation system
#[axum::debug_handler]
pub async fn consultation_health_check(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    if !state.is_twilio_configured() {
        return Ok(Json(json!({
            "status": "not_configured",
            "twilio_configured": false,
            "message": "Twilio video not configured"
        })));
    }

    let twilio = TwilioVideoService::new(&state)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let twilio_healthy = twilio.health_check().await.unwrap_or(false);

    Ok(Json(json!({
        "status": if twilio_healthy { "healthy" } else { "unhealthy" },
        "twilio_configured": true,
        "twilio_status": if twilio_healthy { "connected" } else { "error" },
        "message": if twilio_healthy {
            "Consultation system is operational"
        } else {
            "Consultation system has connectivity issues"
        }
    })))
}
