// libs/twilio-webhook-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{StatusCallback, WebhookError};
use crate::services::StatusCallbackService;

/// Receive and reconcile a Twilio room status callback
#[axum::debug_handler]
pub async fn status_callback(
    State(config): State<Arc<AppConfig>>,
    Form(callback): Form<StatusCallback>,
) -> Result<Json<Value>, AppError> {
    info!(
        "Received Twilio callback: event={}, room={}",
        callback.event.as_deref().unwrap_or("<missing>"),
        callback.room_name.as_deref().unwrap_or("<missing>")
    );

    let service = StatusCallbackService::new(&config);

    let outcome = service.reconcile(&callback).await.map_err(|e| match e {
        WebhookError::MalformedRoomName { .. } | WebhookError::MissingField { .. } => {
            AppError::BadRequest(e.to_string())
        }
        WebhookError::DatabaseError { message } => AppError::Database(message),
        WebhookError::Internal { message } => AppError::Internal(message),
    })?;

    Ok(Json(json!({
        "received": true,
        "outcome": outcome.as_str(),
    })))
}

/// Static acknowledgment for Twilio's webhook URL validation
#[axum::debug_handler]
pub async fn status_callback_probe() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "twilio-webhook-cell",
    }))
}
