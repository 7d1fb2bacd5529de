// libs/twilio-webhook-cell/src/router.rs
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use shared_config::AppConfig;

use crate::handlers::{status_callback, status_callback_probe};

/// Creates the webhook router. Twilio cannot present a user JWT, so these
/// routes sit outside the auth middleware; the reconciler authenticates to
/// the record store with the service role key instead.
pub fn webhook_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/status-callback",
            post(status_callback).get(status_callback_probe),
        )
        .with_state(state)
}
