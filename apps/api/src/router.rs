use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use consultation_cell::router::consultation_routes;
use shared_config::AppConfig;
use twilio_webhook_cell::router::webhook_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Velora consultation API is running!" }))
        .nest("/consultation", consultation_routes(state.clone()))
        .nest("/webhooks", webhook_routes(state.clone()))
}
