// libs/consultation-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

/// Creates the consultation routes
/// Follows the RESTful API design pattern used by other cells
pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(consultation_health_check));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        // Waiting room
        .route(
            "/{appointment_id}/waiting-status",
            get(get_waiting_status).put(update_waiting_status),
        )

        // Session lifecycle
        .route("/{appointment_id}/session/start", post(start_session))
        .route("/{appointment_id}/session", delete(end_session))

        // Room access tokens
        .route("/{appointment_id}/token", get(get_access_token))

        // Apply authentication middleware to all protected routes
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine public and protected routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
