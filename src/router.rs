use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

/// Versioned API routes, without middleware.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/calc_score", post(handlers::calc_score))
        .route("/api/v1/users", get(handlers::list_users))
        .route("/api/v1/users/lookup", get(handlers::lookup_user))
        .route("/api/v1/users/:id", get(handlers::get_user_by_id))
}

/// Final app: health check (outside any rate limiting applied to `api`),
/// tracing and CORS.
pub fn build_router(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
