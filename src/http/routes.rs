use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Take lifecycle
        .route("/session/take/start", post(handlers::start_take))
        .route("/session/take/stop", post(handlers::stop_take))
        .route("/session/take/export", post(handlers::export_take))
        .route("/session/take/discard", post(handlers::discard_take))
        // Session queries
        .route("/session/status", get(handlers::session_status))
        .route(
            "/session/ledger",
            get(handlers::get_ledger).delete(handlers::clear_ledger),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
