//! Axum router configuration with middleware.
//!
//! - `POST /callback`: LINE webhook
//! - `GET /`, `GET /health`: liveness
//! - `/api/v1/`: admin API (token required)
//!
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/conversations/{user_id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::reset_conversation),
        )
        .route("/stats", get(handlers::stats::get_stats));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/callback", post(handlers::webhook::callback))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Plain liveness text.
async fn root() -> &'static str {
    "Hello World"
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
