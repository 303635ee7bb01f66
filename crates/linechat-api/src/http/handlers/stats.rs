//! Memory statistics endpoint.
//!
//! GET /api/v1/stats - Users with history, capacity and upstream timeout.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::extractors::admin::AdminAuth;
use crate::http::response::{ApiResponse, RequestMeta};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Stats {
    pub users: usize,
    pub capacity: usize,
    pub upstream_timeout_secs: u64,
}

pub async fn get_stats(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Json<ApiResponse<Stats>> {
    let meta = RequestMeta::start();
    let memory = state.dispatcher.memory();

    let stats = Stats {
        users: memory.user_count(),
        capacity: memory.capacity().get(),
        upstream_timeout_secs: state.dispatcher.upstream_timeout().as_secs(),
    };

    Json(ApiResponse::success(stats, meta).with_link("self", "/api/v1/stats"))
}
