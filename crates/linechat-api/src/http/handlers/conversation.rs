//! Conversation maintenance handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations/{user_id} - Current history for a user
//! - DELETE /api/v1/conversations/{user_id} - Reset a user's history

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::info;

use linechat_types::chat::Turn;

use crate::http::extractors::admin::AdminAuth;
use crate::http::response::{ApiResponse, RequestMeta};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub user_id: String,
    pub capacity: usize,
    /// Oldest first.
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub user_id: String,
    /// Whether any history existed.
    pub cleared: bool,
}

/// GET /api/v1/conversations/{user_id}
///
/// Unknown users have an empty history.
pub async fn get_conversation(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<String>,
) -> Json<ApiResponse<ConversationView>> {
    let meta = RequestMeta::start();
    let memory = state.dispatcher.memory();

    let view = ConversationView {
        turns: memory.get(&user_id),
        capacity: memory.capacity().get(),
        user_id,
    };
    let href = format!("/api/v1/conversations/{}", view.user_id);

    Json(ApiResponse::success(view, meta).with_link("self", &href))
}

/// DELETE /api/v1/conversations/{user_id}
pub async fn reset_conversation(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<String>,
) -> Json<ApiResponse<ResetResult>> {
    let meta = RequestMeta::start();
    let cleared = state.dispatcher.memory().reset(&user_id);
    info!(user_id = %user_id, cleared, "Conversation reset via admin API");

    Json(ApiResponse::success(ResetResult { user_id, cleared }, meta))
}
