//! HTTP handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::chat::{ChatError, ChatReply, ChatRequest, ChatService};
use crate::status::{NutChatStatus, StatusTracker};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub status: Arc<StatusTracker>,
}

impl AppState {
    pub fn new(chat: ChatService, status: Arc<StatusTracker>) -> Self {
        Self { chat, status }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        match &self {
            ChatError::Unparseable(source) => warn!(error = %source, "Could not parse meal"),
            ChatError::Internal(msg) => error!(error = %msg, "Chat request failed"),
            other => warn!(error = %other, "Rejected chat request"),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// POST /chat
///
/// Model calls block, so the whole request runs on the blocking pool.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    let Json(request) = payload.map_err(|rejection| ChatError::InvalidBody(rejection.body_text()))?;

    let service = state.chat.clone();
    let reply = tokio::task::spawn_blocking(move || service.handle(request))
        .await
        .map_err(|e| ChatError::Internal(format!("chat task failed: {e}")))??;

    Ok(Json(reply))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "records": state.chat.table().len(),
    }))
}

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<NutChatStatus> {
    Json(state.status.get_status())
}
