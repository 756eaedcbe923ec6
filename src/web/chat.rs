//! NeuroBot chat endpoints.

use super::auth::CurrentSession;
use super::{ApiError, AppState};
use crate::chat::{self, ChatMessage};
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Transcript entries, system instruction included.
    pub turns: usize,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub chat_enabled: bool,
    pub messages: Vec<ChatMessage>,
}

/// `POST /api/chat`
pub async fn send(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut context = session.context.lock().await;

    let reply = chat::converse(state.chat.as_ref(), &mut context.transcript, &req.message)
        .await
        .ok_or_else(|| ApiError::BadRequest("Message cannot be empty".into()))?;

    Ok(Json(ChatResponse {
        reply,
        turns: context.transcript.len(),
    }))
}

/// `GET /api/chat`
pub async fn history(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Json<HistoryResponse> {
    let context = session.context.lock().await;
    Json(HistoryResponse {
        chat_enabled: state.chat.is_enabled(),
        messages: context.transcript.history().to_vec(),
    })
}
