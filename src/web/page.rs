//! Static UI page and health check.

use super::AppState;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

const INDEX_HTML: &str = include_str!("../../data/web/index.html");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chat_enabled: bool,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        chat_enabled: state.chat.is_enabled(),
    })
}
