//! Login, logout and the session guard.

use super::{ApiError, AppState};
use crate::session::{LoginError, SharedSession};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub message: &'static str,
}

/// Session resolved by [`require_session`], available to handlers as an
/// extension.
#[derive(Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub context: SharedSession,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim();
    if let Err(e) = state.login.check(&req.username, &req.password) {
        tracing::warn!("Login rejected for {:?}: {}", username, e);
        return Err(e.into());
    }

    let token = state.sessions.create(username)?;
    tracing::info!("Login succeeded for {}", username);
    Ok(Json(LoginResponse {
        token,
        message: "Login successful",
    }))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<StatusCode, ApiError> {
    {
        let context = session.context.lock().await;
        tracing::info!(
            "Session {} for {} ended after {}s",
            session.id,
            context.username,
            (Utc::now() - context.created_at).num_seconds()
        );
    }
    state.sessions.remove(&session.id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject requests that do not carry a live session token.
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_session_inner(state, req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    state: AppState,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
        .ok_or(ApiError::Unauthorized)?;

    let context = state.sessions.get(&id)?.ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentSession { id, context });
    Ok(next.run(req).await)
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::MissingFields => ApiError::BadRequest(err.to_string()),
            LoginError::InvalidCredentials => ApiError::InvalidCredentials(err.to_string()),
        }
    }
}
