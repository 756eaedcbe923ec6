//! HTTP front end
//!
//! Serves the single-page UI and the JSON API behind it. Routes under
//! `/api/` other than login require `Authorization: Bearer <session token>`.

pub mod auth;
pub mod chat;
pub mod diagnose;
pub mod error;
pub mod page;

pub use error::ApiError;

use crate::chat::ChatService;
use crate::classifier::Classifier;
use crate::session::{LoginGate, SessionStore};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handles for every request. The classifier and chat client are
/// built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub chat: Arc<dyn ChatService>,
    pub sessions: SessionStore,
    pub login: Arc<LoginGate>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let protected = Router::new()
        .route("/api/logout", post(auth::logout))
        .route("/api/diagnose", post(diagnose::diagnose))
        .route("/api/report", get(diagnose::report))
        .route("/api/chat", get(chat::history).post(chat::send))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/", get(page::index))
        .route("/health", get(page::health))
        .route("/api/login", post(auth::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
