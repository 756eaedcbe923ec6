//! Application wiring: build services from configuration and serve HTTP.

use crate::chat::{ChatService, OpenRouterClient};
use crate::classifier::{Classifier, OnnxClassifier};
use crate::models::Config;
use crate::session::{LoginGate, SessionStore};
use crate::web::{self, AppState};
use crate::Result;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

pub struct App {
    state: AppState,
    config: Config,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub classifier: Arc<dyn Classifier>,
    pub chat: Arc<dyn ChatService>,
}

impl App {
    pub fn with_services(services: AppServices, config: Config) -> Self {
        let state = AppState {
            classifier: services.classifier,
            chat: services.chat,
            sessions: SessionStore::with_ttl(config.session_ttl),
            login: Arc::new(LoginGate::new(
                config.demo_username.clone(),
                config.demo_password.clone(),
            )),
        };
        Self { state, config }
    }

    /// Load the model and build the chat client. A model that fails to load
    /// is fatal; a missing API key only disables chat.
    pub fn new(config: Config) -> Result<Self> {
        info!(
            "Config: model={}, bind={}, max_upload_bytes={}, session_ttl={}s, chat_enabled={}",
            config.model_path.display(),
            config.bind_addr,
            config.max_upload_bytes,
            config.session_ttl.as_secs(),
            config.chat_enabled()
        );

        let classifier = OnnxClassifier::load(&config.model_path)?;

        let chat = OpenRouterClient::new(config.openrouter_api_key.clone())?;
        if !chat.is_enabled() {
            warn!("OPENROUTER_API_KEY not configured, NeuroBot chat is disabled");
        }

        Ok(Self::with_services(
            AppServices {
                classifier: Arc::new(classifier),
                chat: Arc::new(chat),
            },
            config,
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        web::router(self.state.clone(), self.config.max_upload_bytes)
    }

    /// Bind and serve until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        info!("NeuroScan AI listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatClient;
    use crate::classifier::MockClassifier;
    use crate::Error;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn build_test_app(chat: MockChatClient) -> App {
        App::with_services(
            AppServices {
                classifier: Arc::new(MockClassifier::new()),
                chat: Arc::new(chat),
            },
            Config {
                demo_username: "dr_who".to_string(),
                demo_password: "tardis".to_string(),
                ..Config::default()
            },
        )
    }

    #[test]
    fn test_new_fails_when_model_is_missing() {
        let config = Config {
            model_path: PathBuf::from("/nonexistent/brain_tumor_model.onnx"),
            ..Config::default()
        };

        let err = App::new(config).err().unwrap();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_with_services_starts_without_sessions() {
        let app = build_test_app(MockChatClient::new());
        assert!(app.state().sessions.is_empty().unwrap());
        assert_eq!(app.config().demo_username, "dr_who");
    }

    #[tokio::test]
    async fn test_router_uses_configured_credentials() {
        let app = build_test_app(MockChatClient::new().disabled());

        let resp = app
            .router()
            .oneshot(
                Request::post("/api/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username":"dr_who","password":"tardis"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(app.state().sessions.len().unwrap(), 1);

        let resp = app
            .router()
            .oneshot(
                Request::post("/api/login")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username":"radiologist","password":"secure123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
