use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::{ChatService, Transcript, DISABLED_REPLY};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai";
const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

pub const MODEL_ID: &str = "openai/gpt-4o-mini";
pub const MAX_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.7;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat adapter for the OpenRouter completion API.
///
/// Holds no conversation state; the caller owns the transcript.
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::new_with_client(api_key, client))
    }

    pub fn new_with_client(api_key: Option<String>, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Single request, no retries. A successful response without
    /// `choices[0].message.content` yields the raw body text.
    pub async fn complete(&self, api_key: &str, transcript: &Transcript) -> Result<String> {
        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);
        let request = ChatCompletionRequest {
            model: MODEL_ID,
            messages: transcript.messages(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            "Sending chat completion request ({} messages)",
            transcript.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenRouter: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("OpenRouter API error (status {}): {}", status, body);
            return Err(Error::ChatStatus {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<ChatCompletionResponse>(&body) {
            Ok(parsed) => match parsed.first_content() {
                Some(content) => Ok(content.to_string()),
                None => {
                    tracing::warn!("OpenRouter response had no message content");
                    Ok(body)
                }
            },
            Err(e) => {
                tracing::warn!("Failed to parse OpenRouter response: {}", e);
                Ok(body)
            }
        }
    }
}

#[async_trait]
impl ChatService for OpenRouterClient {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_response(&self, transcript: &Transcript) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return DISABLED_REPLY.to_string();
        };

        match self.complete(api_key, transcript).await {
            Ok(reply) => reply,
            Err(Error::ChatStatus { status, body }) => format!("Error: {} - {}", status, body),
            Err(e) => format!("Error calling OpenRouter: {}", e),
        }
    }
}
