//! NeuroBot question answering
//!
//! Keeps the per-session conversation transcript and forwards it to a hosted
//! chat-completion endpoint. Failures never surface as errors to the caller;
//! they come back as the assistant's reply text.

pub mod client;
pub mod mock;
pub mod types;

pub use client::OpenRouterClient;
pub use mock::MockChatClient;
pub use types::{ChatMessage, Role};

use crate::prompts;
use async_trait::async_trait;
use serde::Serialize;

pub const DISABLED_REPLY: &str =
    "Chatbot is disabled because the OpenRouter API key is not configured.";

#[async_trait]
pub trait ChatService: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Reply to the whole transcript. Never fails; provider and transport
    /// errors are rendered into the returned text.
    async fn get_response(&self, transcript: &Transcript) -> String;
}

/// Append-only conversation, starting with the NeuroBot system instruction.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::with_system(prompts::NEUROBOT_SYSTEM)
    }

    pub fn with_system(instruction: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::System, instruction)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Everything after the system instruction.
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages[1..]
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one chat turn: record the question, ask the service, record the reply.
///
/// Blank input is ignored and leaves the transcript untouched.
pub async fn converse(
    chat: &dyn ChatService,
    transcript: &mut Transcript,
    user_input: &str,
) -> Option<String> {
    if user_input.trim().is_empty() {
        return None;
    }

    transcript.push_user(user_input);
    let reply = chat.get_response(transcript).await;
    transcript.push_assistant(reply.clone());
    Some(reply)
}
