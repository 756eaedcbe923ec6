use super::{ChatService, Role, Transcript, DISABLED_REPLY};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockChatClient {
    replies: Arc<Mutex<Vec<String>>>,
    seen_lengths: Arc<Mutex<Vec<usize>>>,
    enabled: bool,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            seen_lengths: Arc::new(Mutex::new(Vec::new())),
            enabled: true,
        }
    }

    pub fn with_reply(self, reply: String) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.seen_lengths.lock().unwrap().len()
    }

    /// Transcript length observed on each call, in call order.
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen_lengths.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn get_response(&self, transcript: &Transcript) -> String {
        if !self.enabled {
            return DISABLED_REPLY.to_string();
        }

        let mut seen = self.seen_lengths.lock().unwrap();
        seen.push(transcript.len());
        let call = seen.len();

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            let question = transcript
                .messages()
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.as_str())
                .unwrap_or("");
            format!("Mock reply to: {}", question)
        } else {
            replies[(call - 1) % replies.len()].clone()
        }
    }
}
