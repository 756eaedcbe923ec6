//! Per-session state and the demo login gate
//!
//! Each successful login creates a `SessionContext` holding that user's
//! transcript and latest diagnosis. Sessions are keyed by a random token and
//! dropped on logout or once idle past the store's TTL; no handler sees
//! another session's state.

use crate::chat::Transcript;
use crate::diagnosis::Diagnosis;
use crate::models::DEFAULT_SESSION_TTL_SECS;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error as ThisError;
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(DEFAULT_SESSION_TTL_SECS);

#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub transcript: Transcript,
    pub last_diagnosis: Option<Diagnosis>,
}

impl SessionContext {
    fn new(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Utc::now(),
            transcript: Transcript::new(),
            last_diagnosis: None,
        }
    }
}

/// Locked per session so one user's requests run one at a time.
pub type SharedSession = Arc<tokio::sync::Mutex<SessionContext>>;

struct SessionEntry {
    context: SharedSession,
    last_seen: Instant,
}

impl SessionEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Live sessions keyed by token. A session idle for longer than the TTL is
/// evicted the next time the store is touched.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, username: &str) -> Result<Uuid> {
        let context = SessionContext::new(username);
        let id = context.id;

        let mut sessions = self.lock()?;
        self.evict_expired(&mut sessions);
        sessions.insert(
            id,
            SessionEntry {
                context: Arc::new(tokio::sync::Mutex::new(context)),
                last_seen: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Look a session up and mark it as seen. Expired sessions are dropped
    /// and reported as absent.
    pub fn get(&self, id: &Uuid) -> Result<Option<SharedSession>> {
        let mut sessions = self.lock()?;
        self.evict_expired(&mut sessions);

        Ok(sessions.get_mut(id).map(|entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.context)
        }))
    }

    /// Tear a session down. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> Result<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.ttl));

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s)", evicted);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>> {
        self.sessions
            .lock()
            .map_err(|_| Error::Invariant("session store lock poisoned".to_string()))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter both username and password.")]
    MissingFields,
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Single configured username/password pair. A placeholder gate, not a
/// security boundary: no hashing, no persistence.
#[derive(Debug, Clone)]
pub struct LoginGate {
    username: String,
    password: String,
}

impl LoginGate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn check(&self, username: &str, password: &str) -> std::result::Result<(), LoginError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginError::MissingFields);
        }
        if username == self.username && password == self.password {
            Ok(())
        } else {
            Err(LoginError::InvalidCredentials)
        }
    }
}
