//! Runtime configuration
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file). The chat API key is looked up in the secrets file first and
//! falls back to the environment.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL_PATH: &str = "brain_tumor_model.onnx";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";
pub const DEFAULT_DEMO_USERNAME: &str = "radiologist";
pub const DEFAULT_DEMO_PASSWORD: &str = "secure123";
pub const DEFAULT_SECRETS_FILE: &str = ".secrets.env";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub bind_addr: String,
    pub demo_username: String,
    pub demo_password: String,
    pub openrouter_api_key: Option<String>,
    pub max_upload_bytes: usize,
    /// Idle time after which a login session is dropped.
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_file = lookup("NEUROSCAN_SECRETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE));

        let max_upload_bytes = match lookup("NEUROSCAN_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("NEUROSCAN_MAX_UPLOAD_BYTES is not a number: {}", raw))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let session_ttl_secs = match lookup("NEUROSCAN_SESSION_TTL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("NEUROSCAN_SESSION_TTL_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let openrouter_api_key =
            read_secret(&secrets_file, API_KEY_VAR).or_else(|| non_blank(lookup(API_KEY_VAR)));

        Ok(Self {
            model_path: lookup("NEUROSCAN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            bind_addr: lookup("NEUROSCAN_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            demo_username: lookup("NEUROSCAN_DEMO_USERNAME")
                .unwrap_or_else(|| DEFAULT_DEMO_USERNAME.to_string()),
            demo_password: lookup("NEUROSCAN_DEMO_PASSWORD")
                .unwrap_or_else(|| DEFAULT_DEMO_PASSWORD.to_string()),
            openrouter_api_key,
            max_upload_bytes,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }

    pub fn chat_enabled(&self) -> bool {
        self.openrouter_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            demo_username: DEFAULT_DEMO_USERNAME.to_string(),
            demo_password: DEFAULT_DEMO_PASSWORD.to_string(),
            openrouter_api_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

/// Look a key up in a dotenv-style secrets file without touching the
/// process environment. A missing or unreadable file yields `None`.
fn read_secret(path: &Path, key: &str) -> Option<String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Secrets file {} not used: {}", path.display(), e);
            return None;
        }
    };

    for entry in entries {
        match entry {
            Ok((name, value)) if name == key => return non_blank(Some(value)),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Skipping malformed line in {}: {}", path.display(), e);
            }
        }
    }
    None
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
