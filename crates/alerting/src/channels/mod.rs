//! Notification Channels
//!
//! Each channel delivers an already-resolved alert message. Credentials
//! may be given as `${ENV_VAR}` references and are resolved when the
//! channel is built.

mod sms;
mod whatsapp;

pub use sms::{SmsConfig, SmsNotifier};
pub use whatsapp::{WhatsAppConfig, WhatsAppNotifier};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors during notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Delivery timed out after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Supported channel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "whatsapp")]
    WhatsApp,
    #[serde(rename = "sms")]
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::WhatsApp => "whatsapp",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification delivery mechanism
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` through this channel
    async fn send(&self, message: &str) -> Result<(), NotifyError>;

    /// Name used in logs and delivery reports
    fn channel_name(&self) -> &str;
}

/// Resolve a `${VAR}` reference against the environment, or pass a
/// literal value through. Empty results are rejected.
pub fn resolve_secret(field: &str, value: &str) -> Result<String, NotifyError> {
    let resolved = match value.strip_prefix("${") {
        Some(rest) => {
            let var = rest.strip_suffix('}').ok_or_else(|| {
                NotifyError::Config(format!("Malformed env var reference for {field}: {value}"))
            })?;
            std::env::var(var).map_err(|_| {
                NotifyError::Config(format!("Environment variable '{var}' for {field} is not set"))
            })?
        }
        None => value.to_string(),
    };

    if resolved.trim().is_empty() {
        return Err(NotifyError::Config(format!("{field} must not be empty")));
    }
    Ok(resolved)
}
