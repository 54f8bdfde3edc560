//! Bulk SMS notifier over the Fast2SMS `bulkV2` endpoint.

use super::{resolve_secret, Notifier, NotifyError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SMS channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// API key sent in the `authorization` header (literal or `${VAR}`)
    pub api_key: String,
    /// Recipient numbers
    pub numbers: Vec<String>,
    /// Endpoint URL
    pub endpoint: String,
    pub route: String,
    pub sender_id: String,
    pub language: String,
    /// HTTP request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_key: "${FAST2SMS_API_KEY}".to_string(),
            numbers: Vec::new(),
            endpoint: "https://www.fast2sms.com/dev/bulkV2".to_string(),
            route: "v3".to_string(),
            sender_id: "TXTIND".to_string(),
            language: "english".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Request body accepted by the provider
#[derive(Debug, Serialize)]
struct BulkSmsRequest<'a> {
    route: &'a str,
    sender_id: &'a str,
    message: &'a str,
    language: &'a str,
    numbers: &'a str,
}

/// Sends alerts to a list of phone numbers in one request
#[derive(Debug)]
pub struct SmsNotifier {
    api_key: String,
    numbers: String,
    endpoint: String,
    route: String,
    sender_id: String,
    language: String,
    client: reqwest::Client,
}

impl SmsNotifier {
    /// Build the channel, resolving the API key
    pub fn from_config(config: &SmsConfig) -> Result<Self, NotifyError> {
        let api_key = resolve_secret("sms.api_key", &config.api_key)?;

        let numbers: Vec<&str> = config
            .numbers
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if numbers.is_empty() {
            return Err(NotifyError::Config(
                "sms.numbers must list at least one recipient".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            api_key,
            numbers: numbers.join(","),
            endpoint: config.endpoint.clone(),
            route: config.route.clone(),
            sender_id: config.sender_id.clone(),
            language: config.language.clone(),
            client,
        })
    }

    /// Comma-separated recipient list as sent to the provider
    pub fn recipients(&self) -> &str {
        &self.numbers
    }
}

#[async_trait::async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let body = BulkSmsRequest {
            route: &self.route,
            sender_id: &self.sender_id,
            message,
            language: &self.language,
            numbers: &self.numbers,
        };

        tracing::debug!(numbers = %self.numbers, "Sending SMS alert");

        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", &self.api_key)
            .json(&body)
            .send()
            .await?;

        // The provider signals acceptance with exactly 200
        let status = response.status();
        if status == StatusCode::OK {
            tracing::info!(numbers = %self.numbers, "SMS alerts sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "sms"
    }
}
