//! WhatsApp notifier over the Twilio Messages API.

use super::{resolve_secret, Notifier, NotifyError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// WhatsApp channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    /// Twilio account SID (literal or `${VAR}`)
    pub account_sid: String,
    /// Twilio auth token (literal or `${VAR}`)
    pub auth_token: String,
    /// Sender number, with or without the `whatsapp:` prefix
    pub from: String,
    /// Recipient number, with or without the `whatsapp:` prefix
    pub to: String,
    /// API base URL
    pub base_url: String,
    /// HTTP request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            account_sid: "${TWILIO_ACCOUNT_SID}".to_string(),
            auth_token: "${TWILIO_AUTH_TOKEN}".to_string(),
            from: String::new(),
            to: String::new(),
            base_url: "https://api.twilio.com".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Sends alerts to a single WhatsApp recipient
#[derive(Debug)]
pub struct WhatsAppNotifier {
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
    url: String,
    client: reqwest::Client,
}

impl WhatsAppNotifier {
    /// Build the channel, resolving credentials
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self, NotifyError> {
        let account_sid = resolve_secret("whatsapp.account_sid", &config.account_sid)?;
        let auth_token = resolve_secret("whatsapp.auth_token", &config.auth_token)?;
        let from = whatsapp_address("whatsapp.from", &config.from)?;
        let to = whatsapp_address("whatsapp.to", &config.to)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.base_url.trim_end_matches('/'),
            account_sid
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            account_sid,
            auth_token,
            from,
            to,
            url,
            client,
        })
    }
}

fn whatsapp_address(field: &str, number: &str) -> Result<String, NotifyError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(NotifyError::Config(format!("{field} must not be empty")));
    }
    if number.starts_with(WHATSAPP_PREFIX) {
        Ok(number.to_string())
    } else {
        Ok(format!("{WHATSAPP_PREFIX}{number}"))
    }
}

#[async_trait::async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::debug!(to = %self.to, "Sending WhatsApp alert");

        let params = [
            ("Body", message),
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
        ];

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(to = %self.to, "WhatsApp alert sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn channel_name(&self) -> &str {
        "whatsapp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::test_support::spawn_server;
    use axum::extract::{Form, Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Option<(String, String, HashMap<String, String>)>>>;

    fn config(base_url: String) -> WhatsAppConfig {
        WhatsAppConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from: "+14155238886".to_string(),
            to: "whatsapp:+918000000000".to_string(),
            base_url,
            request_timeout_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_posts_twilio_form() {
        let captured: Captured = Arc::new(Mutex::new(None));

        let router = Router::new()
            .route(
                "/2010-04-01/Accounts/:sid/Messages.json",
                post(
                    |State(captured): State<Captured>,
                     Path(sid): Path<String>,
                     headers: HeaderMap,
                     Form(form): Form<HashMap<String, String>>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        *captured.lock().unwrap() = Some((sid, auth, form));
                        (StatusCode::CREATED, "{}")
                    },
                ),
            )
            .with_state(captured.clone());

        let notifier = WhatsAppNotifier::from_config(&config(spawn_server(router).await)).unwrap();
        notifier.send("Brake fault detected").await.unwrap();

        let (sid, auth, form) = captured.lock().unwrap().take().unwrap();
        assert_eq!(sid, "AC123");
        assert!(auth.starts_with("Basic "));
        assert_eq!(form["Body"], "Brake fault detected");
        assert_eq!(form["From"], "whatsapp:+14155238886");
        assert_eq!(form["To"], "whatsapp:+918000000000");
    }

    #[tokio::test]
    async fn test_error_status_is_rejection() {
        let router = Router::new().route(
            "/2010-04-01/Accounts/:sid/Messages.json",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
        );

        let notifier = WhatsAppNotifier::from_config(&config(spawn_server(router).await)).unwrap();
        match notifier.send("x").await {
            Err(NotifyError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_recipient_rejected() {
        let mut cfg = config("http://localhost".to_string());
        cfg.to = String::new();
        assert!(matches!(
            WhatsAppNotifier::from_config(&cfg),
            Err(NotifyError::Config(_))
        ));
    }

    #[test]
    fn test_channel_name() {
        let notifier =
            WhatsAppNotifier::from_config(&config("http://localhost".to_string())).unwrap();
        assert_eq!(notifier.channel_name(), "whatsapp");
    }
}
