//! Delivers one alert message to every enabled channel.
//!
//! Channels are attempted one after another, each bounded by a timeout.
//! A failure on one channel never prevents attempts on the others.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::channels::{Notifier, NotifyError};

/// Outcome of delivering to a single channel
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Sends alerts over a fixed set of channels
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over `channels`, bounding each send by `timeout`
    pub fn new(channels: Vec<Box<dyn Notifier>>, timeout: Duration) -> Self {
        Self { channels, timeout }
    }

    /// Dispatcher with no channels; dispatching is a no-op
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::from_secs(10))
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Names of the configured channels, in delivery order
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.channel_name()).collect()
    }

    /// Deliver `message` to every channel, returning one report per channel
    pub async fn dispatch(&self, message: &str) -> Vec<DeliveryReport> {
        if self.channels.is_empty() {
            tracing::debug!("No notification channels enabled");
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let name = channel.channel_name();
            let start = Instant::now();

            let result = match tokio::time::timeout(self.timeout, channel.send(message)).await {
                Ok(result) => result,
                Err(_) => Err(NotifyError::Timeout(self.timeout.as_millis() as u64)),
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            let error = match result {
                Ok(()) => {
                    tracing::info!(channel = name, duration_ms, "Alert delivered");
                    metrics::counter!(
                        "notifier_deliveries_total",
                        "channel" => name.to_string(),
                        "result" => "ok"
                    )
                    .increment(1);
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        channel = name,
                        error = %e,
                        duration_ms,
                        "Alert delivery failed"
                    );
                    metrics::counter!(
                        "notifier_deliveries_total",
                        "channel" => name.to_string(),
                        "result" => "error"
                    )
                    .increment(1);
                    Some(e.to_string())
                }
            };

            reports.push(DeliveryReport {
                channel: name.to_string(),
                success: error.is_none(),
                error,
                duration_ms,
            });
        }

        reports
    }
}
