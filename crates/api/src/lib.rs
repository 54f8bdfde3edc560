//! Brake Fault Monitor Application
//!
//! Wires the sample source, classifier, and notification channels into a
//! monitoring session, and serves a JSON API the dashboard polls.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use alerting::{ChannelKind, Dispatcher, Notifier, NotifyError, SmsNotifier, WhatsAppNotifier};

mod observer;
mod routes;
pub mod settings;
mod state;

pub use observer::{ConsoleObserver, DashboardObserver};
pub use settings::{LoggingSettings, Settings, SettingsError};
pub use state::{AlertRecord, AppState, FeatureValue, StatusSnapshot};

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub session: fault_monitor::SessionState,
    pub language: alerting::Language,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version().to_string(),
        uptime_seconds: state.uptime().as_secs(),
        session: state.session_state(),
        language: state.language(),
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the Prometheus recorder backing `/metrics`
pub fn install_metrics() -> Option<PrometheusHandle> {
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Build the dispatcher for the enabled channels, in configured order
pub fn build_dispatcher(settings: &Settings) -> Result<Dispatcher, NotifyError> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
    let mut seen = Vec::new();

    for kind in &settings.alerting.channels {
        if seen.contains(kind) {
            continue;
        }
        seen.push(*kind);

        let channel: Box<dyn Notifier> = match kind {
            ChannelKind::WhatsApp => Box::new(WhatsAppNotifier::from_config(&settings.whatsapp)?),
            ChannelKind::Sms => Box::new(SmsNotifier::from_config(&settings.sms)?),
        };
        info!("Alert channel enabled: {}", kind);
        channels.push(channel);
    }

    Ok(Dispatcher::new(
        channels,
        Duration::from_millis(settings.alerting.channel_timeout_ms),
    ))
}

/// Run the server
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> Result<(), std::io::Error> {
    let app = create_router(state);

    info!("Starting dashboard API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::Language;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = Arc::new(AppState::new(Language::Hindi, None));
        let (status, body) = get_json(create_router(state), "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session"], "idle");
        assert_eq!(body["language"], "hi");
    }

    #[tokio::test]
    async fn test_health_reports_aborted_session() {
        let state = Arc::new(AppState::new(Language::English, None));
        state.begin_session(10);
        state.set_session_state(fault_monitor::SessionState::Aborted);

        let (status, body) = get_json(create_router(state), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"], "aborted");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let state = Arc::new(AppState::new(Language::English, None));
        let (status, _) = get_json(create_router(state), "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_dispatcher_from_settings() {
        let mut settings = Settings::default();
        settings.alerting.channels = vec![ChannelKind::Sms, ChannelKind::Sms];
        settings.sms.api_key = "key".to_string();
        settings.sms.numbers = vec!["8100000001".to_string()];

        let dispatcher = build_dispatcher(&settings).unwrap();
        assert_eq!(dispatcher.channel_names(), vec!["sms"]);
    }

    #[test]
    fn test_dispatcher_rejects_unconfigured_channel() {
        let mut settings = Settings::default();
        settings.alerting.channels = vec![ChannelKind::WhatsApp];
        settings.whatsapp.account_sid = "AC1".to_string();
        settings.whatsapp.auth_token = "token".to_string();

        // No from/to numbers configured
        assert!(matches!(
            build_dispatcher(&settings),
            Err(NotifyError::Config(_))
        ));
    }
}
