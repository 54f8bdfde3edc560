//! Dashboard State

use alerting::{Language, Templates};
use chrono::{DateTime, Utc};
use fault_monitor::{AlertOutcome, Observation, SessionState};
use inference_engine::Prediction;
use metrics_exporter_prometheus::PrometheusHandle;
use sample_source::Sample;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Features shown alongside the latest status
const DISPLAYED_FEATURES: usize = 10;

/// Alert history kept for the dashboard
const MAX_ALERT_RECORDS: usize = 500;

/// Single named feature value
#[derive(Debug, Clone, Serialize)]
pub struct FeatureValue {
    pub name: String,
    pub value: f64,
}

/// Latest processed sample, as the dashboard shows it
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub index: usize,
    /// "SAFE" or "FAULT"
    pub status: String,
    pub probability: f64,
    pub status_text: String,
    pub detail: String,
    pub alert: String,
    pub features: Vec<FeatureValue>,
}

/// One fault that reached the alert path
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    /// Set when an alert was dispatched
    pub id: Option<Uuid>,
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub outcome: String,
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug)]
struct Dashboard {
    session: SessionState,
    total_samples: usize,
    processed: usize,
    faults: usize,
    latest: Option<StatusSnapshot>,
    alerts: VecDeque<AlertRecord>,
}

/// Application state shared across handlers and the session observer
pub struct AppState {
    version: String,
    start_time: Instant,
    language: Language,
    metrics: Option<PrometheusHandle>,
    dashboard: RwLock<Dashboard>,
}

impl AppState {
    /// Create new application state
    pub fn new(language: Language, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            language,
            metrics,
            dashboard: RwLock::new(Dashboard {
                session: SessionState::Idle,
                total_samples: 0,
                processed: 0,
                faults: 0,
                latest: None,
                alerts: VecDeque::new(),
            }),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn templates(&self) -> &'static Templates {
        self.language.templates()
    }

    pub fn metrics(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }

    /// Reset counters for a session of `total_samples`
    pub fn begin_session(&self, total_samples: usize) {
        let mut dash = self.dashboard.write().unwrap_or_else(PoisonError::into_inner);
        dash.session = SessionState::Streaming;
        dash.total_samples = total_samples;
        dash.processed = 0;
        dash.faults = 0;
        dash.latest = None;
        dash.alerts.clear();
    }

    pub fn set_session_state(&self, state: SessionState) {
        self.dashboard
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .session = state;
    }

    pub fn session_state(&self) -> SessionState {
        self.dashboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
    }

    /// Show a freshly classified sample; its alert outcome is still pending
    /// for faults
    pub fn record_status(&self, index: usize, prediction: &Prediction, sample: &Sample) {
        let templates = self.templates();
        let is_fault = prediction.label.is_fault();

        let snapshot = StatusSnapshot {
            index,
            status: if is_fault { "FAULT" } else { "SAFE" }.to_string(),
            probability: prediction.probability,
            status_text: if is_fault {
                templates.status_fault
            } else {
                templates.status_safe
            }
            .to_string(),
            detail: if is_fault { templates.fault } else { templates.safe }.to_string(),
            alert: if is_fault { "pending" } else { "not_required" }.to_string(),
            features: sample
                .iter()
                .take(DISPLAYED_FEATURES)
                .map(|(name, value)| FeatureValue {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        };

        let mut dash = self.dashboard.write().unwrap_or_else(PoisonError::into_inner);
        dash.processed += 1;
        if is_fault {
            dash.faults += 1;
        }
        dash.latest = Some(snapshot);
    }

    /// Apply the alert outcome of a sample already shown by `record_status`
    pub fn record_outcome(&self, observation: &Observation) {
        let record = alert_record(observation);

        let mut dash = self.dashboard.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(latest) = dash.latest.as_mut().filter(|l| l.index == observation.index) {
            latest.alert = observation.alert.kind().to_string();
        }
        if let Some(record) = record {
            if dash.alerts.len() >= MAX_ALERT_RECORDS {
                dash.alerts.pop_front();
            }
            dash.alerts.push_back(record);
        }
    }

    /// Latest snapshot with (processed, faults, total) counts
    pub fn status(&self) -> (Option<StatusSnapshot>, usize, usize, usize) {
        let dash = self.dashboard.read().unwrap_or_else(PoisonError::into_inner);
        (
            dash.latest.clone(),
            dash.processed,
            dash.faults,
            dash.total_samples,
        )
    }

    /// Most recent alert records, newest first
    pub fn recent_alerts(&self, limit: usize) -> Vec<AlertRecord> {
        let dash = self.dashboard.read().unwrap_or_else(PoisonError::into_inner);
        dash.alerts.iter().rev().take(limit).cloned().collect()
    }
}

fn alert_record(observation: &Observation) -> Option<AlertRecord> {
    let outcome = observation.alert.kind().to_string();
    match (&observation.alert, observation.alert.dispatch()) {
        (AlertOutcome::NotRequired, _) => None,
        (_, Some(dispatch)) => Some(AlertRecord {
            id: Some(dispatch.id),
            index: dispatch.index,
            timestamp: dispatch.dispatched_at,
            outcome,
            delivered: dispatch
                .delivered_channels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            failed: dispatch.failures().map(|r| r.channel.clone()).collect(),
        }),
        (_, None) => Some(AlertRecord {
            id: None,
            index: observation.index,
            timestamp: Utc::now(),
            outcome,
            delivered: Vec::new(),
            failed: Vec::new(),
        }),
    }
}
