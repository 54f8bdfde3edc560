//! Per-sample Observations and Session Reports

use alerting::DeliveryReport;
use chrono::{DateTime, Utc};
use inference_engine::{FaultLabel, Prediction};
use sample_source::Sample;
use serde::Serialize;
use std::ops::ControlFlow;
use uuid::Uuid;

/// One dispatched alert and its per-channel results
#[derive(Debug, Clone, Serialize)]
pub struct AlertDispatch {
    pub id: Uuid,
    /// Sample index that triggered the alert
    pub index: usize,
    pub dispatched_at: DateTime<Utc>,
    pub reports: Vec<DeliveryReport>,
}

impl AlertDispatch {
    /// Channels that accepted the message
    pub fn delivered_channels(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.success)
            .map(|r| r.channel.as_str())
            .collect()
    }

    /// Reports for channels that failed
    pub fn failures(&self) -> impl Iterator<Item = &DeliveryReport> {
        self.reports.iter().filter(|r| !r.success)
    }
}

/// What happened on the alert path for one sample
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// Sample predicted safe
    NotRequired,
    /// Fault detected, alert delivered on every enabled channel
    Sent(AlertDispatch),
    /// Fault detected, alert held back by the cooldown
    Suppressed {
        last_alert_index: usize,
        remaining: usize,
    },
    /// Fault detected, alert attempted but at least one channel failed
    DeliveryFailed(AlertDispatch),
}

impl AlertOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            AlertOutcome::NotRequired => "not_required",
            AlertOutcome::Sent(_) => "sent",
            AlertOutcome::Suppressed { .. } => "suppressed",
            AlertOutcome::DeliveryFailed(_) => "delivery_failed",
        }
    }

    /// The dispatch, if an alert was attempted
    pub fn dispatch(&self) -> Option<&AlertDispatch> {
        match self {
            AlertOutcome::Sent(d) | AlertOutcome::DeliveryFailed(d) => Some(d),
            _ => None,
        }
    }
}

/// Status of one processed sample
#[derive(Debug, Clone)]
pub struct Observation {
    pub index: usize,
    pub prediction: Prediction,
    pub alert: AlertOutcome,
    pub sample: Sample,
}

impl Observation {
    pub fn label(&self) -> FaultLabel {
        self.prediction.label
    }

    pub fn probability(&self) -> f64 {
        self.prediction.probability
    }
}

/// Receives observations as the session runs
pub trait MonitorObserver {
    /// Called as soon as a sample is classified, before any alert is
    /// dispatched for it.
    fn on_status(&mut self, _index: usize, _prediction: &Prediction, _sample: &Sample) {}

    /// Called once per processed sample, in order, after the alert path has
    /// run. Returning `ControlFlow::Break` stops the session after this sample.
    fn on_observation(&mut self, observation: &Observation) -> ControlFlow<()>;

    /// Called when the session ends without a fatal error
    fn on_finished(&mut self, _report: &SessionReport) {}
}

impl MonitorObserver for Vec<Observation> {
    fn on_observation(&mut self, observation: &Observation) -> ControlFlow<()> {
        self.push(observation.clone());
        ControlFlow::Continue(())
    }
}

/// Fan out to two observers; stops if either asks to
impl<A: MonitorObserver, B: MonitorObserver> MonitorObserver for (A, B) {
    fn on_status(&mut self, index: usize, prediction: &Prediction, sample: &Sample) {
        self.0.on_status(index, prediction, sample);
        self.1.on_status(index, prediction, sample);
    }

    fn on_observation(&mut self, observation: &Observation) -> ControlFlow<()> {
        let first = self.0.on_observation(observation);
        let second = self.1.on_observation(observation);
        if first.is_break() || second.is_break() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn on_finished(&mut self, report: &SessionReport) {
        self.0.on_finished(report);
        self.1.on_finished(report);
    }
}

/// Summary of a completed session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub processed: usize,
    pub safe: usize,
    pub faults: usize,
    /// Indices at which an alert was dispatched
    pub alert_indices: Vec<usize>,
    pub suppressed: usize,
    /// Alerts where at least one channel failed
    pub delivery_failures: usize,
    /// Session ended because an observer asked to stop
    pub stopped_early: bool,
}

impl SessionReport {
    pub(crate) fn record(&mut self, observation: &Observation) {
        self.processed += 1;
        if observation.label().is_fault() {
            self.faults += 1;
        } else {
            self.safe += 1;
        }

        match &observation.alert {
            AlertOutcome::NotRequired => {}
            AlertOutcome::Sent(d) => self.alert_indices.push(d.index),
            AlertOutcome::Suppressed { .. } => self.suppressed += 1,
            AlertOutcome::DeliveryFailed(d) => {
                self.alert_indices.push(d.index);
                self.delivery_failures += 1;
            }
        }
    }
}
