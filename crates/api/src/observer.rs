//! Session Observers

use alerting::{Language, Templates};
use fault_monitor::{AlertOutcome, MonitorObserver, Observation, SessionReport, SessionState};
use inference_engine::{FaultLabel, Prediction};
use sample_source::Sample;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

/// Logs one console line per sample
pub struct ConsoleObserver {
    templates: &'static Templates,
}

impl ConsoleObserver {
    pub fn new(language: Language) -> Self {
        Self {
            templates: language.templates(),
        }
    }
}

impl MonitorObserver for ConsoleObserver {
    fn on_status(&mut self, index: usize, prediction: &Prediction, _sample: &Sample) {
        match prediction.label {
            FaultLabel::Safe => info!(
                "SAFE  [{}] No Fault | Probability = {:.2}",
                index, prediction.probability
            ),
            FaultLabel::Fault => warn!(
                "FAULT [{}] Brake Fault Detected | Probability = {:.2}",
                index, prediction.probability
            ),
        }
    }

    fn on_observation(&mut self, observation: &Observation) -> ControlFlow<()> {
        let index = observation.index;

        match &observation.alert {
            AlertOutcome::NotRequired => {}
            AlertOutcome::Sent(dispatch) => {
                warn!(
                    "ALERT [{}] alert sent ({})",
                    index,
                    dispatch.delivered_channels().join(", ")
                );
            }
            AlertOutcome::Suppressed { remaining, .. } => {
                warn!(
                    "ALERT [{}] alert suppressed by cooldown ({} samples left)",
                    index, remaining
                );
            }
            AlertOutcome::DeliveryFailed(dispatch) => {
                let failed: Vec<&str> = dispatch.failures().map(|r| r.channel.as_str()).collect();
                warn!("ALERT [{}] alert delivery failed on {}", index, failed.join(", "));
            }
        }

        ControlFlow::Continue(())
    }

    fn on_finished(&mut self, report: &SessionReport) {
        info!(
            "{} ({} samples, {} faults, alerts at {:?})",
            self.templates.finished, report.processed, report.faults, report.alert_indices
        );
    }
}

/// Feeds observations into the shared dashboard state
pub struct DashboardObserver {
    state: Arc<AppState>,
}

impl DashboardObserver {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl MonitorObserver for DashboardObserver {
    fn on_status(&mut self, index: usize, prediction: &Prediction, sample: &Sample) {
        self.state.record_status(index, prediction, sample);
    }

    fn on_observation(&mut self, observation: &Observation) -> ControlFlow<()> {
        self.state.record_outcome(observation);
        ControlFlow::Continue(())
    }

    fn on_finished(&mut self, _report: &SessionReport) {
        self.state.set_session_state(SessionState::Finished);
    }
}
