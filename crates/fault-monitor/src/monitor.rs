//! Fault Monitor Implementation

use crate::observation::{
    AlertDispatch, AlertOutcome, MonitorObserver, Observation, SessionReport,
};
use crate::MonitorError;
use alerting::{AlertConfig, AlertManager, AlertState, CooldownDecision, Dispatcher};
use chrono::Utc;
use inference_engine::Classifier;
use sample_source::SampleStream;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of a monitoring session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session started yet
    Idle,
    /// Samples are being processed
    Streaming,
    /// Source exhausted or stopped by an observer
    Finished,
    /// Stopped by a classifier failure
    Aborted,
}

/// Monitor settings, fixed for a session
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub alert: AlertConfig,
    /// Already-localized alert body sent to every channel
    pub alert_message: String,
}

impl MonitorConfig {
    pub fn new(alert: AlertConfig, alert_message: impl Into<String>) -> Self {
        Self {
            alert,
            alert_message: alert_message.into(),
        }
    }
}

/// Classifies samples one at a time and raises cooldown-gated alerts
pub struct FaultMonitor<C> {
    classifier: C,
    dispatcher: Dispatcher,
    alerts: AlertManager,
    alert_message: String,
    state: SessionState,
}

impl<C: Classifier> FaultMonitor<C> {
    /// Create a monitor
    pub fn new(classifier: C, dispatcher: Dispatcher, config: MonitorConfig) -> Self {
        info!(
            "Creating fault monitor: cooldown={} samples, channels={:?}",
            config.alert.cooldown_samples,
            dispatcher.channel_names()
        );
        Self {
            classifier,
            dispatcher,
            alerts: AlertManager::new(config.alert),
            alert_message: config.alert_message,
            state: SessionState::Idle,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Cooldown state of the current or last session
    pub fn alert_state(&self) -> &AlertState {
        self.alerts.state()
    }

    /// Run one session over `stream`
    ///
    /// Each sample is classified and its status reported to `observer`.
    /// When a fault is predicted outside the cooldown window, the alert goes
    /// out on every channel before the next sample is read, and the outcome
    /// follows in `on_observation`. Cooldown state is reset at the start of
    /// every session.
    pub async fn run<O>(
        &mut self,
        mut stream: SampleStream,
        observer: &mut O,
    ) -> Result<SessionReport, MonitorError>
    where
        O: MonitorObserver + ?Sized,
    {
        self.alerts.clear();
        self.state = SessionState::Streaming;
        info!("Monitoring session started: {} samples", stream.total());

        let mut report = SessionReport::default();

        while let Some((index, sample)) = stream.next_sample().await {
            let prediction = match self.classifier.classify(&sample) {
                Ok(prediction) => prediction,
                Err(source) => {
                    self.state = SessionState::Aborted;
                    error!("Session aborted at sample {}: {}", index, source);
                    return Err(MonitorError::ClassifierUnavailable { index, source });
                }
            };

            debug!(
                "Sample {}: {} (p={:.2})",
                index,
                prediction.label.as_str(),
                prediction.probability
            );
            metrics::counter!("monitor_samples_total", "status" => prediction.label.as_str())
                .increment(1);
            observer.on_status(index, &prediction, &sample);

            let alert = if prediction.label.is_fault() {
                self.handle_fault(index).await
            } else {
                AlertOutcome::NotRequired
            };

            let observation = Observation {
                index,
                prediction,
                alert,
                sample,
            };
            report.record(&observation);

            if observer.on_observation(&observation).is_break() {
                info!("Session stopped by observer after sample {}", index);
                report.stopped_early = true;
                break;
            }
        }

        self.state = SessionState::Finished;
        info!(
            "Monitoring session finished: {} processed, {} faults, {} alerts",
            report.processed,
            report.faults,
            report.alert_indices.len()
        );
        observer.on_finished(&report);

        Ok(report)
    }

    async fn handle_fault(&mut self, index: usize) -> AlertOutcome {
        match self.alerts.should_fire(index) {
            CooldownDecision::Cooling {
                last_alert_index,
                remaining,
            } => {
                metrics::counter!("monitor_alerts_total", "outcome" => "suppressed").increment(1);
                AlertOutcome::Suppressed {
                    last_alert_index,
                    remaining,
                }
            }
            CooldownDecision::Ready => {
                let reports = self.dispatcher.dispatch(&self.alert_message).await;
                self.alerts.record_fire(index);

                let dispatch = AlertDispatch {
                    id: Uuid::new_v4(),
                    index,
                    dispatched_at: Utc::now(),
                    reports,
                };

                if dispatch.failures().next().is_none() {
                    metrics::counter!("monitor_alerts_total", "outcome" => "sent").increment(1);
                    AlertOutcome::Sent(dispatch)
                } else {
                    for failure in dispatch.failures() {
                        warn!(
                            "Alert {} at sample {} failed on {}",
                            dispatch.id, index, failure.channel
                        );
                    }
                    metrics::counter!("monitor_alerts_total", "outcome" => "delivery_failed")
                        .increment(1);
                    AlertOutcome::DeliveryFailed(dispatch)
                }
            }
        }
    }
}
