//! Fault Monitor
//!
//! Replays samples through a classifier, reports SAFE/FAULT status for each
//! one, and dispatches cooldown-gated alerts when a fault is predicted.

mod monitor;
mod observation;

pub use monitor::{FaultMonitor, MonitorConfig, SessionState};
pub use observation::{AlertDispatch, AlertOutcome, MonitorObserver, Observation, SessionReport};

use inference_engine::InferenceError;
use thiserror::Error;

/// Errors that end a monitoring session
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The classifier could not score a sample; the session is aborted
    #[error("Classifier unavailable at sample {index}: {source}")]
    ClassifierUnavailable {
        index: usize,
        #[source]
        source: InferenceError,
    },
}
