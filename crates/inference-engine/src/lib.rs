//! Inference Engine
//!
//! Classifier capability used by the fault monitor, plus a logistic model
//! loaded from exported parameters.

mod classifier;
mod engine;

pub use classifier::{Classifier, FaultLabel, Prediction};
pub use engine::LinearModel;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}
