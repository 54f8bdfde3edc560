//! Classifier Capability

use crate::InferenceError;
use sample_source::Sample;
use serde::{Deserialize, Serialize};

/// Binary label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultLabel {
    /// Brakes operating normally (class 0)
    Safe,
    /// Abnormal brake condition (class 1)
    Fault,
}

impl FaultLabel {
    /// Map a raw class id; anything non-zero is a fault
    pub fn from_class(class: u8) -> Self {
        if class == 0 {
            FaultLabel::Safe
        } else {
            FaultLabel::Fault
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, FaultLabel::Fault)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultLabel::Safe => "safe",
            FaultLabel::Fault => "fault",
        }
    }
}

/// Label plus fault probability for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: FaultLabel,
    /// Probability of the fault class, in [0, 1]
    pub probability: f64,
}

/// Pre-trained binary classifier
///
/// Calls are synchronous and must not have side effects. Implementations
/// are loaded once per session and shared read-only.
pub trait Classifier: Send + Sync {
    /// Predicted label for `sample`
    fn predict(&self, sample: &Sample) -> Result<FaultLabel, InferenceError>;

    /// Probability of the fault class for `sample`
    fn predict_probability(&self, sample: &Sample) -> Result<f64, InferenceError>;

    /// Label and probability together, with the probability range checked
    fn classify(&self, sample: &Sample) -> Result<Prediction, InferenceError> {
        let label = self.predict(sample)?;
        let probability = self.predict_probability(sample)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::ProbabilityOutOfRange(probability));
        }

        Ok(Prediction { label, probability })
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, sample: &Sample) -> Result<FaultLabel, InferenceError> {
        (**self).predict(sample)
    }

    fn predict_probability(&self, sample: &Sample) -> Result<f64, InferenceError> {
        (**self).predict_probability(sample)
    }

    fn classify(&self, sample: &Sample) -> Result<Prediction, InferenceError> {
        (**self).classify(sample)
    }
}
