//! Logistic Model Inference

use crate::classifier::{Classifier, FaultLabel};
use crate::InferenceError;
use sample_source::Sample;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Default decision threshold on the fault probability
const DEFAULT_THRESHOLD: f64 = 0.5;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Exported parameters of a trained logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelParams {
    features: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

/// Logistic regression over named features
///
/// Features are matched by name, so the sample may carry extra columns
/// the model does not use.
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: HashMap<String, f64>,
    intercept: f64,
    threshold: f64,
}

impl LinearModel {
    /// Build a model from explicit parameters
    pub fn new(
        features: Vec<String>,
        weights: Vec<f64>,
        intercept: f64,
        threshold: f64,
    ) -> Result<Self, InferenceError> {
        Self::from_params(ModelParams {
            features,
            weights,
            intercept,
            threshold,
        })
    }

    /// Load exported parameters from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading model parameters from {}", path.display());

        let raw = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Parse exported parameters from a JSON document
    pub fn from_json(raw: &str) -> Result<Self, InferenceError> {
        let params: ModelParams = serde_json::from_str(raw)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        Self::from_params(params)
    }

    fn from_params(params: ModelParams) -> Result<Self, InferenceError> {
        if params.features.len() != params.weights.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "{} features but {} weights",
                params.features.len(),
                params.weights.len()
            )));
        }
        if !(0.0..=1.0).contains(&params.threshold) {
            return Err(InferenceError::ModelLoadError(format!(
                "threshold {} outside [0, 1]",
                params.threshold
            )));
        }

        let mut weights = HashMap::with_capacity(params.features.len());
        for (name, weight) in params.features.into_iter().zip(params.weights) {
            if weights.insert(name.clone(), weight).is_some() {
                return Err(InferenceError::ModelLoadError(format!(
                    "duplicate feature '{}'",
                    name
                )));
            }
        }

        info!(
            "Model ready: {} features, threshold {:.2}",
            weights.len(),
            params.threshold
        );

        Ok(Self {
            weights,
            intercept: params.intercept,
            threshold: params.threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn logit(&self, sample: &Sample) -> Result<f64, InferenceError> {
        let mut z = self.intercept;
        let mut matched = 0;

        for (name, value) in sample.iter() {
            let Some(weight) = self.weights.get(name) else {
                continue;
            };
            if !value.is_finite() {
                return Err(InferenceError::InferenceFailed(format!(
                    "non-finite value for feature '{}'",
                    name
                )));
            }
            z += weight * value;
            matched += 1;
        }

        if matched != self.weights.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} model features", self.weights.len()),
                actual: format!("{} present in sample", matched),
            });
        }

        Ok(z)
    }
}

impl Classifier for LinearModel {
    fn predict(&self, sample: &Sample) -> Result<FaultLabel, InferenceError> {
        let p = self.predict_probability(sample)?;
        Ok(if p >= self.threshold {
            FaultLabel::Fault
        } else {
            FaultLabel::Safe
        })
    }

    fn predict_probability(&self, sample: &Sample) -> Result<f64, InferenceError> {
        let z = self.logit(sample)?;
        let p = 1.0 / (1.0 + (-z).exp());
        debug!("logit={:.3} p={:.3}", z, p);
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sample_source::FeatureTable;

    const MODEL: &str = r#"{
        "features": ["brake_temp", "pad_wear"],
        "weights": [0.1, 2.0],
        "intercept": -10.0
    }"#;

    fn sample(columns: &[&str], values: &[f64]) -> Sample {
        FeatureTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            vec![values.to_vec()],
        )
        .unwrap()
        .sample(0)
        .unwrap()
    }

    #[test]
    fn test_normal_reading_is_safe() {
        let model = LinearModel::from_json(MODEL).unwrap();
        assert_eq!(model.threshold(), 0.5);

        let s = sample(&["brake_temp", "pad_wear"], &[40.0, 1.0]);
        let prediction = model.classify(&s).unwrap();
        assert_eq!(prediction.label, FaultLabel::Safe);
        assert!(prediction.probability < 0.05);
    }

    #[test]
    fn test_hot_worn_brakes_fault() {
        let model = LinearModel::from_json(MODEL).unwrap();
        let s = sample(&["pad_wear", "speed", "brake_temp"], &[4.0, 80.0, 90.0]);

        let prediction = model.classify(&s).unwrap();
        assert_eq!(prediction.label, FaultLabel::Fault);
        assert!(prediction.probability > 0.99);
    }

    #[test]
    fn test_missing_feature_is_shape_error() {
        let model = LinearModel::from_json(MODEL).unwrap();
        let s = sample(&["brake_temp"], &[40.0]);
        assert!(matches!(
            model.predict(&s),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_nan_input_rejected() {
        let model = LinearModel::from_json(MODEL).unwrap();
        let s = sample(&["brake_temp", "pad_wear"], &[f64::NAN, 1.0]);
        assert!(matches!(
            model.predict_probability(&s),
            Err(InferenceError::InferenceFailed(_))
        ));
    }

    #[test]
    fn test_weight_count_mismatch() {
        let result = LinearModel::new(vec!["a".into(), "b".into()], vec![1.0], 0.0, 0.5);
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let result = LinearModel::new(vec!["a".into(), "a".into()], vec![1.0, 2.0], 0.0, 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(LinearModel::from_json("{\"features\": [").is_err());
    }

    proptest! {
        #[test]
        fn prop_probability_in_unit_interval(temp in -1e3f64..1e3, wear in -1e3f64..1e3) {
            let model = LinearModel::from_json(MODEL).unwrap();
            let p = model
                .predict_probability(&sample(&["brake_temp", "pad_wear"], &[temp, wear]))
                .unwrap();
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
