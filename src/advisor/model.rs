//! Injected Predictive Model Capability
//!
//! The advisory engine optionally delegates to trained models supplied at
//! construction. Absence of a model is a normal configuration (the engine
//! uses its rule fallback); a model that errors during scoring surfaces
//! [`AdvisorError::PredictionFailed`] and is never papered over by rules.

use std::fmt;

use crate::error::AdvisorError;

/// Feature vector for crop recommendation:
/// `[nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall]`.
pub type CropFeatures = [f64; 7];

/// Feature vector for fertilizer prediction:
/// `[nitrogen, phosphorus, potassium, temperature, humidity, moisture, soil_idx]`.
pub type FertilizerFeatures = [f64; 7];

/// A trained crop classifier exposing per-class probabilities.
pub trait CropModel: Send + Sync {
    /// Score the features and return `(class_label, probability)` pairs.
    /// Order is up to the model; the engine ranks by probability.
    fn predict_proba(&self, features: &CropFeatures) -> Result<Vec<(String, f64)>, ModelError>;
}

/// A trained fertilizer model producing a single raw label.
pub trait FertilizerModel: Send + Sync {
    fn predict(&self, features: &FertilizerFeatures) -> Result<String, ModelError>;
}

/// Failure raised inside an injected model during scoring.
#[derive(Debug, Clone)]
pub struct ModelError(pub String);

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for AdvisorError {
    fn from(err: ModelError) -> Self {
        AdvisorError::PredictionFailed(err.0)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Deterministic stand-ins for trained models, used across the advisor
    //! unit tests.

    use super::*;

    /// Returns a fixed probability table regardless of input.
    pub struct FixedCropModel {
        pub classes: Vec<(String, f64)>,
    }

    impl CropModel for FixedCropModel {
        fn predict_proba(&self, _features: &CropFeatures) -> Result<Vec<(String, f64)>, ModelError> {
            Ok(self.classes.clone())
        }
    }

    /// Always fails, for PredictionFailed propagation tests.
    pub struct FailingCropModel;

    impl CropModel for FailingCropModel {
        fn predict_proba(&self, _features: &CropFeatures) -> Result<Vec<(String, f64)>, ModelError> {
            Err(ModelError("matrix shape mismatch".to_string()))
        }
    }

    /// Returns a fixed label regardless of input.
    pub struct FixedFertilizerModel {
        pub label: String,
    }

    impl FertilizerModel for FixedFertilizerModel {
        fn predict(&self, _features: &FertilizerFeatures) -> Result<String, ModelError> {
            Ok(self.label.clone())
        }
    }
}
