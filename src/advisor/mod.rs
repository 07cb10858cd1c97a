//! Advisory Engine
//!
//! Local, explainable crop and fertilizer recommendations. The engine is a
//! pure function of its inputs and static reference tables; the only shared
//! state is the pair of optional model handles fixed at construction, so
//! concurrent callers need no synchronization.

pub mod crop;
pub mod fertilizer;
pub mod model;
pub mod profiles;

use std::sync::Arc;

pub use crop::{CropRecommendation, SoilClimateSample, MAX_RECOMMENDATIONS};
pub use fertilizer::{FertilizerAdvice, NutrientSample};
pub use model::{CropModel, FertilizerModel, ModelError};
pub use profiles::{AdvisoryAction, CropProfile, FertilizerAdvisory};

use crate::error::AdvisorError;

/// Result of the fertilizer path: the rule block, plus a raw model label
/// when a model is configured.
#[derive(Debug)]
pub struct FertilizerOutcome {
    pub prediction: Option<String>,
    pub advice: FertilizerAdvice,
}

/// Crop and fertilizer recommendation engine with optional injected models.
///
/// Construct once at startup and share via `Arc`; model handles are fixed at
/// construction (no lazy module-level loading).
pub struct AdvisoryEngine {
    crop_model: Option<Arc<dyn CropModel>>,
    fertilizer_model: Option<Arc<dyn FertilizerModel>>,
}

impl AdvisoryEngine {
    /// Engine with no trained models: both paths use their rule fallbacks.
    pub fn new() -> Self {
        AdvisoryEngine {
            crop_model: None,
            fertilizer_model: None,
        }
    }

    pub fn with_models(
        crop_model: Option<Arc<dyn CropModel>>,
        fertilizer_model: Option<Arc<dyn FertilizerModel>>,
    ) -> Self {
        AdvisoryEngine {
            crop_model,
            fertilizer_model,
        }
    }

    pub fn has_crop_model(&self) -> bool {
        self.crop_model.is_some()
    }

    pub fn has_fertilizer_model(&self) -> bool {
        self.fertilizer_model.is_some()
    }

    /// Ranked crop recommendations for a validated sample.
    ///
    /// Delegates to the injected classifier when present; a model error
    /// surfaces as `PredictionFailed` rather than degrading to rules.
    pub fn recommend_crop(
        &self,
        sample: &SoilClimateSample,
    ) -> Result<Vec<CropRecommendation>, AdvisorError> {
        match &self.crop_model {
            Some(model) => crop::model_recommendations(model.as_ref(), sample),
            None => {
                tracing::debug!("no crop model configured, using rule fallback");
                Ok(crop::rule_based_recommendations(sample))
            }
        }
    }

    /// Fertilizer advice for a validated sample. The rule block is always
    /// computed; a configured model adds a raw label on top.
    pub fn recommend_fertilizer(
        &self,
        sample: &NutrientSample,
    ) -> Result<FertilizerOutcome, AdvisorError> {
        let prediction = match &self.fertilizer_model {
            Some(model) => Some(fertilizer::model_prediction(model.as_ref(), sample)?),
            None => None,
        };

        Ok(FertilizerOutcome {
            prediction,
            advice: fertilizer::rule_based_advice(sample),
        })
    }
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self::new()
    }
}
