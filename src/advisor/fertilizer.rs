//! Fertilizer Advisory
//!
//! Compares a nutrient sample against the crop's optimal NPK band and emits
//! excess/deficient advisories per nutrient, or a single maintenance
//! advisory when everything is in range. The rule block is always computed;
//! an injected model only adds a raw label prediction on top.

use serde::{Deserialize, Serialize};

use crate::advisor::crop::check_range;
use crate::advisor::model::{FertilizerFeatures, FertilizerModel};
use crate::advisor::profiles::{
    self, encode_soil_type, npk_optimal_for, FertilizerAdvisory, NpkOptimal,
};
use crate::error::AdvisorError;

/// Soil nutrient measurements plus crop/soil context.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NutrientSample {
    /// Current soil nitrogen (kg/ha)
    pub nitrogen: f64,
    /// Current soil phosphorus (kg/ha)
    pub phosphorus: f64,
    /// Current soil potassium (kg/ha)
    pub potassium: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Humidity (%)
    pub humidity: f64,
    /// Soil moisture (%)
    pub moisture: f64,
    /// Soil type (e.g. Loam, Clay, Sandy)
    pub soil_type: String,
    /// Target crop name
    pub crop_type: String,
}

impl NutrientSample {
    pub fn validate(&self) -> Result<(), AdvisorError> {
        check_range("nitrogen", self.nitrogen, 0.0, 200.0)?;
        check_range("phosphorus", self.phosphorus, 0.0, 200.0)?;
        check_range("potassium", self.potassium, 0.0, 200.0)?;
        check_range("temperature", self.temperature, -10.0, 60.0)?;
        check_range("humidity", self.humidity, 0.0, 100.0)?;
        check_range("moisture", self.moisture, 0.0, 100.0)?;
        if self.soil_type.trim().is_empty() {
            return Err(AdvisorError::invalid("soil_type must not be empty"));
        }
        if self.crop_type.trim().is_empty() {
            return Err(AdvisorError::invalid("crop_type must not be empty"));
        }
        Ok(())
    }

    pub fn features(&self) -> FertilizerFeatures {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.moisture,
            encode_soil_type(&self.soil_type) as f64,
        ]
    }
}

/// Current NPK levels echoed back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct NpkLevels {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Optimal NPK bands echoed back as `[min, max]` pairs.
#[derive(Debug, Clone, Serialize)]
pub struct NpkRanges {
    pub nitrogen: [f64; 2],
    pub phosphorus: [f64; 2],
    pub potassium: [f64; 2],
}

impl From<NpkOptimal> for NpkRanges {
    fn from(optimal: NpkOptimal) -> Self {
        NpkRanges {
            nitrogen: [optimal.nitrogen.0, optimal.nitrogen.1],
            phosphorus: [optimal.phosphorus.0, optimal.phosphorus.1],
            potassium: [optimal.potassium.0, optimal.potassium.1],
        }
    }
}

/// Rule-based fertilizer advice for one sample.
#[derive(Debug, Clone, Serialize)]
pub struct FertilizerAdvice {
    pub crop: String,
    pub soil_type: String,
    pub current_npk: NpkLevels,
    pub optimal_npk: NpkRanges,
    pub recommendations: Vec<&'static FertilizerAdvisory>,
}

/// Evaluate the tiered NPK rules for a sample. Always succeeds; the tables
/// carry defaults for unknown crops.
pub fn rule_based_advice(sample: &NutrientSample) -> FertilizerAdvice {
    let optimal = npk_optimal_for(&sample.crop_type);

    let mut recommendations: Vec<&'static FertilizerAdvisory> = Vec::new();

    // Each nutrient is judged independently against its band
    if sample.nitrogen > optimal.nitrogen.1 {
        recommendations.push(&profiles::HIGH_N);
    } else if sample.nitrogen < optimal.nitrogen.0 {
        recommendations.push(&profiles::LOW_N);
    }

    if sample.phosphorus > optimal.phosphorus.1 {
        recommendations.push(&profiles::HIGH_P);
    } else if sample.phosphorus < optimal.phosphorus.0 {
        recommendations.push(&profiles::LOW_P);
    }

    if sample.potassium > optimal.potassium.1 {
        recommendations.push(&profiles::HIGH_K);
    } else if sample.potassium < optimal.potassium.0 {
        recommendations.push(&profiles::LOW_K);
    }

    if recommendations.is_empty() {
        recommendations.push(&profiles::MAINTAIN);
    }

    FertilizerAdvice {
        crop: sample.crop_type.clone(),
        soil_type: sample.soil_type.clone(),
        current_npk: NpkLevels {
            nitrogen: sample.nitrogen,
            phosphorus: sample.phosphorus,
            potassium: sample.potassium,
        },
        optimal_npk: optimal.into(),
        recommendations,
    }
}

/// Raw label from an injected fertilizer model. The caller pairs this with
/// the always-computed rule block.
pub fn model_prediction(
    model: &dyn FertilizerModel,
    sample: &NutrientSample,
) -> Result<String, AdvisorError> {
    Ok(model.predict(&sample.features())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::profiles::AdvisoryAction;

    fn rice_sample(n: f64, p: f64, k: f64) -> NutrientSample {
        NutrientSample {
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            temperature: 28.0,
            humidity: 65.0,
            moisture: 40.0,
            soil_type: "Loam".to_string(),
            crop_type: "rice".to_string(),
        }
    }

    #[test]
    fn test_excess_nitrogen_for_rice() {
        // Rice band is (60, 120); 140 is above it
        let advice = rule_based_advice(&rice_sample(140.0, 45.0, 45.0));

        let descriptions: Vec<&str> = advice
            .recommendations
            .iter()
            .map(|r| r.description)
            .collect();
        assert!(descriptions.iter().any(|d| d.contains("excess nitrogen")));
        assert!(!descriptions.iter().any(|d| d.contains("nitrogen is deficient")));
        assert_eq!(advice.recommendations[0].action, AdvisoryAction::Reduce);
    }

    #[test]
    fn test_all_in_range_yields_single_maintain_entry() {
        let advice = rule_based_advice(&rice_sample(90.0, 45.0, 45.0));
        assert_eq!(advice.recommendations.len(), 1);
        assert_eq!(advice.recommendations[0].action, AdvisoryAction::Maintain);
    }

    #[test]
    fn test_each_nutrient_judged_independently() {
        // N above (60,120), P below (30,60), K inside (30,60)
        let advice = rule_based_advice(&rice_sample(130.0, 10.0, 45.0));
        let actions: Vec<AdvisoryAction> = advice
            .recommendations
            .iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(actions, vec![AdvisoryAction::Reduce, AdvisoryAction::Add]);
        assert!(advice.recommendations[1].description.contains("phosphorus is deficient"));
    }

    #[test]
    fn test_crop_key_is_case_insensitive_and_trimmed() {
        let mut sample = rice_sample(140.0, 45.0, 45.0);
        sample.crop_type = " Rice ".to_string();
        let advice = rule_based_advice(&sample);

        // Same band as plain "rice"
        assert_eq!(advice.optimal_npk.nitrogen, [60.0, 120.0]);
        assert!(advice.recommendations[0].description.contains("excess nitrogen"));
        // Input string is echoed untouched
        assert_eq!(advice.crop, " Rice ");
    }

    #[test]
    fn test_unknown_crop_uses_default_band() {
        let mut sample = rice_sample(110.0, 45.0, 45.0);
        sample.crop_type = "quinoa".to_string();
        let advice = rule_based_advice(&sample);

        // Default nitrogen band is (60, 100), so 110 is excess
        assert_eq!(advice.optimal_npk.nitrogen, [60.0, 100.0]);
        assert!(advice.recommendations[0].description.contains("excess nitrogen"));
    }

    #[test]
    fn test_rule_based_advice_is_deterministic() {
        let sample = rice_sample(140.0, 10.0, 45.0);
        let a = serde_json::to_string(&rule_based_advice(&sample)).unwrap();
        let b = serde_json::to_string(&rule_based_advice(&sample)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_feature_vector_encodes_soil_type() {
        let mut sample = rice_sample(90.0, 45.0, 45.0);
        sample.soil_type = "Black Soil".to_string();
        let features = sample.features();
        assert_eq!(features[6], 7.0);

        sample.soil_type = "unknown dirt".to_string();
        assert_eq!(sample.features()[6], 0.0);
    }

    #[test]
    fn test_model_prediction_runs_alongside_rules() {
        use crate::advisor::model::fakes::FixedFertilizerModel;

        let model = FixedFertilizerModel {
            label: "Urea".to_string(),
        };
        let sample = rice_sample(140.0, 45.0, 45.0);

        let label = model_prediction(&model, &sample).unwrap();
        assert_eq!(label, "Urea");

        // The rule block is computed regardless of model availability
        let advice = rule_based_advice(&sample);
        assert!(!advice.recommendations.is_empty());
    }

    #[test]
    fn test_validation_rejects_blank_crop() {
        let mut sample = rice_sample(90.0, 45.0, 45.0);
        sample.crop_type = "   ".to_string();
        assert!(sample.validate().is_err());

        let mut sample = rice_sample(90.0, 45.0, 45.0);
        sample.moisture = 150.0;
        assert!(sample.validate().is_err());
    }
}
