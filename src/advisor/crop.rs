//! Crop Recommendation
//!
//! Ranks candidate crops for a soil/climate sample. With an injected
//! classifier the top five classes by probability are returned; without one
//! a declarative threshold rule table produces the candidates. Both paths
//! attach static profile metadata and express confidence on a 0–100 scale
//! rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::advisor::model::{CropFeatures, CropModel};
use crate::advisor::profiles::{profile_for, CropProfile};
use crate::error::AdvisorError;

/// Maximum number of recommendations returned by either path.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Soil and climate measurements for crop recommendation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoilClimateSample {
    /// Soil nitrogen content (kg/ha)
    pub nitrogen: f64,
    /// Soil phosphorus content (kg/ha)
    pub phosphorus: f64,
    /// Soil potassium content (kg/ha)
    pub potassium: f64,
    /// Average temperature (°C)
    pub temperature: f64,
    /// Average relative humidity (%)
    pub humidity: f64,
    /// Soil pH level
    pub ph: f64,
    /// Average rainfall (mm)
    pub rainfall: f64,
}

impl SoilClimateSample {
    /// Range-check every field. Enforced at the HTTP boundary before the
    /// engine runs.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        check_range("nitrogen", self.nitrogen, 0.0, 200.0)?;
        check_range("phosphorus", self.phosphorus, 0.0, 200.0)?;
        check_range("potassium", self.potassium, 0.0, 200.0)?;
        check_range("temperature", self.temperature, -10.0, 60.0)?;
        check_range("humidity", self.humidity, 0.0, 100.0)?;
        check_range("ph", self.ph, 0.0, 14.0)?;
        check_range("rainfall", self.rainfall, 0.0, 500.0)?;
        Ok(())
    }

    pub fn features(&self) -> CropFeatures {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), AdvisorError> {
    if !value.is_finite() || value < min || value > max {
        return Err(AdvisorError::invalid(format!(
            "{} must be within [{}, {}], got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// One ranked crop recommendation with profile metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CropRecommendation {
    pub crop: String,
    /// 0–100, two decimals
    pub confidence: f64,
    pub description: &'static str,
    pub season: &'static str,
    pub water_requirement: &'static str,
}

impl CropRecommendation {
    fn from_score(crop: &str, probability: f64) -> Self {
        let profile: &CropProfile = profile_for(crop);
        CropRecommendation {
            crop: capitalize(crop),
            confidence: round2(probability * 100.0),
            description: profile.description,
            season: profile.season,
            water_requirement: profile.water_requirement,
        }
    }
}

// ============================================================================
// Fallback rule table
// ============================================================================

/// One threshold rule of the fallback path. Rules are independent: every
/// matching rule contributes a candidate, and the final ranking is decided
/// purely by confidence (stable sort preserves table order on ties).
pub struct CropRule {
    pub crop: &'static str,
    pub confidence: f64,
    pub matches: fn(&SoilClimateSample) -> bool,
}

/// Threshold rules evaluated when no classifier is configured.
pub static FALLBACK_RULES: &[CropRule] = &[
    CropRule {
        crop: "rice",
        confidence: 0.90,
        matches: |s| s.humidity > 70.0 && s.rainfall > 150.0 && s.temperature > 20.0,
    },
    CropRule {
        crop: "wheat",
        confidence: 0.88,
        matches: |s| (15.0..=30.0).contains(&s.temperature) && s.humidity < 70.0 && s.rainfall < 150.0,
    },
    CropRule {
        crop: "maize",
        confidence: 0.82,
        matches: |s| (18.0..=35.0).contains(&s.temperature) && s.ph >= 5.5,
    },
    CropRule {
        crop: "cotton",
        confidence: 0.78,
        matches: |s| s.temperature > 25.0 && s.potassium > 30.0,
    },
    CropRule {
        crop: "chickpea",
        confidence: 0.80,
        matches: |s| s.temperature < 30.0 && s.rainfall < 100.0 && s.nitrogen < 80.0,
    },
    CropRule {
        crop: "banana",
        confidence: 0.77,
        matches: |s| s.temperature > 25.0 && s.rainfall > 120.0 && s.nitrogen > 80.0,
    },
    CropRule {
        crop: "mango",
        confidence: 0.76,
        matches: |s| s.temperature > 24.0 && (5.5..=7.5).contains(&s.ph),
    },
    CropRule {
        crop: "lentil",
        confidence: 0.75,
        matches: |s| s.temperature < 28.0 && s.rainfall < 100.0,
    },
    CropRule {
        crop: "coconut",
        confidence: 0.74,
        matches: |s| s.temperature > 27.0 && s.humidity > 70.0 && s.rainfall > 150.0,
    },
    CropRule {
        crop: "pomegranate",
        confidence: 0.73,
        matches: |s| s.temperature > 25.0 && s.rainfall < 80.0,
    },
];

/// Returned when no rule fires, in this exact order.
static DEFAULT_CANDIDATES: &[(&str, f64)] = &[("rice", 0.60), ("wheat", 0.55), ("maize", 0.50)];

/// Evaluate the fallback rule table and rank the fired candidates.
pub fn rule_based_recommendations(sample: &SoilClimateSample) -> Vec<CropRecommendation> {
    let mut candidates: Vec<(&str, f64)> = FALLBACK_RULES
        .iter()
        .filter(|rule| (rule.matches)(sample))
        .map(|rule| (rule.crop, rule.confidence))
        .collect();

    // Stable sort: ties keep table order
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    if candidates.is_empty() {
        candidates = DEFAULT_CANDIDATES.to_vec();
    }

    candidates
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(crop, confidence)| CropRecommendation::from_score(crop, confidence))
        .collect()
}

/// Rank the top classes of an injected classifier.
pub fn model_recommendations(
    model: &dyn CropModel,
    sample: &SoilClimateSample,
) -> Result<Vec<CropRecommendation>, AdvisorError> {
    let mut scored = model.predict_proba(&sample.features())?;
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(label, probability)| CropRecommendation::from_score(&label.to_lowercase(), probability))
        .collect())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
