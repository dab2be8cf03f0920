use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::confidence;
use super::domain::RiskLevel;
use super::features::FeatureVector;

/// Proportional-hazards coefficients, fitted offline on historical graft
/// outcomes. Feature names match the extractor's output.
const MODEL_COEFFICIENTS: [(&str, f64); 14] = [
    ("age_difference", -0.02),
    ("hla_mismatches", -0.15),
    ("donor_age", -0.01),
    ("recipient_age", -0.008),
    ("donor_bmi", -0.05),
    ("recipient_bmi", -0.03),
    ("blood_type_mismatch", -0.3),
    ("geographic_distance", -0.001),
    ("time_on_dialysis", -0.02),
    ("previous_transplant", -0.25),
    ("crossmatch_positive", -0.8),
    ("donor_gender_male", 0.1),
    ("recipient_gender_male", 0.05),
    ("urgent_status", -0.2),
];

/// Baseline graft survival probabilities at the four reported horizons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalCurve {
    #[serde(rename = "1_year")]
    pub one_year: f64,
    #[serde(rename = "3_year")]
    pub three_year: f64,
    #[serde(rename = "5_year")]
    pub five_year: f64,
    #[serde(rename = "10_year")]
    pub ten_year: f64,
}

/// Graft survival estimate for one pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalResult {
    pub linear_predictor: f64,
    pub hazard_ratio: f64,
    pub survival: SurvivalCurve,
    pub risk: RiskLevel,
    pub confidence: f64,
}

impl SurvivalResult {
    /// The primary survival figure is the five-year horizon.
    pub fn survival_probability(&self) -> f64 {
        self.survival.five_year
    }
}

/// Static descriptive metrics for the fixed coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurvivalModelMetadata {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc_roc: f64,
    pub concordance_index: f64,
    pub version: &'static str,
}

/// Linear risk model over the fixed coefficient table. Read-only after
/// construction; safe to share across concurrent scoring calls.
#[derive(Debug, Clone)]
pub struct SurvivalModel {
    coefficients: BTreeMap<&'static str, f64>,
    baseline: SurvivalCurve,
}

impl Default for SurvivalModel {
    fn default() -> Self {
        Self {
            coefficients: MODEL_COEFFICIENTS.into_iter().collect(),
            baseline: SurvivalCurve {
                one_year: 0.95,
                three_year: 0.85,
                five_year: 0.75,
                ten_year: 0.60,
            },
        }
    }
}

impl SurvivalModel {
    pub fn estimate(&self, features: &FeatureVector) -> SurvivalResult {
        let linear_predictor = self.linear_predictor(features);
        let hazard_ratio = linear_predictor.exp();

        let survival = SurvivalCurve {
            one_year: adjust(self.baseline.one_year, hazard_ratio),
            three_year: adjust(self.baseline.three_year, hazard_ratio),
            five_year: adjust(self.baseline.five_year, hazard_ratio),
            ten_year: adjust(self.baseline.ten_year, hazard_ratio),
        };

        let risk = assess_risk(hazard_ratio, survival.five_year);
        let confidence = confidence::survival_confidence(self.completeness(features));

        SurvivalResult {
            linear_predictor,
            hazard_ratio,
            survival,
            risk,
            confidence,
        }
    }

    /// Features without a coefficient and coefficients without a feature are
    /// both silently ignored.
    fn linear_predictor(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .filter_map(|(name, coefficient)| features.value(name).map(|value| coefficient * value))
            .sum()
    }

    /// Fraction of coefficient-table features backed by a caller-supplied
    /// (non-defaulted) value.
    fn completeness(&self, features: &FeatureVector) -> f64 {
        let observed = self
            .coefficients
            .keys()
            .filter(|name| features.value(name).is_some() && !features.was_defaulted(name))
            .count();
        observed as f64 / self.coefficients.len() as f64
    }

    pub fn metadata(&self) -> SurvivalModelMetadata {
        SurvivalModelMetadata {
            accuracy: 0.85,
            precision: 0.83,
            recall: 0.87,
            f1_score: 0.85,
            auc_roc: 0.88,
            concordance_index: 0.82,
            version: "1.0.0",
        }
    }
}

fn adjust(baseline: f64, hazard_ratio: f64) -> f64 {
    baseline.powf(hazard_ratio).clamp(0.0, 1.0)
}

/// First matching rule wins: hazard ratio dominates, then the five-year
/// survival floor.
fn assess_risk(hazard_ratio: f64, five_year_survival: f64) -> RiskLevel {
    if hazard_ratio > 2.0 || five_year_survival < 0.5 {
        RiskLevel::HighRisk
    } else if hazard_ratio > 1.5 || five_year_survival < 0.7 {
        RiskLevel::ModerateRisk
    } else {
        RiskLevel::LowRisk
    }
}
