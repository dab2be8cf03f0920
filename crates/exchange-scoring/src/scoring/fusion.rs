use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::criteria::CriteriaResult;
use super::domain::{CompatibilityLevel, Recommendation, RiskLevel, ScoringMethod, ScoringRequest};
use super::survival::SurvivalResult;

/// Weighting of the two sub-scores under the hybrid method.
const HYBRID_SURVIVAL_WEIGHT: f64 = 0.6;
const HYBRID_CRITERIA_WEIGHT: f64 = 0.4;

/// The fused scoring outcome for one pairing, carrying both sub-results so
/// callers can drill into either model's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedScore {
    pub donor_pair_id: Uuid,
    pub recipient_pair_id: Uuid,
    pub method: ScoringMethod,
    pub overall_score: f64,
    pub confidence_level: f64,
    pub risk: RiskLevel,
    pub compatibility: CompatibilityLevel,
    pub recommendation: Recommendation,
    pub survival: SurvivalResult,
    pub criteria: CriteriaResult,
}

/// Combine the survival estimate and the criteria score into one result.
pub fn fuse(
    request: &ScoringRequest,
    survival: SurvivalResult,
    criteria: CriteriaResult,
) -> FusedScore {
    let overall = overall_score(
        request.method,
        survival.survival_probability(),
        criteria.score,
    );
    let confidence_level = (survival.confidence + criteria.confidence) / 2.0;
    let recommendation = recommend(overall, survival.risk);

    FusedScore {
        donor_pair_id: request.donor_pair_id,
        recipient_pair_id: request.recipient_pair_id,
        method: request.method,
        overall_score: overall,
        confidence_level,
        risk: survival.risk,
        compatibility: criteria.compatibility,
        recommendation,
        survival,
        criteria,
    }
}

pub fn overall_score(method: ScoringMethod, survival: f64, criteria: f64) -> f64 {
    match method {
        ScoringMethod::Survival => survival,
        ScoringMethod::Criteria => criteria,
        ScoringMethod::Hybrid => {
            HYBRID_SURVIVAL_WEIGHT * survival + HYBRID_CRITERIA_WEIGHT * criteria
        }
    }
}

/// Recommendation tiers gate on the overall score and are vetoed by the
/// survival risk: a high-risk pairing never reaches the top two tiers.
pub fn recommend(overall_score: f64, risk: RiskLevel) -> Recommendation {
    if overall_score >= 0.8 && risk == RiskLevel::LowRisk {
        Recommendation::StronglyRecommended
    } else if overall_score >= 0.6 && risk != RiskLevel::HighRisk {
        Recommendation::Recommended
    } else if overall_score >= 0.4 {
        Recommendation::ConsiderWithCaution
    } else {
        Recommendation::NotRecommended
    }
}
