use super::criteria::CriteriaAggregator;
use super::domain::{ScoringRequest, ValidationError};
use super::features;
use super::fusion::{self, FusedScore};
use super::survival::{SurvivalModel, SurvivalModelMetadata};

/// Stateless scoring pipeline: validate, extract features, run both models,
/// fuse. Owns no shared state and is cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    survival: SurvivalModel,
    criteria: CriteriaAggregator,
}

impl ScoringEngine {
    pub fn new(survival: SurvivalModel, criteria: CriteriaAggregator) -> Self {
        Self { survival, criteria }
    }

    pub fn score(&self, request: &ScoringRequest) -> Result<FusedScore, ScoringError> {
        request.validate()?;

        let features = features::extract(request);
        let survival = self.survival.estimate(&features);
        let criteria = self.criteria.evaluate(request);
        let fused = fusion::fuse(request, survival, criteria);

        // Exponentiation of an extreme linear predictor can overflow to
        // infinity; surface that instead of persisting a garbage score.
        if !fused.survival.hazard_ratio.is_finite() || !fused.overall_score.is_finite() {
            return Err(ScoringError::Computation(
                "non-finite intermediate value".to_string(),
            ));
        }

        Ok(fused)
    }

    pub fn model_metadata(&self) -> SurvivalModelMetadata {
        self.survival.metadata()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid scoring request: {0}")]
    Validation(#[from] ValidationError),
    #[error("scoring failed: {0}")]
    Computation(String),
}
