use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{Recommendation, RiskLevel};
use super::fusion::FusedScore;

/// Version stamp persisted with every record so historical scores can be
/// distinguished after a coefficient update.
pub const ALGORITHM_VERSION: &str = "1.0.0";

/// A fused score plus persistence metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: FusedScore,
    pub algorithm_version: String,
    pub scored_at: DateTime<Utc>,
}

/// Storage for computed scores, keyed by the (donor pair, recipient pair)
/// combination. Implementations must be safe to share across handlers.
pub trait ScoreRepository: Send + Sync {
    fn insert(&self, record: ScoreRecord) -> Result<(), RepositoryError>;
    fn find_by_pair(
        &self,
        donor_pair_id: Uuid,
        recipient_pair_id: Uuid,
    ) -> Result<Option<ScoreRecord>, RepositoryError>;
    fn find_by_donor(&self, donor_pair_id: Uuid) -> Result<Vec<ScoreRecord>, RepositoryError>;
    fn find_by_recipient(
        &self,
        recipient_pair_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, RepositoryError>;
    fn count(&self) -> Result<u64, RepositoryError>;
    fn count_by_method(
        &self,
        method: super::domain::ScoringMethod,
    ) -> Result<u64, RepositoryError>;
    fn count_since(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("a score for this pairing already exists")]
    Conflict,
    #[error("no score found for this pairing")]
    NotFound,
    #[error("score store unavailable: {0}")]
    Unavailable(String),
}

/// Topic carrying score notifications to downstream matching services.
pub const SCORE_TOPIC: &str = "score.calculated";

/// Compact notification emitted after each newly computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub donor_pair_id: Uuid,
    pub recipient_pair_id: Uuid,
    pub overall_score: f64,
    pub confidence_level: f64,
    pub risk: RiskLevel,
    pub recommendation: Recommendation,
    pub scored_at: DateTime<Utc>,
}

impl ScoreEvent {
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            donor_pair_id: record.score.donor_pair_id,
            recipient_pair_id: record.score.recipient_pair_id,
            overall_score: record.score.overall_score,
            confidence_level: record.score.confidence_level,
            risk: record.score.risk,
            recommendation: record.score.recommendation,
            scored_at: record.scored_at,
        }
    }
}

/// Outbound notification channel. Publishing is best-effort from the
/// service's perspective; failures are logged, not propagated.
pub trait ScoreEventPublisher: Send + Sync {
    fn publish(&self, event: ScoreEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("event transport failed: {0}")]
    Transport(String),
}
