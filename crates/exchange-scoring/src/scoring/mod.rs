//! Donor/recipient compatibility scoring.
//!
//! Two independent models feed a fused result: a proportional-hazards
//! survival estimate over extracted clinical features, and a weighted
//! multi-criteria aggregation over rule-based sub-scores. The
//! [`CompatibilityService`] wraps the engine with caching, persistence and
//! event publication; [`scoring_router`] exposes it over HTTP.

pub(crate) mod confidence;
pub mod criteria;
pub mod domain;
pub mod engine;
pub mod features;
pub mod fusion;
pub mod geo;
pub mod listener;
pub mod repository;
pub mod router;
pub mod service;
pub mod survival;

#[cfg(test)]
mod tests;

pub use criteria::{normalize_weights, CriteriaAggregator, CriteriaResult};
pub use domain::{
    ClinicalContext, CompatibilityLevel, Criterion, GeoPoint, ParticipantProfile, Party,
    Recommendation, RiskLevel, ScoringMethod, ScoringRequest, Sex, UrgencyLevel, ValidationError,
};
pub use engine::{ScoringEngine, ScoringError};
pub use features::FeatureVector;
pub use fusion::FusedScore;
pub use repository::{
    PublishError, RepositoryError, ScoreEvent, ScoreEventPublisher, ScoreRecord, ScoreRepository,
    ALGORITHM_VERSION, SCORE_TOPIC,
};
pub use router::scoring_router;
pub use service::{
    CompatibilityService, McdaPerformance, ModelPerformanceReport, ScoringServiceError,
    ScoringStatistics,
};
pub use survival::{SurvivalCurve, SurvivalModel, SurvivalModelMetadata, SurvivalResult};
