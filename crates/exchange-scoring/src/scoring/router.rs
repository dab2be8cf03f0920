use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use super::domain::ScoringRequest;
use super::engine::ScoringError;
use super::repository::{RepositoryError, ScoreEventPublisher, ScoreRepository};
use super::service::{CompatibilityService, ScoringServiceError};

/// HTTP surface of the scoring service, mounted under `/api/v1/scoring`.
pub fn scoring_router<R, P>(service: Arc<CompatibilityService<R, P>>) -> Router
where
    R: ScoreRepository + 'static,
    P: ScoreEventPublisher + 'static,
{
    Router::new()
        .route("/api/v1/scoring/calculate", post(calculate::<R, P>))
        .route(
            "/api/v1/scoring/calculate-batch",
            post(calculate_batch::<R, P>),
        )
        .route(
            "/api/v1/scoring/cached/:donor_pair_id/:recipient_pair_id",
            get(cached::<R, P>),
        )
        .route("/api/v1/scoring/donor/:donor_pair_id", get(by_donor::<R, P>))
        .route(
            "/api/v1/scoring/recipient/:recipient_pair_id",
            get(by_recipient::<R, P>),
        )
        .route("/api/v1/scoring/statistics", get(statistics::<R, P>))
        .route(
            "/api/v1/scoring/model-performance",
            get(model_performance::<R, P>),
        )
        .route("/api/v1/scoring/info", get(service_info))
        .with_state(service)
}

pub(crate) async fn calculate<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
    Json(request): Json<ScoringRequest>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.score_pair(&request) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn calculate_batch<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
    Json(requests): Json<Vec<ScoringRequest>>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.score_batch(&requests) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn cached<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
    Path((donor_pair_id, recipient_pair_id)): Path<(Uuid, Uuid)>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.cached(donor_pair_id, recipient_pair_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(ScoringServiceError::Repository(RepositoryError::NotFound)),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_donor<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
    Path(donor_pair_id): Path<Uuid>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.scores_by_donor(donor_pair_id) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_recipient<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
    Path(recipient_pair_id): Path<Uuid>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.scores_by_recipient(recipient_pair_id) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn statistics<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    match service.statistics() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn model_performance<R, P>(
    State(service): State<Arc<CompatibilityService<R, P>>>,
) -> Response
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    (StatusCode::OK, Json(service.model_performance())).into_response()
}

pub(crate) async fn service_info() -> Response {
    let info = json!({
        "service_name": "Exchange Scoring Service",
        "version": super::repository::ALGORITHM_VERSION,
        "description": "Compatibility scoring for paired kidney exchange matching",
        "algorithms": [
            "Proportional-hazards survival estimation",
            "Multi-criteria decision analysis",
        ],
        "supported_methods": ["SURVIVAL", "CRITERIA", "HYBRID"],
        "features": [
            "Survival probability prediction",
            "Multi-criteria compatibility scoring",
            "Batch processing support",
            "Registration event scoring",
            "Score caching",
        ],
        "endpoints": [
            "POST /api/v1/scoring/calculate",
            "POST /api/v1/scoring/calculate-batch",
            "GET /api/v1/scoring/cached/:donor_pair_id/:recipient_pair_id",
            "GET /api/v1/scoring/donor/:donor_pair_id",
            "GET /api/v1/scoring/recipient/:recipient_pair_id",
            "GET /api/v1/scoring/statistics",
            "GET /api/v1/scoring/model-performance",
            "GET /api/v1/scoring/info",
        ],
    });
    (StatusCode::OK, Json(info)).into_response()
}

fn error_response(err: ScoringServiceError) -> Response {
    let status = match &err {
        ScoringServiceError::Scoring(ScoringError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScoringServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
