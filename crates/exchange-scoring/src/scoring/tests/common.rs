use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::scoring::domain::{
    ClinicalContext, GeoPoint, ParticipantProfile, ScoringMethod, ScoringRequest, Sex,
};
use crate::scoring::repository::{
    PublishError, RepositoryError, ScoreEvent, ScoreEventPublisher, ScoreRecord, ScoreRepository,
};
use crate::scoring::{scoring_router, CompatibilityService, ScoringEngine};

pub(super) fn donor_pair_id() -> Uuid {
    Uuid::parse_str("6f1c2a34-9d6b-4f6e-8e2a-0b6a3f1d9c01").expect("valid uuid")
}

pub(super) fn recipient_pair_id() -> Uuid {
    Uuid::parse_str("1b7e4d80-2c3f-4a6d-b5e9-7f0a2c4e8d02").expect("valid uuid")
}

/// A 35-year-old male A+ donor paired with a 42-year-old female B+
/// recipient, two HLA mismatches, urgent, hybrid method. Several optional
/// fields are left unset on purpose.
pub(super) fn sample_request() -> ScoringRequest {
    ScoringRequest {
        donor_pair_id: donor_pair_id(),
        recipient_pair_id: recipient_pair_id(),
        donor: ParticipantProfile {
            blood_type: "A+".to_string(),
            age: 35,
            sex: Some(Sex::Male),
            bmi: None,
            location: None,
        },
        recipient: ParticipantProfile {
            blood_type: "B+".to_string(),
            age: 42,
            sex: Some(Sex::Female),
            bmi: None,
            location: None,
        },
        clinical: ClinicalContext {
            hla_mismatches: Some(2),
            previous_transplant: None,
            months_on_dialysis: None,
            urgency: Some("HIGH".to_string()),
            crossmatch: None,
        },
        method: ScoringMethod::Hybrid,
        custom_weights: None,
    }
}

/// Same pairing with every optional field supplied, so no feature falls
/// back to a default.
pub(super) fn full_request() -> ScoringRequest {
    let mut request = sample_request();
    request.donor.bmi = Some(24.5);
    request.recipient.bmi = Some(26.0);
    request.donor.location = Some(GeoPoint {
        latitude: 41.5868,
        longitude: -93.6250,
    });
    request.recipient.location = Some(GeoPoint {
        latitude: 41.6611,
        longitude: -91.5302,
    });
    request.clinical.previous_transplant = Some(false);
    request.clinical.months_on_dialysis = Some(10);
    request.clinical.crossmatch = Some(0.1);
    request
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::default()
}

pub(super) fn build_service() -> (
    CompatibilityService<MemoryScoreRepository, MemoryPublisher>,
    Arc<MemoryScoreRepository>,
    Arc<MemoryPublisher>,
) {
    let repository = Arc::new(MemoryScoreRepository::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let service = CompatibilityService::new(repository.clone(), publisher.clone());
    (service, repository, publisher)
}

pub(super) fn scoring_router_with_service(
    service: CompatibilityService<MemoryScoreRepository, MemoryPublisher>,
) -> axum::Router {
    scoring_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryScoreRepository {
    pub(super) records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl ScoreRepository for MemoryScoreRepository {
    fn insert(&self, record: ScoreRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.iter().any(|existing| {
            existing.score.donor_pair_id == record.score.donor_pair_id
                && existing.score.recipient_pair_id == record.score.recipient_pair_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn find_by_pair(
        &self,
        donor_pair_id: Uuid,
        recipient_pair_id: Uuid,
    ) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| {
                record.score.donor_pair_id == donor_pair_id
                    && record.score.recipient_pair_id == recipient_pair_id
            })
            .cloned())
    }

    fn find_by_donor(&self, donor_pair_id: Uuid) -> Result<Vec<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.score.donor_pair_id == donor_pair_id)
            .cloned()
            .collect())
    }

    fn find_by_recipient(
        &self,
        recipient_pair_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.score.recipient_pair_id == recipient_pair_id)
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.len() as u64)
    }

    fn count_by_method(&self, method: ScoringMethod) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.score.method == method)
            .count() as u64)
    }

    fn count_since(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.scored_at >= cutoff)
            .count() as u64)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPublisher {
    events: Arc<Mutex<Vec<ScoreEvent>>>,
}

impl MemoryPublisher {
    pub(super) fn events(&self) -> Vec<ScoreEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl ScoreEventPublisher for MemoryPublisher {
    fn publish(&self, event: ScoreEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct FailingPublisher;

impl ScoreEventPublisher for FailingPublisher {
    fn publish(&self, _event: ScoreEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("broker offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ScoreRepository for UnavailableRepository {
    fn insert(&self, _record: ScoreRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn find_by_pair(
        &self,
        _donor_pair_id: Uuid,
        _recipient_pair_id: Uuid,
    ) -> Result<Option<ScoreRecord>, RepositoryError> {
        Ok(None)
    }

    fn find_by_donor(&self, _donor_pair_id: Uuid) -> Result<Vec<ScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn find_by_recipient(
        &self,
        _recipient_pair_id: Uuid,
    ) -> Result<Vec<ScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn count_by_method(&self, _method: ScoringMethod) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn count_since(&self, _cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
