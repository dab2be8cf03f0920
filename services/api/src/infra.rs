use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use exchange_scoring::scoring::{
    PublishError, RepositoryError, ScoreEvent, ScoreEventPublisher, ScoreRecord, ScoreRepository,
    ScoringMethod,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl ScoreRepository for InMemoryScoreRepository {
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
pub(crate) struct InMemoryScorePublisher {
    events: Arc<Mutex<Vec<ScoreEvent>>>,
}

impl ScoreEventPublisher for InMemoryScorePublisher {
    fn publish(&self, event: ScoreEvent) -> Result<(), PublishError> {
        let mut guard = self.events.lock().expect("publisher mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

impl InMemoryScorePublisher {
    pub(crate) fn events(&self) -> Vec<ScoreEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exchange_scoring::scoring::{
        ClinicalContext, CompatibilityService, ParticipantProfile, ScoringRequest,
    };

    fn request(method: ScoringMethod) -> ScoringRequest {
        ScoringRequest {
            donor_pair_id: Uuid::new_v4(),
            recipient_pair_id: Uuid::new_v4(),
            donor: ParticipantProfile {
                blood_type: "O+".to_string(),
                age: 40,
                sex: None,
                bmi: None,
                location: None,
            },
            recipient: ParticipantProfile {
                blood_type: "A+".to_string(),
                age: 44,
                sex: None,
                bmi: None,
                location: None,
            },
            clinical: ClinicalContext::default(),
            method,
            custom_weights: None,
        }
    }

    fn record(method: ScoringMethod) -> ScoreRecord {
        let service = CompatibilityService::new(
            Arc::new(InMemoryScoreRepository::default()),
            Arc::new(InMemoryScorePublisher::default()),
        );
        service.score_pair(&request(method)).expect("scores")
    }

    #[test]
    fn insert_rejects_duplicate_pairings() {
        let repository = InMemoryScoreRepository::default();
        let record = record(ScoringMethod::Hybrid);

        repository.insert(record.clone()).expect("first insert");
        assert_eq!(
            repository.insert(record),
            Err(RepositoryError::Conflict)
        );
    }

    #[test]
    fn counts_split_by_method() {
        let repository = InMemoryScoreRepository::default();
        repository
            .insert(record(ScoringMethod::Hybrid))
            .expect("insert");
        repository
            .insert(record(ScoringMethod::Survival))
            .expect("insert");

        assert_eq!(repository.count().unwrap(), 2);
        assert_eq!(
            repository.count_by_method(ScoringMethod::Hybrid).unwrap(),
            1
        );
        assert_eq!(
            repository.count_by_method(ScoringMethod::Criteria).unwrap(),
            0
        );
    }

    #[test]
    fn publisher_records_emitted_events() {
        let publisher = Arc::new(InMemoryScorePublisher::default());
        let service = CompatibilityService::new(
            Arc::new(InMemoryScoreRepository::default()),
            publisher.clone(),
        );

        let record = service
            .score_pair(&request(ScoringMethod::Hybrid))
            .expect("scores");

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].donor_pair_id, record.score.donor_pair_id);
    }

    #[test]
    fn count_since_filters_on_timestamp() {
        let repository = InMemoryScoreRepository::default();
        repository
            .insert(record(ScoringMethod::Hybrid))
            .expect("insert");

        let recent = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(repository.count_since(recent).unwrap(), 1);
        assert_eq!(repository.count_since(future).unwrap(), 0);
    }
}
