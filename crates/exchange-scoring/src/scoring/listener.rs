use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::domain::{
    ClinicalContext, ParticipantProfile, ScoringMethod, ScoringRequest, Sex,
};
use super::repository::{ScoreEventPublisher, ScoreRepository};
use super::service::CompatibilityService;

/// Topic on which the registration service announces new donor pairs.
pub const REGISTRATION_TOPIC: &str = "donor.registered";

/// Build a scoring request from a registration event payload. Events missing
/// a required field or carrying an out-of-range value are dropped with a
/// warning rather than failing the consumer loop.
pub fn registration_request(event: &Value) -> Option<ScoringRequest> {
    let donor_pair_id = match event
        .get("donor_pair_id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
    {
        Some(id) => id,
        None => {
            warn!("dropping registration event without a donor_pair_id");
            return None;
        }
    };

    let donor_blood_type = match event.get("donor_blood_type").and_then(Value::as_str) {
        Some(bt) => bt.to_string(),
        None => {
            warn!(%donor_pair_id, "dropping registration event without a donor blood type");
            return None;
        }
    };
    let recipient_blood_type = match event.get("recipient_blood_type").and_then(Value::as_str) {
        Some(bt) => bt.to_string(),
        None => {
            warn!(%donor_pair_id, "dropping registration event without a recipient blood type");
            return None;
        }
    };

    let donor_age = match event.get("donor_age").and_then(Value::as_u64) {
        Some(age) => match u32::try_from(age) {
            Ok(age) => age,
            Err(_) => {
                warn!(%donor_pair_id, value = age, "dropping registration event with an out-of-range donor age");
                return None;
            }
        },
        None => {
            warn!(%donor_pair_id, "dropping registration event without a donor age");
            return None;
        }
    };
    let recipient_age = match event.get("recipient_age").and_then(Value::as_u64) {
        Some(age) => match u32::try_from(age) {
            Ok(age) => age,
            Err(_) => {
                warn!(%donor_pair_id, value = age, "dropping registration event with an out-of-range recipient age");
                return None;
            }
        },
        None => {
            warn!(%donor_pair_id, "dropping registration event without a recipient age");
            return None;
        }
    };

    // An out-of-range count is a malformed payload and drops the event,
    // same as a missing required field.
    let hla_mismatches = match event.get("hla_mismatches").and_then(Value::as_u64) {
        Some(raw) => match u8::try_from(raw) {
            Ok(mismatches) => Some(mismatches),
            Err(_) => {
                warn!(%donor_pair_id, value = raw, "dropping registration event with an out-of-range hla mismatch count");
                return None;
            }
        },
        None => None,
    };
    let months_on_dialysis = match event.get("months_on_dialysis").and_then(Value::as_u64) {
        Some(raw) => match u32::try_from(raw) {
            Ok(months) => Some(months),
            Err(_) => {
                warn!(%donor_pair_id, value = raw, "dropping registration event with an out-of-range dialysis duration");
                return None;
            }
        },
        None => None,
    };

    // Registration events predate pairing, so the recipient pair is often
    // unknown; a placeholder id keeps the score addressable until rematch.
    let recipient_pair_id = event
        .get("recipient_pair_id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(Uuid::new_v4);

    Some(ScoringRequest {
        donor_pair_id,
        recipient_pair_id,
        donor: ParticipantProfile {
            blood_type: donor_blood_type,
            age: donor_age,
            sex: event
                .get("donor_sex")
                .and_then(Value::as_str)
                .and_then(Sex::from_label),
            bmi: None,
            location: None,
        },
        recipient: ParticipantProfile {
            blood_type: recipient_blood_type,
            age: recipient_age,
            sex: event
                .get("recipient_sex")
                .and_then(Value::as_str)
                .and_then(Sex::from_label),
            bmi: None,
            location: None,
        },
        clinical: ClinicalContext {
            hla_mismatches,
            previous_transplant: event.get("previous_transplant").and_then(Value::as_bool),
            months_on_dialysis,
            urgency: event
                .get("urgency")
                .and_then(Value::as_str)
                .map(str::to_string),
            crossmatch: event.get("crossmatch").and_then(Value::as_f64),
        },
        method: ScoringMethod::Hybrid,
        custom_weights: None,
    })
}

/// Consume one registration event: derive a request and score it eagerly so
/// a compatibility score is ready before matching asks for it.
pub fn handle_registration<R, P>(service: &CompatibilityService<R, P>, event: &Value)
where
    R: ScoreRepository,
    P: ScoreEventPublisher,
{
    let Some(request) = registration_request(event) else {
        return;
    };

    match service.score_event(&request) {
        Ok(score) => {
            info!(
                donor_pair_id = %request.donor_pair_id,
                overall_score = score.overall_score,
                "scored registration event"
            );
        }
        Err(err) => {
            error!(
                donor_pair_id = %request.donor_pair_id,
                error = %err,
                "failed to score registration event"
            );
        }
    }
}
