use std::collections::{BTreeMap, BTreeSet};

use super::domain::{ScoringRequest, Sex, UrgencyLevel};
use super::geo;

/// Fallback distance when either side lacks coordinates. The criteria
/// aggregator substitutes a flat proximity score instead; the two models
/// handle missing coordinates independently.
pub(crate) const DEFAULT_DISTANCE_KM: f64 = 100.0;
pub(crate) const DEFAULT_HLA_MISMATCHES: u8 = 3;
pub(crate) const DEFAULT_BMI: f64 = 25.0;
pub(crate) const DEFAULT_MONTHS_ON_DIALYSIS: u32 = 12;

/// Named feature values for the proportional-hazards model, with a record of
/// which entries fell back to a documented default so confidence can be
/// derived from input completeness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: BTreeMap<&'static str, f64>,
    defaulted: BTreeSet<&'static str>,
}

impl FeatureVector {
    pub(crate) fn observe(&mut self, name: &'static str, value: f64) {
        self.values.insert(name, value);
    }

    pub(crate) fn fallback(&mut self, name: &'static str, value: f64) {
        self.values.insert(name, value);
        self.defaulted.insert(name);
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn was_defaulted(&self, name: &str) -> bool {
        self.defaulted.contains(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derive the survival-model feature vector from a request. Pure: the
/// request is never mutated and missing optionals degrade to defaults.
pub fn extract(request: &ScoringRequest) -> FeatureVector {
    let mut features = FeatureVector::default();

    let donor_age = f64::from(request.donor.age);
    let recipient_age = f64::from(request.recipient.age);
    features.observe("donor_age", donor_age);
    features.observe("recipient_age", recipient_age);
    features.observe("age_difference", (donor_age - recipient_age).abs());

    match request.clinical.hla_mismatches {
        Some(mismatches) => features.observe("hla_mismatches", f64::from(mismatches)),
        None => features.fallback("hla_mismatches", f64::from(DEFAULT_HLA_MISMATCHES)),
    }

    match request.donor.bmi {
        Some(bmi) => features.observe("donor_bmi", bmi),
        None => features.fallback("donor_bmi", DEFAULT_BMI),
    }
    match request.recipient.bmi {
        Some(bmi) => features.observe("recipient_bmi", bmi),
        None => features.fallback("recipient_bmi", DEFAULT_BMI),
    }

    let compatible = blood_type_compatible(&request.donor.blood_type, &request.recipient.blood_type);
    features.observe("blood_type_mismatch", if compatible { 0.0 } else { 1.0 });

    match (request.donor.location, request.recipient.location) {
        (Some(donor), Some(recipient)) => {
            features.observe("geographic_distance", geo::haversine_km(donor, recipient));
        }
        _ => features.fallback("geographic_distance", DEFAULT_DISTANCE_KM),
    }

    match request.clinical.months_on_dialysis {
        Some(months) => features.observe("time_on_dialysis", f64::from(months)),
        None => {
            features.fallback("time_on_dialysis", f64::from(DEFAULT_MONTHS_ON_DIALYSIS));
        }
    }

    match request.clinical.previous_transplant {
        Some(previous) => {
            features.observe("previous_transplant", if previous { 1.0 } else { 0.0 });
        }
        None => features.fallback("previous_transplant", 0.0),
    }

    // Crossmatch is a [0, 1] lab value thresholded at 0.5; absence is read
    // as a negative result.
    match request.clinical.crossmatch {
        Some(crossmatch) => {
            features.observe("crossmatch_positive", if crossmatch > 0.5 { 1.0 } else { 0.0 });
        }
        None => features.fallback("crossmatch_positive", 0.0),
    }

    match request.donor.sex {
        Some(sex) => {
            features.observe("donor_gender_male", if sex == Sex::Male { 1.0 } else { 0.0 });
        }
        None => features.fallback("donor_gender_male", 0.0),
    }
    match request.recipient.sex {
        Some(sex) => {
            features.observe(
                "recipient_gender_male",
                if sex == Sex::Male { 1.0 } else { 0.0 },
            );
        }
        None => features.fallback("recipient_gender_male", 0.0),
    }

    match &request.clinical.urgency {
        Some(label) => {
            let urgent = UrgencyLevel::from_label(label) == Some(UrgencyLevel::High);
            features.observe("urgent_status", if urgent { 1.0 } else { 0.0 });
        }
        None => features.fallback("urgent_status", 0.0),
    }

    features
}

/// Coarse ABO compatibility used only for the survival-model mismatch
/// indicator. The criteria aggregator applies its own, finer-grained table.
pub(crate) fn blood_type_compatible(donor: &str, recipient: &str) -> bool {
    let donor = donor.trim().to_ascii_uppercase();
    let recipient = recipient.trim().to_ascii_uppercase();

    if donor.is_empty() || recipient.is_empty() {
        return false;
    }

    // Universal donor, universal recipient, then exact match.
    donor.contains('O') || recipient.contains("AB") || donor == recipient
}
