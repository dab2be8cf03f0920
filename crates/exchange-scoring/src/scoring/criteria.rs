use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::confidence;
use super::domain::{CompatibilityLevel, Criterion, ScoringRequest, UrgencyLevel};
use super::geo;

/// Weighted multi-criteria compatibility score for one pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaResult {
    pub scores: BTreeMap<Criterion, f64>,
    pub weights: BTreeMap<Criterion, f64>,
    pub score: f64,
    pub compatibility: CompatibilityLevel,
    pub confidence: f64,
}

/// Rule-based aggregator over the six compatibility criteria. Holds only the
/// immutable default weight table.
#[derive(Debug, Clone)]
pub struct CriteriaAggregator {
    default_weights: BTreeMap<Criterion, f64>,
}

impl Default for CriteriaAggregator {
    fn default() -> Self {
        Self {
            default_weights: default_weights(),
        }
    }
}

/// The defaults already sum to 1.0 and are never renormalized.
fn default_weights() -> BTreeMap<Criterion, f64> {
    [
        (Criterion::BloodType, 0.25),
        (Criterion::HlaCompatibility, 0.30),
        (Criterion::AgeCompatibility, 0.15),
        (Criterion::GeographicProximity, 0.10),
        (Criterion::MedicalHistory, 0.10),
        (Criterion::Urgency, 0.10),
    ]
    .into_iter()
    .collect()
}

impl CriteriaAggregator {
    pub fn evaluate(&self, request: &ScoringRequest) -> CriteriaResult {
        let scores: BTreeMap<Criterion, f64> = Criterion::ALL
            .iter()
            .map(|&criterion| (criterion, score_criterion(criterion, request)))
            .collect();

        let weights = self.effective_weights(request);

        // Criteria missing from a custom weight map carry no weight and drop
        // out of the sum entirely.
        let score: f64 = scores
            .iter()
            .filter_map(|(criterion, value)| weights.get(criterion).map(|weight| value * weight))
            .sum();

        let confidence = confidence::criteria_confidence(
            scores.len() as f64 / Criterion::ALL.len() as f64,
        );

        CriteriaResult {
            scores,
            weights,
            score,
            compatibility: compatibility_level(score),
            confidence,
        }
    }

    fn effective_weights(&self, request: &ScoringRequest) -> BTreeMap<Criterion, f64> {
        match &request.custom_weights {
            Some(custom) if !custom.is_empty() => normalize_weights(custom),
            _ => self.default_weights.clone(),
        }
    }
}

/// Scale a caller-supplied weight map so the weights sum to 1.0.
pub fn normalize_weights(weights: &BTreeMap<Criterion, f64>) -> BTreeMap<Criterion, f64> {
    let sum: f64 = weights.values().sum();
    weights
        .iter()
        .map(|(criterion, weight)| (*criterion, weight / sum))
        .collect()
}

fn score_criterion(criterion: Criterion, request: &ScoringRequest) -> f64 {
    match criterion {
        Criterion::BloodType => blood_type_score(request),
        Criterion::HlaCompatibility => hla_score(request),
        Criterion::AgeCompatibility => age_score(request),
        Criterion::GeographicProximity => geographic_score(request),
        Criterion::MedicalHistory => medical_history_score(request),
        Criterion::Urgency => urgency_score(request),
    }
}

fn blood_type_score(request: &ScoringRequest) -> f64 {
    let donor = request.donor.blood_type.trim().to_ascii_uppercase();
    let recipient = request.recipient.blood_type.trim().to_ascii_uppercase();

    if donor.is_empty() || recipient.is_empty() {
        0.0
    } else if donor == recipient {
        1.0
    } else if donor.starts_with('O') {
        0.9
    } else if recipient.starts_with("AB") {
        0.8
    } else if (donor.starts_with('A') || donor.starts_with('B')) && recipient.starts_with("AB") {
        0.7
    } else {
        0.0
    }
}

fn hla_score(request: &ScoringRequest) -> f64 {
    match request.clinical.hla_mismatches {
        None => 0.5,
        Some(0) => 1.0,
        Some(mismatches) => (1.0 - f64::from(mismatches) / 6.0).max(0.0),
    }
}

fn age_score(request: &ScoringRequest) -> f64 {
    let difference = request.donor.age.abs_diff(request.recipient.age);
    if difference <= 5 {
        1.0
    } else if difference <= 10 {
        0.8
    } else if difference <= 20 {
        0.6
    } else {
        0.3
    }
}

fn geographic_score(request: &ScoringRequest) -> f64 {
    // Missing coordinates fall back to a flat 0.5 here, unlike the survival
    // extractor's 100 km default distance.
    let (donor, recipient) = match (request.donor.location, request.recipient.location) {
        (Some(donor), Some(recipient)) => (donor, recipient),
        _ => return 0.5,
    };

    let distance = geo::haversine_km(donor, recipient);
    if distance <= 50.0 {
        1.0
    } else if distance <= 100.0 {
        0.8
    } else if distance <= 200.0 {
        0.6
    } else if distance <= 500.0 {
        0.4
    } else {
        0.2
    }
}

fn medical_history_score(request: &ScoringRequest) -> f64 {
    let mut score: f64 = 0.7;

    if request.clinical.previous_transplant == Some(true) {
        score -= 0.2;
    }

    match request.clinical.months_on_dialysis {
        Some(months) if months <= 12 => score += 0.2,
        Some(months) if months > 36 => score -= 0.1,
        _ => {}
    }

    score.clamp(0.0, 1.0)
}

fn urgency_score(request: &ScoringRequest) -> f64 {
    match request.urgency_level() {
        Some(UrgencyLevel::High) => 1.0,
        Some(UrgencyLevel::Moderate) => 0.7,
        Some(UrgencyLevel::Low) => 0.4,
        None => 0.5,
    }
}

fn compatibility_level(score: f64) -> CompatibilityLevel {
    if score >= 0.8 {
        CompatibilityLevel::Excellent
    } else if score >= 0.6 {
        CompatibilityLevel::Good
    } else if score >= 0.4 {
        CompatibilityLevel::Moderate
    } else {
        CompatibilityLevel::Poor
    }
}
