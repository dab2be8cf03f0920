use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of a candidate pairing, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Donor,
    Recipient,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Donor => write!(f, "donor"),
            Party::Recipient => write!(f, "recipient"),
        }
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "M", alias = "MALE", alias = "Male")]
    Male,
    #[serde(alias = "F", alias = "FEMALE", alias = "Female")]
    Female,
}

impl Sex {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Self::Male),
            "F" | "FEMALE" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Attributes recorded for each side of a candidate pairing.
///
/// Blood type and age are required; everything else degrades to a documented
/// default during feature extraction when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub blood_type: String,
    pub age: u32,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Clinical context for the donor/recipient combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalContext {
    #[serde(default)]
    pub hla_mismatches: Option<u8>,
    #[serde(default)]
    pub previous_transplant: Option<bool>,
    #[serde(default)]
    pub months_on_dialysis: Option<u32>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub crossmatch: Option<f64>,
}

/// Selects which sub-score drives the overall result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMethod {
    Survival,
    Criteria,
    #[default]
    Hybrid,
}

impl ScoringMethod {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "SURVIVAL" => Some(Self::Survival),
            "CRITERIA" => Some(Self::Criteria),
            "HYBRID" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoringMethod::Survival => "SURVIVAL",
            ScoringMethod::Criteria => "CRITERIA",
            ScoringMethod::Hybrid => "HYBRID",
        }
    }
}

/// Urgency category recognized from free-form labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyLevel {
    Low,
    Moderate,
    High,
}

impl UrgencyLevel {
    /// Case-insensitive parse accepting the historical synonyms
    /// MODERATE/MEDIUM and HIGH/URGENT. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MODERATE" | "MEDIUM" => Some(Self::Moderate),
            "HIGH" | "URGENT" => Some(Self::High),
            _ => None,
        }
    }
}

/// The six criteria aggregated by the multi-criteria model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    BloodType,
    HlaCompatibility,
    AgeCompatibility,
    GeographicProximity,
    MedicalHistory,
    Urgency,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::BloodType,
        Criterion::HlaCompatibility,
        Criterion::AgeCompatibility,
        Criterion::GeographicProximity,
        Criterion::MedicalHistory,
        Criterion::Urgency,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Criterion::BloodType => "blood_type",
            Criterion::HlaCompatibility => "hla_compatibility",
            Criterion::AgeCompatibility => "age_compatibility",
            Criterion::GeographicProximity => "geographic_proximity",
            Criterion::MedicalHistory => "medical_history",
            Criterion::Urgency => "urgency",
        }
    }
}

/// Graft risk tier derived from the survival estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    LowRisk,
    ModerateRisk,
    HighRisk,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "LOW_RISK",
            RiskLevel::ModerateRisk => "MODERATE_RISK",
            RiskLevel::HighRisk => "HIGH_RISK",
        }
    }
}

/// Qualitative tier derived from the multi-criteria score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl CompatibilityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            CompatibilityLevel::Excellent => "EXCELLENT",
            CompatibilityLevel::Good => "GOOD",
            CompatibilityLevel::Moderate => "MODERATE",
            CompatibilityLevel::Poor => "POOR",
        }
    }
}

/// Clinical recommendation derived from the fused score and risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StronglyRecommended,
    Recommended,
    ConsiderWithCaution,
    NotRecommended,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::StronglyRecommended => "STRONGLY_RECOMMENDED",
            Recommendation::Recommended => "RECOMMENDED",
            Recommendation::ConsiderWithCaution => "CONSIDER_WITH_CAUTION",
            Recommendation::NotRecommended => "NOT_RECOMMENDED",
        }
    }
}

/// Immutable scoring input for one candidate pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub donor_pair_id: Uuid,
    pub recipient_pair_id: Uuid,
    pub donor: ParticipantProfile,
    pub recipient: ParticipantProfile,
    #[serde(default)]
    pub clinical: ClinicalContext,
    #[serde(default)]
    pub method: ScoringMethod,
    #[serde(default)]
    pub custom_weights: Option<BTreeMap<Criterion, f64>>,
}

impl ScoringRequest {
    /// Reject structurally invalid requests before any computation runs.
    /// Optional-field defaulting is a separate concern handled downstream.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (party, profile) in [
            (Party::Donor, &self.donor),
            (Party::Recipient, &self.recipient),
        ] {
            if profile.blood_type.trim().is_empty() {
                return Err(ValidationError::MissingBloodType(party));
            }
            if profile.age == 0 {
                return Err(ValidationError::NonPositiveAge(party));
            }
        }

        if let Some(mismatches) = self.clinical.hla_mismatches {
            if mismatches > 6 {
                return Err(ValidationError::HlaMismatchesOutOfRange(mismatches));
            }
        }

        if let Some(crossmatch) = self.clinical.crossmatch {
            if !(0.0..=1.0).contains(&crossmatch) {
                return Err(ValidationError::CrossmatchOutOfRange(crossmatch));
            }
        }

        Ok(())
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        self.clinical
            .urgency
            .as_deref()
            .and_then(UrgencyLevel::from_label)
    }
}

/// Request defects surfaced to the caller before scoring starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} blood type is required")]
    MissingBloodType(Party),
    #[error("{0} age must be a positive integer")]
    NonPositiveAge(Party),
    #[error("hla mismatch count {0} outside the 0-6 range")]
    HlaMismatchesOutOfRange(u8),
    #[error("crossmatch result {0} outside the [0, 1] range")]
    CrossmatchOutOfRange(f64),
}
