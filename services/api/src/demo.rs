use crate::infra::{InMemoryScorePublisher, InMemoryScoreRepository};
use clap::Args;
use std::sync::Arc;
use uuid::Uuid;

use exchange_scoring::error::AppError;
use exchange_scoring::scoring::{
    ClinicalContext, CompatibilityService, Criterion, GeoPoint, ParticipantProfile, ScoreRecord,
    ScoringMethod, ScoringRequest, Sex,
};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Donor blood type, e.g. A+ or O-
    #[arg(long)]
    pub(crate) donor_blood_type: String,
    /// Donor age in years
    #[arg(long)]
    pub(crate) donor_age: u32,
    /// Donor sex (M or F)
    #[arg(long, value_parser = parse_sex)]
    pub(crate) donor_sex: Option<Sex>,
    /// Donor body-mass index
    #[arg(long)]
    pub(crate) donor_bmi: Option<f64>,
    /// Donor latitude in decimal degrees
    #[arg(long)]
    pub(crate) donor_lat: Option<f64>,
    /// Donor longitude in decimal degrees
    #[arg(long)]
    pub(crate) donor_lon: Option<f64>,
    /// Recipient blood type, e.g. B+ or AB-
    #[arg(long)]
    pub(crate) recipient_blood_type: String,
    /// Recipient age in years
    #[arg(long)]
    pub(crate) recipient_age: u32,
    /// Recipient sex (M or F)
    #[arg(long, value_parser = parse_sex)]
    pub(crate) recipient_sex: Option<Sex>,
    /// Recipient body-mass index
    #[arg(long)]
    pub(crate) recipient_bmi: Option<f64>,
    /// Recipient latitude in decimal degrees
    #[arg(long)]
    pub(crate) recipient_lat: Option<f64>,
    /// Recipient longitude in decimal degrees
    #[arg(long)]
    pub(crate) recipient_lon: Option<f64>,
    /// HLA mismatch count (0-6)
    #[arg(long)]
    pub(crate) hla_mismatches: Option<u8>,
    /// The recipient has had a prior transplant
    #[arg(long)]
    pub(crate) previous_transplant: bool,
    /// Months the recipient has spent on dialysis
    #[arg(long)]
    pub(crate) months_on_dialysis: Option<u32>,
    /// Urgency label (LOW, MODERATE or HIGH)
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// Crossmatch result in [0, 1]
    #[arg(long)]
    pub(crate) crossmatch: Option<f64>,
    /// Scoring method: SURVIVAL, CRITERIA or HYBRID
    #[arg(long, default_value = "HYBRID", value_parser = parse_method)]
    pub(crate) method: ScoringMethod,
}

fn parse_sex(raw: &str) -> Result<Sex, String> {
    Sex::from_label(raw).ok_or_else(|| format!("'{raw}' is not a recognized sex (use M or F)"))
}

fn parse_method(raw: &str) -> Result<ScoringMethod, String> {
    ScoringMethod::from_label(raw)
        .ok_or_else(|| format!("'{raw}' is not a scoring method (use SURVIVAL, CRITERIA or HYBRID)"))
}

fn location(lat: Option<f64>, lon: Option<f64>) -> Option<GeoPoint> {
    match (lat, lon) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let request = ScoringRequest {
        donor_pair_id: Uuid::new_v4(),
        recipient_pair_id: Uuid::new_v4(),
        donor: ParticipantProfile {
            blood_type: args.donor_blood_type,
            age: args.donor_age,
            sex: args.donor_sex,
            bmi: args.donor_bmi,
            location: location(args.donor_lat, args.donor_lon),
        },
        recipient: ParticipantProfile {
            blood_type: args.recipient_blood_type,
            age: args.recipient_age,
            sex: args.recipient_sex,
            bmi: args.recipient_bmi,
            location: location(args.recipient_lat, args.recipient_lon),
        },
        clinical: ClinicalContext {
            hla_mismatches: args.hla_mismatches,
            previous_transplant: args.previous_transplant.then_some(true),
            months_on_dialysis: args.months_on_dialysis,
            urgency: args.urgency,
            crossmatch: args.crossmatch,
        },
        method: args.method,
        custom_weights: None,
    };

    let service = CompatibilityService::new(
        Arc::new(InMemoryScoreRepository::default()),
        Arc::new(InMemoryScorePublisher::default()),
    );
    let record = service.score_pair(&request)?;
    render_score_report(&record);

    Ok(())
}

fn render_score_report(record: &ScoreRecord) {
    let score = &record.score;

    println!("Compatibility score ({})", score.method.label());
    println!("  overall score:   {:.4}", score.overall_score);
    println!("  confidence:      {:.2}", score.confidence_level);
    println!("  risk:            {}", score.risk.label());
    println!("  compatibility:   {}", score.compatibility.label());
    println!("  recommendation:  {}", score.recommendation.label());

    println!("\nSurvival estimate");
    println!("  linear predictor: {:.4}", score.survival.linear_predictor);
    println!("  hazard ratio:     {:.4}", score.survival.hazard_ratio);
    println!("  1-year:           {:.4}", score.survival.survival.one_year);
    println!(
        "  3-year:           {:.4}",
        score.survival.survival.three_year
    );
    println!(
        "  5-year:           {:.4}",
        score.survival.survival.five_year
    );
    println!("  10-year:          {:.4}", score.survival.survival.ten_year);

    println!("\nCriteria breakdown (weighted score {:.4})", score.criteria.score);
    for criterion in Criterion::ALL {
        let value = score.criteria.scores.get(&criterion).copied().unwrap_or(0.0);
        let weight = score
            .criteria
            .weights
            .get(&criterion)
            .copied()
            .unwrap_or(0.0);
        println!(
            "  {:<22} {:.4} (weight {:.2})",
            criterion.label(),
            value,
            weight
        );
    }

    println!("\nAlgorithm version {}", record.algorithm_version);
}
