use super::common::*;

use crate::scoring::domain::{Recommendation, RiskLevel, ScoringMethod};
use crate::scoring::fusion::{overall_score, recommend};

const TOLERANCE: f64 = 1e-12;

#[test]
fn survival_method_uses_the_five_year_probability_alone() {
    assert!((overall_score(ScoringMethod::Survival, 0.8, 0.5) - 0.8).abs() < TOLERANCE);
}

#[test]
fn criteria_method_uses_the_weighted_score_alone() {
    assert!((overall_score(ScoringMethod::Criteria, 0.8, 0.5) - 0.5).abs() < TOLERANCE);
}

#[test]
fn hybrid_method_blends_sixty_forty() {
    assert!((overall_score(ScoringMethod::Hybrid, 0.8, 0.5) - 0.68).abs() < TOLERANCE);
}

#[test]
fn fused_confidence_is_the_mean_of_both_models() {
    let result = engine().score(&sample_request()).expect("scoring succeeds");
    assert!((result.confidence_level - 0.725).abs() < TOLERANCE);
}

#[test]
fn fused_result_carries_both_sub_results() {
    let result = engine().score(&sample_request()).expect("scoring succeeds");

    assert_eq!(result.donor_pair_id, donor_pair_id());
    assert_eq!(result.recipient_pair_id, recipient_pair_id());
    assert_eq!(result.method, ScoringMethod::Hybrid);
    assert_eq!(result.risk, result.survival.risk);
    assert_eq!(result.compatibility, result.criteria.compatibility);

    let expected = overall_score(
        ScoringMethod::Hybrid,
        result.survival.survival.five_year,
        result.criteria.score,
    );
    assert!((result.overall_score - expected).abs() < TOLERANCE);
}

#[test]
fn strong_recommendation_requires_low_risk() {
    assert_eq!(
        recommend(0.85, RiskLevel::LowRisk),
        Recommendation::StronglyRecommended
    );
    assert_eq!(
        recommend(0.85, RiskLevel::ModerateRisk),
        Recommendation::Recommended
    );
}

#[test]
fn high_risk_never_reaches_the_top_tiers() {
    assert_eq!(
        recommend(0.85, RiskLevel::HighRisk),
        Recommendation::ConsiderWithCaution
    );
    assert_eq!(
        recommend(0.65, RiskLevel::HighRisk),
        Recommendation::ConsiderWithCaution
    );
}

#[test]
fn recommendation_boundaries() {
    assert_eq!(
        recommend(0.8, RiskLevel::LowRisk),
        Recommendation::StronglyRecommended
    );
    assert_eq!(
        recommend(0.79, RiskLevel::LowRisk),
        Recommendation::Recommended
    );
    assert_eq!(
        recommend(0.6, RiskLevel::ModerateRisk),
        Recommendation::Recommended
    );
    assert_eq!(
        recommend(0.4, RiskLevel::LowRisk),
        Recommendation::ConsiderWithCaution
    );
    assert_eq!(
        recommend(0.39, RiskLevel::LowRisk),
        Recommendation::NotRecommended
    );
    assert_eq!(
        recommend(0.3, RiskLevel::HighRisk),
        Recommendation::NotRecommended
    );
}

#[test]
fn scoring_is_deterministic() {
    let engine = engine();
    let first = engine.score(&sample_request()).expect("scoring succeeds");
    let second = engine.score(&sample_request()).expect("scoring succeeds");
    assert_eq!(first, second);
}

#[test]
fn sample_pairing_is_strongly_recommended() {
    let result = engine().score(&sample_request()).expect("scoring succeeds");

    let expected_lp = -3.866_f64;
    let expected_overall = 0.6 * 0.75_f64.powf(expected_lp.exp()) + 0.4 * 0.54;
    assert!((result.overall_score - expected_overall).abs() < 1e-9);
    assert_eq!(result.risk, RiskLevel::LowRisk);
    assert_eq!(result.recommendation, Recommendation::StronglyRecommended);
}

#[test]
fn validation_failures_surface_before_any_math() {
    let mut request = sample_request();
    request.donor.blood_type = "  ".to_string();
    let err = engine().score(&request).expect_err("must fail");
    assert!(err.to_string().contains("blood type"));

    let mut request = sample_request();
    request.clinical.hla_mismatches = Some(7);
    assert!(engine().score(&request).is_err());

    let mut request = sample_request();
    request.clinical.crossmatch = Some(1.5);
    assert!(engine().score(&request).is_err());
}
