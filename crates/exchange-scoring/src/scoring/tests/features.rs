use super::common::*;

use crate::scoring::domain::GeoPoint;
use crate::scoring::features::{self, blood_type_compatible};

#[test]
fn extracts_all_fourteen_features() {
    let features = features::extract(&sample_request());
    assert_eq!(features.len(), 14);
}

#[test]
fn observed_fields_are_not_marked_defaulted() {
    let features = features::extract(&sample_request());

    assert_eq!(features.value("donor_age"), Some(35.0));
    assert_eq!(features.value("recipient_age"), Some(42.0));
    assert_eq!(features.value("age_difference"), Some(7.0));
    assert_eq!(features.value("hla_mismatches"), Some(2.0));
    assert!(!features.was_defaulted("hla_mismatches"));
    assert!(!features.was_defaulted("donor_age"));
}

#[test]
fn missing_optionals_fall_back_to_documented_defaults() {
    let features = features::extract(&sample_request());

    assert_eq!(features.value("donor_bmi"), Some(25.0));
    assert_eq!(features.value("recipient_bmi"), Some(25.0));
    assert_eq!(features.value("geographic_distance"), Some(100.0));
    assert_eq!(features.value("time_on_dialysis"), Some(12.0));
    assert_eq!(features.value("previous_transplant"), Some(0.0));
    assert_eq!(features.value("crossmatch_positive"), Some(0.0));

    for name in [
        "donor_bmi",
        "recipient_bmi",
        "geographic_distance",
        "time_on_dialysis",
        "previous_transplant",
        "crossmatch_positive",
    ] {
        assert!(features.was_defaulted(name), "{name} should be defaulted");
    }
}

#[test]
fn fully_specified_request_defaults_nothing() {
    let features = features::extract(&full_request());

    for name in [
        "donor_bmi",
        "recipient_bmi",
        "geographic_distance",
        "time_on_dialysis",
        "previous_transplant",
        "crossmatch_positive",
        "urgent_status",
    ] {
        assert!(!features.was_defaulted(name), "{name} should be observed");
    }
}

#[test]
fn incompatible_blood_types_set_the_mismatch_indicator() {
    let features = features::extract(&sample_request());
    assert_eq!(features.value("blood_type_mismatch"), Some(1.0));
}

#[test]
fn sexes_map_to_male_indicators() {
    let features = features::extract(&sample_request());
    assert_eq!(features.value("donor_gender_male"), Some(1.0));
    assert_eq!(features.value("recipient_gender_male"), Some(0.0));
}

#[test]
fn high_urgency_sets_the_urgent_indicator() {
    let features = features::extract(&sample_request());
    assert_eq!(features.value("urgent_status"), Some(1.0));

    let mut request = sample_request();
    request.clinical.urgency = Some("LOW".to_string());
    let features = features::extract(&request);
    assert_eq!(features.value("urgent_status"), Some(0.0));
    assert!(!features.was_defaulted("urgent_status"));
}

#[test]
fn crossmatch_is_thresholded_at_half() {
    let mut request = sample_request();
    request.clinical.crossmatch = Some(0.6);
    let features = features::extract(&request);
    assert_eq!(features.value("crossmatch_positive"), Some(1.0));

    request.clinical.crossmatch = Some(0.5);
    let features = features::extract(&request);
    assert_eq!(features.value("crossmatch_positive"), Some(0.0));
}

#[test]
fn supplied_coordinates_produce_a_real_distance() {
    let mut request = sample_request();
    request.donor.location = Some(GeoPoint {
        latitude: 41.5868,
        longitude: -93.6250,
    });
    request.recipient.location = Some(GeoPoint {
        latitude: 41.5868,
        longitude: -93.6250,
    });
    let features = features::extract(&request);
    assert_eq!(features.value("geographic_distance"), Some(0.0));
    assert!(!features.was_defaulted("geographic_distance"));
}

#[test]
fn blood_type_compatibility_is_coarse() {
    assert!(blood_type_compatible("O+", "A+"));
    assert!(blood_type_compatible("A+", "AB-"));
    assert!(blood_type_compatible("B+", "B+"));
    assert!(blood_type_compatible("a+", "A+"));
    assert!(!blood_type_compatible("A+", "B+"));
    assert!(!blood_type_compatible("", "A+"));
}
