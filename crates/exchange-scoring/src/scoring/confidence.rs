//! Maps input completeness to a discretized confidence level.
//!
//! The survival and criteria estimators were tuned separately and carry
//! different threshold tables; the criteria table has no 0.6 tier and bottoms
//! out at 0.6 instead of 0.5.

pub(crate) fn survival_confidence(completeness: f64) -> f64 {
    if completeness >= 0.9 {
        0.95
    } else if completeness >= 0.8 {
        0.85
    } else if completeness >= 0.7 {
        0.75
    } else if completeness >= 0.6 {
        0.65
    } else {
        0.5
    }
}

pub(crate) fn criteria_confidence(completeness: f64) -> f64 {
    if completeness >= 0.9 {
        0.95
    } else if completeness >= 0.8 {
        0.85
    } else if completeness >= 0.7 {
        0.75
    } else {
        0.6
    }
}
