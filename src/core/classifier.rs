//! Risk Classifier & Explainer
//!
//! Turns a model probability into a binary label and derives contributing
//! factors from the raw (unscaled) measurement.
//!
//! Factor rules (each evaluated independently, reported in this order):
//! - glucose >= 126        -> "Elevated glucose"
//! - BMI >= 30             -> "High BMI"
//! - age > 45              -> "Age > 45"
//! - pedigree > 0.9        -> "Strong family history"
//!
//! These heuristics are independent of the model's own decision boundary.

use tracing::debug;

use crate::models::types::{ContributingFactor, PatientMeasurement, RiskAssessment, RiskLabel};
use crate::utils::constants::{
    is_high_risk, AGE_RISK_YEARS, BMI_HIGH, GLUCOSE_ELEVATED_MG_DL, PEDIGREE_STRONG,
};

/// Label rule: strictly above 0.5 is high risk
pub fn label_for(probability: f64) -> RiskLabel {
    if is_high_risk(probability) {
        RiskLabel::High
    } else {
        RiskLabel::Low
    }
}

/// Evaluate every factor rule against the raw measurement
pub fn contributing_factors(m: &PatientMeasurement) -> Vec<ContributingFactor> {
    let rules = [
        (m.glucose >= GLUCOSE_ELEVATED_MG_DL, ContributingFactor::ElevatedGlucose),
        (m.bmi >= BMI_HIGH, ContributingFactor::HighBmi),
        (m.age > AGE_RISK_YEARS, ContributingFactor::AgeOver45),
        (m.diabetes_pedigree > PEDIGREE_STRONG, ContributingFactor::StrongFamilyHistory),
    ];

    rules
        .into_iter()
        .filter_map(|(fired, factor)| fired.then_some(factor))
        .collect()
}

/// Build the assessment for one probability / measurement pair
pub fn classify(probability: f64, m: &PatientMeasurement) -> RiskAssessment {
    let label = label_for(probability);
    let factors = contributing_factors(m);

    debug!(
        "🩺 p={:.4} -> {} ({} factors)",
        probability,
        label,
        factors.len()
    );

    RiskAssessment {
        probability,
        label,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundary() {
        assert_eq!(label_for(0.5), RiskLabel::Low);
        assert_eq!(label_for(0.500_000_1), RiskLabel::High);
        assert_eq!(label_for(0.0), RiskLabel::Low);
        assert_eq!(label_for(1.0), RiskLabel::High);
        assert_eq!(label_for(0.499_999), RiskLabel::Low);
    }

    #[test]
    fn test_all_factors_fire_in_order() {
        let m = PatientMeasurement {
            glucose: 126,
            bmi: 31.0,
            age: 50,
            diabetes_pedigree: 1.0,
            ..Default::default()
        };
        assert_eq!(
            contributing_factors(&m),
            vec![
                ContributingFactor::ElevatedGlucose,
                ContributingFactor::HighBmi,
                ContributingFactor::AgeOver45,
                ContributingFactor::StrongFamilyHistory,
            ]
        );
    }

    #[test]
    fn test_no_factor_just_below_thresholds() {
        let m = PatientMeasurement {
            glucose: 125,
            bmi: 29.0,
            age: 45,
            diabetes_pedigree: 0.9,
            ..Default::default()
        };
        assert!(contributing_factors(&m).is_empty());
    }

    #[test]
    fn test_bmi_threshold_inclusive() {
        let m = PatientMeasurement {
            bmi: 30.0,
            ..Default::default()
        };
        assert_eq!(contributing_factors(&m), vec![ContributingFactor::HighBmi]);
    }

    #[test]
    fn test_factors_independent_of_probability() {
        let m = PatientMeasurement {
            glucose: 130,
            ..Default::default()
        };
        let low = classify(0.1, &m);
        let high = classify(0.9, &m);
        assert_eq!(low.factors, high.factors);
        assert_eq!(low.label, RiskLabel::Low);
        assert_eq!(high.label, RiskLabel::High);
        assert_eq!(high.factor_labels(), vec!["Elevated glucose"]);
    }
}
