//! Type definitions for GlucoGuard
//! Patient measurements, field descriptors and the derived risk assessment

use serde::{Deserialize, Serialize};

use crate::utils::constants::{HIGH_RISK_LABEL, LOW_RISK_LABEL};

/// Number of model input features
pub const FEATURE_COUNT: usize = 8;

/// Ordered, fixed-length model input
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Canonical feature order. The external scaler and model were fit
/// against exactly this ordering.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "pregnancies",
    "glucose",
    "blood_pressure",
    "skin_thickness",
    "insulin",
    "bmi",
    "diabetes_pedigree",
    "age",
];

/// Eight clinical measurements for one patient.
///
/// Built fresh for every assessment request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientMeasurement {
    /// Number of pregnancies
    pub pregnancies: u32,
    /// Plasma glucose concentration (mg/dL)
    pub glucose: u32,
    /// Diastolic blood pressure (mm Hg)
    pub blood_pressure: u32,
    /// Triceps skin fold thickness (mm)
    pub skin_thickness: u32,
    /// 2-hour serum insulin (mu U/ml)
    pub insulin: u32,
    /// Body mass index
    pub bmi: f64,
    /// Diabetes pedigree function (family history score, unbounded)
    pub diabetes_pedigree: f64,
    /// Age in years
    pub age: u32,
}

impl Default for PatientMeasurement {
    /// Widget defaults
    fn default() -> Self {
        Self {
            pregnancies: 1,
            glucose: 120,
            blood_pressure: 70,
            skin_thickness: 20,
            insulin: 80,
            bmi: 25.0,
            diabetes_pedigree: 0.5,
            age: 30,
        }
    }
}

impl PatientMeasurement {
    /// Clamp every field into its widget range.
    ///
    /// The form and the CLI use this to reproduce slider semantics; the JSON
    /// API passes values through untouched.
    pub fn clamped(&self) -> Self {
        let int = |spec: &FieldSpec, v: u32| (v as f64).clamp(spec.min, spec.max) as u32;
        let real = |spec: &FieldSpec, v: f64| {
            if v.is_nan() {
                spec.default
            } else {
                v.clamp(spec.min, spec.max)
            }
        };

        Self {
            pregnancies: int(&FIELD_SPECS[0], self.pregnancies),
            glucose: int(&FIELD_SPECS[1], self.glucose),
            blood_pressure: int(&FIELD_SPECS[2], self.blood_pressure),
            skin_thickness: int(&FIELD_SPECS[3], self.skin_thickness),
            insulin: int(&FIELD_SPECS[4], self.insulin),
            bmi: real(&FIELD_SPECS[5], self.bmi),
            diabetes_pedigree: real(&FIELD_SPECS[6], self.diabetes_pedigree),
            age: int(&FIELD_SPECS[7], self.age),
        }
    }
}

// ============================================
// Field descriptors
// ============================================

/// Whether a field is entered as a whole number or a real
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Real,
}

/// Display and input-range metadata for one measurement field.
///
/// Ranges bound the input widgets only; the model accepts any 8-vector.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl FieldSpec {
    /// Label with unit suffix, e.g. "Glucose (mg/dL)"
    pub fn display_label(&self) -> String {
        if self.unit.is_empty() {
            self.label.to_string()
        } else {
            format!("{} ({})", self.label, self.unit)
        }
    }
}

/// Field table in feature order
pub const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        key: "pregnancies",
        label: "Pregnancies",
        unit: "",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 1.0,
        step: 1.0,
    },
    FieldSpec {
        key: "glucose",
        label: "Glucose",
        unit: "mg/dL",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 200.0,
        default: 120.0,
        step: 1.0,
    },
    FieldSpec {
        key: "blood_pressure",
        label: "Blood Pressure",
        unit: "mm Hg",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 140.0,
        default: 70.0,
        step: 1.0,
    },
    FieldSpec {
        key: "skin_thickness",
        label: "Skin Thickness",
        unit: "mm",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 100.0,
        default: 20.0,
        step: 1.0,
    },
    FieldSpec {
        key: "insulin",
        label: "Insulin",
        unit: "mu U/ml",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 900.0,
        default: 80.0,
        step: 1.0,
    },
    FieldSpec {
        key: "bmi",
        label: "BMI",
        unit: "",
        kind: FieldKind::Real,
        min: 0.0,
        max: 60.0,
        default: 25.0,
        step: 0.1,
    },
    FieldSpec {
        key: "diabetes_pedigree",
        label: "Diabetes Pedigree Function",
        unit: "",
        kind: FieldKind::Real,
        min: 0.0,
        max: 2.5,
        default: 0.5,
        step: 0.01,
    },
    FieldSpec {
        key: "age",
        label: "Age",
        unit: "years",
        kind: FieldKind::Integer,
        min: 10.0,
        max: 100.0,
        default: 30.0,
        step: 1.0,
    },
];

// ============================================
// Risk assessment
// ============================================

/// Binary risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Low Risk")]
    Low,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::High => HIGH_RISK_LABEL,
            RiskLabel::Low => LOW_RISK_LABEL,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLabel::High => "🔴",
            RiskLabel::Low => "✅",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based explanation attached to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributingFactor {
    ElevatedGlucose,
    HighBmi,
    AgeOver45,
    StrongFamilyHistory,
}

impl ContributingFactor {
    pub fn label(&self) -> &'static str {
        use crate::utils::constants::*;
        match self {
            ContributingFactor::ElevatedGlucose => FACTOR_ELEVATED_GLUCOSE,
            ContributingFactor::HighBmi => FACTOR_HIGH_BMI,
            ContributingFactor::AgeOver45 => FACTOR_AGE,
            ContributingFactor::StrongFamilyHistory => FACTOR_FAMILY_HISTORY,
        }
    }

    /// Stable snake_case key, used for statistics
    pub fn key(&self) -> &'static str {
        match self {
            ContributingFactor::ElevatedGlucose => "elevated_glucose",
            ContributingFactor::HighBmi => "high_bmi",
            ContributingFactor::AgeOver45 => "age_over_45",
            ContributingFactor::StrongFamilyHistory => "strong_family_history",
        }
    }
}

/// Derived, read-only result of one assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Model probability in [0,1]
    pub probability: f64,
    pub label: RiskLabel,
    /// Fired factor rules, in declaration order
    pub factors: Vec<ContributingFactor>,
}

impl RiskAssessment {
    /// Probability as a percentage (gauge needle value)
    pub fn percent(&self) -> f64 {
        crate::utils::constants::to_percent(self.probability)
    }

    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::High
    }

    pub fn factor_labels(&self) -> Vec<&'static str> {
        self.factors.iter().map(|f| f.label()).collect()
    }

    /// Factor list as prose, or the fixed no-factors message
    pub fn explanation(&self) -> String {
        if self.factors.is_empty() {
            crate::utils::constants::NO_FACTORS_MESSAGE.to_string()
        } else {
            self.factor_labels().join(", ")
        }
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "{} {} of Diabetes — {:.1}%",
            self.label.emoji(),
            self.label,
            self.percent()
        )
    }
}
