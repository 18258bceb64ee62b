//! Feature Vector Assembler
//!
//! Packs a `PatientMeasurement` into the fixed model input order:
//! pregnancies, glucose, blood pressure, skin thickness, insulin, BMI,
//! pedigree, age. No validation and no side effects.

use crate::models::types::{FeatureVector, PatientMeasurement};

impl PatientMeasurement {
    /// Ordered feature vector for the scaler/model
    #[inline]
    pub fn to_features(&self) -> FeatureVector {
        [
            self.pregnancies as f64,
            self.glucose as f64,
            self.blood_pressure as f64,
            self.skin_thickness as f64,
            self.insulin as f64,
            self.bmi,
            self.diabetes_pedigree,
            self.age as f64,
        ]
    }
}
