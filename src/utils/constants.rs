//! Constants Module - Single Source of Truth
//!
//! Thresholds, file names and display strings shared by the pipeline,
//! the report renderer and both binaries live here. Other modules import
//! them instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "GlucoGuard AI";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page subtitle
pub const APP_TAGLINE: &str = "Intelligent Diabetes Risk Prediction";

/// Footer caption shown on the page and at the end of the text report
pub const APP_FOOTER: &str = "Generated by GlucoGuard AI (Rust + axum)";

// ============================================
// DECISION BOUNDARY
// ============================================

/// Probabilities strictly above this value are labelled "High Risk"
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

pub const HIGH_RISK_LABEL: &str = "High Risk";
pub const LOW_RISK_LABEL: &str = "Low Risk";

// ============================================
// CONTRIBUTING FACTOR HEURISTICS
// ============================================
// Evaluated against the raw inputs, independent of the model.

/// glucose >= 126 mg/dL
pub const GLUCOSE_ELEVATED_MG_DL: u32 = 126;
/// BMI >= 30
pub const BMI_HIGH: f64 = 30.0;
/// age > 45 years
pub const AGE_RISK_YEARS: u32 = 45;
/// pedigree function > 0.9
pub const PEDIGREE_STRONG: f64 = 0.9;

pub const FACTOR_ELEVATED_GLUCOSE: &str = "Elevated glucose";
pub const FACTOR_HIGH_BMI: &str = "High BMI";
pub const FACTOR_AGE: &str = "Age > 45";
pub const FACTOR_FAMILY_HISTORY: &str = "Strong family history";

/// Rendered when no factor rule fires
pub const NO_FACTORS_MESSAGE: &str = "No major alerting factors detected.";

// ============================================
// GAUGE
// ============================================

pub const GAUGE_TITLE: &str = "Diabetes Risk (%)";
pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 100.0;
/// Threshold marker drawn on the gauge (percent)
pub const GAUGE_THRESHOLD_PCT: f64 = 50.0;
/// Below this percentage the gauge is green
pub const GAUGE_AMBER_FROM_PCT: f64 = 40.0;
/// At or above this percentage the gauge is red
pub const GAUGE_RED_FROM_PCT: f64 = 70.0;

pub const COLOR_GREEN: &str = "#22c55e";
pub const COLOR_AMBER: &str = "#f59e0b";
pub const COLOR_RED: &str = "#ef4444";

// ============================================
// REPORTS
// ============================================

pub const TEXT_REPORT_FILENAME: &str = "GlucoGuard_Report.txt";
pub const CSV_REPORT_FILENAME: &str = "diabetes_report.csv";
pub const TEXT_REPORT_MIME: &str = "text/plain; charset=utf-8";
pub const CSV_REPORT_MIME: &str = "text/csv; charset=utf-8";

// ============================================
// ARTIFACTS & SERVER DEFAULTS
// ============================================

pub const DEFAULT_MODEL_PATH: &str = "artifacts/diabetes_model.json";
pub const DEFAULT_SCALER_PATH: &str = "artifacts/scaler.json";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATS_DIR: &str = "./telemetry";

/// Requests per minute per API key / client address
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Maximum measurements accepted by the batch endpoint
pub const MAX_BATCH_SIZE: usize = 100;

/// Check if a probability crosses the high-risk boundary
#[inline]
pub fn is_high_risk(probability: f64) -> bool {
    probability > HIGH_RISK_THRESHOLD
}

/// Convert a probability in [0,1] to a percentage
#[inline]
pub fn to_percent(probability: f64) -> f64 {
    probability * 100.0
}
