//! GlucoGuard Library
//!
//! Diabetes risk assessment from eight clinical measurements:
//! - feature assembly in a fixed order
//! - standardization and inference through externally trained artifacts
//! - High/Low risk labelling with rule-based contributing factors
//! - risk gauge and downloadable text/CSV reports
//!
//! Served over HTTP (interactive form + JSON API) and from the command line.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    classify, AssessmentOutcome, Gauge, GaugeBand, Report, ReportFormat, RiskPipeline, Theme,
};
pub use models::{
    AppConfig, AppError, AppResult, ContributingFactor, ErrorCode, FieldSpec, ModelConfig,
    PatientMeasurement, RiskAssessment, RiskLabel, FIELD_SPECS,
};
pub use providers::{Artifacts, DenseNetwork, RiskModel, Scaler, StandardScaler};
pub use utils::telemetry::{AssessmentTelemetry, TelemetryStats};
