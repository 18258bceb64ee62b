//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::gauge::{Gauge, Theme};
use crate::core::pipeline::AssessmentOutcome;
use crate::core::report::ReportFormat;
use crate::models::errors::AppError;
use crate::models::types::{PatientMeasurement, RiskLabel};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "API_BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: "API_UNAUTHORIZED".to_string(),
            message: "Invalid or missing API key".to_string(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

// ============================================
// Assessment
// ============================================

#[derive(Debug, Serialize)]
pub struct AssessmentData {
    pub measurement: PatientMeasurement,
    /// Model probability in [0,1]
    pub probability: f64,
    /// Probability as a percentage, one decimal
    pub risk_percent: f64,
    pub label: RiskLabel,
    pub high_risk: bool,
    pub factors: Vec<String>,
    /// Factor prose or the no-factors message
    pub explanation: String,
    pub gauge: Gauge,
}

impl From<&AssessmentOutcome> for AssessmentData {
    fn from(outcome: &AssessmentOutcome) -> Self {
        let a = &outcome.assessment;
        Self {
            measurement: outcome.measurement,
            probability: a.probability,
            risk_percent: (a.percent() * 10.0).round() / 10.0,
            label: a.label,
            high_risk: a.is_high_risk(),
            factors: a.factor_labels().into_iter().map(String::from).collect(),
            explanation: a.explanation(),
            gauge: outcome.gauge.clone(),
        }
    }
}

// ============================================
// Batch Assessment
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchAssessmentRequest {
    pub measurements: Vec<PatientMeasurement>,
}

#[derive(Debug, Serialize)]
pub struct BatchAssessmentData {
    pub total_requested: usize,
    pub total_processed: usize,
    pub total_high_risk: usize,
    pub total_low_risk: usize,
    pub total_failed: usize,
    pub results: Vec<BatchItemResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<AssessmentData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

// ============================================
// Reports / page queries
// ============================================

#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize, Default)]
pub struct ThemeQuery {
    #[serde(default)]
    pub theme: Theme,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: crate::utils::telemetry::TelemetryStats,
    pub high_risk_rate_percent: f64,
    pub uptime_seconds: u64,
    pub rate_limited_clients: usize,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
