//! API Request Handlers

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::pipeline::{AssessmentOutcome, RiskPipeline};
use crate::core::report::{today, Report};
use crate::models::config::ServerConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FieldSpec, PatientMeasurement, FIELD_SPECS};
use crate::providers::artifacts::Artifacts;
use crate::utils::constants::MAX_BATCH_SIZE;
use crate::utils::telemetry::AssessmentTelemetry;

/// Shared application state
pub struct AppState {
    pub artifacts: Artifacts,
    pub telemetry: Arc<AssessmentTelemetry>,
    pub rate_limiter: RateLimiter,
    pub api_key: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(artifacts: Artifacts, config: &ServerConfig) -> Self {
        Self {
            artifacts,
            telemetry: Arc::new(AssessmentTelemetry::new(&config.stats_dir)),
            rate_limiter: RateLimiter::new(config.rate_limit.clone()),
            api_key: config.api_key.clone(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run one measurement through the pipeline and record telemetry
    pub fn assess(&self, measurement: &PatientMeasurement) -> AppResult<AssessmentOutcome> {
        let start = Instant::now();
        let result = RiskPipeline::from_artifacts(&self.artifacts).run(measurement);

        match &result {
            Ok(outcome) => self
                .telemetry
                .record_assessment(&outcome.assessment, start.elapsed().as_micros() as u64),
            Err(e) => {
                error!(code = e.code_str(), "❌ Assessment failed: {}", e);
                self.telemetry.record_failure();
            }
        }

        result
    }
}

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

fn bad_request(message: &str, start: Instant) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(
            ApiError::bad_request(message),
            elapsed_ms(start),
        )),
    )
}

/// File download with attachment headers
pub fn attachment(report: Report) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", report.filename());
    (
        [
            (header::CONTENT_TYPE, report.format.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.content,
    )
        .into_response()
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Field descriptors
// ============================================

pub async fn list_fields() -> Json<ApiResponse<Vec<FieldSpec>>> {
    let start = Instant::now();
    Json(ApiResponse::success(FIELD_SPECS.to_vec(), elapsed_ms(start)))
}

// ============================================
// Single Assessment
// ============================================

pub async fn assess(
    State(state): State<Arc<AppState>>,
    Json(measurement): Json<PatientMeasurement>,
) -> Result<Json<ApiResponse<AssessmentData>>, ApiFailure> {
    let start = Instant::now();

    let outcome = state
        .assess(&measurement)
        .map_err(|e| failure(&e, start))?;

    info!("🩺 {}", outcome.assessment.summary());

    Ok(Json(ApiResponse::success(
        AssessmentData::from(&outcome),
        elapsed_ms(start),
    )))
}

// ============================================
// Batch Assessment
// ============================================

pub async fn batch_assess(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAssessmentRequest>,
) -> Result<Json<ApiResponse<BatchAssessmentData>>, ApiFailure> {
    let start = Instant::now();

    // Validate request
    if req.measurements.is_empty() {
        return Err(bad_request("measurements array cannot be empty", start));
    }

    if req.measurements.len() > MAX_BATCH_SIZE {
        return Err(bad_request(
            &format!("Maximum {} measurements per batch request", MAX_BATCH_SIZE),
            start,
        ));
    }

    // Inference is CPU-only and fast; run in request order
    let results: Vec<BatchItemResult> = req
        .measurements
        .iter()
        .enumerate()
        .map(|(index, measurement)| match state.assess(measurement) {
            Ok(outcome) => BatchItemResult {
                index,
                status: "success".to_string(),
                assessment: Some(AssessmentData::from(&outcome)),
                error: None,
            },
            Err(e) => BatchItemResult {
                index,
                status: "error".to_string(),
                assessment: None,
                error: Some(ApiError::from(&e)),
            },
        })
        .collect();

    let total_high_risk = results
        .iter()
        .filter(|r| r.assessment.as_ref().is_some_and(|a| a.high_risk))
        .count();
    let total_failed = results.iter().filter(|r| r.assessment.is_none()).count();
    let total_processed = results.len() - total_failed;

    info!(
        "📦 Batch complete: {} processed, {} high risk, {} failed in {:.1}ms",
        total_processed,
        total_high_risk,
        total_failed,
        elapsed_ms(start)
    );

    let data = BatchAssessmentData {
        total_requested: req.measurements.len(),
        total_processed,
        total_high_risk,
        total_low_risk: total_processed - total_high_risk,
        total_failed,
        results,
        processing_time_ms: elapsed_ms(start),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Report Download
// ============================================

/// `POST /v1/report?format=txt|csv` with a JSON measurement body
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(measurement): Json<PatientMeasurement>,
) -> Result<Response, ApiFailure> {
    let start = Instant::now();

    let outcome = state
        .assess(&measurement)
        .map_err(|e| failure(&e, start))?;

    Ok(attachment(outcome.report(query.format, today())))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    if stats.failures > 0 {
        warn!("📉 {} assessments failed this session", stats.failures);
    }

    let data = StatsData {
        high_risk_rate_percent: stats.high_risk_rate(),
        stats,
        uptime_seconds: state.uptime_seconds(),
        rate_limited_clients: state.rate_limiter.tracked_clients(),
        api_version: "v1".to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
