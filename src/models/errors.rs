//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so logs and API responses can be
//! correlated without parsing messages.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ART_xxx: model/scaler artifact errors (fatal at startup)
//! - INF_xxx: inference errors (surfaced per request)
//! - REPORT_xxx: report export errors
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Artifact Errors (1xx) - fatal at startup
    // ============================================
    /// Model or scaler file missing / unreadable
    ArtifactMissing,
    /// Artifact file is not valid JSON or has invalid values
    ArtifactInvalid,
    /// Artifact dimensions do not match the 8-feature contract
    ArtifactShapeMismatch,

    // ============================================
    // Inference Errors (2xx)
    // ============================================
    /// Scaler or model raised during a request
    InferenceFailed,
    /// Model returned a value outside [0,1] or non-finite
    InferenceOutOfRange,

    // ============================================
    // Report Errors (3xx)
    // ============================================
    /// Writing the report file failed
    ReportExportFailed,

    // ============================================
    // API Errors (4xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Unauthorized (invalid API key)
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (5xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArtifactMissing => "ART_MISSING",
            Self::ArtifactInvalid => "ART_INVALID",
            Self::ArtifactShapeMismatch => "ART_SHAPE_MISMATCH",

            Self::InferenceFailed => "INF_FAILED",
            Self::InferenceOutOfRange => "INF_OUT_OF_RANGE",

            Self::ReportExportFailed => "REPORT_EXPORT_FAILED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ConfigInvalidValue => 400,
            Self::ApiUnauthorized => 401,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }

    /// Startup-fatal errors: the service cannot serve any assessment
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ArtifactMissing | Self::ArtifactInvalid | Self::ArtifactShapeMismatch
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Artifact file missing or unreadable
    pub fn artifact_missing(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::ArtifactMissing,
            format!("Cannot read artifact {}", path.display()),
            err,
        )
    }

    /// Artifact content invalid
    pub fn artifact_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArtifactInvalid, msg)
    }

    /// Artifact dimensions wrong
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArtifactShapeMismatch, msg)
    }

    /// Inference failed
    pub fn inference_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InferenceFailed, msg)
    }

    /// Model output outside [0,1]
    pub fn out_of_range(probability: f64) -> Self {
        Self::new(
            ErrorCode::InferenceOutOfRange,
            format!("Model returned {} which is not a probability in [0,1]", probability),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::ReportExportFailed, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ArtifactInvalid, "JSON parse error", err)
    }
}
