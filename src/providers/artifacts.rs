//! Artifact Provider Contracts
//!
//! The scaler and the risk model are external, pre-fitted collaborators.
//! The pipeline only sees these two traits:
//! - `Scaler::transform(vector) -> vector` (same dimensionality)
//! - `RiskModel::predict(vector) -> probability`
//!
//! Both are loaded once at startup by `Artifacts::load` and then shared
//! read-only. Tests substitute deterministic stubs.

use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

use super::network::DenseNetwork;
use super::scaler::StandardScaler;
use crate::models::config::ModelConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::FeatureVector;

/// Fitted standardization transform
pub trait Scaler: Send + Sync {
    fn transform(&self, features: &FeatureVector) -> AppResult<FeatureVector>;
}

/// Pre-trained classifier: scaled features in, probability out
pub trait RiskModel: Send + Sync {
    fn predict(&self, scaled: &FeatureVector) -> AppResult<f64>;
}

/// Loaded model/scaler pair
pub struct Artifacts {
    pub scaler: Box<dyn Scaler>,
    pub model: Box<dyn RiskModel>,
}

impl Artifacts {
    /// Load both artifacts from disk. Any failure is fatal for the caller.
    pub fn load(config: &ModelConfig) -> AppResult<Self> {
        let start = Instant::now();

        let scaler = StandardScaler::from_file(&config.scaler_path).map_err(|e| {
            error!("❌ Scaler load failed: {}", e);
            e
        })?;
        let model = DenseNetwork::from_file(&config.model_path).map_err(|e| {
            error!("❌ Model load failed: {}", e);
            e
        })?;

        info!(
            "✅ Artifacts loaded in {:.1}ms ({} dense layers)",
            start.elapsed().as_secs_f64() * 1000.0,
            model.layer_count()
        );

        Ok(Self {
            scaler: Box::new(scaler),
            model: Box::new(model),
        })
    }

    /// Wrap already-constructed providers
    pub fn from_parts(scaler: impl Scaler + 'static, model: impl RiskModel + 'static) -> Self {
        Self {
            scaler: Box::new(scaler),
            model: Box::new(model),
        }
    }
}

/// Read and deserialize a JSON artifact
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| AppError::artifact_missing(path, e))?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::with_source(
            crate::models::errors::ErrorCode::ArtifactInvalid,
            format!("Malformed artifact {}", path.display()),
            e,
        )
    })
}

/// Check every value is finite
pub(crate) fn ensure_finite(values: &[f64], what: &str) -> AppResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(AppError::artifact_invalid(format!(
            "{} contains a non-finite value at index {}",
            what, idx
        ))),
        None => Ok(()),
    }
}
