//! Standard Scaler Provider
//!
//! Applies a previously fitted standardization, `(x - mean) / scale`, per
//! feature. The artifact is the JSON export of a fitted standard scaler:
//!
//! ```json
//! { "mean": [8 values], "scale": [8 values], "feature_names": [optional] }
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::artifacts::{ensure_finite, read_json, Scaler};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Fitted per-feature standardization
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: FeatureVector,
    scale: FeatureVector,
}

impl StandardScaler {
    /// Build from fitted parameters
    pub fn new(mean: FeatureVector, scale: FeatureVector) -> AppResult<Self> {
        ensure_finite(&mean, "scaler mean")?;
        ensure_finite(&scale, "scaler scale")?;
        if let Some(idx) = scale.iter().position(|s| *s == 0.0) {
            return Err(AppError::artifact_invalid(format!(
                "scaler scale for '{}' is zero",
                FEATURE_NAMES[idx]
            )));
        }
        Ok(Self { mean, scale })
    }

    /// Load from a JSON artifact
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let artifact: ScalerArtifact = read_json(path)?;
        debug!("📐 Scaler artifact read from {}", path.display());
        Self::from_artifact(artifact)
    }

    /// Parse from a JSON string
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let artifact: ScalerArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ScalerArtifact) -> AppResult<Self> {
        if let Some(names) = &artifact.feature_names {
            let matches = names.len() == FEATURE_COUNT
                && names.iter().zip(FEATURE_NAMES.iter()).all(|(a, b)| a == b);
            if !matches {
                return Err(AppError::shape_mismatch(format!(
                    "scaler was fit on features {:?}, expected {:?}",
                    names, FEATURE_NAMES
                )));
            }
        }

        let mean = to_fixed(&artifact.mean, "mean")?;
        let scale = to_fixed(&artifact.scale, "scale")?;
        Self::new(mean, scale)
    }

    pub fn mean(&self) -> &FeatureVector {
        &self.mean
    }

    pub fn scale(&self) -> &FeatureVector {
        &self.scale
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &FeatureVector) -> AppResult<FeatureVector> {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (features[i] - self.mean[i]) / self.scale[i];
        }
        if out.iter().any(|v| !v.is_finite()) {
            return Err(AppError::inference_failed("scaled features are not finite"));
        }
        Ok(out)
    }
}

fn to_fixed(values: &[f64], what: &str) -> AppResult<FeatureVector> {
    values.try_into().map_err(|_| {
        AppError::shape_mismatch(format!(
            "scaler {} has {} values, expected {}",
            what,
            values.len(),
            FEATURE_COUNT
        ))
    })
}
