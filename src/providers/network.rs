//! Dense Network Risk Model
//!
//! Forward pass over a stack of fully connected layers exported from the
//! trained classifier. Artifact layout (kernel is `[input][unit]`):
//!
//! ```json
//! { "layers": [
//!     { "kernel": [[...], ...], "bias": [...], "activation": "relu" },
//!     { "kernel": [[...], ...], "bias": [...], "activation": "sigmoid" }
//! ] }
//! ```
//!
//! A logistic regression is the one-layer case with a sigmoid activation.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::artifacts::{ensure_finite, read_json, RiskModel};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureVector, FEATURE_COUNT};

/// Layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Numerically stable logistic function
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// One fully connected layer
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    /// `kernel[i][j]`: weight from input `i` to unit `j`
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default = "default_activation")]
    pub activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Linear
}

impl DenseLayer {
    fn inputs(&self) -> usize {
        self.kernel.len()
    }

    fn units(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.kernel) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        for v in out.iter_mut() {
            *v = self.activation.apply(*v);
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct NetworkArtifact {
    layers: Vec<DenseLayer>,
}

/// Feed-forward classifier with a single probability output
#[derive(Debug, Clone)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Build and validate layer shapes
    pub fn new(layers: Vec<DenseLayer>) -> AppResult<Self> {
        if layers.is_empty() {
            return Err(AppError::artifact_invalid("model has no layers"));
        }

        let mut expected_inputs = FEATURE_COUNT;
        for (idx, layer) in layers.iter().enumerate() {
            if layer.inputs() != expected_inputs {
                return Err(AppError::shape_mismatch(format!(
                    "layer {} expects {} inputs, previous stage provides {}",
                    idx,
                    layer.inputs(),
                    expected_inputs
                )));
            }
            if let Some(row) = layer.kernel.iter().position(|r| r.len() != layer.units()) {
                return Err(AppError::shape_mismatch(format!(
                    "layer {} kernel row {} has {} weights, bias has {} units",
                    idx,
                    row,
                    layer.kernel[row].len(),
                    layer.units()
                )));
            }
            for row in &layer.kernel {
                ensure_finite(row, &format!("layer {} kernel", idx))?;
            }
            ensure_finite(&layer.bias, &format!("layer {} bias", idx))?;
            expected_inputs = layer.units();
        }

        if expected_inputs != 1 {
            return Err(AppError::shape_mismatch(format!(
                "final layer has {} units, expected a single probability",
                expected_inputs
            )));
        }

        Ok(Self { layers })
    }

    /// Single-layer logistic regression
    pub fn logistic(weights: FeatureVector, intercept: f64) -> AppResult<Self> {
        Self::new(vec![DenseLayer {
            kernel: weights.iter().map(|w| vec![*w]).collect(),
            bias: vec![intercept],
            activation: Activation::Sigmoid,
        }])
    }

    /// Load from a JSON artifact
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let artifact: NetworkArtifact = read_json(path)?;
        debug!("🧠 Model artifact read from {}", path.display());
        Self::new(artifact.layers)
    }

    /// Parse from a JSON string
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let artifact: NetworkArtifact = serde_json::from_str(raw)?;
        Self::new(artifact.layers)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl RiskModel for DenseNetwork {
    fn predict(&self, scaled: &FeatureVector) -> AppResult<f64> {
        let mut activations = scaled.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }

        match activations.as_slice() {
            [p] if p.is_finite() && (0.0..=1.0).contains(p) => Ok(*p),
            [p] => Err(AppError::out_of_range(*p)),
            _ => Err(AppError::inference_failed(format!(
                "model produced {} outputs",
                activations.len()
            ))),
        }
    }
}
