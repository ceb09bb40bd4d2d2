//! ONNX inference using tract
//!
//! Loads the 3-input / 1-output stability model and runs it on
//! normalized host readings.

use super::{ModelLoader, ScoringModel};
use crate::error::MonitorError;
use crate::models::FeatureVector;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Default location of the model artifact
pub const DEFAULT_MODEL_PATH: &str = "system_health_model.onnx";

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Scoring model backed by an optimized tract plan
pub struct OnnxModel {
    plan: TractModel,
    version: String,
}

impl OnnxModel {
    /// Load and optimize an ONNX model from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("Failed to parse ONNX model at {}", path.display()))?
            .with_input_fact(0, f32::fact([1, FeatureVector::LEN]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        let version = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self { plan, version })
    }

    fn run(&self, features: &FeatureVector) -> Result<f32> {
        let input: Tensor = tract_ndarray::arr2(&[features.to_array()]).into();
        let result = self.plan.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output.to_array_view::<f32>()?;
        view.iter().next().copied().context("Model output is empty")
    }
}

impl ScoringModel for OnnxModel {
    fn infer(&self, features: &FeatureVector) -> Result<f32, MonitorError> {
        self.run(features)
            .map_err(|e| MonitorError::Inference(format!("{:#}", e)))
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Loads an `OnnxModel` from a fixed path
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    path: PathBuf,
}

impl OnnxModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for OnnxModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self) -> Result<Box<dyn ScoringModel>> {
        if !self.path.is_file() {
            anyhow::bail!("Model artifact not found");
        }
        Ok(Box::new(OnnxModel::from_path(&self.path)?))
    }

    fn source(&self) -> &Path {
        &self.path
    }
}
