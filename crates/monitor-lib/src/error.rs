//! Error taxonomy for the monitoring pipeline
//!
//! `ModelLoad` is fatal: it aborts startup and stops a running loop. Every
//! other variant is a transient per-iteration failure that the loop contains.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to load scoring model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("metrics sampling failed: {0}")]
    Sampling(String),

    #[error("{metric} reading {value} is outside 0-100")]
    MetricOutOfRange { metric: &'static str, value: f32 },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced non-finite output {0}")]
    NonFiniteScore(f32),
}

impl MonitorError {
    /// Whether the error should stop the monitor instead of degrading one iteration
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::ModelLoad { .. })
    }
}
