//! Instability scoring engine

mod cache;
mod inference;
mod output;

pub use cache::{ModelCache, ModelHandle, ModelLoader};
pub use inference::{OnnxModel, OnnxModelLoader, DEFAULT_MODEL_PATH};
pub use output::{clamp_score, confidence_percent, tier_percent};

use crate::error::MonitorError;
use crate::models::{FeatureVector, MetricsSnapshot};
use crate::observability::MonitorMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
pub const SLOW_INFERENCE_THRESHOLD: Duration = Duration::from_millis(50);

/// Trait for scoring model implementations
pub trait ScoringModel: Send + Sync {
    /// Run inference and return the raw, unclamped output
    fn infer(&self, features: &FeatureVector) -> Result<f32, MonitorError>;

    /// Version label of the loaded model
    fn version(&self) -> &str;
}

/// Turns snapshots into clamped scores using the cached model
pub struct Predictor {
    cache: Arc<ModelCache>,
    metrics: MonitorMetrics,
}

impl Predictor {
    pub fn new(cache: Arc<ModelCache>, metrics: MonitorMetrics) -> Self {
        Self { cache, metrics }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Score a snapshot; the result is always finite and within [0, 1]
    pub fn predict(&self, snapshot: &MetricsSnapshot) -> Result<f32, MonitorError> {
        let features = FeatureVector::from_snapshot(snapshot)?;
        let handle = self.cache.get_handle()?;

        let start = Instant::now();
        let raw = handle.model().infer(&features)?;
        let elapsed = start.elapsed();
        self.metrics.observe_inference_latency(elapsed.as_secs_f64());

        if elapsed > SLOW_INFERENCE_THRESHOLD {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded latency target");
        }

        if !raw.is_finite() {
            return Err(MonitorError::NonFiniteScore(raw));
        }

        let score = clamp_score(raw);
        debug!(raw, score, model_version = %handle.version(), "Inference completed");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::Mutex;

    /// Model double returning a fixed raw output and recording its inputs
    struct FixedModel {
        raw: f32,
        seen: Arc<Mutex<Vec<FeatureVector>>>,
    }

    impl ScoringModel for FixedModel {
        fn infer(&self, features: &FeatureVector) -> Result<f32, MonitorError> {
            self.seen.lock().unwrap().push(*features);
            Ok(self.raw)
        }

        fn version(&self) -> &str {
            "test"
        }
    }

    struct FixedLoader {
        raw: f32,
        seen: Arc<Mutex<Vec<FeatureVector>>>,
    }

    impl ModelLoader for FixedLoader {
        fn load(&self) -> Result<Box<dyn ScoringModel>> {
            Ok(Box::new(FixedModel {
                raw: self.raw,
                seen: self.seen.clone(),
            }))
        }

        fn source(&self) -> &std::path::Path {
            std::path::Path::new("memory")
        }
    }

    fn predictor_with(raw: f32) -> (Predictor, Arc<Mutex<Vec<FeatureVector>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cache = Arc::new(ModelCache::new(FixedLoader {
            raw,
            seen: seen.clone(),
        }));
        (Predictor::new(cache, MonitorMetrics::new()), seen)
    }

    #[test]
    fn test_score_passes_through_in_range() {
        let (predictor, seen) = predictor_with(0.95);
        let score = predictor.predict(&MetricsSnapshot::new(90.0, 85.0, 40.0)).unwrap();

        assert_eq!(score, 0.95);
        let inputs = seen.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].to_array(), [0.9, 0.85, 0.4]);
    }

    #[test]
    fn test_score_clamped_high() {
        let (predictor, _) = predictor_with(1.7);
        let score = predictor.predict(&MetricsSnapshot::new(50.0, 50.0, 50.0)).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_score_clamped_low() {
        let (predictor, _) = predictor_with(-0.3);
        let score = predictor.predict(&MetricsSnapshot::new(50.0, 50.0, 50.0)).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_non_finite_output_rejected() {
        let (predictor, _) = predictor_with(f32::NAN);
        let err = predictor.predict(&MetricsSnapshot::new(50.0, 50.0, 50.0)).unwrap_err();
        assert!(matches!(err, MonitorError::NonFiniteScore(_)));

        let (predictor, _) = predictor_with(f32::INFINITY);
        let err = predictor.predict(&MetricsSnapshot::new(50.0, 50.0, 50.0)).unwrap_err();
        assert!(matches!(err, MonitorError::NonFiniteScore(_)));
    }

    #[test]
    fn test_out_of_range_metric_never_reaches_model() {
        let (predictor, seen) = predictor_with(0.2);
        let err = predictor.predict(&MetricsSnapshot::new(150.0, 50.0, 50.0)).unwrap_err();

        assert!(matches!(err, MonitorError::MetricOutOfRange { .. }));
        assert!(seen.lock().unwrap().is_empty());
    }
}
