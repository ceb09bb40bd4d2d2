//! Load-once holder for the scoring model
//!
//! The cache is an explicit service object: construct it with a loader,
//! share it through `Arc`, and every `get_handle` call yields the same
//! handle. The first-load path is guarded so concurrent callers block on
//! a single load instead of racing.

use super::ScoringModel;
use crate::error::MonitorError;
use anyhow::Result;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Source of a scoring model
pub trait ModelLoader: Send + Sync {
    /// Load the model artifact into an inference-capable model
    fn load(&self) -> Result<Box<dyn ScoringModel>>;

    /// Location the model is loaded from, for reporting
    fn source(&self) -> &Path;
}

/// Loaded model plus the moment it was loaded
pub struct ModelHandle {
    model: Box<dyn ScoringModel>,
    loaded_at: DateTime<Utc>,
    source: PathBuf,
}

impl ModelHandle {
    pub fn model(&self) -> &dyn ScoringModel {
        self.model.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn version(&self) -> &str {
        self.model.version()
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("version", &self.version())
            .field("loaded_at", &self.loaded_at)
            .field("source", &self.source)
            .finish()
    }
}

/// Process-lifetime cache of the single model handle
pub struct ModelCache {
    loader: Box<dyn ModelLoader>,
    handle: OnceCell<Arc<ModelHandle>>,
}

impl ModelCache {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            handle: OnceCell::new(),
        }
    }

    /// Return the shared handle, loading the model on first use
    pub fn get_handle(&self) -> Result<Arc<ModelHandle>, MonitorError> {
        self.handle
            .get_or_try_init(|| {
                let source = self.loader.source().to_path_buf();
                let model = self.loader.load().map_err(|e| MonitorError::ModelLoad {
                    path: source.clone(),
                    reason: format!("{:#}", e),
                })?;
                let handle = ModelHandle {
                    model,
                    loaded_at: Utc::now(),
                    source,
                };
                info!(
                    version = %handle.version(),
                    source = %handle.source.display(),
                    "Scoring model loaded"
                );
                Ok::<_, MonitorError>(Arc::new(handle))
            })
            .cloned()
    }

    /// Whether the model has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }
}
