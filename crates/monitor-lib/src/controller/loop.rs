//! Monitoring loop
//!
//! Runs one iteration at a time: sample host metrics, score them, append
//! the score to the trend history, classify it and hand the frame to the
//! presenter. Transient failures degrade that frame only and the loop keeps
//! its cadence; a fatal error (the model cannot be loaded) stops the loop.

use super::LoopState;
use crate::collector::MetricsProvider;
use crate::error::MonitorError;
use crate::history::{HistoryBuffer, HISTORY_CAPACITY};
use crate::models::MetricsSnapshot;
use crate::observability::{MonitorMetrics, StructuredLogger};
use crate::predictor::Predictor;
use crate::presenter::{Frame, Presenter};
use crate::severity::{assess, Assessment};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Delay between the end of one iteration and the next sampling call
pub const DEFAULT_CYCLE_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the monitoring loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Delay after each iteration; the full period adds the provider's sampling window
    pub cycle_delay: Duration,
    /// Trend history capacity
    pub history_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycle_delay: DEFAULT_CYCLE_DELAY,
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

/// Owns the trend history and drives the monitoring cycle
pub struct LoopController {
    provider: Arc<dyn MetricsProvider>,
    predictor: Predictor,
    presenter: Arc<dyn Presenter>,
    history: HistoryBuffer,
    config: LoopConfig,
    metrics: MonitorMetrics,
    logger: StructuredLogger,
    state: LoopState,
    iteration: u64,
    fatal_error: Option<String>,
}

impl LoopController {
    /// Create a new loop controller
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        predictor: Predictor,
        presenter: Arc<dyn Presenter>,
        logger: StructuredLogger,
        config: LoopConfig,
    ) -> Self {
        Self {
            provider,
            predictor,
            presenter,
            history: HistoryBuffer::with_capacity(config.history_capacity),
            config,
            metrics: MonitorMetrics::new(),
            logger,
            state: LoopState::Idle,
            iteration: 0,
            fatal_error: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Number of iterations started so far
    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    /// Reason the loop stopped on its own, if it did
    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    /// Run until the shutdown signal fires, its sender is dropped or an
    /// iteration fails fatally
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            cycle_delay_ms = self.config.cycle_delay.as_millis() as u64,
            history_capacity = self.history.capacity(),
            "Starting monitoring loop"
        );
        self.state = LoopState::Running;

        while self.state == LoopState::Running {
            if shutdown_requested(&mut shutdown) {
                self.state = LoopState::Stopping;
                break;
            }

            // Sampling may block for its window; shutdown must not wait for it
            let cancelled = tokio::select! {
                _ = self.run_iteration() => false,
                _ = shutdown.recv() => true,
            };
            if cancelled {
                self.state = LoopState::Stopping;
                break;
            }
            if let Some(reason) = &self.fatal_error {
                error!(iteration = self.iteration, error = %reason, "Stopping monitoring loop");
                self.state = LoopState::Stopping;
                break;
            }

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(self.config.cycle_delay) => false,
                _ = shutdown.recv() => true,
            };
            if cancelled {
                self.state = LoopState::Stopping;
            }
        }

        info!(iterations = self.iteration, "Shutting down monitoring loop");
        self.state = LoopState::Stopped;
    }

    /// Execute one sample → render cycle and return the rendered frame
    pub async fn run_iteration(&mut self) -> Frame {
        self.iteration += 1;
        let iteration = self.iteration;

        let frame = match self.assess_once().await {
            Ok((snapshot, assessment, model_loaded_at)) => {
                self.logger.log_assessment(iteration, &assessment);
                Frame::Healthy {
                    iteration,
                    snapshot,
                    assessment,
                    history: self.history.snapshot(),
                    trend_mean: self.history.mean(),
                    model_loaded_at,
                }
            }
            Err(e) => {
                self.metrics.inc_failed_iterations();
                let reason = e.to_string();
                self.logger.log_iteration_failure(iteration, &reason);
                if e.is_fatal() {
                    self.fatal_error = Some(reason.clone());
                }
                Frame::Degraded {
                    iteration,
                    reason,
                    history: self.history.snapshot(),
                    trend_mean: self.history.mean(),
                }
            }
        };

        if let Err(e) = self.presenter.render(&frame) {
            warn!(iteration, error = %e, "Failed to render frame");
        }
        frame
    }

    /// Sample, score, record and classify; history is only touched on success
    async fn assess_once(&mut self) -> Result<(MetricsSnapshot, Assessment, String), MonitorError> {
        let start = Instant::now();
        let snapshot = self
            .provider
            .sample()
            .await
            .map_err(|e| MonitorError::Sampling(format!("{:#}", e)))?;
        self.metrics
            .observe_sampling_latency(start.elapsed().as_secs_f64());

        let score = self.predictor.predict(&snapshot)?;
        debug_assert!((0.0..=1.0).contains(&score), "score {} escaped clamp", score);
        let model_loaded_at = self.predictor.cache().get_handle()?.loaded_at().to_rfc3339();

        self.history.append(score);
        let assessment = assess(score);
        self.metrics.record_assessment(&assessment, self.history.len());

        debug!(
            cpu = snapshot.cpu,
            ram = snapshot.ram,
            disk = snapshot.disk,
            score,
            tier = %assessment.tier,
            "Iteration assessed"
        );
        Ok((snapshot, assessment, model_loaded_at))
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

/// Builder for creating the monitoring loop
pub struct LoopControllerBuilder {
    provider: Option<Arc<dyn MetricsProvider>>,
    predictor: Option<Predictor>,
    presenter: Option<Arc<dyn Presenter>>,
    logger: Option<StructuredLogger>,
    config: LoopConfig,
}

impl LoopControllerBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            provider: None,
            predictor: None,
            presenter: None,
            logger: None,
            config: LoopConfig::default(),
        }
    }

    /// Set the metrics provider
    pub fn provider(mut self, provider: Arc<dyn MetricsProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the predictor
    pub fn predictor(mut self, predictor: Predictor) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Set the presenter
    pub fn presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Set the structured logger
    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the delay between iterations
    pub fn cycle_delay(mut self, delay: Duration) -> Self {
        self.config.cycle_delay = delay;
        self
    }

    /// Set the history capacity
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Build the loop controller
    pub fn build(self) -> Result<LoopController> {
        let provider = self
            .provider
            .ok_or_else(|| anyhow::anyhow!("Metrics provider is required"))?;
        let predictor = self
            .predictor
            .ok_or_else(|| anyhow::anyhow!("Predictor is required"))?;
        let presenter = self
            .presenter
            .ok_or_else(|| anyhow::anyhow!("Presenter is required"))?;
        let logger = self
            .logger
            .unwrap_or_else(|| StructuredLogger::new("localhost"));

        Ok(LoopController::new(
            provider,
            predictor,
            presenter,
            logger,
            self.config,
        ))
    }
}

impl Default for LoopControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
