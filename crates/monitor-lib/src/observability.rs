//! Observability infrastructure for the host monitor
//!
//! Provides:
//! - Prometheus metrics (iteration outcomes, score, tier, latencies, model load time)
//! - Structured JSON logging with tracing

use crate::models::HostInfo;
use crate::severity::{Assessment, SeverityTier};
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct MonitorMetricsInner {
    iterations: IntCounter,
    failed_iterations: IntCounter,
    instability_score: Gauge,
    severity_level: IntGauge,
    history_len: IntGauge,
    inference_latency_seconds: Histogram,
    sampling_latency_seconds: Histogram,
    model_loaded_timestamp: IntGauge,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            iterations: register_int_counter!(
                "host_monitor_iterations_total",
                "Total number of completed monitoring iterations"
            )
            .expect("Failed to register iterations_total"),

            failed_iterations: register_int_counter!(
                "host_monitor_failed_iterations_total",
                "Total number of iterations that produced a degraded frame"
            )
            .expect("Failed to register failed_iterations_total"),

            instability_score: register_gauge!(
                "host_monitor_instability_score",
                "Most recent clamped instability score"
            )
            .expect("Failed to register instability_score"),

            severity_level: register_int_gauge!(
                "host_monitor_severity_level",
                "Most recent severity tier (0 stable, 1 caution, 2 critical)"
            )
            .expect("Failed to register severity_level"),

            history_len: register_int_gauge!(
                "host_monitor_history_len",
                "Number of scores in the trend history"
            )
            .expect("Failed to register history_len"),

            inference_latency_seconds: register_histogram!(
                "host_monitor_inference_latency_seconds",
                "Time spent running model inference",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            sampling_latency_seconds: register_histogram!(
                "host_monitor_sampling_latency_seconds",
                "Time spent sampling host metrics, including the sampling window",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register sampling_latency_seconds"),

            model_loaded_timestamp: register_int_gauge!(
                "host_monitor_model_loaded_timestamp_seconds",
                "Unix time at which the scoring model was loaded"
            )
            .expect("Failed to register model_loaded_timestamp_seconds"),
        }
    }
}

/// Monitor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new)
    }

    /// Record a completed iteration with its score and tier
    pub fn record_assessment(&self, assessment: &Assessment, history_len: usize) {
        let inner = self.inner();
        inner.iterations.inc();
        inner.instability_score.set(assessment.score as f64);
        inner.severity_level.set(assessment.tier.level());
        inner.history_len.set(history_len as i64);
    }

    /// Record an iteration that failed before producing a score
    pub fn inc_failed_iterations(&self) {
        self.inner().failed_iterations.inc();
    }

    pub fn observe_inference_latency(&self, duration_secs: f64) {
        self.inner().inference_latency_seconds.observe(duration_secs);
    }

    pub fn observe_sampling_latency(&self, duration_secs: f64) {
        self.inner().sampling_latency_seconds.observe(duration_secs);
    }

    pub fn set_model_loaded_at(&self, unix_secs: i64) {
        self.inner().model_loaded_timestamp.set(unix_secs);
    }

    pub fn iterations(&self) -> u64 {
        self.inner().iterations.get()
    }

    pub fn failed_iterations(&self) -> u64 {
        self.inner().failed_iterations.get()
    }
}

/// Structured logger for monitor events
///
/// Provides consistent JSON-formatted logging for lifecycle events,
/// assessments and iteration failures.
#[derive(Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Log monitor startup with the host description
    pub fn log_startup(&self, version: &str, host_info: &HostInfo) {
        info!(
            event = "monitor_started",
            host = %self.host,
            monitor_version = %version,
            os_name = ?host_info.os_name,
            os_version = ?host_info.os_version,
            cpu_brand = ?host_info.cpu_brand,
            cpu_count = host_info.cpu_count,
            "Host monitor started"
        );
    }

    /// Log the one-time model load
    pub fn log_model_loaded(&self, model_version: &str, source: &str, loaded_at: &str) {
        info!(
            event = "model_loaded",
            host = %self.host,
            model_version = %model_version,
            source = %source,
            loaded_at = %loaded_at,
            "Scoring model active"
        );
    }

    /// Log an iteration's assessment; critical tiers are raised to warn
    pub fn log_assessment(&self, iteration: u64, assessment: &Assessment) {
        match assessment.tier {
            SeverityTier::Critical => {
                warn!(
                    event = "assessment",
                    host = %self.host,
                    iteration = iteration,
                    tier = %assessment.tier,
                    score = assessment.score,
                    message = %assessment.primary,
                    "Critical instability detected"
                );
            }
            _ => {
                info!(
                    event = "assessment",
                    host = %self.host,
                    iteration = iteration,
                    tier = %assessment.tier,
                    score = assessment.score,
                    "Instability assessed"
                );
            }
        }
    }

    /// Log a contained per-iteration failure
    pub fn log_iteration_failure(&self, iteration: u64, reason: &str) {
        warn!(
            event = "iteration_failed",
            host = %self.host,
            iteration = iteration,
            reason = %reason,
            "Monitoring iteration degraded, continuing"
        );
    }

    /// Log monitor shutdown with lifetime totals
    pub fn log_shutdown(&self, reason: &str, iterations: u64, failed_iterations: u64) {
        info!(
            event = "monitor_shutdown",
            host = %self.host,
            reason = %reason,
            iterations = iterations,
            failed_iterations = failed_iterations,
            "Host monitor shutting down"
        );
    }
}
