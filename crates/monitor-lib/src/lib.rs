//! Host instability monitor library
//!
//! This crate provides the core functionality for:
//! - Host metrics sampling (CPU, RAM, disk)
//! - Cached ML scoring of normalized readings
//! - Bounded score history and severity classification
//! - The monitoring loop and its presenters
//! - Observability (Prometheus metrics and structured logging)

pub mod collector;
pub mod controller;
pub mod error;
pub mod history;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod presenter;
pub mod severity;

pub use controller::{LoopController, LoopControllerBuilder, LoopState};
pub use error::MonitorError;
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
pub use severity::{assess, classify, Assessment, SeverityTier};
