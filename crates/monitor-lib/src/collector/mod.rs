//! Host metrics collection
//!
//! This module provides the provider abstraction the monitoring loop samples
//! from, plus a `sysinfo`-backed implementation reading CPU, RAM and disk
//! utilization of the local machine.

mod host;

pub use host::{host_info, SysinfoProvider, DEFAULT_DISK_MOUNT, DEFAULT_SAMPLE_WINDOW};

use crate::models::MetricsSnapshot;
use anyhow::Result;

pub use async_trait::async_trait;

/// Trait for metrics provider implementations
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Capture one snapshot; may block for the provider's sampling window
    async fn sample(&self) -> Result<MetricsSnapshot>;
}
