//! Core data models for the host monitor

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};

/// Upper bound of a utilization percentage
pub const MAX_PERCENT: f32 = 100.0;

/// Point-in-time host utilization reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// CPU utilization averaged over the sampling window (0-100)
    pub cpu: f32,
    /// RAM utilization (0-100)
    pub ram: f32,
    /// Disk space utilization of the monitored mount (0-100)
    pub disk: f32,
    /// Unix timestamp of capture in seconds
    pub timestamp: i64,
}

impl MetricsSnapshot {
    pub fn new(cpu: f32, ram: f32, disk: f32) -> Self {
        Self {
            cpu,
            ram,
            disk,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Model input: snapshot scaled to [0, 1], fed positionally as cpu, ram, disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub cpu: f32,
    pub ram: f32,
    pub disk: f32,
}

impl FeatureVector {
    /// Number of model inputs
    pub const LEN: usize = 3;

    /// Normalize a snapshot, rejecting readings outside [0, 100]
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Result<Self, MonitorError> {
        Ok(Self {
            cpu: normalize("cpu", snapshot.cpu)?,
            ram: normalize("ram", snapshot.ram)?,
            disk: normalize("disk", snapshot.disk)?,
        })
    }

    /// Positional model input
    pub fn to_array(&self) -> [f32; Self::LEN] {
        [self.cpu, self.ram, self.disk]
    }
}

fn normalize(metric: &'static str, value: f32) -> Result<f32, MonitorError> {
    if !value.is_finite() || !(0.0..=MAX_PERCENT).contains(&value) {
        return Err(MonitorError::MetricOutOfRange { metric, value });
    }
    Ok(value / MAX_PERCENT)
}

/// Static host description reported at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub host_name: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub cpu_brand: Option<String>,
    pub cpu_count: usize,
}
