//! Local host metrics via sysinfo
//!
//! CPU utilization is averaged over a sampling window: usage counters are
//! refreshed, the provider waits for the window, then refreshes again.

use super::{async_trait, MetricsProvider};
use crate::models::{HostInfo, MetricsSnapshot, MAX_PERCENT};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::sync::Mutex;
use tracing::debug;

/// Default CPU sampling window
pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Default mount point whose usage is reported as the disk reading
pub const DEFAULT_DISK_MOUNT: &str = "/";

/// Metrics provider reading the local machine
pub struct SysinfoProvider {
    system: Mutex<System>,
    disk_mount: PathBuf,
    sample_window: Duration,
}

impl SysinfoProvider {
    pub fn new(disk_mount: impl Into<PathBuf>, sample_window: Duration) -> Self {
        let mut system = System::new();
        // Baseline for the first interval average
        system.refresh_cpu_usage();
        Self {
            system: Mutex::new(system),
            disk_mount: disk_mount.into(),
            sample_window: sample_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    pub fn sample_window(&self) -> Duration {
        self.sample_window
    }

    fn memory_percent(system: &System) -> Result<f32> {
        let total = system.total_memory();
        if total == 0 {
            anyhow::bail!("Total memory reported as zero");
        }
        let used = total.saturating_sub(system.available_memory());
        Ok(percent(used, total))
    }

    fn disk_percent(&self) -> Result<f32> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.disk_mount.as_path())
            .with_context(|| format!("No disk mounted at {}", self.disk_mount.display()))?;

        disk_used_percent(disk.total_space(), disk.available_space())
            .with_context(|| format!("Disk at {} reports zero capacity", self.disk_mount.display()))
    }
}

/// Share of the filesystem the current user can no longer write to.
///
/// sysinfo exposes only total and user-available space, so blocks reserved
/// for root count as used. This reads higher than psutil's
/// `used / (used + free)`, which leaves reserved blocks out of both terms:
/// on ext4 with the default 5% reservation the gap is a few points.
fn disk_used_percent(total: u64, available: u64) -> Option<f32> {
    if total == 0 {
        return None;
    }
    Some(percent(total.saturating_sub(available), total))
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new(Path::new(DEFAULT_DISK_MOUNT), DEFAULT_SAMPLE_WINDOW)
    }
}

#[async_trait]
impl MetricsProvider for SysinfoProvider {
    async fn sample(&self) -> Result<MetricsSnapshot> {
        let mut system = self.system.lock().await;

        system.refresh_cpu_usage();
        tokio::time::sleep(self.sample_window).await;
        system.refresh_cpu_usage();
        let cpu = system.global_cpu_usage().clamp(0.0, MAX_PERCENT);

        system.refresh_memory();
        let ram = Self::memory_percent(&system)?;
        drop(system);

        let disk = self.disk_percent()?;

        debug!(cpu, ram, disk, "Sampled host metrics");
        Ok(MetricsSnapshot::new(cpu, ram, disk))
    }
}

fn percent(used: u64, total: u64) -> f32 {
    ((used as f64 / total as f64) * MAX_PERCENT as f64) as f32
}

/// Describe the local host for startup reporting
pub fn host_info() -> HostInfo {
    let mut system = System::new();
    system.refresh_cpu_all();
    let cpus = system.cpus();

    HostInfo {
        host_name: System::host_name(),
        os_name: System::name(),
        os_version: System::os_version(),
        cpu_brand: cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty()),
        cpu_count: cpus.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 100), 0.0);
        assert_eq!(percent(50, 200), 25.0);
        assert_eq!(percent(100, 100), 100.0);
    }

    #[test]
    fn test_disk_used_percent_counts_reserved_blocks() {
        // 1000 blocks, 50 reserved for root, 450 used, 500 free to users
        assert_eq!(disk_used_percent(1000, 500), Some(50.0));
        assert_eq!(disk_used_percent(1000, 0), Some(100.0));
        assert_eq!(disk_used_percent(1000, 1200), Some(0.0));
        assert_eq!(disk_used_percent(0, 0), None);
    }

    #[test]
    fn test_sample_window_respects_minimum() {
        let provider = SysinfoProvider::new("/", Duration::ZERO);
        assert!(provider.sample_window() >= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[tokio::test]
    async fn test_unknown_mount_fails() {
        let provider = SysinfoProvider::new("/definitely/not/a/mount", Duration::ZERO);
        let result = provider.sample().await;
        assert!(result.is_err());
    }
}
