//! Monitor configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional config file looked up in the working directory
pub const CONFIG_FILE: &str = "monitor.toml";

/// Presentation format for loop output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Label attached to log events; defaults to the machine host name
    #[serde(default)]
    pub host_name: Option<String>,

    /// Path of the ONNX scoring model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// CPU sampling window in milliseconds
    #[serde(default = "default_sample_window_ms")]
    pub sample_window_ms: u64,

    /// Delay after each iteration in milliseconds
    #[serde(default = "default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,

    /// Mount point whose usage is reported as disk utilization
    #[serde(default = "default_disk_mount")]
    pub disk_mount: PathBuf,

    /// Output format of the presenter
    #[serde(default = "default_output")]
    pub output: OutputFormat,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(monitor_lib::predictor::DEFAULT_MODEL_PATH)
}

fn default_sample_window_ms() -> u64 {
    1000
}

fn default_cycle_delay_ms() -> u64 {
    1000
}

fn default_disk_mount() -> PathBuf {
    PathBuf::from(monitor_lib::collector::DEFAULT_DISK_MOUNT)
}

fn default_output() -> OutputFormat {
    OutputFormat::Text
}

/// `MONITOR_*` variables; numeric values arrive as strings and are parsed
fn monitor_environment() -> config::Environment {
    config::Environment::with_prefix("MONITOR").try_parsing(true)
}

impl MonitorConfig {
    /// Load configuration from the config file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a specific file (if present) and `MONITOR_*` environment variables
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_from_sources(path, monitor_environment())
    }

    /// Load from a file layered under an explicit environment source
    pub fn load_from_sources(path: &Path, environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(environment)
            .build()
            .context("Failed to read monitor configuration")?;

        config
            .try_deserialize()
            .context("Invalid monitor configuration")
    }

    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    /// Nominal time between two sampling calls
    pub fn cycle_period(&self) -> Duration {
        self.sample_window() + self.cycle_delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Environment source fed from a fixed map instead of the process environment
    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        monitor_environment().source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            MonitorConfig::load_from_sources(&dir.path().join("missing.toml"), env(&[])).unwrap();

        assert_eq!(config.model_path, PathBuf::from("system_health_model.onnx"));
        assert_eq!(config.sample_window(), Duration::from_secs(1));
        assert_eq!(config.cycle_delay(), Duration::from_secs(1));
        assert_eq!(config.cycle_period(), Duration::from_secs(2));
        assert_eq!(config.disk_mount, PathBuf::from("/"));
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.host_name.is_none());
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(
            &path,
            r#"
model_path = "/opt/models/health.onnx"
cycle_delay_ms = 250
output = "json"
host_name = "bench-01"
"#,
        )
        .unwrap();

        let config = MonitorConfig::load_from_sources(&path, env(&[])).unwrap();

        assert_eq!(config.model_path, PathBuf::from("/opt/models/health.onnx"));
        assert_eq!(config.cycle_delay(), Duration::from_millis(250));
        assert_eq!(config.sample_window(), Duration::from_secs(1));
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.host_name.as_deref(), Some("bench-01"));
    }

    #[test]
    fn test_environment_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load_from_sources(
            &dir.path().join("missing.toml"),
            env(&[
                ("MONITOR_MODEL_PATH", "/x/y.onnx"),
                ("MONITOR_SAMPLE_WINDOW_MS", "250"),
                ("MONITOR_CYCLE_DELAY_MS", "500"),
                ("MONITOR_DISK_MOUNT", "/data"),
                ("MONITOR_OUTPUT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/x/y.onnx"));
        assert_eq!(config.sample_window_ms, 250);
        assert_eq!(config.cycle_delay(), Duration::from_millis(500));
        assert_eq!(config.cycle_period(), Duration::from_millis(750));
        assert_eq!(config.disk_mount, PathBuf::from("/data"));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_environment_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "cycle_delay_ms = 250\noutput = \"json\"\n").unwrap();

        let config =
            MonitorConfig::load_from_sources(&path, env(&[("MONITOR_CYCLE_DELAY_MS", "100")]))
                .unwrap();

        assert_eq!(config.cycle_delay(), Duration::from_millis(100));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_non_numeric_environment_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = MonitorConfig::load_from_sources(
            &dir.path().join("missing.toml"),
            env(&[("MONITOR_SAMPLE_WINDOW_MS", "soon")]),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_output_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "output = \"html\"\n").unwrap();

        assert!(MonitorConfig::load_from_sources(&path, env(&[])).is_err());
    }
}
