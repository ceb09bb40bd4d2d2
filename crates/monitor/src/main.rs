//! Health Monitor - local host instability monitor
//!
//! Samples CPU, RAM and disk utilization, scores each reading with a
//! local ONNX model and reports the resulting severity tier.

use anyhow::{Context, Result};
use monitor_lib::{
    collector::{host_info, SysinfoProvider},
    predictor::{ModelCache, OnnxModelLoader, Predictor},
    presenter::{JsonPresenter, Presenter, TextPresenter},
    LoopControllerBuilder, MonitorMetrics, StructuredLogger,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{MonitorConfig, OutputFormat};

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so presenter output on stdout stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    info!("Starting health-monitor");

    let config = MonitorConfig::load()?;
    let host = host_info();
    let host_label = config
        .host_name
        .clone()
        .or_else(|| host.host_name.clone())
        .unwrap_or_else(|| "localhost".to_string());
    info!(
        host = %host_label,
        model_path = %config.model_path.display(),
        cycle_period_ms = config.cycle_period().as_millis() as u64,
        "Monitor configured"
    );

    let metrics = MonitorMetrics::new();
    let logger = StructuredLogger::new(&host_label);
    logger.log_startup(MONITOR_VERSION, &host);

    // A monitor without a model has nothing to report: load eagerly and abort on failure
    let cache = Arc::new(ModelCache::new(OnnxModelLoader::new(&config.model_path)));
    let handle = cache
        .get_handle()
        .context("Cannot start without a scoring model")?;
    metrics.set_model_loaded_at(handle.loaded_at().timestamp());
    logger.log_model_loaded(
        handle.version(),
        &handle.source().display().to_string(),
        &handle.loaded_at().format("%H:%M:%S").to_string(),
    );

    let provider = Arc::new(SysinfoProvider::new(&config.disk_mount, config.sample_window()));
    let presenter: Arc<dyn Presenter> = match config.output {
        OutputFormat::Text => Arc::new(TextPresenter::stdout()),
        OutputFormat::Json => Arc::new(JsonPresenter::stdout()),
    };

    let mut controller = LoopControllerBuilder::new()
        .provider(provider)
        .predictor(Predictor::new(cache, metrics.clone()))
        .presenter(presenter)
        .logger(logger.clone())
        .cycle_delay(config.cycle_delay())
        .build()?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut loop_handle = tokio::spawn(async move {
        controller.run(shutdown_rx).await;
        controller
    });

    // Either the operator interrupts us or the loop stops on a fatal error
    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
        joined = &mut loop_handle => Some(joined.context("Monitoring loop panicked")?),
    };
    let (controller, reason) = match finished {
        Some(controller) => (controller, "monitoring loop stopped"),
        None => {
            let _ = shutdown_tx.send(());
            let controller = loop_handle.await.context("Monitoring loop panicked")?;
            (controller, "SIGINT received")
        }
    };

    logger.log_shutdown(reason, metrics.iterations(), metrics.failed_iterations());
    info!(state = %controller.state(), "Shutdown complete");

    if let Some(err) = controller.fatal_error() {
        anyhow::bail!("Monitoring loop stopped: {}", err);
    }
    Ok(())
}
