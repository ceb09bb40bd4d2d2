//! Presentation of per-iteration results
//!
//! The loop hands every iteration's outcome to a `Presenter`. Rendering
//! failures are the presenter's problem: the loop logs them and moves on.

use crate::models::MetricsSnapshot;
use crate::predictor::confidence_percent;
use crate::severity::Assessment;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;

/// Output of one loop iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Frame {
    Healthy {
        iteration: u64,
        snapshot: MetricsSnapshot,
        assessment: Assessment,
        history: Vec<f32>,
        trend_mean: Option<f32>,
        model_loaded_at: String,
    },
    Degraded {
        iteration: u64,
        reason: String,
        history: Vec<f32>,
        trend_mean: Option<f32>,
    },
}

impl Frame {
    pub fn iteration(&self) -> u64 {
        match self {
            Frame::Healthy { iteration, .. } | Frame::Degraded { iteration, .. } => *iteration,
        }
    }

    pub fn history(&self) -> &[f32] {
        match self {
            Frame::Healthy { history, .. } | Frame::Degraded { history, .. } => history,
        }
    }

    /// Mean of the history scores at the time of the frame
    pub fn trend_mean(&self) -> Option<f32> {
        match self {
            Frame::Healthy { trend_mean, .. } | Frame::Degraded { trend_mean, .. } => *trend_mean,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Frame::Degraded { .. })
    }
}

/// Consumer of loop output
pub trait Presenter: Send + Sync {
    fn render(&self, frame: &Frame) -> Result<()>;
}

/// Human-readable multi-line output
pub struct TextPresenter<W: Write + Send> {
    out: Mutex<W>,
}

impl TextPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> Presenter for TextPresenter<W> {
    fn render(&self, frame: &Frame) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;

        match frame {
            Frame::Healthy {
                iteration,
                snapshot,
                assessment,
                history,
                trend_mean,
                ..
            } => {
                writeln!(
                    out,
                    "[#{}] CPU {:.1}% | RAM {:.1}% | Disk {:.1}%",
                    iteration, snapshot.cpu, snapshot.ram, snapshot.disk
                )?;
                writeln!(
                    out,
                    "  Stability confidence: {}%",
                    confidence_percent(assessment.score)
                )?;
                writeln!(out, "  {}", assessment.primary)?;
                if let Some(secondary) = &assessment.secondary {
                    writeln!(out, "  {}", secondary)?;
                }
                writeln!(out, "  {}", trend_line(history, *trend_mean))?;
            }
            Frame::Degraded {
                iteration,
                reason,
                history,
                trend_mean,
            } => {
                writeln!(out, "[#{}] DEGRADED: {}", iteration, reason)?;
                writeln!(out, "  {}", trend_line(history, *trend_mean))?;
            }
        }
        out.flush().context("Failed to flush presenter output")
    }
}

/// One JSON object per frame, newline-delimited
pub struct JsonPresenter<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> Presenter for JsonPresenter<W> {
    fn render(&self, frame: &Frame) -> Result<()> {
        let line = serde_json::to_string(frame).context("Failed to serialize frame")?;
        let mut out = self
            .out
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        writeln!(out, "{}", line)?;
        out.flush().context("Failed to flush presenter output")
    }
}

fn trend_line(history: &[f32], mean: Option<f32>) -> String {
    match mean {
        Some(mean) => format!(
            "Trend ({} samples, avg {}%): {}",
            history.len(),
            confidence_percent(mean),
            sparkline(history)
        ),
        None => format!("Trend ({} samples): {}", history.len(), sparkline(history)),
    }
}

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render scores in [0, 1] as a block sparkline
pub fn sparkline(scores: &[f32]) -> String {
    let top = (SPARK_LEVELS.len() - 1) as f32;
    scores
        .iter()
        .map(|s| {
            let idx = (s.clamp(0.0, 1.0) * top).round() as usize;
            SPARK_LEVELS[idx]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::assess;

    fn healthy_frame(score: f32) -> Frame {
        Frame::Healthy {
            iteration: 7,
            snapshot: MetricsSnapshot {
                cpu: 90.0,
                ram: 85.0,
                disk: 40.0,
                timestamp: 1_700_000_000,
            },
            assessment: assess(score),
            history: vec![0.1, 0.5, score],
            trend_mean: Some(0.5),
            model_loaded_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_sparkline_levels() {
        assert_eq!(sparkline(&[0.0, 1.0]), "▁█");
        assert_eq!(sparkline(&[]), "");
        assert_eq!(sparkline(&[2.0, -1.0]), "█▁");
    }

    #[test]
    fn test_text_presenter_healthy() {
        let presenter = TextPresenter::new(Vec::new());
        presenter.render(&healthy_frame(0.95)).unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("CPU 90.0%"));
        assert!(text.contains("Stability confidence: 95%"));
        assert!(text.contains("CRITICAL STATE"));
        assert!(text.contains("Action suggested"));
        assert!(text.contains("Trend (3 samples, avg 50%)"));
    }

    #[test]
    fn test_text_presenter_degraded() {
        let presenter = TextPresenter::new(Vec::new());
        presenter
            .render(&Frame::Degraded {
                iteration: 3,
                reason: "metrics sampling failed: boom".to_string(),
                history: vec![],
                trend_mean: None,
            })
            .unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.starts_with("[#3] DEGRADED"));
        assert!(text.contains("boom"));
        assert!(text.contains("Trend (0 samples): \n"));
    }

    #[test]
    fn test_json_presenter_tags_status() {
        let presenter = JsonPresenter::new(Vec::new());
        presenter.render(&healthy_frame(0.62)).unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["iteration"], 7);
        assert_eq!(value["assessment"]["tier"], "caution");
        assert_eq!(value["history"].as_array().unwrap().len(), 3);
        assert_eq!(value["trend_mean"], 0.5);
    }

    #[test]
    fn test_frame_accessors() {
        let frame = healthy_frame(0.3);
        assert_eq!(frame.iteration(), 7);
        assert_eq!(frame.history().len(), 3);
        assert_eq!(frame.trend_mean(), Some(0.5));
        assert!(!frame.is_degraded());
    }
}
