//! Monitoring loop orchestration
//!
//! Drives the sample → predict → store → classify → render cycle until a
//! shutdown signal arrives.

mod r#loop;


pub use r#loop::{LoopConfig, LoopController, LoopControllerBuilder, DEFAULT_CYCLE_DELAY};

use serde::{Deserialize, Serialize};

/// Lifecycle of a loop controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    /// Constructed, not yet started
    Idle,
    Running,
    /// Shutdown observed, finishing the current step
    Stopping,
    Stopped,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopState::Idle => write!(f, "idle"),
            LoopState::Running => write!(f, "running"),
            LoopState::Stopping => write!(f, "stopping"),
            LoopState::Stopped => write!(f, "stopped"),
        }
    }
}
