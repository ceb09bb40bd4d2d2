//! Severity classification of instability scores
//!
//! Thresholds are strict: a score equal to a threshold falls into the
//! lower tier.

use crate::predictor::tier_percent;
use serde::{Deserialize, Serialize};

/// Scores above this are critical
pub const CRITICAL_THRESHOLD: f32 = 0.8;

/// Scores above this (and not critical) call for caution
pub const CAUTION_THRESHOLD: f32 = 0.5;

/// Alert tier derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Stable,
    Caution,
    Critical,
}

impl SeverityTier {
    /// Numeric level for gauges: 0 stable, 1 caution, 2 critical
    pub fn level(&self) -> i64 {
        match self {
            SeverityTier::Stable => 0,
            SeverityTier::Caution => 1,
            SeverityTier::Critical => 2,
        }
    }

    /// Primary message for a score in this tier
    pub fn primary_message(&self, score: f32) -> String {
        match self {
            SeverityTier::Critical => format!(
                "CRITICAL STATE: system instability is at {}%!",
                tier_percent(score)
            ),
            SeverityTier::Caution => format!(
                "CAUTION: system load is increasing ({}%).",
                tier_percent(score)
            ),
            SeverityTier::Stable => "SYSTEM STABLE: no instability patterns detected.".to_string(),
        }
    }

    /// Follow-up message, if the tier carries one
    pub fn secondary_message(&self) -> Option<&'static str> {
        match self {
            SeverityTier::Critical => {
                Some("Action suggested: close heavy background processes or inspect the process list.")
            }
            SeverityTier::Caution => {
                Some("The model detects patterns similar to a system slowdown.")
            }
            SeverityTier::Stable => None,
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityTier::Stable => write!(f, "stable"),
            SeverityTier::Caution => write!(f, "caution"),
            SeverityTier::Critical => write!(f, "critical"),
        }
    }
}

/// Map a clamped score to its tier
pub fn classify(score: f32) -> SeverityTier {
    if score > CRITICAL_THRESHOLD {
        SeverityTier::Critical
    } else if score > CAUTION_THRESHOLD {
        SeverityTier::Caution
    } else {
        SeverityTier::Stable
    }
}

/// Tier plus the messages shown for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub tier: SeverityTier,
    pub score: f32,
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

/// Classify a score and attach its messages
pub fn assess(score: f32) -> Assessment {
    let tier = classify(score);
    Assessment {
        tier,
        score,
        primary: tier.primary_message(score),
        secondary: tier.secondary_message().map(str::to_string),
    }
}
