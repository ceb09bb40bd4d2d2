//! Score post-processing
//!
//! The model is a regression head with no output-range guarantee, so raw
//! outputs are saturated into [0, 1] before anything downstream sees them.

/// Saturate a raw model output into [0, 1]; callers reject non-finite input first
pub fn clamp_score(raw: f32) -> f32 {
    0.0_f32.max(1.0_f32.min(raw))
}

/// Score as a percentage rounded to two decimals, for confidence displays
pub fn confidence_percent(score: f32) -> f64 {
    (score as f64 * 10_000.0).round() / 100.0
}

/// Score as a whole percentage, as embedded in tier messages
pub fn tier_percent(score: f32) -> u32 {
    (score * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_saturates() {
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(-0.3), 0.0);
        assert_eq!(clamp_score(0.42), 0.42);
        assert_eq!(clamp_score(0.0), 0.0);
        assert_eq!(clamp_score(1.0), 1.0);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(tier_percent(0.95), 95);
        assert_eq!(tier_percent(0.624), 62);
        assert_eq!(tier_percent(1.0), 100);
        assert_eq!(confidence_percent(0.12345), 12.35);
        assert_eq!(confidence_percent(0.0), 0.0);
    }
}
