//! Score normalization and bucket classification.

use common::Suggestion;

use crate::config::BucketThresholds;

/// Normalize final points to 0-100. With nothing to score the trade passes.
pub fn normalize(points_final: f64, total_possible: f64) -> f64 {
    if total_possible > 0.0 {
        ((points_final / total_possible) * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    }
}

pub fn classify(score: f64, thresholds: &BucketThresholds) -> Suggestion {
    if score >= thresholds.conservative_at {
        Suggestion::Conservative
    } else if score >= thresholds.neutral_at {
        Suggestion::Neutral
    } else {
        Suggestion::Aggressive
    }
}
