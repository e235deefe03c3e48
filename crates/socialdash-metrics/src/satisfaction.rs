//! Fixed three-level satisfaction distribution.

use socialdash_core::{SatisfactionLevel, SatisfactionRecord};

use crate::types::SatisfactionSlice;

/// Scores at or above this are `High`.
pub const HIGH_SCORE_THRESHOLD: f64 = 4.0;
/// Scores at or above this (and below high) are `Medium`.
pub const MEDIUM_SCORE_THRESHOLD: f64 = 2.0;

/// Percentage distribution over high, medium and low, always in that order.
///
/// Levels missing from `records` appear with a zero count, duplicate levels
/// are summed, and `Unknown` rows are left out of both the counts and the
/// total. `percentage = 100 * count / max(total, 1)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_satisfaction_distribution(records: &[SatisfactionRecord]) -> [SatisfactionSlice; 3] {
    let counts = SatisfactionLevel::LEGEND.map(|level| {
        records
            .iter()
            .filter(|record| record.satisfaction_level == level)
            .fold(0_u64, |sum, record| sum.saturating_add(record.count))
    });
    let total = counts.iter().fold(0_u64, |sum, count| sum.saturating_add(*count));
    let denominator = total.max(1) as f64;

    std::array::from_fn(|idx| SatisfactionSlice {
        satisfaction_level: SatisfactionLevel::LEGEND[idx],
        count: counts[idx],
        percentage: 100.0 * counts[idx] as f64 / denominator,
    })
}

/// Bucket raw 1-5 style scores into one record per level (high, medium, low).
///
/// Non-finite scores are skipped.
#[must_use]
pub fn bucket_satisfaction_scores(scores: &[f64]) -> Vec<SatisfactionRecord> {
    let mut counts = [0_u64; 3];
    for score in scores.iter().copied().filter(|score| score.is_finite()) {
        let slot = if score >= HIGH_SCORE_THRESHOLD {
            0
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            1
        } else {
            2
        };
        counts[slot] += 1;
    }

    SatisfactionLevel::LEGEND
        .iter()
        .zip(counts)
        .map(|(level, count)| SatisfactionRecord {
            satisfaction_level: *level,
            count,
        })
        .collect()
}

/// Sum of the counts in a distribution.
#[must_use]
pub fn distribution_total(slices: &[SatisfactionSlice]) -> u64 {
    slices
        .iter()
        .fold(0_u64, |sum, slice| sum.saturating_add(slice.count))
}
