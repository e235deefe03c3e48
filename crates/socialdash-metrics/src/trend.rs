//! Trend classification between two values or along a sequence.

use socialdash_core::{ComparisonMode, TimeSeriesPoint};

use crate::types::{Trend, TrendDelta, TrendDirection};

/// Floor for the delta denominator so tiny non-zero baselines stay finite.
pub const DELTA_EPSILON: f64 = f64::EPSILON;

/// Classify the change from `previous` to `current`.
///
/// `delta = (current - previous) / max(|previous|, ε)`. A zero baseline is
/// special-cased: `(0, 0)` is flat with delta `0`, and `(0, x)` for any
/// non-zero `x` is up with an unbounded delta. Non-finite inputs are treated
/// as `0`.
#[must_use]
pub fn classify_trend(previous: f64, current: f64) -> Trend {
    let previous = finite_or_zero(previous);
    let current = finite_or_zero(current);

    if previous == 0.0 {
        return if current == 0.0 {
            Trend::FLAT
        } else {
            Trend {
                direction: TrendDirection::Up,
                delta: TrendDelta::Unbounded,
            }
        };
    }

    let delta = (current - previous) / previous.abs().max(DELTA_EPSILON);
    Trend {
        direction: direction_of(delta),
        delta: TrendDelta::Finite(delta),
    }
}

/// Classify a time-ordered sequence with the given comparison mode.
///
/// Fewer than two values is flat.
#[must_use]
pub fn classify_sequence(values: &[f64], mode: ComparisonMode) -> Trend {
    let (previous, current) = match (mode, values) {
        (_, [] | [_]) => return Trend::FLAT,
        (ComparisonMode::Endpoints, [first, .., last]) => (*first, *last),
        (ComparisonMode::Latest, [.., previous, last]) => (*previous, *last),
    };
    classify_trend(previous, current)
}

/// One trend per consecutive pair, for per-step chart indicators.
#[must_use]
pub fn classify_steps(values: &[f64]) -> Vec<Trend> {
    values
        .windows(2)
        .map(|pair| classify_trend(pair[0], pair[1]))
        .collect()
}

/// Classify one named measure of a time series.
#[must_use]
pub fn classify_measure(points: &[TimeSeriesPoint], measure: &str, mode: ComparisonMode) -> Trend {
    let values: Vec<f64> = points.iter().map(|point| point.measure(measure)).collect();
    classify_sequence(&values, mode)
}

fn direction_of(delta: f64) -> TrendDirection {
    if delta > 0.0 {
        TrendDirection::Up
    } else if delta < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
