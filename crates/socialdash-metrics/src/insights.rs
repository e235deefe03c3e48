//! Ranked, typed insights composed from the other metric outputs.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use socialdash_core::{Ad, ComparisonMode, ContentType, SatisfactionLevel, TimeSeriesPoint};

use crate::roi::return_on_investment;
use crate::satisfaction::distribution_total;
use crate::trend::{classify_measure, classify_sequence, classify_trend};
use crate::types::{
    Insight, InsightKind, InsightValue, RoiResult, SatisfactionSlice, SummaryMetrics, Trend,
    TrendDelta, TrendDirection,
};

/// Build and rank insights.
///
/// - one engagement insight per measure carried by `timeseries`, valued at
///   the latest point;
/// - one ROI insight when `roi` has periods, valued at the sum-ratio ROI and
///   trended over the per-period ROI sequence;
/// - one satisfaction insight when the distribution is non-empty, trended
///   from the low count to the high count;
/// - one moderation insight when there are reports, trended from resolved to
///   pending;
/// - one content-performance insight naming the content type with the most
///   items, trended from the runner-up count to the leader's count;
/// - one ad-performance insight naming the ad with the highest CTR, trended
///   from the average CTR in `metrics` to that ad's CTR.
///
/// Sequences are compared with `mode`. Output is ordered by absolute delta
/// (unbounded first), then by kind, then by metric name. Empty inputs give an
/// empty vector.
#[must_use]
pub fn synthesize_insights(
    metrics: &SummaryMetrics,
    ads: &[Ad],
    roi: &[RoiResult],
    satisfaction: &[SatisfactionSlice],
    timeseries: &[TimeSeriesPoint],
    mode: ComparisonMode,
) -> Vec<Insight> {
    let mut insights = engagement_insights(timeseries, mode);
    insights.extend(roi_insight(roi, mode));
    insights.extend(satisfaction_insight(satisfaction));
    insights.extend(moderation_insight(metrics));
    insights.extend(content_insight(metrics));
    insights.extend(ad_insight(metrics, ads));

    insights.sort_by(rank);
    tracing::debug!(count = insights.len(), mode = %mode, "synthesized insights");
    insights
}

fn engagement_insights(timeseries: &[TimeSeriesPoint], mode: ComparisonMode) -> Vec<Insight> {
    let Some(latest) = timeseries.last() else {
        return Vec::new();
    };

    let measures: BTreeSet<&str> = timeseries
        .iter()
        .flat_map(|point| point.measures.keys().map(String::as_str))
        .collect();

    measures
        .into_iter()
        .map(|measure| {
            let trend = classify_measure(timeseries, measure, mode);
            build(
                InsightKind::Engagement,
                measure,
                whole_or_float(latest.measure(measure)),
                trend,
            )
        })
        .collect()
}

fn roi_insight(roi: &[RoiResult], mode: ComparisonMode) -> Option<Insight> {
    if roi.is_empty() {
        return None;
    }
    let revenue: f64 = roi.iter().map(|period| period.revenue).sum();
    let cost: f64 = roi.iter().map(|period| period.cost).sum();
    let per_period: Vec<f64> = roi.iter().map(|period| period.roi).collect();

    Some(build(
        InsightKind::Roi,
        "roi",
        InsightValue::Float(return_on_investment(revenue, cost)),
        classify_sequence(&per_period, mode),
    ))
}

#[allow(clippy::cast_precision_loss)]
fn satisfaction_insight(satisfaction: &[SatisfactionSlice]) -> Option<Insight> {
    if distribution_total(satisfaction) == 0 {
        return None;
    }
    let level = |level: SatisfactionLevel| {
        satisfaction
            .iter()
            .find(|slice| slice.satisfaction_level == level)
    };
    let high = level(SatisfactionLevel::High);
    let low_count = level(SatisfactionLevel::Low).map_or(0, |s| s.count);
    let high_count = high.map_or(0, |s| s.count);

    Some(build(
        InsightKind::Satisfaction,
        "net_satisfaction",
        InsightValue::Float(high.map_or(0.0, |s| s.percentage)),
        classify_trend(low_count as f64, high_count as f64),
    ))
}

#[allow(clippy::cast_precision_loss)]
fn moderation_insight(metrics: &SummaryMetrics) -> Option<Insight> {
    if metrics.total_reports == 0 {
        return None;
    }
    Some(build(
        InsightKind::Moderation,
        "pending_reports",
        InsightValue::Integer(i64::try_from(metrics.pending_reports).unwrap_or(i64::MAX)),
        classify_trend(
            metrics.resolved_reports as f64,
            metrics.pending_reports as f64,
        ),
    ))
}

#[allow(clippy::cast_precision_loss)]
fn content_insight(metrics: &SummaryMetrics) -> Option<Insight> {
    let unknown = ContentType::Unknown.to_string();
    let known: Vec<(&str, usize)> = metrics
        .content_by_type
        .iter()
        .filter(|(name, _)| name.as_str() != unknown)
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    let &(leader, count) = known
        .iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
    let runner_up = known
        .iter()
        .filter(|(name, _)| *name != leader)
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);

    let trend = classify_trend(runner_up as f64, count as f64);
    let value = InsightValue::Text(leader.to_string());
    let description = format!(
        "best_performing_content is {value} with {count} items, {}",
        lead(trend, "the next type")
    );
    Some(insight(
        InsightKind::ContentPerformance,
        "best_performing_content",
        value,
        trend,
        description,
    ))
}

fn ad_insight(metrics: &SummaryMetrics, ads: &[Ad]) -> Option<Insight> {
    let best = ads
        .iter()
        .max_by(|a, b| a.ctr.total_cmp(&b.ctr).then_with(|| b.id.cmp(&a.id)))?;

    let trend = classify_trend(metrics.average_ctr, best.ctr);
    let value = InsightValue::Text(best.id.clone());
    let description = format!(
        "best_performing_ad is {value} at {:.2}% ctr, {}",
        best.ctr * 100.0,
        lead(trend, "the average ad")
    );
    Some(insight(
        InsightKind::AdPerformance,
        "best_performing_ad",
        value,
        trend,
        description,
    ))
}

fn build(kind: InsightKind, metric: &str, value: InsightValue, trend: Trend) -> Insight {
    let description = format!("{metric} is {} at {value}", change(trend));
    insight(kind, metric, value, trend, description)
}

fn insight(
    kind: InsightKind,
    metric: &str,
    value: InsightValue,
    trend: Trend,
    description: String,
) -> Insight {
    Insight {
        kind,
        trend: trend.direction,
        delta: trend.delta,
        metric: metric.to_string(),
        value,
        description,
    }
}

/// `flat`, `up 10.00%` or `up from zero`.
fn change(trend: Trend) -> String {
    match (trend.direction, trend.delta) {
        (TrendDirection::Flat, _) => "flat".to_string(),
        (direction, TrendDelta::Finite(delta)) => {
            format!("{direction} {:.2}%", delta.abs() * 100.0)
        }
        (direction, TrendDelta::Unbounded) => format!("{direction} from zero"),
    }
}

fn lead(trend: Trend, baseline: &str) -> String {
    if trend.direction == TrendDirection::Flat {
        format!("level with {baseline}")
    } else {
        format!("{} against {baseline}", change(trend))
    }
}

/// Whole numbers (counts) render as integers, everything else as floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_or_float(value: f64) -> InsightValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        InsightValue::Integer(value as i64)
    } else {
        InsightValue::Float(value)
    }
}

fn rank(left: &Insight, right: &Insight) -> Ordering {
    right
        .delta
        .magnitude()
        .total_cmp(&left.delta.magnitude())
        .then_with(|| left.kind.priority().cmp(&right.kind.priority()))
        .then_with(|| left.metric.cmp(&right.metric))
}
