//! Ad ROI and CTR derived from per-period impression/click/revenue/cost rows.
//!
//! Aggregate ROI is always the ratio over summed revenue and cost, never the
//! mean of per-period ROI values; a cheap period must not weigh as much as an
//! expensive one.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use socialdash_core::RoiRecord;

use crate::types::{CtrPoint, RoiFilter, RoiResult};

impl RoiFilter {
    /// Whether `record` survives the filter.
    ///
    /// Date bounds are inclusive. When any bound is set, rows without a date
    /// are excluded because they cannot be shown to fall inside the range.
    #[must_use]
    pub fn matches(&self, record: &RoiRecord) -> bool {
        if self.ad_id.as_deref().is_some_and(|id| record.ad_id != id) {
            return false;
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        record.date.is_some_and(|date| {
            self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
        })
    }
}

/// `clicks / max(impressions, 1)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    clicks as f64 / impressions.max(1) as f64
}

/// `(revenue - cost) / max(cost, 1)`. With zero cost this is the raw gain.
#[must_use]
pub fn return_on_investment(revenue: f64, cost: f64) -> f64 {
    (revenue - cost) / cost.max(1.0)
}

/// Per-period ROI for every record that passes `filter`, in input order.
#[must_use]
pub fn compute_roi(records: &[RoiRecord], filter: &RoiFilter) -> Vec<RoiResult> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .map(|record| {
            let mut result = fold([record]);
            result.ad_id = non_empty(&record.ad_id);
            result.date = record.date;
            result
        })
        .collect()
}

/// Aggregate ROI over every record that passes `filter`.
///
/// An empty selection yields a zero-valued result with `periods == 0`.
#[must_use]
pub fn compute_aggregate_roi(records: &[RoiRecord], filter: &RoiFilter) -> RoiResult {
    let mut result = fold(records.iter().filter(|record| filter.matches(record)));
    result.ad_id.clone_from(&filter.ad_id);
    result
}

/// Aggregate ROI per ad, ordered by ad id.
#[must_use]
pub fn compute_roi_by_ad(records: &[RoiRecord], filter: &RoiFilter) -> Vec<RoiResult> {
    let mut by_ad: BTreeMap<&str, Vec<&RoiRecord>> = BTreeMap::new();
    for record in records.iter().filter(|record| filter.matches(record)) {
        by_ad.entry(record.ad_id.as_str()).or_default().push(record);
    }

    by_ad
        .into_iter()
        .map(|(ad_id, group)| {
            let mut result = fold(group);
            result.ad_id = non_empty(ad_id);
            result
        })
        .collect()
}

/// Aggregate ROI per calendar date across ads, ascending by date.
///
/// Undated rows have no place on the axis and are skipped.
#[must_use]
pub fn compute_roi_by_date(records: &[RoiRecord], filter: &RoiFilter) -> Vec<RoiResult> {
    group_by_date(records, filter)
        .into_iter()
        .map(|(date, group)| {
            let mut result = fold(group);
            result.ad_id.clone_from(&filter.ad_id);
            result.date = Some(date);
            result
        })
        .collect()
}

/// Daily CTR over summed clicks and impressions, ascending by date.
#[must_use]
pub fn compute_ctr_series(records: &[RoiRecord], filter: &RoiFilter) -> Vec<CtrPoint> {
    group_by_date(records, filter)
        .into_iter()
        .map(|(date, group)| {
            let impressions = group.iter().map(|r| r.impressions).sum();
            let clicks = group.iter().map(|r| r.clicks).sum();
            CtrPoint {
                date,
                impressions,
                clicks,
                ctr: click_through_rate(clicks, impressions),
            }
        })
        .collect()
}

fn group_by_date<'a>(
    records: &'a [RoiRecord],
    filter: &RoiFilter,
) -> BTreeMap<NaiveDate, Vec<&'a RoiRecord>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&RoiRecord>> = BTreeMap::new();
    for record in records.iter().filter(|record| filter.matches(record)) {
        if let Some(date) = record.date {
            by_date.entry(date).or_default().push(record);
        }
    }
    by_date
}

fn fold<'a>(records: impl IntoIterator<Item = &'a RoiRecord>) -> RoiResult {
    let mut periods = 0;
    let mut impressions = 0_u64;
    let mut clicks = 0_u64;
    let mut revenue = 0.0;
    let mut cost = 0.0;

    for record in records {
        periods += 1;
        impressions = impressions.saturating_add(record.impressions);
        clicks = clicks.saturating_add(record.clicks);
        revenue += record.revenue;
        cost += record.cost;
    }

    RoiResult {
        ad_id: None,
        date: None,
        periods,
        impressions,
        clicks,
        revenue,
        cost,
        net_gain: revenue - cost,
        ctr: click_through_rate(clicks, impressions),
        roi: return_on_investment(revenue, cost),
        zero_cost: cost == 0.0,
    }
}

fn non_empty(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ad_id: &str, date: Option<(i32, u32, u32)>, revenue: f64, cost: f64) -> RoiRecord {
        RoiRecord {
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            ad_id: ad_id.to_string(),
            impressions: 1_000,
            clicks: 50,
            revenue,
            cost,
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 1, d)
    }

    #[test]
    fn aggregate_is_ratio_of_sums_not_mean_of_ratios() {
        let records = vec![
            record("a", Some((2025, 1, 1)), 400.0, 100.0),
            record("a", Some((2025, 1, 2)), 0.0, 300.0),
        ];
        let periods = compute_roi(&records, &RoiFilter::default());
        let mean_of_periods = periods.iter().map(|r| r.roi).sum::<f64>() / 2.0;
        assert!((mean_of_periods - 1.0).abs() < 1e-12);

        let aggregate = compute_aggregate_roi(&records, &RoiFilter::default());
        assert!(aggregate.roi.abs() < 1e-12, "got {}", aggregate.roi);
        assert_eq!(aggregate.periods, 2);
    }

    #[test]
    fn per_period_roi_values() {
        let records = vec![
            record("a", day_tuple(1), 100.0, 50.0),
            record("a", day_tuple(2), 0.0, 50.0),
        ];
        let results = compute_roi(&records, &RoiFilter::default());
        assert!((results[0].roi - 1.0).abs() < 1e-12);
        assert!((results[1].roi + 1.0).abs() < 1e-12);
        assert_eq!(results[0].ad_id.as_deref(), Some("a"));
        assert_eq!(results[0].date, day(1));
        assert!((results[0].ctr - 0.05).abs() < 1e-12);
    }

    fn day_tuple(d: u32) -> Option<(i32, u32, u32)> {
        Some((2025, 1, d))
    }

    #[test]
    fn zero_cost_reports_raw_gain_and_flags_it() {
        let records = vec![record("a", None, 75.0, 0.0)];
        let result = compute_aggregate_roi(&records, &RoiFilter::default());
        assert!((result.roi - 75.0).abs() < 1e-12);
        assert!(result.zero_cost);
        assert!(result.roi.is_finite());
    }

    #[test]
    fn zero_impressions_give_zero_ctr() {
        let mut row = record("a", None, 1.0, 1.0);
        row.impressions = 0;
        row.clicks = 0;
        let result = compute_aggregate_roi(&[row], &RoiFilter::default());
        assert_eq!(result.ctr, 0.0);
    }

    #[test]
    fn empty_selection_is_zero_valued() {
        let result = compute_aggregate_roi(&[], &RoiFilter::default());
        assert_eq!(result.periods, 0);
        assert_eq!(result.roi, 0.0);
        assert_eq!(result.revenue, 0.0);
        assert_eq!(result.impressions, 0);
    }

    #[test]
    fn ad_filter_keeps_matching_rows_only() {
        let records = vec![
            record("a", day_tuple(1), 200.0, 100.0),
            record("b", day_tuple(1), 0.0, 100.0),
        ];
        let filter = RoiFilter {
            ad_id: Some("a".to_string()),
            ..RoiFilter::default()
        };
        let result = compute_aggregate_roi(&records, &filter);
        assert_eq!(result.periods, 1);
        assert_eq!(result.ad_id.as_deref(), Some("a"));
        assert!((result.roi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_ad_filter_yields_zero_record() {
        let records = vec![record("a", day_tuple(1), 200.0, 100.0)];
        let filter = RoiFilter {
            ad_id: Some("missing".to_string()),
            ..RoiFilter::default()
        };
        let result = compute_aggregate_roi(&records, &filter);
        assert_eq!(result.periods, 0);
        assert_eq!(result.roi, 0.0);
    }

    #[test]
    fn date_range_is_inclusive() {
        let records = vec![
            record("a", day_tuple(1), 10.0, 10.0),
            record("a", day_tuple(2), 10.0, 10.0),
            record("a", day_tuple(3), 10.0, 10.0),
            record("a", day_tuple(4), 10.0, 10.0),
        ];
        let filter = RoiFilter {
            start: day(2),
            end: day(3),
            ..RoiFilter::default()
        };
        let results = compute_roi(&records, &filter);
        let dates: Vec<_> = results.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2), day(3)]);
    }

    #[test]
    fn date_bound_excludes_undated_rows() {
        let records = vec![record("a", None, 10.0, 10.0)];
        let filter = RoiFilter {
            start: day(1),
            ..RoiFilter::default()
        };
        assert!(compute_roi(&records, &filter).is_empty());
        assert_eq!(compute_roi(&records, &RoiFilter::default()).len(), 1);
    }

    #[test]
    fn by_ad_groups_and_orders_by_id() {
        let records = vec![
            record("b", day_tuple(1), 300.0, 100.0),
            record("a", day_tuple(1), 100.0, 100.0),
            record("b", day_tuple(2), 0.0, 100.0),
        ];
        let results = compute_roi_by_ad(&records, &RoiFilter::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ad_id.as_deref(), Some("a"));
        assert_eq!(results[1].ad_id.as_deref(), Some("b"));
        assert_eq!(results[1].periods, 2);
        assert!((results[1].roi - 0.5).abs() < 1e-12);
    }

    #[test]
    fn by_date_sums_across_ads() {
        let records = vec![
            record("a", day_tuple(2), 100.0, 50.0),
            record("b", day_tuple(1), 10.0, 10.0),
            record("b", day_tuple(2), 50.0, 50.0),
            record("c", None, 999.0, 1.0),
        ];
        let results = compute_roi_by_date(&records, &RoiFilter::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].date, day(1));
        assert_eq!(results[1].date, day(2));
        assert!((results[1].revenue - 150.0).abs() < 1e-12);
        assert!((results[1].roi - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ctr_series_is_daily_ratio_of_sums() {
        let mut first = record("a", day_tuple(1), 0.0, 0.0);
        first.impressions = 100;
        first.clicks = 10;
        let mut second = record("b", day_tuple(1), 0.0, 0.0);
        second.impressions = 300;
        second.clicks = 10;
        let series = compute_ctr_series(&[first, second], &RoiFilter::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].impressions, 400);
        assert!((series[0].ctr - 0.05).abs() < 1e-12);
    }
}
