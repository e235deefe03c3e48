use socialdash_core::{ComparisonMode, EntitySet};

use crate::aggregate::summarize_entity_set;
use crate::insights::synthesize_insights;
use crate::roi::{compute_aggregate_roi, compute_ctr_series, compute_roi_by_ad, compute_roi_by_date};
use crate::satisfaction::compute_satisfaction_distribution;
use crate::types::{DashboardReport, RoiFilter};

/// Compute every dashboard section from one snapshot with a single
/// comparison mode.
///
/// The ROI insight is trended over the per-date ROI sequence.
#[must_use]
pub fn build_dashboard(set: &EntitySet, mode: ComparisonMode) -> DashboardReport {
    let unfiltered = RoiFilter::default();
    let summary = summarize_entity_set(set);
    let roi_by_date = compute_roi_by_date(&set.ad_roi, &unfiltered);
    let satisfaction = compute_satisfaction_distribution(&set.satisfaction);
    let insights = synthesize_insights(
        &summary,
        &set.ads,
        &roi_by_date,
        &satisfaction,
        &set.engagement,
        mode,
    );

    tracing::debug!(
        users = set.users.len(),
        ads = set.ads.len(),
        roi_rows = set.ad_roi.len(),
        insights = insights.len(),
        "built dashboard report"
    );

    DashboardReport {
        comparison_mode: mode,
        aggregate_roi: compute_aggregate_roi(&set.ad_roi, &unfiltered),
        roi_by_ad: compute_roi_by_ad(&set.ad_roi, &unfiltered),
        ctr_series: compute_ctr_series(&set.ad_roi, &unfiltered),
        satisfaction: satisfaction.to_vec(),
        summary,
        roi_by_date,
        insights,
    }
}
