//! Metrics aggregation and insight derivation for socialdash.
//!
//! Turns raw entity collections (users, content, ads, moderation stats,
//! engagement series, ad ROI rows, satisfaction rows) into summary metrics,
//! trend classifications, ROI figures, satisfaction distributions and ranked
//! insights. Every function is a pure transformation over its inputs: nothing
//! here fetches, caches or stores data.

pub mod aggregate;
pub mod error;
pub mod insights;
pub mod normalize;
pub mod report;
pub mod roi;
pub mod satisfaction;
pub mod trend;
pub mod types;

pub use aggregate::{compute_summary_metrics, summarize_entity_set};
pub use error::MetricsError;
pub use insights::synthesize_insights;
pub use normalize::normalize_entity_set;
pub use report::build_dashboard;
pub use roi::{
    compute_aggregate_roi, compute_ctr_series, compute_roi, compute_roi_by_ad,
    compute_roi_by_date,
};
pub use satisfaction::{bucket_satisfaction_scores, compute_satisfaction_distribution};
pub use trend::{classify_sequence, classify_steps, classify_trend};
pub use types::{
    CtrPoint, DashboardReport, Insight, InsightKind, InsightValue, RoiFilter, RoiResult,
    SatisfactionSlice, SummaryMetrics, Trend, TrendDelta, TrendDirection,
};
