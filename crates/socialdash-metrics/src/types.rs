use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use socialdash_core::{ComparisonMode, SatisfactionLevel};

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_users: usize,
    pub active_users: usize,
    pub total_content: usize,
    pub total_ads: usize,
    pub total_reports: u64,
    /// Mean ad CTR. `0.0` when there are no ads.
    pub average_ctr: f64,
    pub pending_reports: u64,
    pub resolved_reports: u64,
    pub dismissed_reports: u64,
    pub total_flags: u64,
    /// `resolved / max(total, 1)`.
    pub report_resolution_rate: f64,
    pub flagged_content: usize,
    pub removed_content: usize,
    pub users_by_region: BTreeMap<String, usize>,
    pub content_by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

/// Relative change between two values.
///
/// Any change away from a zero baseline has no finite ratio; it is reported
/// as `Unbounded` instead of an overflowing float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendDelta {
    Finite(f64),
    Unbounded,
}

impl TrendDelta {
    /// Absolute size of the change, used for ranking. Unbounded deltas rank
    /// above every finite one.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        match self {
            TrendDelta::Finite(delta) => delta.abs(),
            TrendDelta::Unbounded => f64::INFINITY,
        }
    }

    #[must_use]
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            TrendDelta::Finite(delta) => Some(*delta),
            TrendDelta::Unbounded => None,
        }
    }
}

impl Serialize for TrendDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TrendDelta::Finite(delta) => serializer.serialize_f64(*delta),
            TrendDelta::Unbounded => serializer.serialize_str("infinity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub delta: TrendDelta,
}

impl Trend {
    pub const FLAT: Trend = Trend {
        direction: TrendDirection::Flat,
        delta: TrendDelta::Finite(0.0),
    };
}

/// Optional narrowing applied before any ROI computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoiFilter {
    pub ad_id: Option<String>,
    /// Inclusive lower date bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end: Option<NaiveDate>,
}

/// Financial performance over one period, one ad, or a whole filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoiResult {
    pub ad_id: Option<String>,
    pub date: Option<NaiveDate>,
    /// Number of input rows folded into this result.
    pub periods: usize,
    pub impressions: u64,
    pub clicks: u64,
    pub revenue: f64,
    pub cost: f64,
    pub net_gain: f64,
    pub ctr: f64,
    pub roi: f64,
    /// Set when cost was zero; `roi` then equals the raw gain.
    pub zero_cost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrPoint {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub ctr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SatisfactionSlice {
    pub satisfaction_level: SatisfactionLevel,
    pub count: u64,
    /// Share of the total in `[0, 100]`.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Engagement,
    Roi,
    Satisfaction,
    Moderation,
    ContentPerformance,
    AdPerformance,
}

impl InsightKind {
    /// Tie-break rank when two insights move by the same amount; lower first.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            InsightKind::Engagement => 0,
            InsightKind::Roi => 1,
            InsightKind::Satisfaction => 2,
            InsightKind::Moderation => 3,
            InsightKind::ContentPerformance => 4,
            InsightKind::AdPerformance => 5,
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Engagement => write!(f, "engagement"),
            InsightKind::Roi => write!(f, "roi"),
            InsightKind::Satisfaction => write!(f, "satisfaction"),
            InsightKind::Moderation => write!(f, "moderation"),
            InsightKind::ContentPerformance => write!(f, "content_performance"),
            InsightKind::AdPerformance => write!(f, "ad_performance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for InsightValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightValue::Integer(value) => write!(f, "{value}"),
            InsightValue::Float(value) => write!(f, "{value:.2}"),
            InsightValue::Text(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub trend: TrendDirection,
    pub delta: TrendDelta,
    pub metric: String,
    pub value: InsightValue,
    pub description: String,
}

/// Everything a dashboard overview renders, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub comparison_mode: ComparisonMode,
    pub summary: SummaryMetrics,
    pub aggregate_roi: RoiResult,
    pub roi_by_ad: Vec<RoiResult>,
    pub roi_by_date: Vec<RoiResult>,
    pub ctr_series: Vec<CtrPoint>,
    pub satisfaction: Vec<SatisfactionSlice>,
    pub insights: Vec<Insight>,
}
