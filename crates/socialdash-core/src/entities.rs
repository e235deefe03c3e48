use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Unknown,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
            UserStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Thread,
    Video,
    Mixed,
    Unknown,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Thread => write!(f, "thread"),
            ContentType::Video => write!(f, "video"),
            ContentType::Mixed => write!(f, "mixed"),
            ContentType::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Active,
    Removed,
    Flagged,
    Unknown,
}

/// Bucketed satisfaction level. `Unknown` only appears on rows whose level
/// could not be recognized; it never shows up in a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatisfactionLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl SatisfactionLevel {
    /// The fixed legend order used for distributions.
    pub const LEGEND: [SatisfactionLevel; 3] = [
        SatisfactionLevel::High,
        SatisfactionLevel::Medium,
        SatisfactionLevel::Low,
    ];
}

impl std::fmt::Display for SatisfactionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SatisfactionLevel::High => write!(f, "high"),
            SatisfactionLevel::Medium => write!(f, "medium"),
            SatisfactionLevel::Low => write!(f, "low"),
            SatisfactionLevel::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub status: UserStatus,
    /// Defaults to `"unknown"` when the upstream record has no region.
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub title: String,
    /// Click-through rate in `[0.0, 1.0]`.
    pub ctr: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub revenue: f64,
    pub cost: f64,
}

/// Moderation queue counters.
///
/// `resolved + pending + dismissed <= total` is not guaranteed upstream;
/// consumers must tolerate violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationStats {
    pub total_reports: u64,
    pub pending_reports: u64,
    pub resolved_reports: u64,
    pub dismissed_reports: u64,
    pub total_flags: u64,
}

/// One bucket of a time series, e.g. a day of engagement counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub measures: BTreeMap<String, f64>,
}

impl TimeSeriesPoint {
    /// Value of a named measure, `0.0` when the bucket does not carry it.
    #[must_use]
    pub fn measure(&self, name: &str) -> f64 {
        self.measures.get(name).copied().unwrap_or(0.0)
    }
}

/// Per-period ad performance row (`date/ad_id/impressions/clicks/revenue/cost`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub date: Option<NaiveDate>,
    pub ad_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub revenue: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionRecord {
    pub satisfaction_level: SatisfactionLevel,
    pub count: u64,
}

/// Which points of a sequence a trend is computed from.
///
/// A single aggregation run uses one mode for every sequence it classifies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// First point against last point.
    #[default]
    Endpoints,
    /// Second-to-last point against last point.
    Latest,
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonMode::Endpoints => write!(f, "endpoints"),
            ComparisonMode::Latest => write!(f, "latest"),
        }
    }
}

impl std::str::FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "endpoints" => Ok(ComparisonMode::Endpoints),
            "latest" => Ok(ComparisonMode::Latest),
            other => Err(format!(
                "unknown comparison mode '{other}'; expected 'endpoints' or 'latest'"
            )),
        }
    }
}

/// Everything one dashboard pass aggregates over.
///
/// Sources that were not fetched (or failed to fetch) are simply empty, and
/// `moderation_stats` is `None`. Every aggregation treats those as zero
/// rather than as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub users: Vec<User>,
    pub content: Vec<Content>,
    pub ads: Vec<Ad>,
    pub moderation_stats: Option<ModerationStats>,
    /// Engagement buckets, ascending by timestamp.
    pub engagement: Vec<TimeSeriesPoint>,
    pub ad_roi: Vec<RoiRecord>,
    pub satisfaction: Vec<SatisfactionRecord>,
}

impl EntitySet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.content.is_empty()
            && self.ads.is_empty()
            && self.moderation_stats.is_none()
            && self.engagement.is_empty()
            && self.ad_roi.is_empty()
            && self.satisfaction.is_empty()
    }
}
