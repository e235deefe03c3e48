//! Snapshot-file command handlers for the CLI.
//!
//! Each handler loads a snapshot, runs one metrics operation and prints the
//! result either as a fixed-width text table or as pretty JSON.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use socialdash_core::{ComparisonMode, EntitySet};
use socialdash_metrics::{
    build_dashboard, classify_trend, compute_aggregate_roi, compute_roi, compute_roi_by_ad,
    compute_satisfaction_distribution, normalize_entity_set, summarize_entity_set, Insight,
    RoiFilter, RoiResult, SatisfactionSlice, SummaryMetrics, Trend, TrendDelta,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Read and normalize a snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a
/// collection in it is structurally malformed.
pub(crate) fn load_entity_set(path: &Path) -> anyhow::Result<EntitySet> {
    let raw = socialdash_core::load_raw_snapshot(path)?;
    let set = normalize_entity_set(&raw)
        .with_context(|| format!("malformed snapshot {}", path.display()))?;
    if set.is_empty() {
        tracing::warn!(path = %path.display(), "snapshot has no recognized collections");
    }
    tracing::debug!(
        path = %path.display(),
        users = set.users.len(),
        ads = set.ads.len(),
        roi_rows = set.ad_roi.len(),
        "loaded snapshot"
    );
    Ok(set)
}

/// Build an ROI filter from CLI flags.
///
/// # Errors
///
/// Returns an error if `start` is after `end`.
pub(crate) fn roi_filter(
    ad_id: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> anyhow::Result<RoiFilter> {
    if let (Some(start), Some(end)) = (start, end) {
        anyhow::ensure!(
            start <= end,
            "--start-date {start} is after --end-date {end}"
        );
    }
    Ok(RoiFilter {
        ad_id: ad_id.filter(|id| !id.trim().is_empty()),
        start,
        end,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn run_summary(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let summary = summarize_entity_set(&load_entity_set(path)?);
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            print!("{}", render_summary(&summary));
            Ok(())
        }
    }
}

pub(crate) fn run_roi(
    path: &Path,
    filter: RoiFilter,
    by_ad: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let set = load_entity_set(path)?;
    let rows = if by_ad {
        compute_roi_by_ad(&set.ad_roi, &filter)
    } else {
        compute_roi(&set.ad_roi, &filter)
    };
    let aggregate = compute_aggregate_roi(&set.ad_roi, &filter);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "rows": rows,
            "aggregate": aggregate,
        })),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("no ROI rows matched the filter");
                return Ok(());
            }
            print!("{}", render_roi(&rows, &aggregate));
            Ok(())
        }
    }
}

pub(crate) fn run_satisfaction(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let set = load_entity_set(path)?;
    let slices = compute_satisfaction_distribution(&set.satisfaction);
    match format {
        OutputFormat::Json => print_json(&slices),
        OutputFormat::Text => {
            print!("{}", render_satisfaction(&slices));
            Ok(())
        }
    }
}

pub(crate) fn run_insights(
    path: &Path,
    mode: ComparisonMode,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = build_dashboard(&load_entity_set(path)?, mode);
    match format {
        OutputFormat::Json => print_json(&report.insights),
        OutputFormat::Text => {
            if report.insights.is_empty() {
                println!("no insights; the snapshot has no trendable data");
                return Ok(());
            }
            print!("{}", render_insights(&report.insights));
            Ok(())
        }
    }
}

/// Print the full dashboard as markdown (text) or JSON.
pub(crate) fn run_report(
    path: &Path,
    mode: ComparisonMode,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = build_dashboard(&load_entity_set(path)?, mode);
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    println!("# Dashboard Report");
    println!();
    println!("**Generated**: {now}");
    println!("**Source**: {}", path.display());
    println!("**Comparison mode**: {}", report.comparison_mode);
    println!();
    println!("## Summary");
    println!();
    print!("{}", render_summary(&report.summary));
    println!();
    println!("## ROI by ad");
    println!();
    if report.roi_by_ad.is_empty() {
        println!("no ROI rows");
    } else {
        print!("{}", render_roi(&report.roi_by_ad, &report.aggregate_roi));
    }
    println!();
    println!("## Satisfaction");
    println!();
    print!("{}", render_satisfaction(&report.satisfaction));
    println!();
    println!("## Insights");
    println!();
    if report.insights.is_empty() {
        println!("none");
    } else {
        print!("{}", render_insights(&report.insights));
    }
    Ok(())
}

pub(crate) fn run_trend(previous: f64, current: f64, format: OutputFormat) -> anyhow::Result<()> {
    let trend = classify_trend(previous, current);
    match format {
        OutputFormat::Json => print_json(&trend),
        OutputFormat::Text => {
            println!("{} ({})", trend.direction, fmt_delta(trend));
            Ok(())
        }
    }
}

fn fmt_delta(trend: Trend) -> String {
    match trend.delta {
        TrendDelta::Finite(delta) => format!("{:+.2}%", delta * 100.0),
        TrendDelta::Unbounded => "+inf".to_string(),
    }
}

fn render_summary(summary: &SummaryMetrics) -> String {
    let mut out = String::new();
    let rows: [(&str, String); 10] = [
        ("total users", summary.total_users.to_string()),
        ("active users", summary.active_users.to_string()),
        ("total content", summary.total_content.to_string()),
        ("flagged content", summary.flagged_content.to_string()),
        ("total ads", summary.total_ads.to_string()),
        ("average ctr", format!("{:.4}", summary.average_ctr)),
        ("total reports", summary.total_reports.to_string()),
        ("pending reports", summary.pending_reports.to_string()),
        (
            "resolution rate",
            format!("{:.2}%", summary.report_resolution_rate * 100.0),
        ),
        ("total flags", summary.total_flags.to_string()),
    ];
    for (label, value) in rows {
        out.push_str(&format!("{label:<20}{value}\n"));
    }
    out
}

fn render_roi(rows: &[RoiResult], aggregate: &RoiResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14}{:<12}{:>12}{:>10}{:>12}{:>12}{:>10}\n",
        "AD", "DATE", "IMPRESSIONS", "CLICKS", "REVENUE", "COST", "ROI"
    ));
    for row in rows.iter().chain(std::iter::once(aggregate)) {
        let ad = row.ad_id.as_deref().unwrap_or("(all)");
        let date = row
            .date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        out.push_str(&format!(
            "{:<14}{:<12}{:>12}{:>10}{:>12.2}{:>12.2}{:>10.2}{}\n",
            ad,
            date,
            row.impressions,
            row.clicks,
            row.revenue,
            row.cost,
            row.roi,
            if row.zero_cost { " *" } else { "" }
        ));
    }
    if rows.iter().chain(std::iter::once(aggregate)).any(|r| r.zero_cost) {
        out.push_str("* zero cost: ROI shows the raw gain\n");
    }
    out
}

fn render_satisfaction(slices: &[SatisfactionSlice]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10}{:>8}{:>10}\n", "LEVEL", "COUNT", "SHARE"));
    for slice in slices {
        out.push_str(&format!(
            "{:<10}{:>8}{:>9.2}%\n",
            slice.satisfaction_level, slice.count, slice.percentage
        ));
    }
    out
}

fn render_insights(insights: &[Insight]) -> String {
    let mut out = String::new();
    for insight in insights {
        out.push_str(&format!("[{}] {}\n", insight.kind, insight.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use socialdash_core::SatisfactionLevel;
    use socialdash_metrics::{InsightKind, InsightValue, TrendDirection};

    use super::*;

    #[test]
    fn roi_filter_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 1);
        let end = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert!(roi_filter(None, start, end).is_err());
    }

    #[test]
    fn roi_filter_drops_blank_ad_id() {
        let filter = roi_filter(Some("  ".to_string()), None, None).expect("valid filter");
        assert_eq!(filter, RoiFilter::default());
    }

    #[test]
    fn fmt_delta_handles_sentinels() {
        assert_eq!(fmt_delta(classify_trend(0.0, 3.0)), "+inf");
        assert_eq!(fmt_delta(classify_trend(100.0, 90.0)), "-10.00%");
    }

    #[test]
    fn render_roi_marks_zero_cost_rows() {
        let row = RoiResult {
            ad_id: Some("a1".to_string()),
            revenue: 10.0,
            roi: 10.0,
            zero_cost: true,
            periods: 1,
            ..RoiResult::default()
        };
        let out = render_roi(std::slice::from_ref(&row), &row);
        assert!(out.contains("a1"));
        assert!(out.contains("* zero cost"));
    }

    #[test]
    fn render_satisfaction_lists_every_level() {
        let slices = compute_satisfaction_distribution(&[socialdash_core::SatisfactionRecord {
            satisfaction_level: SatisfactionLevel::Medium,
            count: 2,
        }]);
        let out = render_satisfaction(&slices);
        assert!(out.contains("high"));
        assert!(out.contains("medium"));
        assert!(out.contains("100.00%"));
        assert!(out.contains("low"));
    }

    #[test]
    fn render_insights_prefixes_kind() {
        let insight = Insight {
            kind: InsightKind::Moderation,
            trend: TrendDirection::Up,
            delta: TrendDelta::Finite(0.5),
            metric: "pending_reports".to_string(),
            value: InsightValue::Integer(6),
            description: "pending_reports is up 50.00% at 6".to_string(),
        };
        assert_eq!(
            render_insights(&[insight]),
            "[moderation] pending_reports is up 50.00% at 6\n"
        );
    }

    #[test]
    fn render_roi_writes_header_rows_and_aggregate() {
        let row = RoiResult {
            ad_id: Some("a1".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1),
            periods: 1,
            ..RoiResult::default()
        };
        let out = render_roi(std::slice::from_ref(&row), &RoiResult::default());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("AD"));
        assert!(lines[1].contains("2025-01-01"));
        assert!(lines[2].starts_with("(all)"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn render_insights_names_leader_kinds() {
        let insight = Insight {
            kind: InsightKind::ContentPerformance,
            trend: TrendDirection::Up,
            delta: TrendDelta::Finite(0.5),
            metric: "best_performing_content".to_string(),
            value: InsightValue::Text("video".to_string()),
            description: "best_performing_content is video with 3 items".to_string(),
        };
        assert_eq!(
            render_insights(&[insight]),
            "[content_performance] best_performing_content is video with 3 items\n"
        );
    }

    #[test]
    fn load_entity_set_reads_yaml_snapshot() {
        let path = std::env::temp_dir().join(format!(
            "socialdash-cli-snapshot-{}.yaml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "users:\n  - id: u1\n    status: active\nsatisfaction:\n  - satisfaction_level: High\n    count: 3\n",
        )
        .expect("write snapshot");
        let set = load_entity_set(&path).expect("snapshot should load");
        std::fs::remove_file(&path).ok();
        assert_eq!(set.users.len(), 1);
        assert_eq!(set.satisfaction.len(), 1);
    }

    #[test]
    fn load_entity_set_reports_missing_file() {
        let err = load_entity_set(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
