//! End-to-end checks from a raw JSON snapshot to dashboard output.

use serde_json::json;
use socialdash_core::ComparisonMode;
use socialdash_metrics::{
    build_dashboard, compute_aggregate_roi, compute_roi, compute_satisfaction_distribution,
    compute_summary_metrics, normalize_entity_set, InsightKind, InsightValue, RoiFilter,
    TrendDirection,
};

fn snapshot() -> serde_json::Value {
    json!({
        "users": [
            {"id": 1, "status": "active", "region": "EU"},
            {"id": 2, "status": "inactive", "region": "NA"},
            {"id": 3, "status": "active"}
        ],
        "content": [
            {"id": "c1", "content_type": "video", "status": "active"},
            {"id": "c2", "content_type": "thread", "status": "flagged"}
        ],
        "ads": [
            {"id": "a1", "title": "Spring", "ctr": 0.04, "impressions": 1000, "clicks": 40},
            {"id": "a2", "title": "Summer", "ctr": "0.08"},
            {"id": "a3", "title": "Broken", "ctr": null}
        ],
        "moderation_stats": {
            "reports": {"total": 12, "pending": 6, "resolved": 4, "dismissed": 2},
            "flags": {"total": 3}
        },
        "engagement": [
            {"timestamp": "2025-03-02T00:00:00Z", "likes": 120, "comments": 30},
            {"timestamp": "2025-03-01T00:00:00Z", "likes": 100, "comments": 30}
        ],
        "ad_roi": [
            {"date": "2025-03-01", "ad_id": "a1", "impressions": 500, "clicks": 20, "revenue": 400, "cost": 100},
            {"date": "2025-03-02", "ad_id": "a1", "impressions": 500, "clicks": 20, "revenue": 0, "cost": 300}
        ],
        "satisfaction": [
            {"satisfaction_level": "High", "count": 6},
            {"satisfaction_level": "Low", "count": 2}
        ]
    })
}

#[test]
fn missing_ctr_counts_as_zero_in_average() {
    let set = normalize_entity_set(&snapshot()).expect("snapshot should normalize");
    let metrics =
        compute_summary_metrics(&set.users, &set.content, &set.ads, set.moderation_stats.as_ref());
    assert_eq!(metrics.total_ads, 3);
    assert!((metrics.average_ctr - 0.04).abs() < 1e-12);
    assert_eq!(metrics.active_users, 2);
    assert_eq!(metrics.total_reports, 12);
    assert_eq!(metrics.total_flags, 3);
}

#[test]
fn aggregate_roi_diverges_from_mean_of_periods() {
    let set = normalize_entity_set(&snapshot()).expect("snapshot should normalize");
    let filter = RoiFilter::default();
    let periods = compute_roi(&set.ad_roi, &filter);
    let mean = periods.iter().map(|p| p.roi).sum::<f64>() / periods.len() as f64;
    let aggregate = compute_aggregate_roi(&set.ad_roi, &filter);
    assert!((mean - 1.0).abs() < 1e-12);
    assert!(aggregate.roi.abs() < 1e-12);
}

#[test]
fn satisfaction_distribution_has_fixed_legend() {
    let set = normalize_entity_set(&snapshot()).expect("snapshot should normalize");
    let slices = compute_satisfaction_distribution(&set.satisfaction);
    assert_eq!(slices.len(), 3);
    assert_eq!(slices[1].count, 0);
    assert!((slices[0].percentage - 75.0).abs() < 1e-12);
}

#[test]
fn dashboard_ranks_insights_by_change() {
    let set = normalize_entity_set(&snapshot()).expect("snapshot should normalize");
    let report = build_dashboard(&set, ComparisonMode::Endpoints);

    let ranked: Vec<(InsightKind, &str)> = report
        .insights
        .iter()
        .map(|insight| (insight.kind, insight.metric.as_str()))
        .collect();
    // roi 3.0 -> -1.0 (|d| 1.33), satisfaction 2 -> 6 (2.0), best ad a2 0.08 vs
    // average 0.04 (1.0), moderation 4 -> 6 (0.5), likes 100 -> 120 (0.2),
    // comments flat and the one-each content types tied (0.0).
    assert_eq!(
        ranked,
        vec![
            (InsightKind::Satisfaction, "net_satisfaction"),
            (InsightKind::Roi, "roi"),
            (InsightKind::AdPerformance, "best_performing_ad"),
            (InsightKind::Moderation, "pending_reports"),
            (InsightKind::Engagement, "likes"),
            (InsightKind::Engagement, "comments"),
            (InsightKind::ContentPerformance, "best_performing_content"),
        ]
    );
    assert_eq!(report.insights[5].trend, TrendDirection::Flat);
    assert_eq!(report.insights[2].value, InsightValue::Text("a2".to_string()));
    assert_eq!(report.insights[6].value, InsightValue::Text("thread".to_string()));
}

#[test]
fn dashboard_serializes_unbounded_delta_as_string() {
    let raw = json!({
        "engagement": [
            {"date": "2025-03-01", "shares": 0},
            {"date": "2025-03-02", "shares": 5}
        ]
    });
    let set = normalize_entity_set(&raw).expect("snapshot should normalize");
    let report = build_dashboard(&set, ComparisonMode::Latest);
    let json = serde_json::to_value(&report).expect("report should serialize");
    assert_eq!(json["insights"][0]["delta"], "infinity");
    assert_eq!(json["insights"][0]["type"], "engagement");
    assert_eq!(json["comparison_mode"], "latest");
}

#[test]
fn malformed_collection_names_its_path() {
    let err = normalize_entity_set(&json!({"ad_roi": [{"ad_id": "a"}, [1, 2]]}))
        .expect_err("nested array should be rejected");
    assert_eq!(err.path(), "ad_roi[1]");
}
