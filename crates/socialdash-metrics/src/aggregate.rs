//! Reduction of entity collections into dashboard summary metrics.

use std::collections::BTreeMap;

use socialdash_core::{Ad, Content, ContentStatus, EntitySet, ModerationStats, User, UserStatus};

use crate::types::SummaryMetrics;

/// Reduce users, content, ads and moderation stats into [`SummaryMetrics`].
///
/// Every count is order-independent, and the CTR mean is summed over sorted
/// values so it is bit-identical for any permutation of `ads`. Absent
/// moderation stats contribute zeros.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_summary_metrics(
    users: &[User],
    content: &[Content],
    ads: &[Ad],
    moderation_stats: Option<&ModerationStats>,
) -> SummaryMetrics {
    let stats = moderation_stats.copied().unwrap_or_default();

    let mut ctrs: Vec<f64> = ads.iter().map(|ad| ad.ctr).collect();
    ctrs.sort_by(f64::total_cmp);
    let average_ctr = ctrs.iter().sum::<f64>() / ads.len().max(1) as f64;

    let mut users_by_region: BTreeMap<String, usize> = BTreeMap::new();
    for user in users {
        *users_by_region.entry(user.region.clone()).or_default() += 1;
    }

    let mut content_by_type: BTreeMap<String, usize> = BTreeMap::new();
    for item in content {
        *content_by_type
            .entry(item.content_type.to_string())
            .or_default() += 1;
    }

    SummaryMetrics {
        total_users: users.len(),
        active_users: users
            .iter()
            .filter(|user| user.status == UserStatus::Active)
            .count(),
        total_content: content.len(),
        total_ads: ads.len(),
        total_reports: stats.total_reports,
        average_ctr,
        pending_reports: stats.pending_reports,
        resolved_reports: stats.resolved_reports,
        dismissed_reports: stats.dismissed_reports,
        total_flags: stats.total_flags,
        report_resolution_rate: stats.resolved_reports as f64
            / stats.total_reports.max(1) as f64,
        flagged_content: content
            .iter()
            .filter(|item| item.status == ContentStatus::Flagged)
            .count(),
        removed_content: content
            .iter()
            .filter(|item| item.status == ContentStatus::Removed)
            .count(),
        users_by_region,
        content_by_type,
    }
}

/// [`compute_summary_metrics`] over a normalized snapshot.
#[must_use]
pub fn summarize_entity_set(set: &EntitySet) -> SummaryMetrics {
    compute_summary_metrics(
        &set.users,
        &set.content,
        &set.ads,
        set.moderation_stats.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use socialdash_core::ContentType;

    use super::*;

    fn user(id: &str, status: UserStatus, region: &str) -> User {
        User {
            id: id.to_string(),
            status,
            region: region.to_string(),
        }
    }

    fn ad(id: &str, ctr: f64) -> Ad {
        Ad {
            id: id.to_string(),
            title: format!("Ad {id}"),
            ctr,
            impressions: 0,
            clicks: 0,
            revenue: 0.0,
            cost: 0.0,
        }
    }

    #[test]
    fn empty_inputs_yield_all_zero_metrics() {
        let metrics = compute_summary_metrics(&[], &[], &[], None);
        assert_eq!(metrics, SummaryMetrics::default());
        assert_eq!(metrics.average_ctr, 0.0);
        assert!(!metrics.average_ctr.is_nan());
    }

    #[test]
    fn counts_active_users() {
        let users = vec![
            user("u1", UserStatus::Active, "EU"),
            user("u2", UserStatus::Suspended, "EU"),
            user("u3", UserStatus::Active, "NA"),
            user("u4", UserStatus::Unknown, "unknown"),
        ];
        let metrics = compute_summary_metrics(&users, &[], &[], None);
        assert_eq!(metrics.total_users, 4);
        assert_eq!(metrics.active_users, 2);
        assert_eq!(metrics.users_by_region.get("EU"), Some(&2));
        assert_eq!(metrics.users_by_region.get("unknown"), Some(&1));
    }

    #[test]
    fn user_order_does_not_change_counts() {
        let mut users = vec![
            user("u1", UserStatus::Active, "EU"),
            user("u2", UserStatus::Inactive, "APAC"),
            user("u3", UserStatus::Active, "NA"),
        ];
        let baseline = compute_summary_metrics(&users, &[], &[], None);
        users.reverse();
        let reversed = compute_summary_metrics(&users, &[], &[], None);
        users.rotate_left(1);
        let rotated = compute_summary_metrics(&users, &[], &[], None);
        assert_eq!(baseline, reversed);
        assert_eq!(baseline, rotated);
    }

    #[test]
    fn average_ctr_is_permutation_stable() {
        let mut ads = vec![ad("a", 0.1), ad("b", 0.2), ad("c", 0.3), ad("d", 1e-17)];
        let forward = compute_summary_metrics(&[], &[], &ads, None).average_ctr;
        ads.reverse();
        let backward = compute_summary_metrics(&[], &[], &ads, None).average_ctr;
        assert_eq!(forward.to_bits(), backward.to_bits());
        assert!((forward - 0.15).abs() < 1e-12);
    }

    #[test]
    fn moderation_stats_are_copied_through() {
        let stats = ModerationStats {
            total_reports: 8,
            pending_reports: 3,
            resolved_reports: 4,
            dismissed_reports: 1,
            total_flags: 6,
        };
        let metrics = compute_summary_metrics(&[], &[], &[], Some(&stats));
        assert_eq!(metrics.total_reports, 8);
        assert_eq!(metrics.pending_reports, 3);
        assert_eq!(metrics.total_flags, 6);
        assert!((metrics.report_resolution_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn inconsistent_moderation_stats_do_not_panic() {
        let stats = ModerationStats {
            total_reports: 0,
            pending_reports: 10,
            resolved_reports: 10,
            dismissed_reports: 10,
            total_flags: 0,
        };
        let metrics = compute_summary_metrics(&[], &[], &[], Some(&stats));
        assert_eq!(metrics.total_reports, 0);
        assert!((metrics.report_resolution_rate - 10.0).abs() < 1e-12);
    }

    #[test]
    fn content_breakdown_by_type_and_status() {
        let content = vec![
            Content {
                id: "c1".into(),
                content_type: ContentType::Video,
                status: ContentStatus::Active,
            },
            Content {
                id: "c2".into(),
                content_type: ContentType::Video,
                status: ContentStatus::Flagged,
            },
            Content {
                id: "c3".into(),
                content_type: ContentType::Thread,
                status: ContentStatus::Removed,
            },
        ];
        let metrics = compute_summary_metrics(&[], &content, &[], None);
        assert_eq!(metrics.total_content, 3);
        assert_eq!(metrics.content_by_type.get("video"), Some(&2));
        assert_eq!(metrics.content_by_type.get("thread"), Some(&1));
        assert_eq!(metrics.flagged_content, 1);
        assert_eq!(metrics.removed_content, 1);
    }

    #[test]
    fn summarize_entity_set_matches_direct_call() {
        let set = EntitySet {
            users: vec![user("u1", UserStatus::Active, "EU")],
            ads: vec![ad("a", 0.4)],
            ..EntitySet::default()
        };
        assert_eq!(
            summarize_entity_set(&set),
            compute_summary_metrics(&set.users, &[], &set.ads, None)
        );
    }
}
