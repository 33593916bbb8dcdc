//! Snapshot pipeline for the dashboard.
//!
//! Applies the selection, runs every aggregate once and returns a
//! [`DashboardSnapshot`] of owned data for the presentation layer.

use chrono::Utc;
use dashboard_core::error::Result;
use dashboard_core::models::{Dataset, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{
    self, ActivePoint, BucketField, RevenuePoint, SegmentField, SegmentRevenue,
};
use crate::filter::{filter, Selection};

// ── Public types ──────────────────────────────────────────────────────────────

/// One row of the high-value users table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub username: Option<String>,
    pub total_revenue_usd: Option<f64>,
    pub total_play_sessions: Option<u64>,
    pub preferred_game_mode: Option<String>,
}

impl From<&UserRecord> for TopUser {
    fn from(r: &UserRecord) -> Self {
        Self {
            username: r.username.clone(),
            total_revenue_usd: r.total_revenue_usd,
            total_play_sessions: r.total_play_sessions,
            preferred_game_mode: r.preferred_game_mode.clone(),
        }
    }
}

/// Metadata produced alongside the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// ISO-8601 timestamp when this snapshot was generated.
    pub generated_at: String,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub loaded_records: usize,
    pub filtered_records: usize,
    pub total_users: usize,
    pub total_revenue: f64,
    pub avg_session_duration: Option<f64>,
    pub daily_active: Vec<ActivePoint>,
    pub weekly_active: Vec<ActivePoint>,
    /// Whole dataset, independent of the selection.
    pub monthly_active: Vec<ActivePoint>,
    /// Whole dataset, independent of the selection.
    pub cumulative_revenue: Vec<RevenuePoint>,
    pub revenue_by_device: Vec<SegmentRevenue>,
    pub revenue_by_tier: Vec<SegmentRevenue>,
    pub revenue_by_mode: Vec<SegmentRevenue>,
    pub top_users: Vec<TopUser>,
    pub metadata: SnapshotMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Filter `dataset` by `selection` and compute every dashboard aggregate.
pub fn build_snapshot(
    dataset: &Dataset,
    selection: &Selection,
    top_n: usize,
) -> Result<DashboardSnapshot> {
    let start = std::time::Instant::now();

    let view = filter(dataset, selection)?;

    let snapshot = DashboardSnapshot {
        loaded_records: dataset.len(),
        filtered_records: view.len(),
        total_users: aggregator::total_users(&view)?,
        total_revenue: aggregator::total_revenue(&view)?,
        avg_session_duration: aggregator::avg_session_duration(&view)?,
        daily_active: aggregator::active_users_by_bucket(&view, BucketField::LoginDate)?,
        weekly_active: aggregator::active_users_by_bucket(&view, BucketField::Week)?,
        monthly_active: aggregator::monthly_active_users(dataset)?,
        cumulative_revenue: aggregator::cumulative_revenue_by_signup(dataset)?,
        revenue_by_device: aggregator::revenue_by_segment(&view, SegmentField::DeviceType)?,
        revenue_by_tier: aggregator::revenue_by_segment(&view, SegmentField::SubscriptionTier)?,
        revenue_by_mode: aggregator::revenue_by_segment(&view, SegmentField::PreferredGameMode)?,
        top_users: aggregator::top_users_by_revenue(&view, top_n)?
            .into_iter()
            .map(TopUser::from)
            .collect(),
        metadata: SnapshotMetadata {
            generated_at: Utc::now().to_rfc3339(),
            compute_time_seconds: start.elapsed().as_secs_f64(),
        },
    };

    debug!(
        "Snapshot: {} of {} records, {} users, revenue {:.2}, {:.3}s",
        snapshot.filtered_records,
        snapshot.loaded_records,
        snapshot.total_users,
        snapshot.total_revenue,
        snapshot.metadata.compute_time_seconds,
    );

    Ok(snapshot)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_dataset;
    use chrono::NaiveDate;
    use std::path::Path;

    const CSV: &str = "\
User_ID,Username,Country,Device_Type,Subscription_Tier,Preferred_Game_Mode,Signup_Date,Last_Login,Total_Revenue_USD,Avg_Session_Duration_Min,Total_Play_Sessions
A,alice,US,Mobile,Premium,Ranked,01/01/2024,10/01/2024,10,30,12
B,bob,US,Desktop,Free,Casual,02/01/2024,10/01/2024,20,10,4
A,alice,FR,Mobile,Premium,Ranked,03/01/2024,11/02/2024,5,,7
";

    fn dataset() -> Dataset {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        read_dataset(CSV.as_bytes(), Path::new("mem.csv"), now).unwrap()
    }

    #[test]
    fn test_build_snapshot_us_only() {
        let ds = dataset();
        let sel = Selection::new(
            ["US".to_string()],
            ["Mobile".to_string(), "Desktop".to_string()],
        );
        let snap = build_snapshot(&ds, &sel, 10).unwrap();

        assert_eq!(snap.loaded_records, 3);
        assert_eq!(snap.filtered_records, 2);
        assert_eq!(snap.total_users, 2);
        assert_eq!(snap.total_revenue, 30.0);
        assert_eq!(snap.avg_session_duration, Some(20.0));
        assert_eq!(snap.daily_active.len(), 1);
        assert_eq!(snap.daily_active[0].active_users, 2);

        // Whole-dataset series still see the FR row.
        assert_eq!(snap.monthly_active.len(), 2);
        assert_eq!(snap.cumulative_revenue.len(), 3);
        assert_eq!(snap.cumulative_revenue[2].cumulative, 35.0);

        let top: Vec<Option<&str>> = snap.top_users.iter().map(|u| u.username.as_deref()).collect();
        assert_eq!(top, vec![Some("bob"), Some("alice")]);
        assert_eq!(snap.top_users[0].total_play_sessions, Some(4));
        assert_eq!(snap.top_users[0].preferred_game_mode.as_deref(), Some("Casual"));
    }

    #[test]
    fn test_build_snapshot_empty_selection() {
        let ds = dataset();
        let snap = build_snapshot(&ds, &Selection::default(), 10).unwrap();
        assert_eq!(snap.filtered_records, 0);
        assert_eq!(snap.total_revenue, 0.0);
        assert_eq!(snap.avg_session_duration, None);
        assert!(snap.daily_active.is_empty());
        assert!(snap.top_users.is_empty());
        assert!(!snap.monthly_active.is_empty());
    }

    #[test]
    fn test_build_snapshot_top_n_limits() {
        let ds = dataset();
        let snap = build_snapshot(&ds, &Selection::all(&ds), 1).unwrap();
        assert_eq!(snap.top_users.len(), 1);
        assert_eq!(snap.top_users[0].total_revenue_usd, Some(20.0));
    }
}
