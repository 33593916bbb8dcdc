//! Dashboard aggregates over views and datasets.
//!
//! Every function is read-only. The only failure is
//! [`DashboardError::MissingColumn`] when the source header lacked a column
//! the aggregate needs. Empty input yields the identity result.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{Dataset, UserRecord, View};
use dashboard_core::schema::Column;
use serde::{Deserialize, Serialize};

// ── Fields ────────────────────────────────────────────────────────────────────

/// Login bucket used by [`active_users_by_bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketField {
    LoginDate,
    Week,
}

impl BucketField {
    fn key(self, record: &UserRecord) -> Option<String> {
        match self {
            BucketField::LoginDate => record.login_date.map(|d| d.format("%Y-%m-%d").to_string()),
            BucketField::Week => record.week.clone(),
        }
    }
}

impl FromStr for BucketField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(BucketField::LoginDate),
            "week" => Ok(BucketField::Week),
            other => Err(DashboardError::UnknownSegment(other.to_string())),
        }
    }
}

/// Categorical field used by [`revenue_by_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentField {
    DeviceType,
    SubscriptionTier,
    PreferredGameMode,
}

impl SegmentField {
    pub fn column(self) -> Column {
        match self {
            SegmentField::DeviceType => Column::DeviceType,
            SegmentField::SubscriptionTier => Column::SubscriptionTier,
            SegmentField::PreferredGameMode => Column::PreferredGameMode,
        }
    }

    /// Human-readable name, e.g. `"Device Type"`.
    pub fn label(self) -> &'static str {
        match self {
            SegmentField::DeviceType => "Device Type",
            SegmentField::SubscriptionTier => "Subscription Tier",
            SegmentField::PreferredGameMode => "Game Mode",
        }
    }

    fn value(self, record: &UserRecord) -> Option<&str> {
        match self {
            SegmentField::DeviceType => record.device_type.as_deref(),
            SegmentField::SubscriptionTier => record.subscription_tier.as_deref(),
            SegmentField::PreferredGameMode => record.preferred_game_mode.as_deref(),
        }
    }
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SegmentField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "device" => Ok(SegmentField::DeviceType),
            "tier" => Ok(SegmentField::SubscriptionTier),
            "mode" => Ok(SegmentField::PreferredGameMode),
            other => Err(DashboardError::UnknownSegment(other.to_string())),
        }
    }
}

// ── Result rows ───────────────────────────────────────────────────────────────

/// Distinct active users within one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePoint {
    pub bucket: String,
    pub active_users: usize,
}

/// Revenue of every user who signed up at `signup`, plus the running total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub signup: NaiveDateTime,
    pub revenue: f64,
    pub cumulative: f64,
}

/// Revenue sum of one segment value. `segment` is `None` for records with no
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRevenue {
    pub segment: Option<String>,
    pub revenue: f64,
}

// ── Scalar metrics ────────────────────────────────────────────────────────────

/// Distinct non-null user ids.
pub fn total_users(view: &View<'_>) -> Result<usize> {
    view.require(Column::UserId)?;
    let ids: HashSet<&str> = view.iter().filter_map(|r| r.user_id.as_deref()).collect();
    Ok(ids.len())
}

/// Sum of revenue; missing values count as zero.
pub fn total_revenue(view: &View<'_>) -> Result<f64> {
    view.require(Column::TotalRevenueUsd)?;
    Ok(view.iter().map(UserRecord::revenue_or_zero).sum())
}

/// Mean of the non-null session durations, `None` when there are none.
pub fn avg_session_duration(view: &View<'_>) -> Result<Option<f64>> {
    view.require(Column::AvgSessionDurationMin)?;
    let (sum, count) = view
        .iter()
        .filter_map(|r| r.avg_session_duration_min)
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    Ok((count > 0).then(|| sum / count as f64))
}

// ── Active users ──────────────────────────────────────────────────────────────

/// Distinct users per login day or week, ascending by bucket.
pub fn active_users_by_bucket(view: &View<'_>, field: BucketField) -> Result<Vec<ActivePoint>> {
    view.require(Column::UserId)?;
    view.require(Column::LastLogin)?;
    Ok(count_distinct_users(view.iter(), |r| field.key(r)))
}

/// Distinct users per login month over the whole dataset. Filters do not
/// apply here.
pub fn monthly_active_users(dataset: &Dataset) -> Result<Vec<ActivePoint>> {
    dataset.require(Column::UserId)?;
    dataset.require(Column::LastLogin)?;
    Ok(count_distinct_users(dataset.records().iter(), |r| {
        r.month.clone()
    }))
}

fn count_distinct_users<'a>(
    records: impl Iterator<Item = &'a UserRecord>,
    bucket: impl Fn(&UserRecord) -> Option<String>,
) -> Vec<ActivePoint> {
    let mut buckets: BTreeMap<String, HashSet<&'a str>> = BTreeMap::new();
    for record in records {
        let Some(key) = bucket(record) else {
            continue;
        };
        let users = buckets.entry(key).or_default();
        if let Some(id) = record.user_id.as_deref() {
            users.insert(id);
        }
    }
    buckets
        .into_iter()
        .map(|(bucket, users)| ActivePoint {
            bucket,
            active_users: users.len(),
        })
        .collect()
}

// ── Revenue ───────────────────────────────────────────────────────────────────

/// Revenue grouped by signup timestamp with a running prefix sum, over the
/// whole dataset. Records without a signup date are left out.
pub fn cumulative_revenue_by_signup(dataset: &Dataset) -> Result<Vec<RevenuePoint>> {
    dataset.require(Column::SignupDate)?;
    dataset.require(Column::TotalRevenueUsd)?;

    let mut by_signup: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for record in dataset.records() {
        if let Some(signup) = record.signup_date {
            *by_signup.entry(signup).or_insert(0.0) += record.revenue_or_zero();
        }
    }

    let mut running = 0.0;
    Ok(by_signup
        .into_iter()
        .map(|(signup, revenue)| {
            running += revenue;
            RevenuePoint {
                signup,
                revenue,
                cumulative: running,
            }
        })
        .collect())
}

/// Revenue per value of `field`. Named groups come first in ascending order;
/// records with no value form one trailing group.
pub fn revenue_by_segment(view: &View<'_>, field: SegmentField) -> Result<Vec<SegmentRevenue>> {
    view.require(field.column())?;
    view.require(Column::TotalRevenueUsd)?;

    let mut named: BTreeMap<&str, f64> = BTreeMap::new();
    let mut unnamed: Option<f64> = None;
    for record in view.iter() {
        let revenue = record.revenue_or_zero();
        match field.value(record) {
            Some(segment) => *named.entry(segment).or_insert(0.0) += revenue,
            None => *unnamed.get_or_insert(0.0) += revenue,
        }
    }

    let mut out: Vec<SegmentRevenue> = named
        .into_iter()
        .map(|(segment, revenue)| SegmentRevenue {
            segment: Some(segment.to_string()),
            revenue,
        })
        .collect();
    if let Some(revenue) = unnamed {
        out.push(SegmentRevenue {
            segment: None,
            revenue,
        });
    }
    Ok(out)
}

/// The `n` highest-revenue records, descending. Missing revenue sorts last
/// and ties keep row order.
pub fn top_users_by_revenue<'a>(view: &View<'a>, n: usize) -> Result<Vec<&'a UserRecord>> {
    view.require(Column::TotalRevenueUsd)?;
    let mut rows: Vec<&'a UserRecord> = view.rows().to_vec();
    rows.sort_by(|a, b| match (a.total_revenue_usd, b.total_revenue_usd) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows.truncate(n);
    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
