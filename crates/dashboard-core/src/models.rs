use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{DashboardError, Result};
use crate::schema::{Column, ColumnSet};

/// One row of the user-records source after cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Zero-based position among the data rows of the source.
    pub row: usize,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub device_type: Option<String>,
    pub subscription_tier: Option<String>,
    pub preferred_game_mode: Option<String>,
    /// Parsed day-first; `None` when the cell was empty or unparseable.
    pub signup_date: Option<NaiveDateTime>,
    /// Parsed day-first; `None` when the cell was empty or unparseable.
    pub last_login: Option<NaiveDateTime>,
    pub total_revenue_usd: Option<f64>,
    pub avg_session_duration_min: Option<f64>,
    pub total_play_sessions: Option<u64>,
    /// Calendar date of `last_login`.
    pub login_date: Option<NaiveDate>,
    /// `%Y-%U` bucket of `last_login`.
    pub week: Option<String>,
    /// `%Y-%m` bucket of `last_login`.
    pub month: Option<String>,
    /// Whole days between `last_login` and the processing instant. Display
    /// only; it differs between loads.
    pub days_since_last_login: Option<i64>,
}

impl UserRecord {
    /// Fill the fields derived from `last_login`, relative to `now`.
    pub fn derive_login_fields(&mut self, now: &NaiveDateTime) {
        match self.last_login {
            Some(ref login) => {
                self.login_date = Some(login.date());
                self.week = Some(dates::week_key(login));
                self.month = Some(dates::month_key(login));
                self.days_since_last_login = Some(dates::days_between(login, now));
            }
            None => {
                self.login_date = None;
                self.week = None;
                self.month = None;
                self.days_since_last_login = None;
            }
        }
    }

    /// Revenue with a missing value counted as zero.
    pub fn revenue_or_zero(&self) -> f64 {
        self.total_revenue_usd.unwrap_or(0.0)
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// The cleaned, immutable table loaded from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: PathBuf,
    columns: ColumnSet,
    records: Vec<UserRecord>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, columns: ColumnSet, records: Vec<UserRecord>) -> Self {
        Self {
            source: source.into(),
            columns,
            records,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail with [`DashboardError::MissingColumn`] unless the header had `column`.
    pub fn require(&self, column: Column) -> Result<()> {
        if self.columns.contains(column) {
            Ok(())
        } else {
            Err(DashboardError::MissingColumn(column))
        }
    }

    /// A view over every row.
    pub fn full_view(&self) -> View<'_> {
        View {
            dataset: self,
            rows: self.records.iter().collect(),
        }
    }

    /// A view over the rows matching `keep`, in original order.
    pub fn view_where(&self, keep: impl Fn(&UserRecord) -> bool) -> View<'_> {
        View {
            dataset: self,
            rows: self.records.iter().filter(|r| keep(*r)).collect(),
        }
    }

    /// Distinct non-null countries in first-appearance order.
    pub fn distinct_countries(&self) -> Vec<String> {
        distinct_in_order(self.records.iter().map(|r| r.country.as_deref()))
    }

    /// Distinct non-null device types in first-appearance order.
    pub fn distinct_devices(&self) -> Vec<String> {
        distinct_in_order(self.records.iter().map(|r| r.device_type.as_deref()))
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for value in values.flatten() {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

// ── View ──────────────────────────────────────────────────────────────────────

/// A read-only projection of a [`Dataset`].
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    rows: Vec<&'a UserRecord>,
}

impl<'a> View<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn rows(&self) -> &[&'a UserRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a UserRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn require(&self, column: Column) -> Result<()> {
        self.dataset.require(column)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
