//! CSV loading and cleaning for the user-records source.
//!
//! Reads the header through the declared schema mapping, converts every row
//! into a [`UserRecord`] and derives the login buckets. Cell-level problems
//! (bad dates, bad numbers) become `None`; only an unreadable or empty source
//! fails the load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{Datelike, Local, NaiveDateTime};
use csv::StringRecord;
use dashboard_core::dates::DayFirstParser;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{Dataset, UserRecord};
use dashboard_core::schema::{Column, HeaderMap};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `path`, deriving `days_since_last_login` against the local clock.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    load_dataset_at(path, Local::now().naive_local())
}

/// Load `path` with an explicit processing instant.
pub fn load_dataset_at(path: &Path, now: NaiveDateTime) -> Result<Dataset> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_dataset(BufReader::new(file), path, now)
}

/// Parse CSV from any reader. `source` only labels the resulting dataset.
pub fn read_dataset<R: Read>(reader: R, source: &Path, now: NaiveDateTime) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let header_map = HeaderMap::from_headers(headers.iter());
    if !header_map.unrecognised().is_empty() {
        debug!(
            "Ignoring unrecognised columns in {}: {:?}",
            source.display(),
            header_map.unrecognised()
        );
    }

    let mut records: Vec<UserRecord> = Vec::new();
    let mut stats = LoadStats::default();

    for result in rdr.records() {
        match result {
            Ok(raw) => {
                let record = map_record(&raw, &header_map, records.len(), now, &mut stats);
                records.push(record);
            }
            Err(e) => {
                stats.rows_skipped += 1;
                debug!("Skipping unreadable row in {}: {}", source.display(), e);
            }
        }
    }

    if stats.rows_skipped > 0 {
        warn!(
            "Skipped {} unreadable rows in {}",
            stats.rows_skipped,
            source.display()
        );
    }

    debug!(
        "Loaded {}: {} rows, {} skipped, {} unparseable dates, {} unparseable numbers, {} columns",
        source.display(),
        records.len(),
        stats.rows_skipped,
        stats.bad_dates,
        stats.bad_numbers,
        header_map.columns().len(),
    );

    if records.is_empty() {
        return Err(DashboardError::EmptyDataset(source.to_path_buf()));
    }

    Ok(Dataset::new(source, header_map.columns(), records))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Counters reported once per load.
#[derive(Debug, Default)]
struct LoadStats {
    rows_skipped: u64,
    bad_dates: u64,
    bad_numbers: u64,
}

/// Convert one CSV row into a cleaned [`UserRecord`].
fn map_record(
    raw: &StringRecord,
    header: &HeaderMap,
    row: usize,
    now: NaiveDateTime,
    stats: &mut LoadStats,
) -> UserRecord {
    let text = |col: Column| cell(raw, header, col).map(str::to_string);

    let mut date = |col: Column| {
        let value = cell(raw, header, col)?;
        let parsed = DayFirstParser::parse_with_reference(value, now.year());
        if parsed.is_none() {
            stats.bad_dates += 1;
        }
        parsed
    };
    let signup_date = date(Column::SignupDate);
    let last_login = date(Column::LastLogin);

    let mut amount = |col: Column| {
        let value = cell(raw, header, col)?;
        let parsed = parse_amount(value);
        if parsed.is_none() {
            stats.bad_numbers += 1;
        }
        parsed
    };
    let total_revenue_usd = amount(Column::TotalRevenueUsd);
    let avg_session_duration_min = amount(Column::AvgSessionDurationMin);

    let total_play_sessions = cell(raw, header, Column::TotalPlaySessions).and_then(|value| {
        let parsed = parse_count(value);
        if parsed.is_none() {
            stats.bad_numbers += 1;
        }
        parsed
    });

    let mut record = UserRecord {
        row,
        user_id: text(Column::UserId),
        username: text(Column::Username),
        country: text(Column::Country),
        device_type: text(Column::DeviceType),
        subscription_tier: text(Column::SubscriptionTier),
        preferred_game_mode: text(Column::PreferredGameMode),
        signup_date,
        last_login,
        total_revenue_usd,
        avg_session_duration_min,
        total_play_sessions,
        ..Default::default()
    };
    record.derive_login_fields(&now);
    record
}

/// Trimmed, non-empty cell for `col`, if the header has it and the row is
/// long enough.
fn cell<'r>(raw: &'r StringRecord, header: &HeaderMap, col: Column) -> Option<&'r str> {
    header
        .position(col)
        .and_then(|idx| raw.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a decimal amount, tolerating a leading `$` and thousands commas.
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative count; integral floats such as `"12.0"` are accepted.
fn parse_count(s: &str) -> Option<u64> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
