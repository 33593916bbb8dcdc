//! Declared schema mapping from source headers to typed columns.
//!
//! Header normalisation (trim, spaces to `_`) runs first, then the result is
//! looked up in [`COLUMN_MAP`]. Supporting a new source layout means editing
//! the table, nothing else.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A recognised column of the user-records source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    UserId,
    Username,
    Country,
    DeviceType,
    SubscriptionTier,
    PreferredGameMode,
    SignupDate,
    LastLogin,
    TotalRevenueUsd,
    AvgSessionDurationMin,
    TotalPlaySessions,
}

/// Canonical (normalised) header name → [`Column`].
pub const COLUMN_MAP: &[(&str, Column)] = &[
    ("User_ID", Column::UserId),
    ("Username", Column::Username),
    ("Country", Column::Country),
    ("Device_Type", Column::DeviceType),
    ("Subscription_Tier", Column::SubscriptionTier),
    ("Preferred_Game_Mode", Column::PreferredGameMode),
    ("Signup_Date", Column::SignupDate),
    ("Last_Login", Column::LastLogin),
    ("Total_Revenue_USD", Column::TotalRevenueUsd),
    ("Avg_Session_Duration_Min", Column::AvgSessionDurationMin),
    ("Total_Play_Sessions", Column::TotalPlaySessions),
];

/// Separator substituted for every internal space of a header.
pub const HEADER_SEPARATOR: char = '_';

impl Column {
    /// Canonical header spelling, e.g. `"Device_Type"`.
    pub fn header(self) -> &'static str {
        COLUMN_MAP
            .iter()
            .find(|(_, col)| *col == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Resolve a raw header through normalisation and the schema table.
    pub fn from_header(raw: &str) -> Option<Self> {
        let normalised = normalize_header(raw);
        COLUMN_MAP
            .iter()
            .find(|(name, _)| *name == normalised)
            .map(|(_, col)| *col)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Trim surrounding whitespace and replace each internal space with
/// [`HEADER_SEPARATOR`].
///
/// ```
/// use dashboard_core::schema::normalize_header;
///
/// assert_eq!(normalize_header("  Device Type "), "Device_Type");
/// assert_eq!(normalize_header("User_ID"), "User_ID");
/// ```
pub fn normalize_header(raw: &str) -> String {
    raw.trim().replace(' ', &HEADER_SEPARATOR.to_string())
}

// ── ColumnSet ─────────────────────────────────────────────────────────────────

/// The set of columns a loaded source actually provided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    columns: BTreeSet<Column>,
}

impl ColumnSet {
    pub fn insert(&mut self, column: Column) {
        self.columns.insert(column);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    /// Columns from the schema table that are absent from this set.
    pub fn missing(&self) -> Vec<Column> {
        COLUMN_MAP
            .iter()
            .map(|(_, col)| *col)
            .filter(|col| !self.contains(*col))
            .collect()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

// ── HeaderMap ─────────────────────────────────────────────────────────────────

/// Resolved positions of each recognised column within a header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    positions: HashMap<Column, usize>,
    unrecognised: Vec<String>,
}

impl HeaderMap {
    /// Build the map from raw header cells.
    ///
    /// When a column appears more than once the first occurrence wins.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for (idx, raw) in headers.into_iter().enumerate() {
            match Column::from_header(raw) {
                Some(col) => {
                    map.positions.entry(col).or_insert(idx);
                }
                None => map.unrecognised.push(normalize_header(raw)),
            }
        }
        map
    }

    /// Cell index of `column`, if the header provided it.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// Normalised names of headers the schema table does not know.
    pub fn unrecognised(&self) -> &[String] {
        &self.unrecognised
    }

    pub fn columns(&self) -> ColumnSet {
        self.positions.keys().copied().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
