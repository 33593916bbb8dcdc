use std::path::PathBuf;
use thiserror::Error;

use crate::schema::Column;

/// All errors produced by the dashboard pipeline.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input (e.g. an unreadable header row).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The source was read but contained no data rows.
    #[error("No user records found in {0}")]
    EmptyDataset(PathBuf),

    /// An operation needs a column the source header did not provide.
    #[error("Missing column: {0}")]
    MissingColumn(Column),

    /// A segment or bucket name is not one of the recognised fields.
    #[error("Unknown segment field: {0}")]
    UnknownSegment(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
