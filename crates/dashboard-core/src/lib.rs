//! Core domain types for the user revenue dashboard.
//!
//! Holds the record model and its declared schema mapping, day-first date
//! parsing, the shared error type, display formatting helpers and the CLI
//! settings layer.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod schema;
pub mod settings;

pub use error::{DashboardError, Result};
