//! Terminal UI layer for the user revenue dashboard.
//!
//! Provides themes, the header, metric, chart and sidebar components, the
//! high-value users table, the plain-text report and the main application
//! event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod report;
pub mod table_view;
pub mod themes;

#[cfg(test)]
mod test_support;

pub use dashboard_core as core;
