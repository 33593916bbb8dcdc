//! Data pipeline for the user revenue dashboard.
//!
//! Loads and cleans the user-records CSV, filters it by the current
//! country/device selection, computes the dashboard aggregates and bundles
//! them into a snapshot for the presentation layer.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use dashboard_core as core;
