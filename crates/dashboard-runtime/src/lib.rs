//! Runtime layer for the user revenue dashboard.
//!
//! Owns the fingerprint-keyed dataset cache and the per-user session state
//! that turns selection changes into fresh snapshots.

pub mod cache;
pub mod session;

pub use dashboard_core as core;
pub use dashboard_data as data;
