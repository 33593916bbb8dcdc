//! Fingerprint-keyed cache of loaded datasets.
//!
//! A source is identified by its canonical path, byte length and modification
//! time. Looking up a fingerprint reads metadata only; the file is parsed on a
//! miss and the resulting [`Dataset`] is shared as an `Arc`. There is no TTL:
//! an entry stays until the file changes, or until [`DatasetCache::invalidate`]
//! or [`DatasetCache::clear`] is called.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::Dataset;
use dashboard_data::reader::load_dataset;
use serde::Serialize;

// ── SourceFingerprint ─────────────────────────────────────────────────────────

/// Identity of an input file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    /// `None` on platforms that do not report modification times.
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Fingerprint `path` from its metadata.
    pub fn of(path: &Path) -> Result<Self> {
        let read_err = |source: std::io::Error| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        let canonical = fs::canonicalize(path).map_err(read_err)?;
        let meta = fs::metadata(&canonical).map_err(read_err)?;
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ── CacheStats ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

// ── DatasetCache ──────────────────────────────────────────────────────────────

/// Loaded datasets by source fingerprint.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use dashboard_runtime::cache::DatasetCache;
///
/// let mut cache = DatasetCache::new();
/// let dataset = cache.get_or_load(Path::new("data.csv")).unwrap();
/// println!("{} records", dataset.len());
/// ```
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceFingerprint, Arc<Dataset>>,
    stats: CacheStats,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, loading it when the file is new or has
    /// changed since it was cached.
    ///
    /// A failed load leaves the cache untouched.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let fingerprint = SourceFingerprint::of(path)?;

        if let Some(dataset) = self.entries.get(&fingerprint) {
            self.stats.hits += 1;
            tracing::debug!(path = %fingerprint.path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        self.stats.misses += 1;
        tracing::debug!(path = %fingerprint.path.display(), "dataset cache miss");

        let dataset = Arc::new(load_dataset(path)?);
        tracing::info!(
            path = %fingerprint.path.display(),
            records = dataset.len(),
            "loaded user records"
        );

        // Older fingerprints of the same file are stale now.
        self.entries.retain(|key, _| key.path != fingerprint.path);
        self.entries.insert(fingerprint, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop every entry for `path`. Returns whether anything was removed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|key, _| key.path != target);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(path = %target.display(), "dataset cache invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
