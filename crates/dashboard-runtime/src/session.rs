//! Per-user dashboard state: the shared dataset plus an owned selection.

use std::sync::Arc;

use dashboard_core::error::Result;
use dashboard_core::models::Dataset;
use dashboard_data::analysis::{build_snapshot, DashboardSnapshot};
use dashboard_data::filter::Selection;

/// Default length of the high-value users table.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<Dataset>,
    selection: Selection,
    top_n: usize,
    /// Dimensions still on "everything selected". A reload re-seeds these
    /// from the new dataset so that new values show up.
    defaults: DefaultDimensions,
}

/// Which filter dimensions the user has not narrowed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDimensions {
    pub countries: bool,
    pub devices: bool,
}

impl DashboardSession {
    /// Session with every country and device selected.
    pub fn new(dataset: Arc<Dataset>, top_n: usize) -> Self {
        let selection = Selection::all(&dataset);
        Self::with_selection(dataset, selection, top_n)
    }

    /// Session with an explicit selection. A dimension equal to every value
    /// of `dataset` counts as the default.
    pub fn with_selection(dataset: Arc<Dataset>, selection: Selection, top_n: usize) -> Self {
        let all = Selection::all(&dataset);
        let defaults = DefaultDimensions {
            countries: selection.countries == all.countries,
            devices: selection.devices == all.devices,
        };
        Self {
            dataset,
            selection,
            top_n,
            defaults,
        }
    }

    /// Session whose initial selection comes from command-line values. An
    /// empty list means "all" for that dimension.
    pub fn from_initial(
        dataset: Arc<Dataset>,
        countries: &[String],
        devices: &[String],
        top_n: usize,
    ) -> Self {
        let mut selection = Selection::all(&dataset);
        if !countries.is_empty() {
            selection.countries = countries.iter().cloned().collect();
        }
        if !devices.is_empty() {
            selection.devices = devices.iter().cloned().collect();
        }
        let mut session = Self::with_selection(dataset, selection, top_n);
        session.defaults = DefaultDimensions {
            countries: countries.is_empty(),
            devices: devices.is_empty(),
        };
        session
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Country options in first-appearance order.
    pub fn countries(&self) -> Vec<String> {
        self.dataset.distinct_countries()
    }

    /// Device options in first-appearance order.
    pub fn devices(&self) -> Vec<String> {
        self.dataset.distinct_devices()
    }

    pub fn defaults(&self) -> DefaultDimensions {
        self.defaults
    }

    /// Swap in a reloaded dataset. Dimensions still on their default select
    /// every value of the new dataset; narrowed ones are kept as is.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;
        if self.defaults.countries {
            self.selection.select_all_countries(&self.dataset);
        }
        if self.defaults.devices {
            self.selection.select_all_devices(&self.dataset);
        }
    }

    // ── Selection changes ─────────────────────────────────────────────────

    pub fn toggle_country(&mut self, country: &str) -> bool {
        self.defaults.countries = false;
        self.selection.toggle_country(country)
    }

    pub fn toggle_device(&mut self, device: &str) -> bool {
        self.defaults.devices = false;
        self.selection.toggle_device(device)
    }

    /// Select every country and follow new ones on reload again.
    pub fn select_all_countries(&mut self) {
        self.defaults.countries = true;
        self.selection.select_all_countries(&self.dataset);
    }

    /// Select every device and follow new ones on reload again.
    pub fn select_all_devices(&mut self) {
        self.defaults.devices = true;
        self.selection.select_all_devices(&self.dataset);
    }

    pub fn clear_countries(&mut self) {
        self.defaults.countries = false;
        self.selection.clear_countries();
    }

    pub fn clear_devices(&mut self) {
        self.defaults.devices = false;
        self.selection.clear_devices();
    }

    /// Recompute every aggregate for the current selection.
    pub fn snapshot(&self) -> Result<DashboardSnapshot> {
        build_snapshot(&self.dataset, &self.selection, self.top_n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::UserRecord;
    use dashboard_core::schema::COLUMN_MAP;

    fn user(row: usize, id: &str, country: &str, device: &str, revenue: f64) -> UserRecord {
        UserRecord {
            row,
            user_id: Some(id.to_string()),
            country: Some(country.to_string()),
            device_type: Some(device.to_string()),
            total_revenue_usd: Some(revenue),
            ..Default::default()
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::new(
            "mem.csv",
            COLUMN_MAP.iter().map(|(_, c)| *c).collect(),
            vec![
                user(0, "A", "US", "Mobile", 10.0),
                user(1, "B", "US", "Desktop", 20.0),
                user(2, "A", "FR", "Mobile", 5.0),
            ],
        ))
    }

    #[test]
    fn test_new_selects_everything() {
        let session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        let snap = session.snapshot().unwrap();
        assert_eq!(snap.filtered_records, 3);
        assert_eq!(snap.total_revenue, 35.0);
    }

    #[test]
    fn test_toggle_recomputes_snapshot() {
        let mut session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        assert!(!session.toggle_country("FR"));

        let snap = session.snapshot().unwrap();
        assert_eq!(snap.filtered_records, 2);
        assert_eq!(snap.total_revenue, 30.0);
        assert_eq!(snap.total_users, 2);
    }

    #[test]
    fn test_clear_and_select_all() {
        let mut session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        session.clear_devices();
        assert_eq!(session.snapshot().unwrap().filtered_records, 0);

        session.select_all_devices();
        session.clear_countries();
        session.select_all_countries();
        assert_eq!(session.snapshot().unwrap().filtered_records, 3);
    }

    #[test]
    fn test_from_initial_lists() {
        let session = DashboardSession::from_initial(dataset(), &["US".to_string()], &[], 1);
        assert_eq!(session.selection().countries.len(), 1);
        assert_eq!(session.selection().devices.len(), 2);

        let snap = session.snapshot().unwrap();
        assert_eq!(snap.filtered_records, 2);
        assert_eq!(snap.top_users.len(), 1);
    }

    #[test]
    fn test_sessions_share_dataset_but_not_selection() {
        let shared = dataset();
        let mut a = DashboardSession::new(Arc::clone(&shared), DEFAULT_TOP_N);
        let b = DashboardSession::new(Arc::clone(&shared), DEFAULT_TOP_N);

        a.clear_countries();
        assert!(Arc::ptr_eq(a.dataset(), b.dataset()));
        assert_eq!(a.snapshot().unwrap().filtered_records, 0);
        assert_eq!(b.snapshot().unwrap().filtered_records, 3);
    }

    fn reloaded() -> Arc<Dataset> {
        Arc::new(Dataset::new(
            "mem.csv",
            COLUMN_MAP.iter().map(|(_, c)| *c).collect(),
            vec![
                user(0, "A", "US", "Mobile", 10.0),
                user(1, "B", "US", "Desktop", 20.0),
                user(2, "A", "FR", "Mobile", 5.0),
                user(3, "C", "DE", "Console", 50.0),
            ],
        ))
    }

    #[test]
    fn test_replace_dataset_follows_default_selection() {
        let mut session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        session.replace_dataset(reloaded());

        assert!(session.selection().countries.contains("DE"));
        assert!(session.selection().devices.contains("Console"));
        let snap = session.snapshot().unwrap();
        assert_eq!(snap.loaded_records, 4);
        assert_eq!(snap.filtered_records, 4);
    }

    #[test]
    fn test_replace_dataset_keeps_narrowed_dimension() {
        let mut session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        session.toggle_country("FR");
        session.replace_dataset(reloaded());

        // Countries were narrowed to US; devices still follow the data.
        assert_eq!(session.selection().countries.len(), 1);
        assert!(session.selection().devices.contains("Console"));
        assert_eq!(session.snapshot().unwrap().filtered_records, 2);
    }

    #[test]
    fn test_select_all_restores_default_tracking() {
        let mut session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        session.clear_devices();
        assert!(!session.defaults().devices);

        session.select_all_devices();
        assert!(session.defaults().devices);
        session.replace_dataset(reloaded());
        assert_eq!(session.snapshot().unwrap().filtered_records, 4);
    }

    #[test]
    fn test_from_initial_list_is_not_default() {
        let session = DashboardSession::from_initial(dataset(), &["US".to_string()], &[], 1);
        assert_eq!(
            session.defaults(),
            DefaultDimensions {
                countries: false,
                devices: true,
            }
        );
    }

    #[test]
    fn test_options_in_first_appearance_order() {
        let session = DashboardSession::new(dataset(), DEFAULT_TOP_N);
        assert_eq!(session.countries(), vec!["US", "FR"]);
        assert_eq!(session.devices(), vec!["Mobile", "Desktop"]);
    }
}
