//! Country / device selection and the filtered view it produces.

use std::collections::HashSet;

use dashboard_core::error::Result;
use dashboard_core::models::{Dataset, UserRecord, View};
use dashboard_core::schema::Column;
use serde::{Deserialize, Serialize};

/// The active multi-select filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub countries: HashSet<String>,
    pub devices: HashSet<String>,
}

impl Selection {
    pub fn new(
        countries: impl IntoIterator<Item = String>,
        devices: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            countries: countries.into_iter().collect(),
            devices: devices.into_iter().collect(),
        }
    }

    /// Every distinct non-null country and device of `dataset`.
    pub fn all(dataset: &Dataset) -> Self {
        Self::new(dataset.distinct_countries(), dataset.distinct_devices())
    }

    /// Add `country` if absent, remove it otherwise. Returns whether it is now
    /// selected.
    pub fn toggle_country(&mut self, country: &str) -> bool {
        toggle(&mut self.countries, country)
    }

    /// Add `device` if absent, remove it otherwise. Returns whether it is now
    /// selected.
    pub fn toggle_device(&mut self, device: &str) -> bool {
        toggle(&mut self.devices, device)
    }

    pub fn select_all_countries(&mut self, dataset: &Dataset) {
        self.countries = dataset.distinct_countries().into_iter().collect();
    }

    pub fn select_all_devices(&mut self, dataset: &Dataset) {
        self.devices = dataset.distinct_devices().into_iter().collect();
    }

    pub fn clear_countries(&mut self) {
        self.countries.clear();
    }

    pub fn clear_devices(&mut self) {
        self.devices.clear();
    }

    /// `true` when `record` has a selected country AND a selected device.
    /// A null field never matches.
    pub fn matches(&self, record: &UserRecord) -> bool {
        let country = record
            .country
            .as_deref()
            .is_some_and(|c| self.countries.contains(c));
        let device = record
            .device_type
            .as_deref()
            .is_some_and(|d| self.devices.contains(d));
        country && device
    }
}

fn toggle(set: &mut HashSet<String>, value: &str) -> bool {
    if set.remove(value) {
        false
    } else {
        set.insert(value.to_string());
        true
    }
}

/// Rows of `dataset` matching `selection`, in original order.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> Result<View<'a>> {
    dataset.require(Column::Country)?;
    dataset.require(Column::DeviceType)?;
    Ok(dataset.view_where(|r| selection.matches(r)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
