//! Shared fixtures for the widget and app tests.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dashboard_data::analysis::{build_snapshot, DashboardSnapshot};
use dashboard_data::filter::Selection;
use dashboard_data::reader::read_dataset;
use dashboard_runtime::cache::DatasetCache;
use dashboard_runtime::session::DashboardSession;
use tempfile::TempDir;

use crate::app::App;

pub const CSV: &str = "\
User_ID,Username,Country,Device_Type,Subscription_Tier,Preferred_Game_Mode,Signup_Date,Last_Login,Total_Revenue_USD,Avg_Session_Duration_Min,Total_Play_Sessions
A,alice,US,Mobile,Premium,Ranked,01/01/2024,10/01/2024,10,30,12
B,bob,US,Desktop,Free,Casual,02/01/2024,10/01/2024,20,10,4
A,alice,FR,Mobile,Premium,Ranked,03/01/2024,11/02/2024,5,,7
";

pub fn write_csv(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("data.csv");
    std::fs::write(&path, body).unwrap();
    path
}

/// Snapshot of [`CSV`] filtered to US on every device.
pub fn snapshot() -> DashboardSnapshot {
    let now = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let dataset = read_dataset(CSV.as_bytes(), Path::new("mem.csv"), now).unwrap();
    let selection = Selection::new(
        ["US".to_string()],
        ["Mobile".to_string(), "Desktop".to_string()],
    );
    build_snapshot(&dataset, &selection, 10).unwrap()
}

/// An app over [`CSV`] on disk with everything selected. Keep the directory
/// alive for as long as the app reloads from it.
pub fn app_fixture() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, CSV);
    let mut cache = DatasetCache::new();
    let dataset = cache.get_or_load(&path).unwrap();
    let session = DashboardSession::new(dataset, 10);
    let app = App::new("dark", session, cache, path).unwrap();
    (dir, app)
}
