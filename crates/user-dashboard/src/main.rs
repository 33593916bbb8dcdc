mod bootstrap;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use dashboard_core::settings::Settings;
use dashboard_runtime::cache::DatasetCache;
use dashboard_runtime::session::DashboardSession;
use dashboard_ui::app::App;
use dashboard_ui::report::write_report;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let interactive = !settings.plain && io::stdout().is_terminal();
    let target = bootstrap::log_target(settings.log_file.as_deref(), interactive, &app_dir);
    bootstrap::setup_logging(&settings.log_level, &target)?;

    tracing::info!("User Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Theme: {}, Top: {}, Interactive: {}",
        settings.data.display(),
        settings.theme,
        settings.top,
        interactive
    );

    // A load failure ends the run before anything is drawn.
    let mut cache = DatasetCache::new();
    let dataset = cache
        .get_or_load(&settings.data)
        .with_context(|| format!("could not load user records from {}", settings.data.display()))?;

    let session = DashboardSession::from_initial(
        dataset,
        &settings.countries,
        &settings.devices,
        settings.top as usize,
    );

    if !interactive {
        let snapshot = session.snapshot()?;
        let stdout = io::stdout();
        write_report(&mut stdout.lock(), &snapshot)?;
        return Ok(());
    }

    let app = App::new(&settings.theme, session, cache, settings.data.clone())?;

    // The loop exits on 'q' / Ctrl+C inside the TUI. OS-level Ctrl+C is raced
    // alongside it; dropping the loop restores the terminal.
    tokio::select! {
        result = app.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
        }
    }

    Ok(())
}
