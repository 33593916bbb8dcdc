//! Main application state and TUI event loop for the dashboard.
//!
//! [`App`] owns the theme, the user's session, the dataset cache used for
//! reloads and the last computed snapshot. Every key that changes the
//! selection recomputes the snapshot before the next draw.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};

use dashboard_core::error::Result;
use dashboard_data::analysis::DashboardSnapshot;
use dashboard_runtime::cache::DatasetCache;
use dashboard_runtime::session::DashboardSession;

use crate::components::charts::{self, Series};
use crate::components::header::Header;
use crate::components::metrics;
use crate::components::sidebar::{self, Sidebar, SidebarList};
use crate::table_view;
use crate::themes::Theme;

const TICK_RATE: Duration = Duration::from_millis(250);
const SIDEBAR_WIDTH: u16 = 30;

// ── Page / EngagementTab ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Key metrics and high-value users.
    Overview,
    /// Daily / weekly / monthly active users.
    Engagement,
    /// Cumulative revenue and per-segment breakdowns.
    Revenue,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Overview, Page::Engagement, Page::Revenue];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Engagement => "Engagement",
            Page::Revenue => "Revenue",
        }
    }

    fn index(self) -> usize {
        match self {
            Page::Overview => 0,
            Page::Engagement => 1,
            Page::Revenue => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementTab {
    Daily,
    Weekly,
    Monthly,
}

impl EngagementTab {
    pub const ALL: [EngagementTab; 3] = [
        EngagementTab::Daily,
        EngagementTab::Weekly,
        EngagementTab::Monthly,
    ];

    pub fn title(self) -> &'static str {
        match self {
            EngagementTab::Daily => "Daily Active Users",
            EngagementTab::Weekly => "Weekly Active Users",
            EngagementTab::Monthly => "Monthly Active Users",
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub page: Page,
    pub tab: EngagementTab,
    pub sidebar: Sidebar,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    session: DashboardSession,
    cache: DatasetCache,
    source: PathBuf,
    snapshot: DashboardSnapshot,
    /// One-line message from the last reload or failed recompute.
    status: Option<Status>,
}

/// Footer message. Errors render in the theme's error style.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    text: String,
    is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl App {
    /// Build the app and compute the first snapshot.
    ///
    /// `cache` should already hold the session's dataset so that `r` only
    /// reparses the source when it has changed.
    pub fn new(
        theme_name: &str,
        session: DashboardSession,
        cache: DatasetCache,
        source: PathBuf,
    ) -> Result<Self> {
        let snapshot = session.snapshot()?;
        Ok(Self {
            theme: Theme::from_name(theme_name),
            page: Page::Overview,
            tab: EngagementTab::Daily,
            sidebar: Sidebar::default(),
            should_quit: false,
            session,
            cache,
            source,
            snapshot,
            status: None,
        })
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    /// Whether the footer message reports a failure.
    pub fn status_is_error(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.is_error)
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive dashboard until `q` / `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout and yields to the
    /// runtime between polls so a surrounding `tokio::select!` can observe
    /// OS signals.
    pub async fn run(mut self) -> io::Result<()> {
        let mut guard = TerminalGuard::enter()?;

        while !self.should_quit {
            guard.terminal.draw(|frame| self.render(frame))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        guard.restore()
    }

    /// Apply one key press to the state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,

            KeyCode::Tab => self.sidebar.switch_focus(),
            KeyCode::Up | KeyCode::Char('k') => self.sidebar.move_up(),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.focused_options().len();
                self.sidebar.move_down(len);
            }
            KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Char('a') => {
                match self.sidebar.focus {
                    SidebarList::Countries => self.session.select_all_countries(),
                    SidebarList::Devices => self.session.select_all_devices(),
                }
                self.refresh();
            }
            KeyCode::Char('n') => {
                match self.sidebar.focus {
                    SidebarList::Countries => self.session.clear_countries(),
                    SidebarList::Devices => self.session.clear_devices(),
                }
                self.refresh();
            }

            KeyCode::Left => self.page = self.page.prev(),
            KeyCode::Right => self.page = self.page.next(),
            KeyCode::Char('1') => self.page = Page::Overview,
            KeyCode::Char('2') => self.page = Page::Engagement,
            KeyCode::Char('3') => self.page = Page::Revenue,

            KeyCode::Char('d') => self.show_tab(EngagementTab::Daily),
            KeyCode::Char('w') => self.show_tab(EngagementTab::Weekly),
            KeyCode::Char('m') => self.show_tab(EngagementTab::Monthly),

            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    // ── State changes ─────────────────────────────────────────────────────────

    fn focused_options(&self) -> Vec<String> {
        match self.sidebar.focus {
            SidebarList::Countries => self.session.countries(),
            SidebarList::Devices => self.session.devices(),
        }
    }

    fn toggle_at_cursor(&mut self) {
        let options = self.focused_options();
        let Some(value) = options.get(self.sidebar.cursor()) else {
            return;
        };
        match self.sidebar.focus {
            SidebarList::Countries => self.session.toggle_country(value),
            SidebarList::Devices => self.session.toggle_device(value),
        };
        self.refresh();
    }

    fn show_tab(&mut self, tab: EngagementTab) {
        self.tab = tab;
        self.page = Page::Engagement;
    }

    /// Recompute the snapshot and clear the footer message. On failure the
    /// previous snapshot stays on screen and the error goes to the footer.
    fn refresh(&mut self) -> bool {
        match self.session.snapshot() {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.status = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot recompute failed");
                self.status = Some(Status::error(e.to_string()));
                false
            }
        }
    }

    /// Re-read the source through the cache.
    fn reload(&mut self) {
        match self.cache.get_or_load(&self.source) {
            Ok(dataset) if Arc::ptr_eq(&dataset, self.session.dataset()) => {
                self.status = Some(Status::info("Source unchanged"));
            }
            Ok(dataset) => {
                let records = dataset.len();
                self.session.replace_dataset(dataset);
                self.sidebar
                    .clamp(self.session.countries().len(), self.session.devices().len());
                if self.refresh() {
                    self.status = Some(Status::info(format!("Reloaded {} user records", records)));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed; keeping previous data");
                self.status = Some(Status::error(format!("Reload failed: {}", e)));
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let header = Header::new(
            self.snapshot.loaded_records,
            self.snapshot.filtered_records,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(rows[1]);

        sidebar::render_sidebar(frame, body[0], &self.sidebar, &self.session, &self.theme);
        self.render_main(frame, body[1]);
        self.render_footer(frame, rows[2]);
    }

    fn render_main(&self, frame: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(4)])
            .split(area);

        frame.render_widget(Paragraph::new(self.page_tabs()), parts[0]);

        match self.page {
            Page::Overview => self.render_overview(frame, parts[1]),
            Page::Engagement => self.render_engagement(frame, parts[1]),
            Page::Revenue => self.render_revenue(frame, parts[1]),
        }
    }

    fn page_tabs(&self) -> Line<'_> {
        let mut spans = Vec::new();
        for (i, page) in Page::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", self.theme.separator));
            }
            spans.push(Span::styled(
                format!("{} {}", i + 1, page.title()),
                self.theme.tab_style(*page == self.page),
            ));
        }
        Line::from(spans)
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);
        metrics::render_metrics(frame, parts[0], &self.snapshot, &self.theme);
        table_view::render_top_users(frame, parts[1], &self.snapshot.top_users, &self.theme);
    }

    fn render_engagement(&self, frame: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);

        let mut spans = Vec::new();
        for (tab, key) in EngagementTab::ALL.iter().zip(["d", "w", "m"]) {
            spans.push(Span::styled(
                format!("[{}] {}  ", key, tab.title()),
                self.theme.tab_style(*tab == self.tab),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), parts[0]);

        let points = match self.tab {
            EngagementTab::Daily => &self.snapshot.daily_active,
            EngagementTab::Weekly => &self.snapshot.weekly_active,
            EngagementTab::Monthly => &self.snapshot.monthly_active,
        };
        let series = Series::active_users(self.tab.title(), points);
        charts::render_series(frame, parts[1], &series, &self.theme);
    }

    fn render_revenue(&self, frame: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let cumulative = Series::cumulative_revenue(&self.snapshot.cumulative_revenue);
        charts::render_series(frame, parts[0], &cumulative, &self.theme);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(parts[1]);

        let segments = [
            Series::segment_revenue("By Device Type", &self.snapshot.revenue_by_device),
            Series::segment_revenue("By User Segment", &self.snapshot.revenue_by_tier),
            Series::segment_revenue("By Game Mode", &self.snapshot.revenue_by_mode),
        ];
        for (series, slot) in segments.iter().zip(columns.iter()) {
            charts::render_series(frame, *slot, series, &self.theme);
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "q quit · Tab list · ↑↓ move · Space toggle · a all · n none · ←→ page · d/w/m tab · r reload",
            self.theme.dim,
        )];
        if let Some(status) = &self.status {
            let style = if status.is_error {
                self.theme.error
            } else {
                self.theme.info
            };
            spans.push(Span::styled("  ", self.theme.dim));
            spans.push(Span::styled(status.text.clone(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

// ── Terminal guard ────────────────────────────────────────────────────────────

/// Raw mode plus alternate screen, restored on drop so a cancelled loop does
/// not leave the terminal unusable.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    restored: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    fn restore(&mut self) -> io::Result<()> {
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = self.restore();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
