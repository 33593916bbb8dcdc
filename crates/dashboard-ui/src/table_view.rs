//! High-value users table.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per top user,
//! or a placeholder when the current selection matches nothing.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{self, NO_DATA};
use dashboard_data::analysis::TopUser;

use crate::themes::Theme;

pub const TOP_USER_HEADERS: [&str; 4] = [
    "Username",
    "Total Revenue USD",
    "Total Play Sessions",
    "Preferred Game Mode",
];

/// Display cells for one user. Missing values show as `-`.
pub fn top_user_cells(user: &TopUser) -> [String; 4] {
    let dash = || "-".to_string();
    [
        user.username.clone().unwrap_or_else(dash),
        user.total_revenue_usd
            .map(formatting::format_currency)
            .unwrap_or_else(dash),
        user.total_play_sessions
            .map(|n| formatting::format_number(n as f64, 0))
            .unwrap_or_else(dash),
        user.preferred_game_mode.clone().unwrap_or_else(dash),
    ]
}

/// Render the high-value users table into `area`.
pub fn render_top_users(frame: &mut Frame, area: Rect, users: &[TopUser], theme: &Theme) {
    if users.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let header = Row::new(
        TOP_USER_HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = users
        .iter()
        .enumerate()
        .map(|(i, user)| Row::new(top_user_cells(user).map(Cell::from)).style(theme.row_style(i)))
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Percentage(26),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" High-Value Users "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when the filters leave no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(NO_DATA, theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "No records match the current filters. Press 'a' to select all.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" High-Value Users "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
