//! Key metric cards shown above the charts.

use dashboard_core::formatting::{format_currency, format_minutes, format_number};
use dashboard_data::analysis::DashboardSnapshot;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// A labelled, pre-formatted value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

/// The three cards for `snapshot`: users, revenue, mean session length.
pub fn metric_cards(snapshot: &DashboardSnapshot) -> [MetricCard; 3] {
    [
        MetricCard {
            label: "Total Users",
            value: format_number(snapshot.total_users as f64, 0),
        },
        MetricCard {
            label: "Total Revenue",
            value: format_currency(snapshot.total_revenue),
        },
        MetricCard {
            label: "Avg. Session Duration",
            value: format_minutes(snapshot.avg_session_duration),
        },
    ]
}

/// Render the cards side by side in `area`.
pub fn render_metrics(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (card, slot) in metric_cards(snapshot).into_iter().zip(columns.iter()) {
        let body = Text::from(vec![
            Line::from(Span::styled(card.label, theme.label)),
            Line::from(Span::styled(card.value, theme.metric_value)),
        ]);
        let widget = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.metric_border),
        );
        frame.render_widget(widget, *slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::snapshot;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_metric_cards_format_values() {
        let mut snap = snapshot();
        snap.total_users = 1234;
        snap.total_revenue = 1234.5;
        snap.avg_session_duration = Some(12.345);

        let cards = metric_cards(&snap);
        assert_eq!(cards[0].value, "1,234");
        assert_eq!(cards[1].value, "$1,234.50");
        assert_eq!(cards[2].value, "12.35 min");
    }

    #[test]
    fn test_metric_cards_no_data() {
        let mut snap = snapshot();
        snap.avg_session_duration = None;
        assert_eq!(metric_cards(&snap)[2].value, "no data");
    }

    #[test]
    fn test_render_metrics_smoke() {
        let backend = TestBackend::new(90, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let snap = snapshot();
        let theme = Theme::dark();
        terminal
            .draw(|f| render_metrics(f, f.area(), &snap, &theme))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Total Users"));
        assert!(rendered.contains("Total Revenue"));
    }
}
