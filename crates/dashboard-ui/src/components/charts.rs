//! Line and bar charts with a plain-table fallback.
//!
//! [`ChartCapability::for_series`] decides up front whether a series can be
//! drawn as a ratatui chart in the given area. When it cannot (too few
//! points, or too little room) the values are rendered as a two-column table
//! instead.

use dashboard_core::formatting::{format_currency, format_number, NO_DATA};
use dashboard_data::aggregator::{ActivePoint, RevenuePoint, SegmentRevenue};
use ratatui::{
    layout::{Constraint, Rect},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset as ChartDataset,
        GraphType, Paragraph, Row, Table,
    },
    Frame,
};

use crate::themes::Theme;

/// Smallest area a primary chart is drawn into, borders included.
pub const MIN_CHART_WIDTH: u16 = 24;
pub const MIN_CHART_HEIGHT: u16 = 7;

/// Label used for records with no segment value.
pub const UNKNOWN_SEGMENT: &str = "(unknown)";

// ── Series ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Count,
    Currency,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Count => format_number(value, 0),
            ValueFormat::Currency => format_currency(value),
        }
    }
}

/// A titled sequence of labelled values ready to chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub title: String,
    pub kind: ChartKind,
    pub format: ValueFormat,
    pub points: Vec<(String, f64)>,
}

impl Series {
    /// Distinct active users per bucket, as a line.
    pub fn active_users(title: &str, points: &[ActivePoint]) -> Self {
        Self {
            title: title.to_string(),
            kind: ChartKind::Line,
            format: ValueFormat::Count,
            points: points
                .iter()
                .map(|p| (p.bucket.clone(), p.active_users as f64))
                .collect(),
        }
    }

    /// Running revenue total by signup date, as a line.
    pub fn cumulative_revenue(points: &[RevenuePoint]) -> Self {
        Self {
            title: "Cumulative Revenue Over Time".to_string(),
            kind: ChartKind::Line,
            format: ValueFormat::Currency,
            points: points
                .iter()
                .map(|p| (p.signup.format("%Y-%m-%d").to_string(), p.cumulative))
                .collect(),
        }
    }

    /// Revenue per segment value, as bars.
    pub fn segment_revenue(title: &str, segments: &[SegmentRevenue]) -> Self {
        Self {
            title: title.to_string(),
            kind: ChartKind::Bar,
            format: ValueFormat::Currency,
            points: segments
                .iter()
                .map(|s| {
                    let label = s.segment.as_deref().unwrap_or(UNKNOWN_SEGMENT).to_string();
                    (label, s.revenue)
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    fn min_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::min)
    }
}

// ── Capability ────────────────────────────────────────────────────────────────

/// How a series will be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartCapability {
    /// ratatui `Chart` or `BarChart`.
    Primary,
    /// Plain value table.
    Fallback,
}

impl ChartCapability {
    pub fn for_series(series: &Series, area: Rect) -> Self {
        let min_points = match series.kind {
            ChartKind::Line => 2,
            ChartKind::Bar => 1,
        };
        if series.points.len() < min_points {
            return ChartCapability::Fallback;
        }
        if area.width < MIN_CHART_WIDTH || area.height < MIN_CHART_HEIGHT {
            return ChartCapability::Fallback;
        }
        if series.kind == ChartKind::Bar {
            // One column per bar plus one gap between bars, inside the borders.
            let needed = series.points.len() * 2 + 1;
            if usize::from(area.width.saturating_sub(2)) < needed {
                return ChartCapability::Fallback;
            }
        }
        ChartCapability::Primary
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render `series` into `area`, choosing the chart or the table up front.
pub fn render_series(frame: &mut Frame, area: Rect, series: &Series, theme: &Theme) {
    match (ChartCapability::for_series(series, area), series.kind) {
        (ChartCapability::Primary, ChartKind::Line) => render_line(frame, area, series, theme),
        (ChartCapability::Primary, ChartKind::Bar) => render_bars(frame, area, series, theme),
        (ChartCapability::Fallback, _) => render_fallback(frame, area, series, theme),
    }
}

fn titled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(format!(" {} ", title), theme.label))
}

fn render_line(frame: &mut Frame, area: Rect, series: &Series, theme: &Theme) {
    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();

    let last = series.points.len().saturating_sub(1);
    let (first_label, last_label) = match (series.points.first(), series.points.last()) {
        (Some(first), Some(end)) => (first.0.clone(), end.0.clone()),
        _ => (String::new(), String::new()),
    };

    let y_min = series.min_value();
    let mut y_max = series.max_value();
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    let datasets = vec![ChartDataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_line)
        .data(&data)];

    let chart = Chart::new(datasets)
        .block(titled_block(&series.title, theme))
        .x_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, last.max(1) as f64])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(series.format.format(y_min)),
                    Span::raw(series.format.format(y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn render_bars(frame: &mut Frame, area: Rect, series: &Series, theme: &Theme) {
    let bars: Vec<Bar> = series
        .points
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .label(Line::from(label.clone()))
                .text_value(series.format.format(*value))
        })
        .collect();

    let n = series.points.len().max(1) as u16;
    let inner = area.width.saturating_sub(2);
    let bar_width = (inner.saturating_sub(n - 1) / n).clamp(1, 16);

    let chart = BarChart::default()
        .block(titled_block(&series.title, theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(theme.chart_bar)
        .value_style(theme.value)
        .label_style(theme.label);

    frame.render_widget(chart, area);
}

fn render_fallback(frame: &mut Frame, area: Rect, series: &Series, theme: &Theme) {
    if series.is_empty() {
        let body = Paragraph::new(Line::from(Span::styled(NO_DATA, theme.dim)))
            .block(titled_block(&series.title, theme));
        frame.render_widget(body, area);
        return;
    }

    let rows: Vec<Row> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Row::new(vec![
                Cell::from(label.clone()),
                Cell::from(series.format.format(*value)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(55), Constraint::Percentage(45)])
        .block(titled_block(&series.title, theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn line_series(n: usize) -> Series {
        Series {
            title: "Daily Active Users".to_string(),
            kind: ChartKind::Line,
            format: ValueFormat::Count,
            points: (0..n).map(|i| (format!("2024-01-0{}", i + 1), i as f64)).collect(),
        }
    }

    fn bar_series(n: usize) -> Series {
        Series {
            title: "By Device Type".to_string(),
            kind: ChartKind::Bar,
            format: ValueFormat::Currency,
            points: (0..n).map(|i| (format!("Seg{}", i), 10.0 * i as f64)).collect(),
        }
    }

    fn render(series: &Series, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|f| render_series(f, f.area(), series, &theme))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_capability_line_needs_two_points() {
        let area = Rect::new(0, 0, 60, 12);
        assert_eq!(
            ChartCapability::for_series(&line_series(1), area),
            ChartCapability::Fallback
        );
        assert_eq!(
            ChartCapability::for_series(&line_series(2), area),
            ChartCapability::Primary
        );
    }

    #[test]
    fn test_capability_bar_needs_one_point() {
        let area = Rect::new(0, 0, 60, 12);
        assert_eq!(
            ChartCapability::for_series(&bar_series(0), area),
            ChartCapability::Fallback
        );
        assert_eq!(
            ChartCapability::for_series(&bar_series(1), area),
            ChartCapability::Primary
        );
    }

    #[test]
    fn test_capability_small_area_falls_back() {
        let series = line_series(5);
        assert_eq!(
            ChartCapability::for_series(&series, Rect::new(0, 0, 10, 12)),
            ChartCapability::Fallback
        );
        assert_eq!(
            ChartCapability::for_series(&series, Rect::new(0, 0, 60, 3)),
            ChartCapability::Fallback
        );
    }

    #[test]
    fn test_capability_too_many_bars_falls_back() {
        assert_eq!(
            ChartCapability::for_series(&bar_series(20), Rect::new(0, 0, 30, 12)),
            ChartCapability::Fallback
        );
    }

    #[test]
    fn test_segment_series_labels_unknown() {
        let series = Series::segment_revenue(
            "By Device Type",
            &[
                SegmentRevenue {
                    segment: Some("Mobile".to_string()),
                    revenue: 15.0,
                },
                SegmentRevenue {
                    segment: None,
                    revenue: 2.0,
                },
            ],
        );
        assert_eq!(series.points[1].0, UNKNOWN_SEGMENT);
        assert_eq!(series.kind, ChartKind::Bar);
    }

    #[test]
    fn test_fallback_renders_values_as_table() {
        let out = render(&line_series(1), 60, 8);
        assert!(out.contains("Daily Active Users"));
        assert!(out.contains("2024-01-01"));
    }

    #[test]
    fn test_empty_series_renders_no_data() {
        let out = render(&line_series(0), 60, 8);
        assert!(out.contains("no data"));
    }

    #[test]
    fn test_primary_charts_render() {
        let out = render(&line_series(4), 60, 12);
        assert!(out.contains("Daily Active Users"));

        let out = render(&bar_series(3), 60, 12);
        assert!(out.contains("By Device Type"));
    }
}
