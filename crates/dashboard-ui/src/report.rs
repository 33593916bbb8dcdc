//! Plain-text rendering of a snapshot for non-interactive output.

use std::io::{self, Write};

use dashboard_data::analysis::DashboardSnapshot;
use unicode_width::UnicodeWidthStr;

use crate::components::charts::Series;
use crate::components::header::{loaded_line, showing_line, CAPTION, TITLE};
use crate::components::metrics::metric_cards;
use crate::table_view::{top_user_cells, TOP_USER_HEADERS};

/// Write every dashboard section of `snapshot` to `out`.
pub fn write_report<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> io::Result<()> {
    writeln!(out, "{}", TITLE)?;
    writeln!(out, "{}", CAPTION)?;
    writeln!(out)?;
    writeln!(out, "{}", loaded_line(snapshot.loaded_records))?;
    writeln!(out, "{}", showing_line(snapshot.filtered_records))?;

    section(out, "Key Metrics Overview")?;
    for card in metric_cards(snapshot) {
        writeln!(out, "  {}: {}", card.label, card.value)?;
    }

    section(out, "Engagement Trends")?;
    write_series(out, &Series::active_users("Daily Active Users", &snapshot.daily_active))?;
    write_series(out, &Series::active_users("Weekly Active Users", &snapshot.weekly_active))?;
    write_series(out, &Series::active_users("Monthly Active Users", &snapshot.monthly_active))?;

    section(out, "Cumulative Revenue Trend (by Signup Date)")?;
    write_series(out, &Series::cumulative_revenue(&snapshot.cumulative_revenue))?;

    section(out, "Revenue Breakdown by Segment")?;
    write_series(out, &Series::segment_revenue("By Device Type", &snapshot.revenue_by_device))?;
    write_series(out, &Series::segment_revenue("By User Segment", &snapshot.revenue_by_tier))?;
    write_series(out, &Series::segment_revenue("By Game Mode", &snapshot.revenue_by_mode))?;

    section(out, "High-Value Users")?;
    if snapshot.top_users.is_empty() {
        writeln!(out, "  no data")?;
    } else {
        let rows: Vec<[String; 4]> = snapshot.top_users.iter().map(top_user_cells).collect();
        let header = TOP_USER_HEADERS.map(String::from);
        write_table(out, &header, &rows)?;
    }

    out.flush()
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.width()))
}

fn write_series<W: Write>(out: &mut W, series: &Series) -> io::Result<()> {
    writeln!(out, "  {}", series.title)?;
    if series.is_empty() {
        return writeln!(out, "    no data");
    }
    let label_width = series
        .points
        .iter()
        .map(|(label, _)| label.width())
        .max()
        .unwrap_or(0);
    for (label, value) in &series.points {
        writeln!(
            out,
            "    {}  {}",
            pad(label, label_width),
            series.format.format(*value)
        )?;
    }
    Ok(())
}

fn write_table<W: Write, const N: usize>(
    out: &mut W,
    header: &[String; N],
    rows: &[[String; N]],
) -> io::Result<()> {
    let mut widths = header.clone().map(|h| h.width());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.width());
        }
    }

    let line = |cells: &[String; N]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| pad(c, *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "  {}", line(header).trim_end())?;
    for row in rows {
        writeln!(out, "  {}", line(row).trim_end())?;
    }
    Ok(())
}

/// Left-align `s` to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}
