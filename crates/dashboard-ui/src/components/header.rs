use crate::themes::Theme;
use ratatui::text::{Line, Span};

pub const TITLE: &str = "User Behavior & Revenue Dashboard";
pub const CAPTION: &str = "Interactive analysis of user engagement, monetization, and churn patterns";

/// Dashboard header rendering five lines:
///
/// 1. Title.
/// 2. Caption.
/// 3. A separator as wide as the caption.
/// 4. `Loaded N user records`.
/// 5. `Showing M records based on current filters`.
pub struct Header<'a> {
    pub loaded_records: usize,
    pub filtered_records: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(loaded_records: usize, filtered_records: usize, theme: &'a Theme) -> Self {
        Self {
            loaded_records,
            filtered_records,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled(CAPTION, self.theme.caption)),
            Line::from(Span::styled(
                "─".repeat(CAPTION.len()),
                self.theme.separator,
            )),
            Line::from(Span::styled(loaded_line(self.loaded_records), self.theme.info)),
            Line::from(Span::styled(
                showing_line(self.filtered_records),
                self.theme.label,
            )),
        ]
    }
}

pub fn loaded_line(n: usize) -> String {
    format!("Loaded {} user records", n)
}

pub fn showing_line(n: usize) -> String {
    format!("Showing {} records based on current filters", n)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
