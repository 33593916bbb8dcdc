//! Country and device checklists.

use std::collections::HashSet;

use dashboard_runtime::session::DashboardSession;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// Which checklist receives cursor movement and toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarList {
    Countries,
    Devices,
}

/// Cursor state of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    pub focus: SidebarList,
    pub country_cursor: usize,
    pub device_cursor: usize,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            focus: SidebarList::Countries,
            country_cursor: 0,
            device_cursor: 0,
        }
    }
}

impl Sidebar {
    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            SidebarList::Countries => SidebarList::Devices,
            SidebarList::Devices => SidebarList::Countries,
        };
    }

    pub fn cursor(&self) -> usize {
        match self.focus {
            SidebarList::Countries => self.country_cursor,
            SidebarList::Devices => self.device_cursor,
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            SidebarList::Countries => &mut self.country_cursor,
            SidebarList::Devices => &mut self.device_cursor,
        }
    }

    pub fn move_up(&mut self) {
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_sub(1);
    }

    /// Move down, stopping at the last of `len` options.
    pub fn move_down(&mut self, len: usize) {
        let cursor = self.cursor_mut();
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    /// Pull both cursors back inside their lists after a reload.
    pub fn clamp(&mut self, countries: usize, devices: usize) {
        self.country_cursor = self.country_cursor.min(countries.saturating_sub(1));
        self.device_cursor = self.device_cursor.min(devices.saturating_sub(1));
    }
}

/// `[x] value` / `[ ] value` lines, the cursor line highlighted.
pub fn checklist_lines<'a>(
    options: &[String],
    selected: &HashSet<String>,
    cursor: Option<usize>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let checked = selected.contains(option);
            let mark = if checked { "[x] " } else { "[ ] " };
            let line = Line::from(vec![
                Span::styled(mark, theme.checkbox_style(checked)),
                Span::styled(option.clone(), theme.text),
            ]);
            if cursor == Some(i) {
                line.style(theme.cursor)
            } else {
                line
            }
        })
        .collect()
}

/// Render the "Filter Data" sidebar: countries on top, devices below.
pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    sidebar: &Sidebar,
    session: &DashboardSession,
    theme: &Theme,
) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(" Filter Data ", theme.header));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let selection = session.selection();
    let lists = [
        (
            SidebarList::Countries,
            " Select Country ",
            session.countries(),
            &selection.countries,
            sidebar.country_cursor,
        ),
        (
            SidebarList::Devices,
            " Select Device Type ",
            session.devices(),
            &selection.devices,
            sidebar.device_cursor,
        ),
    ];

    for ((list, title, options, selected, cursor), slot) in lists.into_iter().zip(halves.iter()) {
        let focused = sidebar.focus == list;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                theme.focus_border
            } else {
                theme.separator
            })
            .title(Span::styled(title, theme.tab_style(focused)));

        let visible = usize::from(slot.height.saturating_sub(2)).max(1);
        let offset = cursor.saturating_sub(visible - 1);
        let lines = checklist_lines(&options, selected, focused.then_some(cursor), theme);
        let widget = Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((offset as u16, 0));
        frame.render_widget(widget, *slot);
    }
}
