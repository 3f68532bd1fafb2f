use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
    TableState,
};

use crate::config::HostProfile;

const HEADER_LABELS: [&str; 6] = ["Alias", "Host", "User", "Port", "Group", "Description"];

const COLUMN_CONSTRAINTS: [Constraint; 7] = [
    Constraint::Percentage(16),
    Constraint::Percentage(22),
    Constraint::Percentage(12),
    Constraint::Length(6),
    Constraint::Percentage(12),
    Constraint::Min(10),
    Constraint::Length(1), // Scrollbar
];

const FOOTER_HINTS: &str =
    "Enter/c: Connect  x: Run  u: Upload  D: Download  a: Add  e: Edit  d: Delete  g: Group  q: Quit";

/// Selection index over the visible host rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostListState {
    pub selected: usize,
}

impl HostListState {
    pub fn new(selected: usize) -> Self {
        Self { selected }
    }

    /// Move up by one row, wrapping to the end.
    pub fn scroll_up(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected == 0 {
            self.selected = len - 1;
        } else {
            self.selected = (self.selected - 1).min(len - 1);
        }
    }

    /// Move down by one row, wrapping to the start.
    pub fn scroll_down(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Keep the selection inside `0..len` after rows disappear.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn render_row(host: &HostProfile) -> Row<'static> {
    Row::new(vec![
        Cell::from(host.alias.clone()),
        Cell::from(host.host.clone()),
        Cell::from(host.user.clone()),
        Cell::from(host.port.to_string()),
        Cell::from(host.group.clone().unwrap_or_default()),
        Cell::from(host.description.clone().unwrap_or_default()),
    ])
}

fn table_title(group_filter: Option<&str>, current: usize, total: usize) -> String {
    let position = format!("({}/{})", if total > 0 { current + 1 } else { 0 }, total);
    match group_filter {
        Some(group) => format!("SSH Hosts [group: {}] {}", group, position),
        None => format!("SSH Hosts {}", position),
    }
}

pub fn draw_host_table(
    area: Rect,
    hosts: &[&HostProfile],
    state: &HostListState,
    group_filter: Option<&str>,
    frame: &mut Frame<'_>,
) {
    let rows: Vec<Row<'static>> = hosts.iter().map(|h| render_row(h)).collect();
    let rows_len = rows.len();
    let sel = if rows_len == 0 {
        0
    } else {
        state.selected.min(rows_len - 1)
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let header = Row::new(
        HEADER_LABELS
            .iter()
            .map(|&label| Cell::from(label))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .height(1);

    let table = Table::new(rows, COLUMN_CONSTRAINTS)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(table_title(group_filter, sel, rows_len)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default().with_selected(Some(sel));
    frame.render_stateful_widget(table, layout[0], &mut table_state);

    if rows_len == 0 {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No hosts yet. Press 'a' to add one.",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        let inner = layout[0].inner(Margin::new(1, 2));
        frame.render_widget(empty, inner);
    }

    render_scrollbar(frame, layout[0], sel, rows_len);
    render_footer(frame, layout[1]);
}

/// Only drawn when the rows overflow the viewport.
fn render_scrollbar(frame: &mut Frame<'_>, table_area: Rect, selected: usize, total_items: usize) {
    if total_items == 0 {
        return;
    }

    let inner_area = table_area.inner(Margin::new(1, 2));
    let visible_rows = inner_area.height.saturating_sub(1) as usize; // -1 for header
    if total_items <= visible_rows {
        return;
    }

    let max_top = total_items.saturating_sub(visible_rows);
    let centered_top = selected.saturating_sub(visible_rows.saturating_sub(1) / 2);
    let top_index = centered_top.min(max_top);
    let mut scroll_state = ScrollbarState::new(max_top.saturating_add(1)).position(top_index);

    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None);
    frame.render_stateful_widget(scrollbar, inner_area, &mut scroll_state);
}

fn render_footer(frame: &mut Frame<'_>, footer_area: Rect) {
    let footer_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(footer_area);

    let left = Paragraph::new(Line::from(Span::styled(
        FOOTER_HINTS,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Left);

    let right = Paragraph::new(Line::from(Span::styled(
        format!("sshm v{}", env!("CARGO_PKG_VERSION")),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Right);

    frame.render_widget(left, footer_layout[0]);
    frame.render_widget(right, footer_layout[1]);
}
