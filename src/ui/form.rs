use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tui_textarea::TextArea;

use crate::config::{HostProfile, ProfileDraft};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusField {
    Alias,
    Host,
    User,
    Port,
    Group,
    Description,
    KeyPath,
}

impl FocusField {
    const ORDER: [FocusField; 7] = [
        FocusField::Alias,
        FocusField::Host,
        FocusField::User,
        FocusField::Port,
        FocusField::Group,
        FocusField::Description,
        FocusField::KeyPath,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn label(self) -> &'static str {
        match self {
            FocusField::Alias => "Alias",
            FocusField::Host => "Hostname",
            FocusField::User => "Username",
            FocusField::Port => "Port",
            FocusField::Group => "Group (optional)",
            FocusField::Description => "Description (optional)",
            FocusField::KeyPath => "Key Path (optional)",
        }
    }
}

fn input(placeholder: &str, value: &str) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(placeholder);
    textarea.set_cursor_line_style(Style::default());
    textarea.insert_str(value);
    textarea
}

fn value_of(textarea: &TextArea<'_>) -> String {
    textarea.lines().first().cloned().unwrap_or_default()
}

/// Add/edit form for one host profile
#[derive(Clone, Debug)]
pub struct HostForm {
    pub alias: TextArea<'static>,
    pub host: TextArea<'static>,
    pub user: TextArea<'static>,
    pub port: TextArea<'static>,
    pub group: TextArea<'static>,
    pub description: TextArea<'static>,
    pub key_path: TextArea<'static>,
    pub focus: FocusField,
    pub errors: Vec<String>,
}

impl HostForm {
    pub fn new(default_port: u16) -> Self {
        Self::from_draft(&ProfileDraft {
            port: default_port.to_string(),
            ..ProfileDraft::default()
        })
    }

    pub fn from_profile(profile: &HostProfile) -> Self {
        Self::from_draft(&ProfileDraft::from_profile(profile))
    }

    fn from_draft(draft: &ProfileDraft) -> Self {
        Self {
            alias: input("Unique identifier for this host", &draft.alias),
            host: input("IP address or hostname", &draft.host),
            user: input("SSH username", &draft.user),
            port: input("SSH port (default: 22)", &draft.port),
            group: input("Optional group for organizing hosts", &draft.group),
            description: input("Optional description", &draft.description),
            key_path: input("Path to SSH key file (optional)", &draft.key_path),
            focus: FocusField::Alias,
            errors: Vec::new(),
        }
    }

    pub fn next(&mut self) {
        let idx = (self.focus.index() + 1) % FocusField::ORDER.len();
        self.focus = FocusField::ORDER[idx];
    }

    pub fn prev(&mut self) {
        let len = FocusField::ORDER.len();
        let idx = (self.focus.index() + len - 1) % len;
        self.focus = FocusField::ORDER[idx];
    }

    fn textarea(&self, field: FocusField) -> &TextArea<'static> {
        match field {
            FocusField::Alias => &self.alias,
            FocusField::Host => &self.host,
            FocusField::User => &self.user,
            FocusField::Port => &self.port,
            FocusField::Group => &self.group,
            FocusField::Description => &self.description,
            FocusField::KeyPath => &self.key_path,
        }
    }

    pub fn focused_textarea_mut(&mut self) -> &mut TextArea<'static> {
        match self.focus {
            FocusField::Alias => &mut self.alias,
            FocusField::Host => &mut self.host,
            FocusField::User => &mut self.user,
            FocusField::Port => &mut self.port,
            FocusField::Group => &mut self.group,
            FocusField::Description => &mut self.description,
            FocusField::KeyPath => &mut self.key_path,
        }
    }

    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            alias: value_of(&self.alias),
            host: value_of(&self.host),
            user: value_of(&self.user),
            port: value_of(&self.port),
            group: value_of(&self.group),
            description: value_of(&self.description),
            key_path: value_of(&self.key_path),
        }
    }
}

pub fn draw_host_form_popup(
    area: Rect,
    title: &str,
    form: &HostForm,
    frame: &mut ratatui::Frame<'_>,
) {
    let fields = FocusField::ORDER.len() as u16;
    let error_lines = form.errors.len() as u16;
    let popup_w = (area.width as f32 * 0.6) as u16;
    let popup_h = (fields * 3 + error_lines + 3).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup = Rect {
        x,
        y,
        width: popup_w,
        height: popup_h,
    };

    frame.render_widget(Clear, popup);
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
    frame.render_widget(outer, popup);

    let inner = popup.inner(Margin::new(1, 1));
    let mut constraints: Vec<Constraint> = FocusField::ORDER
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Length(error_lines));
    constraints.push(Constraint::Length(1)); // hint
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, field) in FocusField::ORDER.iter().enumerate() {
        let focused = form.focus == *field;
        let mut widget = form.textarea(*field).clone();
        let mut block = Block::default().borders(Borders::ALL).title(field.label());
        if focused {
            block = block.border_style(Style::default().fg(Color::Cyan));
        } else {
            // Hide cursor when not focused
            widget.set_cursor_style(Style::default().bg(Color::Reset));
        }
        widget.set_block(block);
        frame.render_widget(&widget, layout[idx]);
    }

    let errors: Vec<Line> = form
        .errors
        .iter()
        .map(|e| Line::from(Span::styled(e.clone(), Style::default().fg(Color::Red))))
        .collect();
    frame.render_widget(Paragraph::new(errors), layout[fields as usize]);

    let hint = Paragraph::new(Line::from(Span::styled(
        "Enter: Save   Esc: Cancel   Tab/↓: Next Field   Shift+Tab/↑: Previous Field",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )));
    frame.render_widget(hint, layout[fields as usize + 1]);
}
