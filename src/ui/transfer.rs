use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tui_textarea::TextArea;

use crate::transfer::{TransferDirection, TransferRequest};
use crate::validation::expand_path;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferFocus {
    Local,
    Remote,
}

/// Upload/download form: a direction toggle and two paths.
#[derive(Clone, Debug)]
pub struct TransferForm {
    pub direction: TransferDirection,
    pub local_path: TextArea<'static>,
    pub remote_path: TextArea<'static>,
    pub focus: TransferFocus,
}

impl TransferForm {
    pub fn new(direction: TransferDirection) -> Self {
        let mut local_path = TextArea::default();
        local_path.set_placeholder_text("Local file path, e.g. ~/backup.tar.gz");
        local_path.set_cursor_line_style(Style::default());
        let mut remote_path = TextArea::default();
        remote_path.set_placeholder_text("Remote file path, e.g. /tmp/backup.tar.gz");
        remote_path.set_cursor_line_style(Style::default());
        Self {
            direction,
            local_path,
            remote_path,
            focus: TransferFocus::Local,
        }
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            TransferDirection::Upload => TransferDirection::Download,
            TransferDirection::Download => TransferDirection::Upload,
        };
    }

    pub fn next(&mut self) {
        self.focus = match self.focus {
            TransferFocus::Local => TransferFocus::Remote,
            TransferFocus::Remote => TransferFocus::Local,
        };
    }

    pub fn prev(&mut self) {
        self.next();
    }

    pub fn focused_field_mut(&mut self) -> &mut TextArea<'static> {
        match self.focus {
            TransferFocus::Local => &mut self.local_path,
            TransferFocus::Remote => &mut self.remote_path,
        }
    }

    fn local_value(&self) -> String {
        self.local_path
            .lines()
            .first()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn remote_value(&self) -> String {
        self.remote_path
            .lines()
            .first()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Build the request, or explain which path is missing.
    pub fn to_request(&self) -> std::result::Result<TransferRequest, String> {
        let local = self.local_value();
        let remote = self.remote_value();
        if local.is_empty() {
            return Err("Local path is required".to_string());
        }
        if remote.is_empty() {
            return Err("Remote path is required".to_string());
        }
        let local = expand_path(&local);
        Ok(match self.direction {
            TransferDirection::Upload => TransferRequest::upload(local, remote),
            TransferDirection::Download => TransferRequest::download(remote, local),
        })
    }
}

pub fn draw_transfer_popup(
    area: Rect,
    alias: &str,
    form: &TransferForm,
    error: Option<&str>,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup_w = (area.width as f32 * 0.6) as u16;
    let popup_h = 13u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup = Rect {
        x,
        y,
        width: popup_w,
        height: popup_h,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            format!("File Transfer: {}", alias),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
    frame.render_widget(block, popup);

    let inner = popup.inner(Margin::new(1, 1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // direction
            Constraint::Length(3), // local
            Constraint::Length(3), // remote
            Constraint::Length(1), // error
            Constraint::Length(1), // hint
        ])
        .split(inner);

    let (upload_style, download_style) = match form.direction {
        TransferDirection::Upload => (
            Style::default().fg(Color::Black).bg(Color::Cyan),
            Style::default().fg(Color::Gray),
        ),
        TransferDirection::Download => (
            Style::default().fg(Color::Gray),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
    };
    let direction = Paragraph::new(Line::from(vec![
        Span::styled("Direction: ", Style::default().fg(Color::Gray)),
        Span::styled(" Upload ", upload_style),
        Span::raw(" "),
        Span::styled(" Download ", download_style),
    ]));
    frame.render_widget(direction, layout[0]);

    for (idx, (field, title, focus)) in [
        (&form.local_path, "Local Path", TransferFocus::Local),
        (&form.remote_path, "Remote Path", TransferFocus::Remote),
    ]
    .into_iter()
    .enumerate()
    {
        let mut widget = field.clone();
        let mut block = Block::default().borders(Borders::ALL).title(title);
        if form.focus == focus {
            block = block.border_style(Style::default().fg(Color::Cyan));
        } else {
            widget.set_cursor_style(Style::default().bg(Color::Reset));
        }
        widget.set_block(block);
        frame.render_widget(&widget, layout[idx + 1]);
    }

    if let Some(error) = error {
        let line = Paragraph::new(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
        frame.render_widget(line, layout[3]);
    }

    let hint = Paragraph::new(Line::from(Span::styled(
        "Enter: Start   Ctrl+D: Toggle Direction   Tab: Switch Field   Esc: Cancel",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )));
    frame.render_widget(hint, layout[4]);
}
