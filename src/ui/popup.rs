use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tui_textarea::TextArea;

use crate::async_ssh_client::CommandOutput;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn dismiss_hint() -> Line<'static> {
    Line::from(Span::styled(
        "Press Enter or Esc to dismiss",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    ))
}

fn message_popup(
    area: Rect,
    title: &str,
    message: &str,
    color: Color,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup_w = area.width.saturating_sub(4);
    let inner_w = popup_w.saturating_sub(2).max(1);
    let estimated_lines: u16 = message
        .lines()
        .map(|l| {
            let len = l.chars().count() as u16;
            if len == 0 { 1 } else { len.div_ceil(inner_w) }
        })
        .sum();
    let content_h = estimated_lines.max(1) + 4; // title + message + hint
    let popup = centered(area, popup_w, content_h.min(area.height.saturating_sub(2)));

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    let mut lines: Vec<Line> = message
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(color))))
        .collect();
    lines.push(Line::from(Span::raw("")));
    lines.push(dismiss_hint());
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, popup);
}

pub fn draw_error_popup(area: Rect, message: &str, frame: &mut ratatui::Frame<'_>) {
    message_popup(area, "Error", message, Color::Red, frame);
}

pub fn draw_info_popup(area: Rect, message: &str, frame: &mut ratatui::Frame<'_>) {
    message_popup(area, "Info", message, Color::Green, frame);
}

/// Shown while a blocking network call is in flight.
pub fn draw_busy_popup(area: Rect, message: &str, frame: &mut ratatui::Frame<'_>) {
    let popup_w = (message.chars().count() as u16 + 6).min(area.width);
    let popup = centered(area, popup_w, 3);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Yellow),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, popup);
}

pub fn draw_delete_confirmation_popup(area: Rect, alias: &str, frame: &mut ratatui::Frame<'_>) {
    let popup_w = area.width.saturating_sub(10).max(50).min(area.width);
    let popup_h = 8u16.min(area.height.saturating_sub(2)).max(6);
    let popup = centered(area, popup_w, popup_h);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            "Delete Host",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));

    let inner = popup.inner(Margin::new(1, 1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // warning
            Constraint::Length(1), // alias
            Constraint::Length(1),
            Constraint::Length(1), // consequence
            Constraint::Length(1), // buttons
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Are you sure you want to delete this host?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))),
        layout[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Host: ", Style::default().fg(Color::Gray)),
            Span::styled(
                alias.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ])),
        layout[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(Color::Red),
        ))),
        layout[3],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "Y",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - Delete   ", Style::default().fg(Color::White)),
            Span::styled(
                "N",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - Cancel   ", Style::default().fg(Color::White)),
            Span::styled(
                "Esc",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - Cancel", Style::default().fg(Color::White)),
        ]))
        .alignment(Alignment::Center),
        layout[4],
    );

    frame.render_widget(block, popup);
}

pub fn draw_command_prompt(
    area: Rect,
    alias: &str,
    input: &TextArea<'static>,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup_w = (area.width as f32 * 0.6) as u16;
    let popup = centered(area, popup_w, 6);
    frame.render_widget(Clear, popup);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(popup.inner(Margin::new(1, 1)));

    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(Span::styled(
                format!("Run Command on {}", alias),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))),
        popup,
    );

    let mut widget = input.clone();
    widget.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Command"),
    );
    frame.render_widget(&widget, layout[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Enter: Run   Esc: Cancel",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ))),
        layout[1],
    );
}

/// Stdout, stderr and exit code of a finished remote command.
pub fn draw_command_output(
    area: Rect,
    alias: &str,
    command: &str,
    output: &CommandOutput,
    scroll: u16,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup = centered(
        area,
        area.width.saturating_sub(4),
        area.height.saturating_sub(2),
    );
    frame.render_widget(Clear, popup);

    let status_color = if output.success() {
        Color::Green
    } else {
        Color::Red
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("$ ", Style::default().fg(Color::Gray)),
            Span::styled(
                command.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("exit code: {}", output.exit_code),
            Style::default().fg(status_color),
        )),
        Line::from(Span::raw("")),
    ];
    lines.extend(output.stdout.lines().map(|l| Line::from(l.to_string())));
    if !output.stderr.is_empty() {
        lines.push(Line::from(Span::styled(
            "--- stderr ---",
            Style::default().fg(Color::DarkGray),
        )));
        lines.extend(
            output
                .stderr
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red)))),
        );
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(popup);

    let body = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    format!("Output from {}", alias),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))),
        );
    frame.render_widget(body, layout[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "J/↓: Down  K/↑: Up  Enter/Esc: Close",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ))),
        layout[1],
    );
}
