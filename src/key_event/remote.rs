use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Backend;
use tui_textarea::Input;

use super::KeyFlow;
use crate::{App, AppMode};

pub fn handle_command_prompt_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let AppMode::CommandPrompt { alias, input } = &mut app.mode else {
        return KeyFlow::Continue;
    };

    match key.code {
        KeyCode::Esc => app.go_to_host_list(),
        KeyCode::Enter => {
            let command = input
                .lines()
                .first()
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            if command.is_empty() {
                return KeyFlow::Continue;
            }
            let alias = alias.clone();
            app.run_remote_command(&alias, command);
        }
        _ => {
            input.input(Input::from(key));
        }
    }
    KeyFlow::Continue
}

pub fn handle_command_result_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let AppMode::CommandResult { scroll, .. } = &mut app.mode else {
        return KeyFlow::Continue;
    };

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
        KeyCode::PageDown => *scroll = scroll.saturating_add(10),
        KeyCode::PageUp => *scroll = scroll.saturating_sub(10),
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => app.go_to_host_list(),
        _ => {}
    }
    KeyFlow::Continue
}

pub fn handle_transfer_form_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let AppMode::TransferForm { alias, form, error } = &mut app.mode else {
        return KeyFlow::Continue;
    };

    match key.code {
        KeyCode::Esc => app.go_to_host_list(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => form.next(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.toggle_direction();
        }
        KeyCode::Enter => match form.to_request() {
            Ok(request) => {
                *error = None;
                let alias = alias.clone();
                app.run_transfer(&alias, request);
            }
            Err(message) => *error = Some(message),
        },
        _ => {
            *error = None;
            form.focused_field_mut().input(Input::from(key));
        }
    }
    KeyFlow::Continue
}
