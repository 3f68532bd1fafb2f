use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::Backend;

use super::KeyFlow;
use crate::transfer::TransferDirection;
use crate::{App, AppMode};

pub fn handle_host_list_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let len = app.visible_hosts().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return KeyFlow::Quit,
        KeyCode::Char('k') | KeyCode::Up => app.list_state.scroll_up(len),
        KeyCode::Char('j') | KeyCode::Down => app.list_state.scroll_down(len),
        KeyCode::Char('g') => app.cycle_group_filter(),
        KeyCode::Char('a') => app.go_to_form_new(),
        KeyCode::Char('e') => {
            if let Some(profile) = app.selected_host() {
                app.go_to_form_edit(&profile);
            }
        }
        KeyCode::Char('d') => {
            if let Some(profile) = app.selected_host() {
                app.go_to_delete_confirmation(profile.alias);
            }
        }
        KeyCode::Enter | KeyCode::Char('c') => {
            if let Some(profile) = app.selected_host() {
                app.launch_interactive(&profile);
            }
        }
        KeyCode::Char('x') => {
            if let Some(profile) = app.selected_host() {
                app.go_to_command_prompt(profile.alias);
            }
        }
        KeyCode::Char('u') => {
            if let Some(profile) = app.selected_host() {
                app.go_to_transfer_form(profile.alias, TransferDirection::Upload);
            }
        }
        KeyCode::Char('D') => {
            if let Some(profile) = app.selected_host() {
                app.go_to_transfer_form(profile.alias, TransferDirection::Download);
            }
        }
        _ => {}
    }
    KeyFlow::Continue
}

pub fn handle_delete_confirmation_key<B: Backend + Write>(
    app: &mut App<B>,
    key: KeyEvent,
) -> KeyFlow {
    let AppMode::DeleteConfirmation { alias } = &app.mode else {
        return KeyFlow::Continue;
    };
    let alias = alias.clone();

    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let result = app.registry.delete_host(&alias);
            app.go_to_host_list();
            if let Err(e) = result {
                app.set_error(e);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.go_to_host_list(),
        _ => {}
    }
    KeyFlow::Continue
}
