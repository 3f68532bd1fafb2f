use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::Backend;

use crate::{App, AppMode};

pub mod form;
pub mod host_list;
pub mod remote;

pub use form::handle_host_form_key;
pub use host_list::{handle_delete_confirmation_key, handle_host_list_key};
pub use remote::{handle_command_prompt_key, handle_command_result_key, handle_transfer_form_key};

/// Result of handling a key event
pub enum KeyFlow {
    Continue,
    Quit,
}

/// Top-level key handler: popup dismissal first, then dispatch by mode.
pub fn handle_key_event<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    // Only handle actual key presses (ignore repeats/releases)
    if key.kind != KeyEventKind::Press {
        return KeyFlow::Continue;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyFlow::Quit;
    }

    if app.error.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.error = None;
        }
        return KeyFlow::Continue;
    }

    if app.info.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.info = None;
        }
        return KeyFlow::Continue;
    }

    match &app.mode {
        AppMode::HostList => handle_host_list_key(app, key),
        AppMode::FormNew { .. } | AppMode::FormEdit { .. } => handle_host_form_key(app, key),
        AppMode::DeleteConfirmation { .. } => handle_delete_confirmation_key(app, key),
        AppMode::CommandPrompt { .. } => handle_command_prompt_key(app, key),
        AppMode::CommandResult { .. } => handle_command_result_key(app, key),
        AppMode::TransferForm { .. } => handle_transfer_form_key(app, key),
    }
}
