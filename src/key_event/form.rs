use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::Backend;
use tui_textarea::Input;

use super::KeyFlow;
use crate::config::HostProfile;
use crate::error::AppError;
use crate::{App, AppMode};

enum Submit {
    Add(HostProfile),
    Update { original_alias: String, profile: HostProfile },
}

/// Shared by the add and edit forms.
pub fn handle_host_form_key<B: Backend + Write>(app: &mut App<B>, key: KeyEvent) -> KeyFlow {
    let submit = match &mut app.mode {
        AppMode::FormNew { form } | AppMode::FormEdit { form, .. } => match key.code {
            KeyCode::Esc => None,
            KeyCode::Tab | KeyCode::Down => {
                form.next();
                return KeyFlow::Continue;
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.prev();
                return KeyFlow::Continue;
            }
            KeyCode::Enter => match form.to_draft().into_profile() {
                Ok(profile) => Some(profile),
                Err(errors) => {
                    form.errors = errors;
                    return KeyFlow::Continue;
                }
            },
            _ => {
                form.focused_textarea_mut().input(Input::from(key));
                return KeyFlow::Continue;
            }
        },
        _ => return KeyFlow::Continue,
    };

    let Some(profile) = submit else {
        app.go_to_host_list();
        return KeyFlow::Continue;
    };

    let submit = match &app.mode {
        AppMode::FormEdit { original_alias, .. } => Submit::Update {
            original_alias: original_alias.clone(),
            profile,
        },
        _ => Submit::Add(profile),
    };

    let (alias, result) = match submit {
        Submit::Add(profile) => (profile.alias.clone(), app.registry.add_host(profile)),
        Submit::Update {
            original_alias,
            profile,
        } => (
            profile.alias.clone(),
            app.registry.update_host(&original_alias, profile),
        ),
    };

    match result {
        Ok(()) => app.go_to_host_list_selecting(&alias),
        // The user can fix these without leaving the form.
        Err(e @ (AppError::ValidationError(_) | AppError::DuplicateAlias(_))) => {
            if let AppMode::FormNew { form } | AppMode::FormEdit { form, .. } = &mut app.mode {
                form.errors = vec![e.to_string()];
            }
        }
        Err(e) => app.set_error(e),
    }
    KeyFlow::Continue
}
