use std::io::Write;
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::prelude::Backend;
use tokio::runtime::Handle;
use tui_textarea::TextArea;

use crate::async_ssh_client::CommandOutput;
use crate::config::{HostProfile, HostRegistry};
use crate::error::{AppError, Result};
use crate::key_event::{KeyFlow, handle_key_event};
use crate::launcher::TerminalControl;
use crate::orchestrator::Orchestrator;
use crate::transfer::{TransferDirection, TransferRequest};
use crate::ui::{
    HostForm, HostListState, TransferForm, draw_busy_popup, draw_command_output,
    draw_command_prompt, draw_delete_confirmation_popup, draw_error_popup, draw_host_form_popup,
    draw_host_table, draw_info_popup, draw_transfer_popup,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Current screen; the host table is always drawn underneath.
pub enum AppMode {
    HostList,
    FormNew {
        form: HostForm,
    },
    FormEdit {
        original_alias: String,
        form: HostForm,
    },
    DeleteConfirmation {
        alias: String,
    },
    CommandPrompt {
        alias: String,
        input: TextArea<'static>,
    },
    CommandResult {
        alias: String,
        command: String,
        output: CommandOutput,
        scroll: u16,
    },
    TransferForm {
        alias: String,
        form: TransferForm,
        error: Option<String>,
    },
}

pub fn create_command_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("e.g. uptime");
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea
}

/// Hosts shown under the given group filter, in registry order.
pub fn visible_hosts<'a>(registry: &'a HostRegistry, group: Option<&str>) -> Vec<&'a HostProfile> {
    match group {
        Some(group) => registry.list_by_group(group),
        None => registry.list_hosts().iter().collect(),
    }
}

pub struct App<B: Backend + Write> {
    pub mode: AppMode,
    pub error: Option<AppError>,
    pub info: Option<String>,
    pub registry: HostRegistry,
    pub orchestrator: Orchestrator,
    pub list_state: HostListState,
    pub group_filter: Option<String>,
    runtime: Handle,
    busy: Option<String>,
    terminal: Terminal<B>,
    needs_redraw: bool,
}

impl<B: Backend + Write> Drop for App<B> {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen,
            Show
        )
        .ok();
    }
}

impl<B: Backend + Write> App<B> {
    pub fn new(
        terminal: Terminal<B>,
        registry: HostRegistry,
        orchestrator: Orchestrator,
        runtime: Handle,
    ) -> Self {
        Self {
            mode: AppMode::HostList,
            error: None,
            info: None,
            registry,
            orchestrator,
            list_state: HostListState::default(),
            group_filter: None,
            runtime,
            busy: None,
            terminal,
            needs_redraw: true,
        }
    }

    pub fn init_terminal(&mut self) -> Result<()> {
        use crossterm::ExecutableCommand;

        enable_raw_mode().inspect_err(|e| tracing::error!("Error enabling raw mode: {}", e))?;
        self.terminal
            .backend_mut()
            .execute(EnterAlternateScreen)
            .inspect_err(|e| {
                tracing::error!(
                    "Error executing EnterAlternateScreen terminal command: {}",
                    e
                )
            })?;
        self.terminal
            .backend_mut()
            .execute(EnableBracketedPaste)
            .inspect_err(|e| {
                tracing::error!(
                    "Error executing EnableBracketedPaste terminal command: {}",
                    e
                )
            })?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Event loop; returns when the user quits.
    ///
    /// Input is polled synchronously so that nothing competes with an
    /// interactive ssh child for stdin.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if self.should_redraw() {
                self.draw()?;
            }

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if let KeyFlow::Quit = handle_key_event(self, key) {
                        break;
                    }
                    self.mark_redraw();
                }
                Event::Paste(text) => {
                    self.paste(&text);
                    self.mark_redraw();
                }
                Event::Resize(_, _) => self.mark_redraw(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Mark that UI needs redrawing
    pub fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    fn should_redraw(&mut self) -> bool {
        let should = self.needs_redraw;
        self.needs_redraw = false;
        should
    }

    pub fn set_error(&mut self, error: AppError) {
        if error.is_recoverable() {
            tracing::warn!("{}", error);
        } else {
            tracing::error!("{}", error);
        }
        self.error = Some(error);
        self.needs_redraw = true;
    }

    pub fn set_info(&mut self, info: String) {
        self.info = Some(info);
        self.needs_redraw = true;
    }

    pub fn visible_hosts(&self) -> Vec<&HostProfile> {
        visible_hosts(&self.registry, self.group_filter.as_deref())
    }

    pub fn selected_host(&self) -> Option<HostProfile> {
        self.visible_hosts()
            .get(self.list_state.selected)
            .map(|h| (*h).clone())
    }

    /// All → first group → … → last group → All.
    pub fn cycle_group_filter(&mut self) {
        let groups = self.registry.list_groups();
        self.group_filter = match self.group_filter.as_deref() {
            None => groups.first().cloned(),
            Some(current) => groups
                .iter()
                .position(|g| g == current)
                .and_then(|idx| groups.get(idx + 1))
                .cloned(),
        };
        self.list_state.selected = 0;
    }

    pub fn go_to_host_list(&mut self) {
        self.mode = AppMode::HostList;
        if let Some(group) = self.group_filter.as_deref()
            && !self.registry.list_groups().iter().any(|g| g == group)
        {
            self.group_filter = None;
        }
        let len = self.visible_hosts().len();
        self.list_state.clamp(len);
    }

    /// Return to the list with `alias` selected, dropping the group filter
    /// if it would hide the host.
    pub fn go_to_host_list_selecting(&mut self, alias: &str) {
        self.mode = AppMode::HostList;
        if !self.visible_hosts().iter().any(|h| h.alias == alias) {
            self.group_filter = None;
        }
        if let Some(idx) = self.visible_hosts().iter().position(|h| h.alias == alias) {
            self.list_state.selected = idx;
        }
    }

    pub fn go_to_form_new(&mut self) {
        let form = HostForm::new(self.orchestrator.settings().default_port);
        self.mode = AppMode::FormNew { form };
    }

    pub fn go_to_form_edit(&mut self, profile: &HostProfile) {
        self.mode = AppMode::FormEdit {
            original_alias: profile.alias.clone(),
            form: HostForm::from_profile(profile),
        };
    }

    pub fn go_to_delete_confirmation(&mut self, alias: String) {
        self.mode = AppMode::DeleteConfirmation { alias };
    }

    pub fn go_to_command_prompt(&mut self, alias: String) {
        self.mode = AppMode::CommandPrompt {
            alias,
            input: create_command_textarea(),
        };
    }

    pub fn go_to_transfer_form(&mut self, alias: String, direction: TransferDirection) {
        self.mode = AppMode::TransferForm {
            alias,
            form: TransferForm::new(direction),
            error: None,
        };
    }

    /// Draw one frame with a busy message over the current screen.
    fn show_busy(&mut self, message: String) {
        self.busy = Some(message);
        if let Err(e) = self.draw() {
            tracing::debug!("Failed to draw busy popup: {}", e);
        }
        self.busy = None;
    }

    /// Run one command on `alias` and show the result.
    pub fn run_remote_command(&mut self, alias: &str, command: String) {
        let profile = match self.registry.get_host(alias) {
            Ok(profile) => profile,
            Err(e) => {
                self.go_to_host_list();
                self.set_error(e);
                return;
            }
        };

        self.show_busy(format!("Running on {}...", profile.alias));
        let output = self
            .runtime
            .block_on(self.orchestrator.run_on(&profile, &command));
        self.mode = AppMode::CommandResult {
            alias: profile.alias,
            command,
            output,
            scroll: 0,
        };
    }

    /// Perform one transfer against `alias`; on failure the form stays open.
    pub fn run_transfer(&mut self, alias: &str, request: TransferRequest) {
        let profile = match self.registry.get_host(alias) {
            Ok(profile) => profile,
            Err(e) => {
                self.go_to_host_list();
                self.set_error(e);
                return;
            }
        };

        self.show_busy(format!(
            "Transferring {}...",
            request.local_path.display()
        ));
        let result = self
            .runtime
            .block_on(self.orchestrator.transfer_on(&profile, request));
        match result {
            Ok(outcome) => {
                self.go_to_host_list();
                self.set_info(outcome.message());
            }
            Err(e) => self.set_error(e),
        }
    }

    /// Hand the terminal to the external ssh client for `profile`.
    pub fn launch_interactive(&mut self, profile: &HostProfile) {
        let result = self
            .orchestrator
            .launch_interactive(profile, &mut self.terminal);
        match result {
            // 255 is ssh's own failure code; anything else came from the remote shell.
            Ok(exit) if exit.code == Some(255) => {
                self.set_error(AppError::ConnectionError(format!(
                    "ssh to {} exited with status 255",
                    profile.destination()
                )));
            }
            Ok(_) => {}
            Err(e) => self.set_error(e),
        }
        self.mark_redraw();
    }

    fn paste(&mut self, text: &str) {
        let line = text.lines().next().unwrap_or_default();
        match &mut self.mode {
            AppMode::FormNew { form } | AppMode::FormEdit { form, .. } => {
                form.focused_textarea_mut().insert_str(line);
            }
            AppMode::CommandPrompt { input, .. } => {
                input.insert_str(line);
            }
            AppMode::TransferForm { form, .. } => {
                form.focused_field_mut().insert_str(line);
            }
            _ => {}
        }
    }

    fn draw(&mut self) -> Result<()> {
        let Self {
            terminal,
            registry,
            mode,
            error,
            info,
            busy,
            list_state,
            group_filter,
            ..
        } = self;

        terminal.draw(|frame| {
            let area = frame.area();
            let hosts = visible_hosts(registry, group_filter.as_deref());
            draw_host_table(area, &hosts, list_state, group_filter.as_deref(), frame);

            match mode {
                AppMode::HostList => {}
                AppMode::FormNew { form } => {
                    draw_host_form_popup(area, "New Host", form, frame);
                }
                AppMode::FormEdit {
                    original_alias,
                    form,
                } => {
                    let title = format!("Edit Host: {}", original_alias);
                    draw_host_form_popup(area, &title, form, frame);
                }
                AppMode::DeleteConfirmation { alias } => {
                    draw_delete_confirmation_popup(area, alias, frame);
                }
                AppMode::CommandPrompt { alias, input } => {
                    draw_command_prompt(area, alias, input, frame);
                }
                AppMode::CommandResult {
                    alias,
                    command,
                    output,
                    scroll,
                } => {
                    draw_command_output(area, alias, command, output, *scroll, frame);
                }
                AppMode::TransferForm { alias, form, error } => {
                    draw_transfer_popup(area, alias, form, error.as_deref(), frame);
                }
            }

            if let Some(message) = busy.as_deref() {
                draw_busy_popup(area, message, frame);
            }
            if let Some(error) = error.as_ref() {
                draw_error_popup(area, &error.to_string(), frame);
            } else if let Some(info) = info.as_deref() {
                draw_info_popup(area, info, frame);
            }
        })?;
        Ok(())
    }
}

impl<B: Backend + Write> TerminalControl for Terminal<B> {
    fn suspend(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen,
            Show
        )?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(self.backend_mut(), EnterAlternateScreen, EnableBracketedPaste)?;
        self.clear()?;
        Ok(())
    }
}
