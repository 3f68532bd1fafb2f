mod app;
mod async_ssh_client;
mod config;
mod error;
mod key_event;
mod launcher;
mod orchestrator;
mod transfer;
mod ui;
mod utils;
mod validation;

pub use app::{App, AppMode};
pub use async_ssh_client::{CommandOutput, SshSession, TRANSPORT_FAILURE_CODE};
pub use config::{
    AppSettings, CONFIG_DIR_ENV, DEFAULT_PORT, HOSTS_FILE_NAME, HostProfile, HostRegistry,
    ProfileDraft, ensure_config_dir, resolve_config_dir,
};
pub use error::{AppError, Result};
pub use launcher::{InteractiveCommand, InteractiveExit, TerminalControl};
pub use orchestrator::Orchestrator;
pub use transfer::{TransferDirection, TransferOutcome, TransferRequest};
pub use utils::{init_panic_hook, init_tracing, restore_tui};
pub use validation::{
    expand_path, validate_hostname, validate_key_path, validate_port, validate_username,
};
