//! Hand the terminal to an external ssh client for a full interactive session.
//!
//! The caller's UI is suspended before the child starts and resumed after it
//! exits, whatever the outcome. The child owns its own lifetime; nothing here
//! imposes a timeout.

use std::process::Command;

use tracing::{info, warn};

use crate::config::{AppSettings, DEFAULT_PORT, HostProfile};
use crate::error::{AppError, Result};
use crate::validation::expand_path;

/// Something that owns the terminal and can give it up temporarily.
pub trait TerminalControl {
    /// Leave raw mode / alternate screen so a child process can use the tty.
    fn suspend(&mut self) -> Result<()>;
    /// Take the terminal back and redraw from scratch.
    fn resume(&mut self) -> Result<()>;
}

/// Program and argument vector for an interactive ssh session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InteractiveCommand {
    pub fn for_profile(profile: &HostProfile, settings: &AppSettings) -> Self {
        let mut args = Vec::new();

        if profile.port != DEFAULT_PORT {
            args.push("-p".to_string());
            args.push(profile.port.to_string());
        }

        if let Some(key_path) = profile.key_path.as_deref().filter(|p| !p.is_empty()) {
            args.push("-i".to_string());
            args.push(expand_path(key_path));
        }

        if let Some(policy) = settings.strict_host_key_checking.as_deref() {
            args.push("-o".to_string());
            args.push(format!("StrictHostKeyChecking={policy}"));
        }

        args.push(profile.destination());

        Self {
            program: settings.ssh_program.clone(),
            args,
        }
    }

    /// Shell-like rendering for status messages and logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How the external client finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveExit {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
}

impl InteractiveExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Suspend the UI, run the client to completion, resume the UI.
///
/// The program is resolved before suspending so a missing binary never
/// flickers the screen. `resume` runs even when spawning fails.
pub fn launch<T: TerminalControl + ?Sized>(
    command: &InteractiveCommand,
    terminal: &mut T,
) -> Result<InteractiveExit> {
    let program = which::which(&command.program).map_err(|e| {
        AppError::LaunchError(format!("{} not found in PATH: {}", command.program, e))
    })?;

    info!("Launching interactive session: {}", command.display());
    terminal.suspend()?;

    let status = Command::new(&program).args(&command.args).status();
    let resumed = terminal.resume();

    let status = status.map_err(|e| {
        warn!("Failed to run {}: {}", program.display(), e);
        AppError::LaunchError(format!("Failed to run {}: {}", program.display(), e))
    })?;
    resumed?;

    let exit = InteractiveExit {
        code: status.code(),
    };
    info!("Interactive session ended with {:?}", exit.code);
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTerminal {
        calls: Vec<&'static str>,
    }

    impl TerminalControl for RecordingTerminal {
        fn suspend(&mut self) -> Result<()> {
            self.calls.push("suspend");
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.calls.push("resume");
            Ok(())
        }
    }

    #[test]
    fn test_default_port_has_no_port_flag() {
        let profile = HostProfile::new("web", "web.example.com", "deploy");
        let command = InteractiveCommand::for_profile(&profile, &AppSettings::default());
        assert_eq!(command.program, "ssh");
        assert_eq!(command.args, vec!["deploy@web.example.com"]);
    }

    #[test]
    fn test_port_and_identity_flags() {
        let profile = HostProfile::new("db1", "10.0.0.5", "admin")
            .with_port(2222)
            .with_key_path("/keys/id_ed25519");
        let settings = AppSettings {
            strict_host_key_checking: Some("accept-new".to_string()),
            ..AppSettings::default()
        };
        let command = InteractiveCommand::for_profile(&profile, &settings);
        assert_eq!(
            command.args,
            vec![
                "-p",
                "2222",
                "-i",
                "/keys/id_ed25519",
                "-o",
                "StrictHostKeyChecking=accept-new",
                "admin@10.0.0.5",
            ]
        );
        assert_eq!(
            command.display(),
            "ssh -p 2222 -i /keys/id_ed25519 -o StrictHostKeyChecking=accept-new admin@10.0.0.5"
        );
    }

    #[test]
    fn test_missing_program_does_not_suspend() {
        let command = InteractiveCommand {
            program: "sshm-no-such-binary".to_string(),
            args: vec![],
        };
        let mut terminal = RecordingTerminal::default();
        let result = launch(&command, &mut terminal);
        assert!(matches!(result, Err(AppError::LaunchError(_))));
        assert!(terminal.calls.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_suspends_and_resumes() {
        let mut terminal = RecordingTerminal::default();
        let ok = InteractiveCommand {
            program: "true".to_string(),
            args: vec!["ignored@host".to_string()],
        };
        let exit = launch(&ok, &mut terminal).unwrap();
        assert!(exit.success());
        assert_eq!(terminal.calls, vec!["suspend", "resume"]);

        let failing = InteractiveCommand {
            program: "false".to_string(),
            args: vec![],
        };
        let exit = launch(&failing, &mut terminal).unwrap();
        assert_eq!(exit.code, Some(1));
        assert_eq!(
            terminal.calls,
            vec!["suspend", "resume", "suspend", "resume"]
        );
    }
}
