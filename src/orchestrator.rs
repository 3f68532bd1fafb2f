use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::async_ssh_client::{CommandOutput, SshSession};
use crate::config::{AppSettings, HostProfile};
use crate::error::{AppError, Result};
use crate::launcher::{self, InteractiveCommand, InteractiveExit, TerminalControl};
use crate::transfer::{TransferDirection, TransferOutcome, TransferRequest};

/// Turns host profiles into sessions, commands, transfers and interactive
/// launches.
///
/// Holds at most one session. Methods that touch it take `&mut self`, so a
/// caller sharing an orchestrator across tasks has to wrap it in a mutex.
pub struct Orchestrator {
    settings: AppSettings,
    session: Option<SshSession>,
    connected_alias: Option<String>,
}

impl Orchestrator {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            session: None,
            connected_alias: None,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(SshSession::is_open)
    }

    pub fn connected_alias(&self) -> Option<&str> {
        self.connected_alias.as_deref()
    }

    /// Open a session to `profile`, replacing any current one.
    ///
    /// Every failure comes back as [`AppError::ConnectionError`] carrying the
    /// transport's message.
    pub async fn connect(&mut self, profile: &HostProfile) -> Result<()> {
        self.disconnect().await;

        info!("Connecting to '{}' ({})", profile.alias, profile.host_port());
        let timeout = Duration::from_secs(self.settings.connection_timeout);
        match SshSession::connect(profile, timeout).await {
            Ok(session) => {
                self.session = Some(session);
                self.connected_alias = Some(profile.alias.clone());
                Ok(())
            }
            Err(e) => {
                warn!("Connection to '{}' failed: {}", profile.alias, e);
                Err(match e {
                    AppError::ConnectionError(message) => AppError::ConnectionError(message),
                    other => AppError::ConnectionError(other.to_string()),
                })
            }
        }
    }

    /// Release the session. Safe to call when nothing is connected.
    pub async fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                debug!("Error while disconnecting: {}", e);
            }
            if let Some(alias) = self.connected_alias.take() {
                info!("Disconnected from '{}'", alias);
            }
        }
        self.connected_alias = None;
    }

    /// Run one command on the current session.
    ///
    /// Transport problems don't propagate: they come back as exit code `-1`
    /// with the error text in `stderr`.
    pub async fn run_command(&mut self, command: &str) -> CommandOutput {
        let Some(session) = self.session.as_ref() else {
            return CommandOutput::transport_failure("Not connected");
        };

        debug!("Running command: {}", command);
        match session.run_command(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Command failed: {}", e);
                CommandOutput::transport_failure(e.to_string())
            }
        }
    }

    pub async fn upload_file(
        &mut self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<TransferOutcome> {
        self.transfer(TransferRequest::upload(local_path, remote_path))
            .await
    }

    pub async fn download_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<TransferOutcome> {
        self.transfer(TransferRequest::download(remote_path, local_path))
            .await
    }

    /// Perform one transfer over its own SFTP channel.
    ///
    /// Every failure comes back as [`AppError::TransferError`].
    pub async fn transfer(&mut self, request: TransferRequest) -> Result<TransferOutcome> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| AppError::TransferError("Not connected".to_string()))?;

        let start = Instant::now();
        let result = match request.direction {
            TransferDirection::Upload => {
                session
                    .upload_file(&request.local_path, &request.remote_path)
                    .await
            }
            TransferDirection::Download => {
                session
                    .download_file(&request.remote_path, &request.local_path)
                    .await
            }
        };

        match result {
            Ok(bytes) => {
                info!(
                    "{} of {} finished ({} bytes)",
                    request.direction.label(),
                    request.remote_path,
                    bytes
                );
                Ok(TransferOutcome {
                    request,
                    bytes,
                    elapsed: start.elapsed(),
                })
            }
            Err(e) => {
                warn!(
                    "{} of {} failed: {}",
                    request.direction.label(),
                    request.remote_path,
                    e
                );
                Err(match e {
                    AppError::TransferError(message) => AppError::TransferError(message),
                    other => AppError::TransferError(other.to_string()),
                })
            }
        }
    }

    /// Connect, run one command, and always disconnect.
    pub async fn run_on(&mut self, profile: &HostProfile, command: &str) -> CommandOutput {
        if let Err(e) = self.connect(profile).await {
            return CommandOutput::transport_failure(e.to_string());
        }
        let output = self.run_command(command).await;
        self.disconnect().await;
        output
    }

    /// Connect, perform one transfer, and always disconnect.
    pub async fn transfer_on(
        &mut self,
        profile: &HostProfile,
        request: TransferRequest,
    ) -> Result<TransferOutcome> {
        self.connect(profile).await?;
        let result = self.transfer(request).await;
        self.disconnect().await;
        result
    }

    /// Argument vector for the external client, without running it.
    pub fn interactive_command(&self, profile: &HostProfile) -> InteractiveCommand {
        InteractiveCommand::for_profile(profile, &self.settings)
    }

    /// Give the terminal to the external ssh client until it exits.
    pub fn launch_interactive<T: TerminalControl + ?Sized>(
        &self,
        profile: &HostProfile,
        terminal: &mut T,
    ) -> Result<InteractiveExit> {
        let command = self.interactive_command(profile);
        launcher::launch(&command, terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> HostProfile {
        // Nothing listens on port 1 locally, so the connect is refused fast.
        HostProfile::new("closed", "127.0.0.1", "nobody").with_port(1)
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(AppSettings {
            connection_timeout: 5,
            ..AppSettings::default()
        })
    }

    #[tokio::test]
    async fn test_connect_unreachable_then_disconnect() {
        let mut orchestrator = orchestrator();
        let result = orchestrator.connect(&unreachable()).await;
        assert!(matches!(result, Err(AppError::ConnectionError(_))));
        assert!(!orchestrator.is_connected());
        assert_eq!(orchestrator.connected_alias(), None);

        orchestrator.disconnect().await;
        orchestrator.disconnect().await;
    }

    #[tokio::test]
    async fn test_run_command_without_session() {
        let mut orchestrator = orchestrator();
        let output = orchestrator.run_command("uptime").await;
        assert_eq!(output.exit_code, -1);
        assert!(output.stdout.is_empty());
        assert_eq!(output.stderr, "Not connected");
    }

    #[tokio::test]
    async fn test_transfer_without_session() {
        let mut orchestrator = orchestrator();
        let result = orchestrator
            .upload_file(Path::new("/etc/hostname"), "/tmp/hostname")
            .await;
        assert!(matches!(result, Err(AppError::TransferError(_))));

        let result = orchestrator
            .download_file("/etc/hostname", Path::new("/tmp/hostname"))
            .await;
        assert!(matches!(result, Err(AppError::TransferError(_))));
    }

    #[tokio::test]
    async fn test_scoped_helpers_report_connection_failure() {
        let mut orchestrator = orchestrator();
        let output = orchestrator.run_on(&unreachable(), "uptime").await;
        assert_eq!(output.exit_code, -1);
        assert!(!output.stderr.is_empty());

        let result = orchestrator
            .transfer_on(
                &unreachable(),
                TransferRequest::download("/etc/hostname", "/tmp/hostname"),
            )
            .await;
        assert!(matches!(result, Err(AppError::ConnectionError(_))));
        assert!(!orchestrator.is_connected());
    }

    #[test]
    fn test_interactive_command_uses_settings() {
        let orchestrator = Orchestrator::new(AppSettings {
            ssh_program: "/usr/local/bin/ssh".to_string(),
            ..AppSettings::default()
        });
        let profile = HostProfile::new("db1", "10.0.0.5", "admin").with_port(2222);
        let command = orchestrator.interactive_command(&profile);
        assert_eq!(command.program, "/usr/local/bin/ssh");
        assert_eq!(command.args, vec!["-p", "2222", "admin@10.0.0.5"]);
    }

    #[tokio::test]
    #[ignore = "requires a running ssh server"]
    async fn test_upload_download_docker() {
        let profile = HostProfile::new("docker", "127.0.0.1", "dockeruser").with_port(2222);
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("payload.txt");
        let back = dir.path().join("payload.back");
        std::fs::write(&local, "hello sftp").unwrap();

        let mut orchestrator = orchestrator();
        orchestrator.connect(&profile).await.unwrap();
        let up = orchestrator
            .upload_file(&local, "/tmp/payload.txt")
            .await
            .unwrap();
        assert_eq!(up.bytes, 10);
        orchestrator
            .download_file("/tmp/payload.txt", &back)
            .await
            .unwrap();
        orchestrator.disconnect().await;

        assert_eq!(std::fs::read_to_string(back).unwrap(), "hello sftp");
    }
}
