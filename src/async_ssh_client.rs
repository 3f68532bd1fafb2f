use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle};
#[cfg(unix)]
use russh::keys::agent::client::AgentClient;
use russh::keys::{self, PrivateKeyWithHashAlg, ssh_key};
use russh::{ChannelMsg, Disconnect};
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::HostProfile;
use crate::error::{AppError, Result};
use crate::validation::expand_path;

/// Key files tried, in order, when a profile has no explicit key path.
const DEFAULT_KEY_FILES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

/// Exit code reported when a command could not run at all.
pub const TRANSPORT_FAILURE_CODE: i32 = -1;

struct SshClient {
    host: String,
}

impl client::Handler for SshClient {
    type Error = AppError;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        info!(
            "Accepting host key for {}: {}",
            self.host,
            server_public_key.fingerprint(ssh_key::HashAlg::Sha256)
        );
        Ok(true)
    }
}

/// Result of one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output for a command that never reached the remote side.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: TRANSPORT_FAILURE_CODE,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// An authenticated SSH transport to one host.
pub struct SshSession {
    session: Option<Handle<SshClient>>,
    target: String,
}

impl SshSession {
    /// Connect and authenticate, giving up after `timeout` for the handshake.
    ///
    /// With a key path on the profile only that key is offered; otherwise the
    /// standard key files under `~/.ssh` are tried before `none` auth.
    pub async fn connect(profile: &HostProfile, timeout: Duration) -> Result<Self> {
        let config = Arc::new(client::Config {
            keepalive_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        });

        let handler = SshClient {
            host: profile.host.clone(),
        };
        let target = profile.host_port();
        debug!("Opening SSH transport to {}", target);

        let mut session = tokio::time::timeout(
            timeout,
            client::connect(config, (profile.host.as_str(), profile.port), handler),
        )
        .await
        .map_err(|_| {
            AppError::ConnectionError(format!(
                "Timed out after {}s connecting to {}",
                timeout.as_secs(),
                target
            ))
        })??;

        let authenticated = match profile.key_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                let key_path = PathBuf::from(expand_path(path));
                Self::authenticate_with_key(&mut session, &profile.user, &key_path).await?
            }
            None => Self::authenticate_default(&mut session, &profile.user).await?,
        };

        if !authenticated {
            let _ = session
                .disconnect(Disconnect::ByApplication, "", "")
                .await;
            return Err(AppError::AuthenticationError(format!(
                "Authentication failed for {}",
                profile.destination()
            )));
        }

        info!("Authenticated as {} on {}", profile.user, target);
        Ok(Self {
            session: Some(session),
            target,
        })
    }

    async fn authenticate_with_key(
        session: &mut Handle<SshClient>,
        user: &str,
        key_path: &Path,
    ) -> Result<bool> {
        let private_key = keys::load_secret_key(key_path, None).map_err(|e| {
            AppError::AuthenticationError(format!(
                "Failed to load key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        let algo = session.best_supported_rsa_hash().await?.flatten();
        let key = PrivateKeyWithHashAlg::new(Arc::new(private_key), algo);
        let auth_result = session.authenticate_publickey(user, key).await?;
        Ok(auth_result.success())
    }

    #[cfg(unix)]
    async fn open_agent(
        sock: Option<&std::ffi::OsStr>,
    ) -> Option<AgentClient<tokio::net::UnixStream>> {
        let sock = sock.filter(|s| !s.is_empty())?;
        match AgentClient::connect_uds(sock).await {
            Ok(agent) => Some(agent),
            Err(e) => {
                debug!("ssh-agent at {} unavailable: {}", Path::new(sock).display(), e);
                None
            }
        }
    }

    /// Offers every identity held by the agent at `SSH_AUTH_SOCK`.
    #[cfg(unix)]
    async fn authenticate_agent(session: &mut Handle<SshClient>, user: &str) -> Result<bool> {
        let sock = std::env::var_os("SSH_AUTH_SOCK");
        let Some(mut agent) = Self::open_agent(sock.as_deref()).await else {
            return Ok(false);
        };
        let identities = match agent.request_identities().await {
            Ok(identities) => identities,
            Err(e) => {
                debug!("ssh-agent refused to list identities: {}", e);
                return Ok(false);
            }
        };

        let rsa_hash = session.best_supported_rsa_hash().await?.flatten();
        for key in identities {
            let hash_alg = if key.algorithm().is_rsa() {
                rsa_hash
            } else {
                None
            };
            let fingerprint = key.fingerprint(ssh_key::HashAlg::Sha256);
            match session
                .authenticate_publickey_with(user, key, hash_alg, &mut agent)
                .await
            {
                Ok(result) if result.success() => return Ok(true),
                Ok(_) => debug!("Agent key {} was rejected", fingerprint),
                Err(e) => debug!("Agent key {} failed to sign: {}", fingerprint, e),
            }
        }
        Ok(false)
    }

    #[cfg(not(unix))]
    async fn authenticate_agent(_session: &mut Handle<SshClient>, _user: &str) -> Result<bool> {
        Ok(false)
    }

    async fn authenticate_default(session: &mut Handle<SshClient>, user: &str) -> Result<bool> {
        if Self::authenticate_agent(session, user).await? {
            return Ok(true);
        }

        if let Some(ssh_dir) = dirs::home_dir().map(|home| home.join(".ssh")) {
            for name in DEFAULT_KEY_FILES {
                let candidate = ssh_dir.join(name);
                if !candidate.is_file() {
                    continue;
                }
                match Self::authenticate_with_key(session, user, &candidate).await {
                    Ok(true) => return Ok(true),
                    Ok(false) => debug!("Key {} was rejected", candidate.display()),
                    // Passphrase-protected or unsupported keys are skipped.
                    Err(AppError::AuthenticationError(e)) => debug!("{}", e),
                    Err(e) => return Err(e),
                }
            }
        }

        let auth_result = session.authenticate_none(user).await?;
        Ok(auth_result.success())
    }

    fn handle(&self) -> Result<&Handle<SshClient>> {
        self.session.as_ref().ok_or_else(|| {
            AppError::ConnectionError(format!("Session to {} is closed", self.target))
        })
    }

    pub fn is_open(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Run `command` on a fresh exec channel and wait for it to finish.
    pub async fn run_command(&self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.handle()?.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;

        // Exit status may arrive after EOF, so drain until the channel closes.
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => stdout.extend_from_slice(&data),
                ChannelMsg::ExtendedData { data, ext } => {
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    exit_code = Some(i32::try_from(exit_status).unwrap_or(i32::MAX));
                }
                ChannelMsg::Close => break,
                _ => {}
            }
        }

        debug!("Command on {} exited with {:?}", self.target, exit_code);
        Ok(CommandOutput {
            exit_code: exit_code.unwrap_or(TRANSPORT_FAILURE_CODE),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Open a dedicated SFTP channel; callers close it when done.
    async fn open_sftp(&self) -> Result<SftpSession> {
        let channel = self.handle()?.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| AppError::TransferError(format!("SFTP session creation failed: {e}")))
    }

    pub async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<u64> {
        let mut local = tokio::fs::File::open(local_path).await.map_err(|e| {
            AppError::TransferError(format!("Failed to open {}: {}", local_path.display(), e))
        })?;

        let sftp = self.open_sftp().await?;
        let result = async {
            let mut remote = sftp.create(remote_path).await?;
            let bytes = tokio::io::copy(&mut local, &mut remote).await?;
            remote.shutdown().await?;
            Ok::<u64, AppError>(bytes)
        }
        .await;

        if let Err(e) = sftp.close().await {
            debug!("Closing SFTP channel failed: {}", e);
        }
        result
    }

    pub async fn download_file(&self, remote_path: &str, local_path: &Path) -> Result<u64> {
        let sftp = self.open_sftp().await?;
        let result = async {
            let mut remote = sftp.open(remote_path).await?;
            let mut local = tokio::fs::File::create(local_path).await.map_err(|e| {
                AppError::TransferError(format!(
                    "Failed to create {}: {}",
                    local_path.display(),
                    e
                ))
            })?;
            let bytes = tokio::io::copy(&mut remote, &mut local).await?;
            local.flush().await?;
            Ok::<u64, AppError>(bytes)
        }
        .await;

        if let Err(e) = sftp.close().await {
            debug!("Closing SFTP channel failed: {}", e);
        }
        result
    }

    /// Disconnect; later calls do nothing.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            debug!("Closing connection to {}", self.target);
            session
                .disconnect(Disconnect::ByApplication, "", "")
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_output() {
        let output = CommandOutput::transport_failure("broken pipe");
        assert_eq!(output.exit_code, -1);
        assert!(output.stdout.is_empty());
        assert_eq!(output.stderr, "broken pipe");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let profile = HostProfile::new("closed", "127.0.0.1", "nobody").with_port(1);
        let result = SshSession::connect(&profile, Duration::from_secs(5)).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_agent_skipped_without_socket() {
        assert!(SshSession::open_agent(None).await.is_none());
        assert!(SshSession::open_agent(Some(std::ffi::OsStr::new(""))).await.is_none());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("agent.sock");
        assert!(SshSession::open_agent(Some(missing.as_os_str())).await.is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running ssh server"]
    async fn test_run_command_docker() {
        let profile = HostProfile::new("docker", "127.0.0.1", "dockeruser").with_port(2222);
        let mut session = SshSession::connect(&profile, Duration::from_secs(5))
            .await
            .unwrap();
        let output = session.run_command("echo hello; echo oops >&2; exit 3").await.unwrap();
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert_eq!(output.exit_code, 3);
        session.close().await.unwrap();
        session.close().await.unwrap();
    }
}
