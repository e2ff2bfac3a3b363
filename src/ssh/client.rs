// ABOUTME: SSH session management using russh.
// ABOUTME: Handles dialing, authentication, and deadline-bounded command execution.

use super::auth::{AuthMethod, authenticate};
use super::error::{Error, Result};
use super::host_key::{HostKeyPolicy, SshHandler};
use super::target::Target;
use russh::client::{self, Config, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for establishing an SSH session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote endpoint.
    pub target: Target,
    /// Username for authentication.
    pub user: String,
    /// Bound on TCP connect plus key exchange plus authentication (default: 10s).
    pub connect_timeout: Duration,
    /// Timeout for command execution (default: 5 minutes).
    pub command_timeout: Duration,
    pub host_key_policy: HostKeyPolicy,
}

impl SessionConfig {
    pub fn new(target: Target, user: impl Into<String>) -> Self {
        Self {
            target,
            user: user.into(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(300), // 5 minutes
            host_key_policy: HostKeyPolicy::default(),
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }
}

/// Output from a remote command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: u32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// An authenticated SSH connection.
pub struct Client {
    config: SessionConfig,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Client {
    /// Dial and authenticate, bounded by `config.connect_timeout`.
    pub async fn connect(config: SessionConfig, auth: AuthMethod) -> Result<Self> {
        let timeout = config.connect_timeout;
        match tokio::time::timeout(timeout, Self::connect_inner(config, auth)).await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectTimeout(timeout)),
        }
    }

    async fn connect_inner(config: SessionConfig, auth: AuthMethod) -> Result<Self> {
        let target = &config.target;
        tracing::debug!(%target, user = %config.user, "dialing SSH server");

        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let handler = SshHandler::new(
            target.host.clone(),
            target.port,
            config.host_key_policy.clone(),
        );

        let mut handle = client::connect(
            Arc::new(russh_config),
            (target.host.as_str(), target.port),
            handler,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("Connection refused") {
                Error::Connection(format!("connection refused to {}", target))
            } else {
                Error::Connection(e.to_string())
            }
        })?;

        authenticate(&mut handle, &config.user, auth).await?;
        tracing::debug!(%target, user = %config.user, "authenticated");

        Ok(Self { config, handle })
    }

    /// Execute a command on the remote host.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.exec_with_timeout(command, self.config.command_timeout)
            .await
    }

    /// Execute a command with a custom timeout.
    ///
    /// The deadline covers opening the channel, starting the command and
    /// draining its output. On expiry the channel is closed and no partial
    /// output is returned. A non-zero exit status is not an error.
    pub async fn exec_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        tracing::debug!(command, ?timeout, "executing remote command");

        let mut opened = None;
        let outcome = tokio::time::timeout(timeout, self.exec_in(&mut opened, command)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(command, ?timeout, "remote command timed out; closing channel");
                if let Some(channel) = opened {
                    if let Err(e) = channel.close().await {
                        tracing::debug!("failed to close timed-out channel: {}", e);
                    }
                }
                Err(Error::CommandTimeout(timeout))
            }
        }
    }

    /// Open a channel into `slot`, start `command` on it and drain its output.
    /// The channel stays in `slot` so a caller that abandons this future can
    /// still close it.
    async fn exec_in(
        &self,
        slot: &mut Option<Channel<Msg>>,
        command: &str,
    ) -> Result<CommandOutput> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;
        let channel = slot.insert(channel);

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        collect_output(channel).await
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}

/// Drain a running command's channel until it reports an exit status and EOF.
async fn collect_output(channel: &mut Channel<Msg>) -> Result<CommandOutput> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = None;
    let mut got_eof = false;

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                stdout.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExtendedData { data, ext }) => {
                if ext == 1 {
                    // stderr
                    stderr.extend_from_slice(&data);
                }
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                exit_code = Some(exit_status);
                if got_eof {
                    break;
                }
            }
            Some(ChannelMsg::Eof) => {
                got_eof = true;
                if exit_code.is_some() {
                    break;
                }
            }
            Some(ChannelMsg::Close) | None => break,
            Some(_) => {}
        }
    }

    // Closed without an exit status: connection dropped or the remote
    // process was killed by a signal.
    let exit_code = exit_code.ok_or(Error::ChannelClosed)?;

    Ok(CommandOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::new(Target::new("example.com", 22), "deploy");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.command_timeout, Duration::from_secs(300));
        assert_eq!(config.host_key_policy, HostKeyPolicy::default());
    }

    #[test]
    fn session_config_builders_override() {
        let config = SessionConfig::new(Target::new("example.com", 22), "deploy")
            .connect_timeout(Duration::from_secs(3))
            .command_timeout(Duration::from_secs(7))
            .host_key_policy(HostKeyPolicy::AcceptAny);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.command_timeout, Duration::from_secs(7));
        assert_eq!(config.host_key_policy, HostKeyPolicy::AcceptAny);
    }

    #[test]
    fn success_reflects_exit_code() {
        let ok = CommandOutput {
            exit_code: 0,
            stdout: "web1\n".to_string(),
            stderr: String::new(),
        };
        let failed = CommandOutput {
            exit_code: 127,
            stdout: String::new(),
            stderr: "sh: lsX: not found\n".to_string(),
        };
        assert!(ok.success());
        assert!(!failed.success());
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SessionConfig::new(Target::new("127.0.0.1", port), "nobody");
        let err = Client::connect(config, AuthMethod::password("x"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Connection(_)),
            "expected Connection error, got: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn silent_server_hits_connect_timeout() {
        // Accepts TCP but never sends an SSH banner.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let config = SessionConfig::new(Target::new("127.0.0.1", port), "nobody")
            .connect_timeout(Duration::from_millis(200));
        let err = Client::connect(config, AuthMethod::password("x"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::ConnectTimeout(_)),
            "expected ConnectTimeout error, got: {:?}",
            err
        );
    }
}
