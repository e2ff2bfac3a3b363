// ABOUTME: One-call helpers over Client for the common cases.
// ABOUTME: Dial by key or password from a "host:port" string, run one command, tear down.

use super::auth::{AuthMethod, key_auth};
use super::client::{Client, CommandOutput, SessionConfig};
use super::error::Result;
use super::target::Target;
use std::path::Path;
use std::time::Duration;

/// Dial `addr` ("host" or "host:port") and authenticate as `user`.
/// `timeout` bounds connection setup only.
pub async fn dial_ssh(
    addr: &str,
    user: &str,
    timeout: Duration,
    auth: AuthMethod,
) -> Result<Client> {
    let config = SessionConfig::new(Target::parse(addr)?, user).connect_timeout(timeout);
    Client::connect(config, auth).await
}

/// Dial using an unencrypted private key file.
pub async fn dial_key(
    addr: &str,
    user: &str,
    keyfile: impl AsRef<Path>,
    timeout: Duration,
) -> Result<Client> {
    let auth = key_auth(keyfile)?;
    dial_ssh(addr, user, timeout, auth).await
}

/// Dial using password authentication.
pub async fn dial_password(
    addr: &str,
    user: &str,
    password: &str,
    timeout: Duration,
) -> Result<Client> {
    dial_ssh(addr, user, timeout, AuthMethod::password(password)).await
}

/// Run `command` on an established client with its configured command timeout.
pub async fn run(client: &Client, command: &str) -> Result<CommandOutput> {
    client.exec(command).await
}

/// Dial with a password, run a single command, and disconnect.
///
/// `timeout` bounds the dial and, separately, the command. The session is
/// torn down whether the command succeeds, fails, or times out.
pub async fn exec(
    addr: &str,
    user: &str,
    password: &str,
    command: &str,
    timeout: Duration,
) -> Result<CommandOutput> {
    let config = SessionConfig::new(Target::parse(addr)?, user)
        .connect_timeout(timeout)
        .command_timeout(timeout);
    exec_once(config, AuthMethod::password(password), command).await
}

/// Connect, run `command` under `config.command_timeout`, and disconnect.
/// A failed disconnect is logged, not returned.
pub async fn exec_once(
    config: SessionConfig,
    auth: AuthMethod,
    command: &str,
) -> Result<CommandOutput> {
    let target = config.target.clone();
    let client = Client::connect(config, auth).await?;
    let result = client.exec(command).await;

    if let Err(e) = client.disconnect().await {
        tracing::warn!("SSH disconnect failed for {}: {}", target, e);
    }

    result
}
