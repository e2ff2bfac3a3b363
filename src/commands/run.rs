// ABOUTME: Run command implementation.
// ABOUTME: Resolves target and credentials, executes one remote command, relays output.

use crate::cli::RunArgs;
use sshclient::config::{Config, Defaults, EnvCredentials, EnvValue, HostConfig, HostKeyMode};
use sshclient::error::Result;
use sshclient::output::Output;
use sshclient::ssh::Client;

/// Execute `args.command` on the selected host and return its exit code.
pub async fn run_command(
    config: Option<Config>,
    args: RunArgs,
    output: &mut Output,
) -> Result<u32> {
    let mut defaults = config
        .as_ref()
        .map(|c| c.defaults.clone())
        .unwrap_or_default();
    let mut host = resolve_host(config.as_ref(), args.host.as_deref())?;
    apply_overrides(&mut host, &mut defaults, &args);

    let session_config = host.session_config(&defaults);
    let auth = host.auth_method()?;
    let target = session_config.target.to_string();
    let command = args.command.join(" ");

    output.progress(&format!(
        "→ Connecting to {}@{}...",
        session_config.user, target
    ));
    output.start_timer();

    let client = Client::connect(session_config, auth).await?;
    let result = client.exec(&command).await;

    // Disconnect is non-fatal; the command outcome is what matters.
    if let Err(e) = client.disconnect().await {
        output.warning(&format!("SSH disconnect failed for {}: {}", target, e));
    }

    let result = result?;
    output.command_output(&target, &result);
    Ok(result.exit_code)
}

/// An inventory name wins over an address of the same spelling.
/// Without `--host`, fall back to the SSH_* environment variables.
fn resolve_host(config: Option<&Config>, host: Option<&str>) -> Result<HostConfig> {
    match host {
        Some(name) => match config.and_then(|c| c.hosts.get(name)) {
            Some(entry) => Ok(entry.clone()),
            None => HostConfig::parse(name),
        },
        None => Ok(EnvCredentials::from_env()?.into_host_config()),
    }
}

fn apply_overrides(host: &mut HostConfig, defaults: &mut Defaults, args: &RunArgs) {
    if let Some(user) = &args.user {
        host.user = Some(user.clone());
    }

    if let Some(key) = &args.key {
        host.key = Some(key.clone());
        host.passphrase = None;
        host.password = None;
        host.agent = false;
    } else if let Some(var) = &args.password_env {
        host.password = Some(EnvValue::FromEnv {
            var: var.clone(),
            default: None,
        });
        host.key = None;
        host.agent = false;
    } else if args.agent {
        host.password = None;
        host.key = None;
        host.agent = true;
    }

    if let Some(timeout) = args.timeout {
        host.timeout = Some(timeout);
    }

    if args.accept_any_host_key {
        defaults.host_key = HostKeyMode::AcceptAny;
    }
}
