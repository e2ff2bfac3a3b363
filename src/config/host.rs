// ABOUTME: Host inventory entries and their conversion into SSH session settings.
// ABOUTME: Parses addresses like "host", "user@host", "host:port", "user@host:port".

use super::env_value::EnvValue;
use super::Defaults;
use crate::error::{Error, Result};
use crate::ssh::{self, AuthMethod, SessionConfig, Target};
use std::path::PathBuf;
use std::time::Duration;

/// One named host from the inventory.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub target: Target,
    pub user: Option<String>,
    pub key: Option<PathBuf>,
    pub passphrase: Option<EnvValue>,
    pub password: Option<EnvValue>,
    pub agent: bool,
    /// Per-host command timeout; falls back to `defaults.timeout`.
    pub timeout: Option<Duration>,
}

impl HostConfig {
    /// Build a host from an address string with no credentials attached.
    pub fn parse(s: &str) -> Result<Self> {
        let (user, target) = parse_address(s)?;
        Ok(HostConfig {
            target,
            user,
            key: None,
            passphrase: None,
            password: None,
            agent: false,
            timeout: None,
        })
    }

    /// Username precedence: host entry, then defaults, then `$USER`, then "root".
    pub fn effective_user(&self, defaults: &Defaults) -> String {
        self.user
            .clone()
            .or_else(|| defaults.user.clone())
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "root".to_string()))
    }

    pub fn session_config(&self, defaults: &Defaults) -> SessionConfig {
        SessionConfig::new(self.target.clone(), self.effective_user(defaults))
            .connect_timeout(defaults.connect_timeout)
            .command_timeout(self.timeout.unwrap_or(defaults.timeout))
            .host_key_policy(defaults.host_key_policy())
    }

    /// Resolve credentials: password, then key file, then agent, then defaults.
    pub fn auth_method(&self) -> Result<AuthMethod> {
        if let Some(password) = &self.password {
            return Ok(AuthMethod::password(password.resolve()?));
        }

        if let Some(key) = &self.key {
            let passphrase = self.passphrase.as_ref().map(EnvValue::resolve).transpose()?;
            let path = expand_home(key);
            return Ok(ssh::key_auth_with_passphrase(&path, passphrase.as_deref())?);
        }

        if self.agent {
            return Ok(AuthMethod::agent());
        }

        Ok(ssh::default_auth_method()?)
    }
}

/// Split `[user@]host[:port]`.
pub fn parse_address(s: &str) -> Result<(Option<String>, Target)> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidConfig("host address cannot be empty".to_string()));
    }

    let (user, rest) = match s.split_once('@') {
        Some(("", _)) => {
            return Err(Error::InvalidConfig(format!("empty user in address: {s}")));
        }
        Some((user, rest)) => (Some(user.to_string()), rest),
        None => (None, s),
    };

    Ok((user, Target::parse(rest)?))
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
