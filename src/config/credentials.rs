// ABOUTME: Connection settings taken from SSH_* environment variables.
// ABOUTME: Lets scripts and live-server tests target a host without an inventory file.

use super::env_value::EnvValue;
use super::host::{HostConfig, parse_address};
use crate::error::{Error, Result};
use crate::ssh::Target;
use std::path::PathBuf;

pub const ENV_HOST: &str = "SSH_HOST";
pub const ENV_USERNAME: &str = "SSH_USERNAME";
pub const ENV_PASSWORD: &str = "SSH_PASSWORD";
pub const ENV_PRIVATE_KEY: &str = "SSH_PRIVATE";

/// Target and credentials read from the process environment.
#[derive(Clone)]
pub struct EnvCredentials {
    pub target: Target,
    pub user: String,
    pub password: Option<String>,
    pub key_file: Option<PathBuf>,
}

impl std::fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentials")
            .field("target", &self.target)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("key_file", &self.key_file)
            .finish()
    }
}

impl EnvCredentials {
    /// `SSH_HOST` and `SSH_USERNAME` are required; the port defaults to 22.
    /// `SSH_PASSWORD` and `SSH_PRIVATE` (a key file path) are optional.
    pub fn from_env() -> Result<Self> {
        let (_, target) = parse_address(&required(ENV_HOST)?)?;
        Ok(Self {
            target,
            user: required(ENV_USERNAME)?,
            password: optional(ENV_PASSWORD),
            key_file: optional(ENV_PRIVATE_KEY).map(PathBuf::from),
        })
    }

    /// "host:port" form accepted by the dial helpers.
    pub fn addr(&self) -> String {
        self.target.to_string()
    }

    /// Password wins over the key file when both are set.
    pub fn into_host_config(self) -> HostConfig {
        HostConfig {
            target: self.target,
            user: Some(self.user),
            key: self.key_file,
            passphrase: None,
            password: self.password.map(EnvValue::Literal),
            agent: false,
            timeout: None,
        }
    }
}

fn required(var: &str) -> Result<String> {
    optional(var).ok_or_else(|| Error::MissingEnvVar(var.to_string()))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
