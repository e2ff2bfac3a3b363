// ABOUTME: Host inventory configuration (sshclient.yml) and environment credentials.
// ABOUTME: Handles YAML parsing, discovery, defaults, and per-host lookup.

mod credentials;
mod deserialize;
mod env_value;
mod host;

pub use credentials::{
    ENV_HOST, ENV_PASSWORD, ENV_PRIVATE_KEY, ENV_USERNAME, EnvCredentials,
};
pub use env_value::EnvValue;
pub use host::{HostConfig, parse_address};

use crate::error::{Error, Result};
use crate::ssh::HostKeyPolicy;
use deserialize::deserialize_hosts;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "sshclient.yml";
pub const CONFIG_FILENAME_ALT: &str = "sshclient.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".sshclient/config.yml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default, deserialize_with = "deserialize_hosts")]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// Settings shared by every host unless the host overrides them.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub user: Option<String>,

    /// Command timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    #[serde(default)]
    pub host_key: HostKeyMode,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            user: None,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            host_key: HostKeyMode::default(),
            known_hosts: None,
        }
    }
}

impl Defaults {
    pub fn host_key_policy(&self) -> HostKeyPolicy {
        match self.host_key {
            HostKeyMode::AcceptAny => HostKeyPolicy::AcceptAny,
            HostKeyMode::Tofu => HostKeyPolicy::KnownHosts {
                path: self.known_hosts.clone(),
                trust_on_first_use: true,
            },
            HostKeyMode::Strict => HostKeyPolicy::KnownHosts {
                path: self.known_hosts.clone(),
                trust_on_first_use: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyMode {
    /// Learn unknown hosts, reject changed keys.
    #[default]
    Tofu,
    /// Only hosts already in known_hosts.
    Strict,
    AcceptAny,
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn host(&self, name: &str) -> Result<&HostConfig> {
        self.hosts
            .get(name)
            .ok_or_else(|| Error::UnknownHost(name.to_string()))
    }
}
