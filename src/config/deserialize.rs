// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Accepts host entries as plain address strings or detailed maps.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::EnvValue;
use super::HostConfig;

pub fn deserialize_hosts<'de, D>(deserializer: D) -> Result<BTreeMap<String, HostConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries: BTreeMap<String, HostEntry> = BTreeMap::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|(name, entry)| {
            entry
                .into_host_config()
                .map(|host| (name.clone(), host))
                .map_err(|e| serde::de::Error::custom(format!("host {name}: {e}")))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostEntry {
    Simple(String),
    Detailed(DetailedHost),
}

#[derive(Debug, Deserialize)]
struct DetailedHost {
    address: String,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    key: Option<PathBuf>,
    #[serde(default)]
    passphrase: Option<EnvValue>,
    #[serde(default)]
    password: Option<EnvValue>,
    #[serde(default)]
    agent: bool,
    #[serde(default, with = "humantime_serde")]
    timeout: Option<Duration>,
}

impl HostEntry {
    fn into_host_config(self) -> crate::error::Result<HostConfig> {
        match self {
            HostEntry::Simple(s) => HostConfig::parse(&s),
            HostEntry::Detailed(d) => {
                let mut host = HostConfig::parse(&d.address)?;
                // An explicit `user:` wins over one embedded in the address.
                if d.user.is_some() {
                    host.user = d.user;
                }
                host.key = d.key;
                host.passphrase = d.passphrase;
                host.password = d.password;
                host.agent = d.agent;
                host.timeout = d.timeout;
                Ok(host)
            }
        }
    }
}
