// ABOUTME: Remote endpoint addressing for SSH connections.
// ABOUTME: Parses "host", "host:port" and "[v6addr]:port" with a default port of 22.

use super::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 22;

/// A host and port to dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("address cannot be empty".to_string()));
        }

        // Bracketed IPv6: [::1] or [::1]:2222
        if let Some(rest) = s.strip_prefix('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| Error::InvalidAddress(format!("unclosed bracket in {s}")))?;
            let host = &rest[..close];
            let port = match &rest[close + 1..] {
                "" => DEFAULT_PORT,
                tail => {
                    let port_str = tail.strip_prefix(':').ok_or_else(|| {
                        Error::InvalidAddress(format!("unexpected characters after ] in {s}"))
                    })?;
                    parse_port(port_str)?
                }
            };
            return Self::checked(host, port);
        }

        // A bare IPv6 address has more than one colon and no port.
        if s.matches(':').count() > 1 {
            return Self::checked(s, DEFAULT_PORT);
        }

        match s.rsplit_once(':') {
            Some((host, port_str)) => Self::checked(host, parse_port(port_str)?),
            None => Self::checked(s, DEFAULT_PORT),
        }
    }

    fn checked(host: &str, port: u16) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::InvalidAddress("hostname cannot be empty".to_string()));
        }
        Ok(Self::new(host, port))
    }
}

fn parse_port(s: &str) -> Result<u16> {
    s.parse::<u16>()
        .map_err(|_| Error::InvalidAddress(format!("invalid port: {s}")))
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
