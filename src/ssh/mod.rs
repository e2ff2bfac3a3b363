// ABOUTME: SSH client module for remote command execution.
// ABOUTME: Password, key, and agent authentication with known_hosts verification.

mod auth;
mod client;
mod dial;
mod error;
mod host_key;
mod target;

pub use auth::{AuthMethod, default_auth_method, key_auth, key_auth_with_passphrase};
pub use client::{Client, CommandOutput, SessionConfig};
pub use dial::{dial_key, dial_password, dial_ssh, exec, exec_once, run};
pub use error::{Error, Result};
pub use host_key::HostKeyPolicy;
pub use target::{DEFAULT_PORT, Target};
