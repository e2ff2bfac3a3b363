// ABOUTME: Library root for sshclient - thin helpers over russh.
// ABOUTME: The command-line front end is in main.rs.

pub mod config;
pub mod error;
pub mod output;
pub mod ssh;

pub use ssh::{
    AuthMethod, Client, CommandOutput, dial_key, dial_password, dial_ssh, exec, key_auth, run,
};
