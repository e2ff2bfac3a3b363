// ABOUTME: Command module aggregator for the sshclient CLI.
// ABOUTME: Re-exports run and hosts command handlers.

mod hosts;
mod run;

pub use hosts::list_hosts;
pub use run::run_command;
