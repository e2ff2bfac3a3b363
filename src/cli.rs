// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the run and hosts subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sshclient")]
#[command(about = "Run a single command on a remote host over SSH")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only relay remote output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of plain output
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the host inventory (default: discover sshclient.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a command on a remote host
    Run(RunArgs),

    /// List hosts defined in the configuration file
    Hosts,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Inventory host name or address [user@]host[:port] (default: $SSH_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Remote username
    #[arg(short, long)]
    pub user: Option<String>,

    /// Private key file
    #[arg(short = 'i', long, conflicts_with_all = ["password_env", "agent"])]
    pub key: Option<PathBuf>,

    /// Environment variable holding the password
    #[arg(long, value_name = "VAR", conflicts_with = "agent")]
    pub password_env: Option<String>,

    /// Authenticate with the SSH agent
    #[arg(long)]
    pub agent: bool,

    /// Command timeout, e.g. "5s" or "2m"
    #[arg(short, long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Skip host key verification
    #[arg(long)]
    pub accept_any_host_key: bool,

    /// Command and arguments to run remotely
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
