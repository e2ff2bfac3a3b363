// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::ssh::CommandOutput;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Remote output only
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message to stderr (normal mode only).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_err(&JsonEvent {
                event: "warning",
                message,
                duration_secs: None,
            }),
        }
    }

    /// Print the result of a remote command.
    ///
    /// Normal and quiet modes relay remote stdout/stderr verbatim to the
    /// matching local stream.
    pub fn command_output(&self, host: &str, output: &CommandOutput) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                if let Err(e) = relay(&mut std::io::stdout(), &mut std::io::stderr(), output) {
                    tracing::debug!("failed to relay remote output: {}", e);
                }
                if self.mode == OutputMode::Normal && !output.success() {
                    eprintln!("exit code {} ({:.1}s)", output.exit_code, self.elapsed_secs());
                }
            }
            OutputMode::Json => {
                let event = JsonResult {
                    event: "result",
                    host,
                    output,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_err(&JsonEvent {
                event: "error",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    fn emit_err(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            eprintln!("{json}");
        }
    }
}

/// Write remote stdout and stderr to the matching local streams.
fn relay(
    out: &mut impl Write,
    err: &mut impl Write,
    output: &CommandOutput,
) -> std::io::Result<()> {
    out.write_all(output.stdout.as_bytes())?;
    out.flush()?;
    err.write_all(output.stderr.as_bytes())?;
    err.flush()
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    event: &'a str,
    host: &'a str,
    #[serde(flatten)]
    output: &'a CommandOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
