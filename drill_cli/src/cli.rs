//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "drill", version, about = "Servo drill controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/drill_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller until Ctrl-C
    Run,
    /// Replay a scripted knob/button scenario on simulated hardware
    Simulate {
        /// Scenario CSV with headers at_ms,knob,button
        #[arg(long, value_name = "FILE")]
        scenario: PathBuf,
        /// Stop at this many ms of virtual time (default: last row + 1000)
        #[arg(long, value_name = "MS")]
        until_ms: Option<u64>,
    },
    /// Validate config, open peripherals and cycle the indicator
    SelfCheck,
}
