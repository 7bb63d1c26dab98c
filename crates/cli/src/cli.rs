//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{ByteOrder, ErrorPolicy};
use std::path::PathBuf;

/// HC-SR04 Ranger - polls an ultrasonic range sensor's character device
#[derive(Parser, Debug)]
#[command(
    name = "hcsr04-ranger",
    author,
    version,
    about = "Poll an HC-SR04 ultrasonic range sensor",
    long_about = "Repeatedly opens the HC-SR04 driver's character device, reads one 4-byte \n\
                  distance record, prints it in millimetres and sleeps 100 ms.\n\n\
                  Measurement lines go to stdout; logs go to stderr."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HCSR04_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HCSR04_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the sensor and print readings
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "HCSR04_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the device path from configuration
    #[arg(long, env = "HCSR04_DEVICE")]
    pub device: Option<PathBuf>,

    /// Override the record byte order from configuration
    #[arg(long, value_enum)]
    pub byte_order: Option<ByteOrderArg>,

    /// Override the failed-poll policy from configuration
    #[arg(long, value_enum)]
    pub on_error: Option<ErrorPolicyArg>,

    /// Stop after this many readings (0 = unlimited, overrides configuration)
    #[arg(long, env = "HCSR04_COUNT")]
    pub count: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "HCSR04_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without polling
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "ranger.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Record byte order
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ByteOrderArg {
    Native,
    Little,
    Big,
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Native => Self::Native,
            ByteOrderArg::Little => Self::Little,
            ByteOrderArg::Big => Self::Big,
        }
    }
}

/// Failed-poll policy
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ErrorPolicyArg {
    /// Stop on the first failed poll
    Abort,
    /// Log failed polls and keep going
    Skip,
}

impl From<ErrorPolicyArg> for ErrorPolicy {
    fn from(arg: ErrorPolicyArg) -> Self {
        match arg {
            ErrorPolicyArg::Abort => Self::Abort,
            ErrorPolicyArg::Skip => Self::Skip,
        }
    }
}
