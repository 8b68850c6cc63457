use clap::Parser;
use serde::{Deserialize, Serialize};
use twist_common::{
    config::VERSION,
    logger::{default_logs_datetime_format, LogLevel},
};

use crate::core::CoreConfig;

// Environment variables read as fallbacks for the command line flags
pub const ENV_ADMIN: &str = "TWIST_ADMIN";
pub const ENV_MAX_SUPPLY: &str = "TWIST_MAX_SUPPLY";
pub const ENV_LOG_LEVEL: &str = "TWIST_LOG_LEVEL";

// Number of recent events printed in the startup summary
pub const SUMMARY_RECENT_EVENTS: u64 = 10;

// Snapshots are plain JSON files
pub const SNAPSHOT_FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, env = ENV_LOG_LEVEL, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Disable the usage of colors in log
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
    /// Change the datetime format used by the logger
    #[clap(long, default_value_t = default_logs_datetime_format())]
    #[serde(default = "default_logs_datetime_format")]
    pub datetime_format: String,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[clap(
    version = VERSION,
    about = "Twist node registry and vesting state core"
)]
#[command(styles = twist_common::get_cli_styles())]
pub struct Config {
    /// State engine configuration
    #[clap(flatten)]
    pub core: CoreConfig,
    /// Logging configuration
    #[clap(flatten)]
    pub log: LogConfig,
    /// Restore the state from this snapshot instead of starting empty
    #[clap(long)]
    #[serde(default)]
    pub snapshot: Option<String>,
    /// Write a snapshot of the state to this path before exiting
    #[clap(long)]
    #[serde(default)]
    pub snapshot_out: Option<String>,
    /// JSON config file to load instead of the command line flags
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub config_file: Option<String>,
    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub generate_config_template: bool,
}
