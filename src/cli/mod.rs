//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for pgbackup using clap.

pub mod commands;

use crate::logging::LogFormat;
use clap::{Parser, Subcommand};

/// pgbackup - PostgreSQL backup service configuration
#[derive(Parser, Debug)]
#[command(name = "pgbackup")]
#[command(version, about, long_about = None)]
#[command(author = "pgbackup Contributors")]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "backup.json", env = "PGBACKUP_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PGBACKUP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the database configuration and show every field with its source
    ValidateConfig(commands::validate::ValidateArgs),

    /// Print the connection string handed to the backup engine
    ConnectionString(commands::connection::ConnectionStringArgs),
}
