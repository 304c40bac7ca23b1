//! Domain error types
//!
//! This module defines the error hierarchy for pgbackup. Errors never expose
//! secret values: messages carry paths, field names and parser diagnostics,
//! never the password or the composed connection string.

use std::path::PathBuf;
use thiserror::Error;

/// Main pgbackup error type
///
/// Configuration loading itself never surfaces these to callers of the
/// resolver; sources return them and the resolver turns them into logged
/// fallbacks. They are visible to code that drives a single source directly.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configuration file could not be opened or read
    #[error("Failed to open {}: {source}", .path.display())]
    FileOpen {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was read but is not acceptable JSON for the schema
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse {
        /// Path of the offending file
        path: PathBuf,
        /// Parser diagnostic (line/column and expected type)
        message: String,
    },

    /// A port candidate was rejected by validation
    #[error("Invalid port '{value}': {reason}")]
    InvalidPort {
        /// The rejected candidate
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),
}
