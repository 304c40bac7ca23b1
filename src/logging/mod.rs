//! Logging and observability
//!
//! Configuration events carry a `category` field (`CONFIG` for source and
//! validation problems, `DATABASE` for the resolved connection) and an
//! `operation` field naming the emitting operation.
//!
//! # Example
//!
//! ```no_run
//! use pgbackup::logging::{init_logging, LogFormat, CATEGORY_CONFIG};
//!
//! init_logging("info", LogFormat::Text).expect("Failed to initialize logging");
//! tracing::warn!(category = CATEGORY_CONFIG, operation = "main", "Something odd");
//! ```

pub mod structured;

pub use structured::{init_logging, LogFormat};

/// Category for configuration source and validation events
pub const CATEGORY_CONFIG: &str = "CONFIG";

/// Category for events about the resolved database connection
pub const CATEGORY_DATABASE: &str = "DATABASE";

/// Log a configuration source failure that triggers the environment fallback
///
/// The first argument is the `tracing` level macro to use (`warn` for an
/// unreadable file, `error` for a malformed one).
///
/// # Example
///
/// ```no_run
/// use pgbackup::log_config_fallback;
///
/// log_config_fallback!(warn, "load_from_file", "backup.json", "No such file");
/// ```
#[macro_export]
macro_rules! log_config_fallback {
    ($level:ident, $operation:expr, $source:expr, $error:expr) => {
        tracing::$level!(
            category = $crate::logging::CATEGORY_CONFIG,
            operation = $operation,
            source = %$source,
            error = %$error,
            "Configuration source unavailable, falling back to environment variables"
        );
    };
}

/// Log a configuration value refused by validation
///
/// # Example
///
/// ```no_run
/// use pgbackup::log_rejected_field;
/// use pgbackup::config::{ConfigField, RejectedField};
///
/// let rejected = RejectedField {
///     field: ConfigField::Port,
///     value: "99999".to_string(),
///     reason: "port must be between 1 and 65535".to_string(),
/// };
/// log_rejected_field!("load_from_env", &rejected);
/// ```
#[macro_export]
macro_rules! log_rejected_field {
    ($operation:expr, $rejected:expr) => {
        tracing::warn!(
            category = $crate::logging::CATEGORY_CONFIG,
            operation = $operation,
            field = %$rejected.field,
            value = %$rejected.value,
            reason = %$rejected.reason,
            "Ignoring invalid configuration value, keeping current setting"
        );
    };
}
