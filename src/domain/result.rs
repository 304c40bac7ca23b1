//! Result type alias for pgbackup

use super::errors::BackupError;

/// Result type alias for pgbackup operations
///
/// # Examples
///
/// ```
/// use pgbackup::domain::result::Result;
/// use pgbackup::domain::errors::BackupError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BackupError::Configuration("missing section".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BackupError>;
