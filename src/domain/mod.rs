//! Domain types for pgbackup.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated value types** ([`Port`])
//! - **Error types** ([`BackupError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BackupError>`]:
//!
//! ```rust
//! use pgbackup::domain::{Port, Result};
//!
//! fn example() -> Result<u16> {
//!     let port: Port = "5433".parse()?;
//!     Ok(port.value())
//! }
//! ```

pub mod errors;
pub mod port;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::BackupError;
pub use port::{validate_port, Port, DEFAULT_PORT};
pub use result::Result;
