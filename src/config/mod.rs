//! Database configuration for the backup service.
//!
//! # Overview
//!
//! Connection parameters are resolved from layered sources:
//! - an env-file (`backup.env` or `.env`) loaded into the environment at start-up
//! - a JSON configuration file
//! - `POSTGRES_*` environment variables
//! - compiled-in defaults
//!
//! and composed into a libpq keyword/value connection string.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pgbackup::config::{env_file, DatabaseConfigResolver};
//!
//! env_file::load_default();
//!
//! let resolver = DatabaseConfigResolver::new();
//! let report = resolver.load_from_file("backup.json");
//! if report.is_fallback() {
//!     eprintln!("config file unusable, environment used instead");
//! }
//! println!("{}", resolver.redacted_connection_string());
//! ```
//!
//! # Configuration File
//!
//! ```json
//! {
//!   "database": {
//!     "postgres": {
//!       "host": "db.internal",
//!       "port": "5432",
//!       "database": "app",
//!       "user": "backup",
//!       "password": "secret"
//!     }
//!   }
//! }
//! ```
//!
//! All five values are JSON strings; any other type makes the file unusable
//! and triggers the environment fallback.
//!
//! # Environment Variables
//!
//! ```bash
//! export POSTGRES_HOST=db.internal
//! export POSTGRES_PORT=5432
//! export POSTGRES_DB=app
//! export POSTGRES_USER=backup
//! export POSTGRES_PASSWORD=secret
//! ```

pub mod connection;
pub mod env_file;
pub mod resolver;
pub mod schema;
pub mod secret;
pub mod sources;

// Re-export commonly used types
pub use connection::{connection_string, escape_connection_param, redacted_connection_string};
pub use env_file::{EnvFile, EnvFileLoad};
pub use resolver::{DatabaseConfigResolver, LoadReport};
pub use schema::{
    ConfigField, DatabaseSettings, FieldSource, MergeOutcome, PartialSettings, Provenance,
    RejectedField,
};
pub use secret::{secret_string, SecretString, SecretValue};
pub use sources::{ConfigSource, DefaultSource, EnvSource, JsonFileSource};
