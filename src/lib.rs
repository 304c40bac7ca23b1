// pgbackup - PostgreSQL backup service
// Copyright (c) 2025 pgbackup Contributors
// Licensed under the MIT License

//! # pgbackup
//!
//! Configuration layer of the PostgreSQL backup service: resolves database
//! connection parameters from an env-file, a JSON configuration file, process
//! environment variables and compiled-in defaults, validates them, and
//! composes the connection string handed to the backup engine.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Env-file loading, configuration sources, resolution
//! - [`domain`] - Error types and validated value types
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pgbackup::config::{env_file, DatabaseConfigResolver};
//! use secrecy::ExposeSecret;
//! use std::sync::Arc;
//!
//! // Seed the environment before anything else starts
//! env_file::load_default();
//!
//! let resolver = Arc::new(DatabaseConfigResolver::new());
//! resolver.load_from_env();
//!
//! if resolver.is_initialized() {
//!     let conn = resolver.connection_string();
//!     let _driver_input: &str = conn.expose_secret().as_ref();
//! }
//! ```
//!
//! ## Error Handling
//!
//! Loads never fail: unreadable or malformed sources are logged and replaced
//! by the environment, invalid values are logged and ignored. Callers decide
//! readiness with [`config::DatabaseConfigResolver::is_initialized`] and can
//! inspect the returned [`config::LoadReport`]. Lower-level operations return
//! [`domain::Result`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
