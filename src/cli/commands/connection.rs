//! Connection string command implementation

use super::{resolve, EXIT_CONFIG_ERROR};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the connection-string command
#[derive(Args, Debug)]
pub struct ConnectionStringArgs {
    /// Resolve from POSTGRES_* environment variables only, ignoring the file
    #[arg(long)]
    pub from_env: bool,

    /// Mask the password
    #[arg(long)]
    pub redact: bool,
}

impl ConnectionStringArgs {
    /// Execute the connection-string command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (resolver, report) = resolve(config_path, self.from_env);

        if !resolver.is_initialized() {
            eprintln!("Error: Database configuration failed to initialize. Set POSTGRES_* or use backup.env / .env");
            return Ok(EXIT_CONFIG_ERROR);
        }
        if report.is_fallback() {
            tracing::debug!(config_path = %config_path, "Connection string built from environment");
        }

        if self.redact {
            println!("{}", resolver.redacted_connection_string());
        } else {
            let conn = resolver.connection_string();
            let conn: &str = conn.expose_secret().as_ref();
            println!("{conn}");
        }
        Ok(0)
    }
}
