//! Validate config command implementation
//!
//! Resolves the database configuration exactly as the backup scheduler would
//! and prints every field together with the source that supplied it.

use super::{resolve, EXIT_CONFIG_ERROR};
use crate::config::{ConfigField, DatabaseSettings, LoadReport};
use clap::Args;
use std::fmt::Write as _;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resolve from POSTGRES_* environment variables only, ignoring the file
    #[arg(long)]
    pub from_env: bool,

    /// Fail when the file was unusable or any value was rejected
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, from_env = self.from_env, "Validating configuration");

        let (resolver, report) = resolve(config_path, self.from_env);
        let settings = resolver.snapshot();

        print!("{}", render_summary(&settings, &report));

        if !settings.is_initialized() {
            println!("❌ Database configuration failed to initialize");
            return Ok(EXIT_CONFIG_ERROR);
        }
        if self.strict && !report.is_clean() {
            println!("❌ Configuration has problems (strict mode)");
            return Ok(EXIT_CONFIG_ERROR);
        }

        println!("✅ Configuration is usable");
        Ok(0)
    }
}

/// Renders the resolved settings and load diagnostics. Never includes the
/// password.
pub fn render_summary(settings: &DatabaseSettings, report: &LoadReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Database Configuration:");
    for field in ConfigField::ALL {
        let _ = writeln!(
            out,
            "  {:<10} {:<24} ({})",
            field.as_str(),
            settings.display_value(field),
            settings.provenance().get(field)
        );
    }
    let _ = writeln!(
        out,
        "  Connection: {}",
        crate::config::redacted_connection_string(settings)
    );

    if let Some(reason) = &report.fallback_reason {
        let _ = writeln!(out, "⚠️  Configuration file not used: {reason}");
        let _ = writeln!(out, "   Values were taken from POSTGRES_* environment variables");
    }
    for rejected in &report.rejected {
        let _ = writeln!(
            out,
            "⚠️  Ignored {}: {}",
            rejected.field, rejected.reason
        );
    }

    out
}
