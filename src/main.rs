// pgbackup - PostgreSQL backup service
// Copyright (c) 2025 pgbackup Contributors
// Licensed under the MIT License

use clap::Parser;
use pgbackup::cli::{Cli, Commands};
use pgbackup::config::env_file;
use pgbackup::logging::{init_logging, CATEGORY_CONFIG};
use std::process;

fn main() {
    // Seed the environment before anything else reads it, including clap's
    // `env = ...` fallbacks. PGBACKUP_ENV_FILE names an explicit file. The
    // outcome is logged once the subscriber is installed.
    let env_file_load = match std::env::var_os("PGBACKUP_ENV_FILE") {
        Some(path) => Some(env_file::apply_file(path)),
        None => env_file::apply_default().map(Ok),
    };

    // Parse CLI arguments
    let cli = Cli::parse();

    let log_level = cli.log_level.as_deref().unwrap_or("info");
    if let Err(e) = init_logging(log_level, cli.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(5);
    }

    let loaded_env_file = match &env_file_load {
        Some(Ok(load)) => {
            load.log();
            Some(load.path.display().to_string())
        }
        Some(Err(e)) => {
            tracing::warn!(
                category = CATEGORY_CONFIG,
                operation = "load_from_file",
                error = %e,
                "Env-file not loaded"
            );
            None
        }
        None => None,
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env_file = ?loaded_env_file,
        "pgbackup starting"
    );

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::ValidateConfig(args) => args.execute(&cli.config),
        Commands::ConnectionString(args) => args.execute(&cli.config),
    }
}
