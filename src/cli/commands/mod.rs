//! CLI command implementations

pub mod connection;
pub mod validate;

use crate::config::{DatabaseConfigResolver, LoadReport};

/// Exit code when the configuration is unusable
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Builds a resolver over the process environment and performs the single
/// load a command needs: the JSON file, or the environment alone.
pub(crate) fn resolve(config_path: &str, from_env: bool) -> (DatabaseConfigResolver, LoadReport) {
    let resolver = DatabaseConfigResolver::new();
    let report = if from_env {
        resolver.load_from_env()
    } else {
        resolver.load_from_file(config_path)
    };
    (resolver, report)
}
