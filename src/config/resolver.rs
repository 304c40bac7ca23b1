//! Database configuration resolver
//!
//! [`DatabaseConfigResolver`] owns the resolved PostgreSQL parameters for one
//! backup service instance. It is constructed explicitly and handed (usually
//! behind an `Arc`) to whatever needs a connection string.
//!
//! # Precedence
//!
//! A successful file load dominates: fields absent from the JSON document are
//! *not* filled from the environment, they keep whatever was stored before.
//! The environment is consulted only when the file cannot be opened or
//! parsed, or when [`load_from_env`](DatabaseConfigResolver::load_from_env)
//! is called directly. Every load merges into the current state; nothing is
//! reset to defaults.
//!
//! # Concurrency
//!
//! Loads are serialised end-to-end by a mutex. Each load builds a complete new
//! [`DatabaseSettings`] and publishes it as a fresh `Arc`, so readers holding
//! a [`snapshot`](DatabaseConfigResolver::snapshot) never observe a partial
//! update.
//!
//! # Example
//!
//! ```rust,no_run
//! use pgbackup::config::DatabaseConfigResolver;
//! use secrecy::ExposeSecret;
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(DatabaseConfigResolver::new());
//! resolver.load_from_file("backup.json");
//! if resolver.is_initialized() {
//!     let conn = resolver.connection_string();
//!     // hand conn.expose_secret() to the driver
//! }
//! ```

use super::connection;
use super::schema::{ConfigField, DatabaseSettings, FieldSource, MergeOutcome, RejectedField};
use super::secret::SecretString;
use super::sources::{ConfigSource, EnvSource, JsonFileSource};
use crate::domain::BackupError;
use crate::{log_config_fallback, log_rejected_field};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// What a single load did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Source whose values were merged
    pub source: FieldSource,
    /// Why the requested source was abandoned for the environment, if it was
    pub fallback_reason: Option<String>,
    /// Fields that received an accepted candidate, even one equal to the
    /// stored value
    pub applied: Vec<ConfigField>,
    /// Candidates refused by validation
    pub rejected: Vec<RejectedField>,
}

impl LoadReport {
    fn from_outcome(
        source: FieldSource,
        fallback_reason: Option<String>,
        outcome: MergeOutcome,
    ) -> Self {
        Self {
            source,
            fallback_reason,
            applied: outcome.applied,
            rejected: outcome.rejected,
        }
    }

    /// True if the requested source failed and the environment was used
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    /// True if nothing was rejected and no fallback happened
    pub fn is_clean(&self) -> bool {
        self.fallback_reason.is_none() && self.rejected.is_empty()
    }
}

/// Resolves and publishes database connection settings
#[derive(Debug)]
pub struct DatabaseConfigResolver {
    env: EnvSource,
    current: RwLock<Arc<DatabaseSettings>>,
    load_lock: Mutex<()>,
}

impl Default for DatabaseConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseConfigResolver {
    /// Creates an uninitialised resolver reading the process environment
    pub fn new() -> Self {
        Self::with_env(EnvSource::process())
    }

    /// Creates an uninitialised resolver with an explicit environment layer
    pub fn with_env(env: EnvSource) -> Self {
        Self {
            env,
            current: RwLock::new(Arc::new(DatabaseSettings::default())),
            load_lock: Mutex::new(()),
        }
    }

    /// Loads `database.postgres` from a JSON file.
    ///
    /// If the file cannot be opened or parsed (including a field of the wrong
    /// JSON type), the failure is logged and the environment is loaded
    /// instead. Marks the resolver initialised in every case.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> LoadReport {
        self.load(&JsonFileSource::new(path.as_ref()), "load_from_file")
    }

    /// Loads `POSTGRES_*` variables from the environment layer
    pub fn load_from_env(&self) -> LoadReport {
        self.load(&self.env, "load_from_env")
    }

    /// Loads an arbitrary source with the same fallback rule as
    /// [`load_from_file`](Self::load_from_file)
    pub fn load_from_source(&self, source: &dyn ConfigSource) -> LoadReport {
        self.load(source, "load_from_source")
    }

    /// True once any load has completed
    pub fn is_initialized(&self) -> bool {
        self.snapshot().is_initialized()
    }

    /// Current settings. The returned snapshot never changes.
    pub fn snapshot(&self) -> Arc<DatabaseSettings> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Connection string for the current snapshot
    pub fn connection_string(&self) -> SecretString {
        connection::connection_string(&self.snapshot())
    }

    /// Connection string with the password masked, for logs and output
    pub fn redacted_connection_string(&self) -> String {
        connection::redacted_connection_string(&self.snapshot())
    }

    fn load(&self, source: &dyn ConfigSource, operation: &'static str) -> LoadReport {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = DatabaseSettings::clone(&self.snapshot());

        let report = match source.read() {
            Ok(partial) => {
                let outcome = next.merge(partial, source.kind());
                LoadReport::from_outcome(source.kind(), None, outcome)
            }
            Err(err) => {
                if matches!(err, BackupError::FileOpen { .. }) {
                    log_config_fallback!(warn, operation, source.describe(), err);
                } else {
                    log_config_fallback!(error, operation, source.describe(), err);
                }
                self.fallback_to_env(&mut next, err.to_string(), operation)
            }
        };

        for rejected in &report.rejected {
            log_rejected_field!(operation, rejected);
        }

        next.mark_initialized();
        tracing::info!(
            category = crate::logging::CATEGORY_DATABASE,
            operation,
            source = %report.source,
            host = %next.host(),
            port = %next.port(),
            database = %next.database(),
            user = %next.user(),
            applied = report.applied.len(),
            rejected = report.rejected.len(),
            "Database configuration loaded"
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        report
    }

    fn fallback_to_env(
        &self,
        next: &mut DatabaseSettings,
        reason: String,
        operation: &'static str,
    ) -> LoadReport {
        match self.env.read() {
            Ok(partial) => {
                let outcome = next.merge(partial, FieldSource::Environment);
                LoadReport::from_outcome(FieldSource::Environment, Some(reason), outcome)
            }
            Err(err) => {
                tracing::error!(
                    category = crate::logging::CATEGORY_CONFIG,
                    operation,
                    error = %err,
                    "Environment fallback failed, keeping current settings"
                );
                LoadReport::from_outcome(
                    FieldSource::Environment,
                    Some(reason),
                    MergeOutcome::default(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::DefaultSource;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;
    use std::thread;
    use tempfile::NamedTempFile;
    use tracing_test::traced_test;

    fn env(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_new_resolver_is_uninitialized() {
        let resolver = DatabaseConfigResolver::with_env(env(&[]));
        assert!(!resolver.is_initialized());
        assert_eq!(resolver.snapshot().host(), "localhost");
    }

    #[test]
    fn test_load_from_env() {
        let resolver = DatabaseConfigResolver::with_env(env(&[
            ("POSTGRES_HOST", "H1"),
            ("POSTGRES_PORT", "6432"),
            ("POSTGRES_DB", "app"),
            ("POSTGRES_USER", "backup"),
            ("POSTGRES_PASSWORD", "pw"),
        ]));
        let report = resolver.load_from_env();

        assert!(report.is_clean());
        assert_eq!(report.applied.len(), 5);
        assert!(resolver.is_initialized());
        assert_eq!(
            resolver.connection_string().expose_secret().as_ref(),
            "host=H1 port=6432 dbname=app user=backup password=pw"
        );
    }

    #[test]
    fn test_load_from_env_invalid_port_keeps_default() {
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_PORT", "0")]));
        let report = resolver.load_from_env();

        assert_eq!(report.rejected.len(), 1);
        assert!(resolver.is_initialized());
        assert_eq!(resolver.snapshot().port().as_str(), "5432");
    }

    #[test]
    fn test_file_dominates_env() {
        let file = json_file(r#"{"database": {"postgres": {"user": "fileuser"}}}"#);
        let resolver = DatabaseConfigResolver::with_env(env(&[
            ("POSTGRES_HOST", "envhost"),
            ("POSTGRES_USER", "envuser"),
        ]));
        let report = resolver.load_from_file(file.path());

        assert!(!report.is_fallback());
        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.user(), "fileuser");
        // Absent from the file and not filled from the environment
        assert_eq!(snapshot.host(), "localhost");
        assert_eq!(snapshot.provenance().host, FieldSource::Default);
    }

    #[test]
    fn test_env_then_file_without_host_keeps_host() {
        let file = json_file(r#"{"database": {"postgres": {"database": "d"}}}"#);
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "H1")]));

        resolver.load_from_env();
        resolver.load_from_file(file.path());

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.host(), "H1");
        assert_eq!(snapshot.database(), "d");
        assert_eq!(snapshot.provenance().host, FieldSource::Environment);
        assert_eq!(snapshot.provenance().database, FieldSource::File);
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "envhost")]));
        let report = resolver.load_from_file("/nonexistent/backup.json");

        assert!(report.is_fallback());
        assert_eq!(report.source, FieldSource::Environment);
        assert!(resolver.is_initialized());
        assert_eq!(resolver.snapshot().host(), "envhost");
    }

    #[test]
    fn test_type_error_falls_back_to_env() {
        let file = json_file(r#"{"database": {"postgres": {"host": "filehost", "port": 5432}}}"#);
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "envhost")]));
        let report = resolver.load_from_file(file.path());

        assert!(report.is_fallback());
        // No field from the failed file is applied
        assert_eq!(resolver.snapshot().host(), "envhost");
    }

    fn find_event(lines: &[&str], needles: &[&str]) -> std::result::Result<(), String> {
        lines
            .iter()
            .find(|line| needles.iter().all(|needle| line.contains(needle)))
            .map(|_| ())
            .ok_or_else(|| format!("no event containing {needles:?}"))
    }

    #[traced_test]
    #[test]
    fn test_malformed_file_emits_one_error_event() {
        let file = json_file("{ not json");
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "envhost")]));
        resolver.load_from_file(file.path());

        logs_assert(|lines: &[&str]| {
            find_event(
                lines,
                &["ERROR", "CONFIG", "load_from_file", "falling back to environment"],
            )?;
            let count = lines
                .iter()
                .filter(|line| line.contains("falling back to environment"))
                .count();
            if count == 1 {
                Ok(())
            } else {
                Err(format!("expected one fallback event, found {count}"))
            }
        });
    }

    #[traced_test]
    #[test]
    fn test_unreadable_file_emits_warning_event() {
        let resolver = DatabaseConfigResolver::with_env(env(&[]));
        resolver.load_from_file("/nonexistent/backup.json");

        logs_assert(|lines: &[&str]| {
            find_event(
                lines,
                &["WARN", "CONFIG", "load_from_file", "falling back to environment"],
            )
        });
    }

    #[traced_test]
    #[test]
    fn test_rejected_port_emits_warning_event() {
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_PORT", "70000")]));
        resolver.load_from_env();

        logs_assert(|lines: &[&str]| {
            find_event(
                lines,
                &["WARN", "CONFIG", "load_from_env", "70000", "Ignoring invalid"],
            )?;
            find_event(lines, &["INFO", "DATABASE", "load_from_env"])
        });
    }

    #[test]
    fn test_empty_host_in_file_does_not_overwrite() {
        let file = json_file(r#"{"database": {"postgres": {"host": ""}}}"#);
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "H1")]));
        resolver.load_from_env();
        resolver.load_from_file(file.path());

        assert_eq!(resolver.snapshot().host(), "H1");
    }

    #[test]
    fn test_file_without_section_still_initializes() {
        let file = json_file(r#"{"backup": {"interval": "1h"}}"#);
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "envhost")]));
        let report = resolver.load_from_file(file.path());

        assert!(!report.is_fallback());
        assert!(report.applied.is_empty());
        assert!(resolver.is_initialized());
        assert_eq!(resolver.snapshot().host(), "localhost");
    }

    #[test]
    fn test_default_source_resets_fields() {
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "H1")]));
        resolver.load_from_env();
        resolver.load_from_source(&DefaultSource);

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.host(), "localhost");
        assert_eq!(snapshot.provenance().host, FieldSource::Default);
    }

    #[test]
    fn test_old_snapshot_is_unchanged_by_reload() {
        let resolver = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "H1")]));
        let before = resolver.snapshot();
        resolver.load_from_env();

        assert_eq!(before.host(), "localhost");
        assert!(!before.is_initialized());
        assert_eq!(resolver.snapshot().host(), "H1");
    }

    #[test]
    fn test_independent_resolvers() {
        let a = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "a")]));
        let b = DatabaseConfigResolver::with_env(env(&[("POSTGRES_HOST", "b")]));
        a.load_from_env();

        assert!(a.is_initialized());
        assert!(!b.is_initialized());
        assert_eq!(b.snapshot().host(), "localhost");
    }

    #[test]
    fn test_concurrent_reads_never_observe_torn_snapshots() {
        let first = env(&[
            ("POSTGRES_HOST", "alpha"),
            ("POSTGRES_PORT", "1111"),
            ("POSTGRES_DB", "alpha_db"),
            ("POSTGRES_USER", "alpha_user"),
            ("POSTGRES_PASSWORD", "alpha_pw"),
        ]);
        let second = env(&[
            ("POSTGRES_HOST", "beta"),
            ("POSTGRES_PORT", "2222"),
            ("POSTGRES_DB", "beta_db"),
            ("POSTGRES_USER", "beta_user"),
            ("POSTGRES_PASSWORD", "beta_pw"),
        ]);
        let expected_first =
            "host=alpha port=1111 dbname=alpha_db user=alpha_user password=alpha_pw";
        let expected_second =
            "host=beta port=2222 dbname=beta_db user=beta_user password=beta_pw";

        let resolver = Arc::new(DatabaseConfigResolver::with_env(env(&[])));
        resolver.load_from_source(&first);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let conn = resolver.connection_string();
                        let conn = conn.expose_secret().as_ref().to_string();
                        assert!(
                            conn == expected_first || conn == expected_second,
                            "torn snapshot: {conn}"
                        );
                    }
                })
            })
            .collect();

        for i in 0..200 {
            if i % 2 == 0 {
                resolver.load_from_source(&second);
            } else {
                resolver.load_from_source(&first);
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
