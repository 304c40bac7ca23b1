//! Database configuration schema
//!
//! [`DatabaseSettings`] is one immutable snapshot of the resolved PostgreSQL
//! parameters. Sources produce [`PartialSettings`] (a field is `Some` when the
//! source supplied it) which [`DatabaseSettings::merge`] folds in under the
//! acceptance rules:
//!
//! - host, database and user are replaced only by non-empty candidates
//! - port is replaced only by a candidate that passes
//!   [`validate_port`](crate::domain::port::validate_port);
//!   empty candidates are skipped silently, other rejections are reported
//! - password is replaced whenever it is supplied, even when empty

use super::secret::{empty_secret, SecretString};
use crate::domain::port::Port;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Compiled-in default host
pub const DEFAULT_HOST: &str = "localhost";
/// Compiled-in default database name
pub const DEFAULT_DATABASE: &str = "postgres";
/// Compiled-in default user
pub const DEFAULT_USER: &str = "postgres";

/// One of the five resolved connection parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Host,
    Port,
    Database,
    User,
    Password,
}

impl ConfigField {
    /// All fields in connection-string order
    pub const ALL: [ConfigField; 5] = [
        ConfigField::Host,
        ConfigField::Port,
        ConfigField::Database,
        ConfigField::User,
        ConfigField::Password,
    ];

    /// Key used for the field in the JSON configuration file
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigField::Host => "host",
            ConfigField::Port => "port",
            ConfigField::Database => "database",
            ConfigField::User => "user",
            ConfigField::Password => "password",
        }
    }

    /// Environment variable that supplies the field
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigField::Host => "POSTGRES_HOST",
            ConfigField::Port => "POSTGRES_PORT",
            ConfigField::Database => "POSTGRES_DB",
            ConfigField::User => "POSTGRES_USER",
            ConfigField::Password => "POSTGRES_PASSWORD",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which source last set a field's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldSource {
    /// Compiled-in default, never overwritten
    #[default]
    Default,
    /// The JSON configuration file
    File,
    /// Environment variables (process or explicit map)
    Environment,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Default => f.write_str("default"),
            FieldSource::File => f.write_str("file"),
            FieldSource::Environment => f.write_str("environment"),
        }
    }
}

/// Provenance of every field in a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provenance {
    pub host: FieldSource,
    pub port: FieldSource,
    pub database: FieldSource,
    pub user: FieldSource,
    pub password: FieldSource,
}

impl Provenance {
    /// Returns the source recorded for `field`
    pub fn get(&self, field: ConfigField) -> FieldSource {
        match field {
            ConfigField::Host => self.host,
            ConfigField::Port => self.port,
            ConfigField::Database => self.database,
            ConfigField::User => self.user,
            ConfigField::Password => self.password,
        }
    }

    fn set(&mut self, field: ConfigField, source: FieldSource) {
        match field {
            ConfigField::Host => self.host = source,
            ConfigField::Port => self.port = source,
            ConfigField::Database => self.database = source,
            ConfigField::User => self.user = source,
            ConfigField::Password => self.password = source,
        }
    }
}

/// Field values supplied by one source. `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct PartialSettings {
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
}

impl PartialSettings {
    /// Returns true if the source supplied no field at all
    pub fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.port.is_none()
            && self.database.is_none()
            && self.user.is_none()
            && self.password.is_none()
    }
}

/// A candidate value that was supplied but refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedField {
    pub field: ConfigField,
    pub value: String,
    pub reason: String,
}

/// Result of folding one [`PartialSettings`] into a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Fields that received an accepted candidate, including one equal to
    /// the stored value
    pub applied: Vec<ConfigField>,
    /// Non-empty candidates refused by validation
    pub rejected: Vec<RejectedField>,
}

/// One complete, immutable set of resolved database parameters
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    host: String,
    port: Port,
    database: String,
    user: String,
    password: SecretString,
    initialized: bool,
    provenance: Provenance,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: Port::default(),
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: empty_secret(),
            initialized: false,
            provenance: Provenance::default(),
        }
    }
}

impl DatabaseSettings {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &Port {
        &self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// True once any load attempt has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Displayable value of a field; the password is never returned in clear
    pub fn display_value(&self, field: ConfigField) -> String {
        match field {
            ConfigField::Host => self.host.clone(),
            ConfigField::Port => self.port.to_string(),
            ConfigField::Database => self.database.clone(),
            ConfigField::User => self.user.clone(),
            ConfigField::Password if self.password.expose_secret().is_empty() => {
                "(empty)".to_string()
            }
            ConfigField::Password => super::connection::REDACTED_PASSWORD.to_string(),
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Folds a source's values into this snapshot, recording provenance for
    /// every replaced field. Never resets fields the source did not supply.
    pub fn merge(&mut self, partial: PartialSettings, source: FieldSource) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        if let Some(host) = partial.host.filter(|v| !v.is_empty()) {
            self.host = host;
            self.record(ConfigField::Host, source, &mut outcome);
        }

        if let Some(candidate) = partial.port.filter(|v| !v.is_empty()) {
            match Port::new(candidate.clone()) {
                Ok(port) => {
                    self.port = port;
                    self.record(ConfigField::Port, source, &mut outcome);
                }
                Err(err) => {
                    outcome.rejected.push(RejectedField {
                        field: ConfigField::Port,
                        value: candidate,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if let Some(database) = partial.database.filter(|v| !v.is_empty()) {
            self.database = database;
            self.record(ConfigField::Database, source, &mut outcome);
        }

        if let Some(user) = partial.user.filter(|v| !v.is_empty()) {
            self.user = user;
            self.record(ConfigField::User, source, &mut outcome);
        }

        if let Some(password) = partial.password {
            self.password = password;
            self.record(ConfigField::Password, source, &mut outcome);
        }

        outcome
    }

    fn record(&mut self, field: ConfigField, source: FieldSource, outcome: &mut MergeOutcome) {
        self.provenance.set(field, source);
        outcome.applied.push(field);
    }
}

/// Top-level JSON document: `{"database": {"postgres": {...}}}`
///
/// Only the `postgres` section is typed; the document is navigated as a
/// [`serde_json::Value`] first so non-object `database`/`postgres` entries
/// read as "no section" instead of failing the whole file.
#[derive(Debug, Default, Deserialize)]
pub struct PostgresSection {
    #[serde(default, deserialize_with = "present")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub database: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<SecretString>,
}

/// A present key must hold a value of the declared type; `null` is a type
/// error rather than "absent".
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<PostgresSection> for PartialSettings {
    fn from(section: PostgresSection) -> Self {
        Self {
            host: section.host,
            port: section.port,
            database: section.database,
            user: section.user,
            password: section.password,
        }
    }
}
