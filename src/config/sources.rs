//! Configuration sources
//!
//! Each source yields a [`PartialSettings`] describing only the fields it
//! supplies. Sources never apply acceptance rules themselves; that happens in
//! [`DatabaseSettings::merge`](super::schema::DatabaseSettings::merge).

use super::env_file::EnvFile;
use super::schema::{
    ConfigField, FieldSource, PartialSettings, PostgresSection, DEFAULT_DATABASE, DEFAULT_HOST,
    DEFAULT_USER,
};
use super::secret::secret_string;
use crate::domain::{BackupError, Result, DEFAULT_PORT};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Written by some editors at the start of UTF-8 files
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A layer that can supply database settings
pub trait ConfigSource: fmt::Debug + Send + Sync {
    /// Provenance recorded for fields this source sets
    fn kind(&self) -> FieldSource;

    /// Human-readable description used in log events
    fn describe(&self) -> String;

    /// Reads the fields this source supplies
    ///
    /// # Errors
    ///
    /// Returns an error if the source exists but cannot be read or parsed.
    fn read(&self) -> Result<PartialSettings>;
}

/// JSON configuration file: `{"database": {"postgres": {...}}}`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_error(&self, err: &serde_json::Error) -> BackupError {
        BackupError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

impl ConfigSource for JsonFileSource {
    fn kind(&self) -> FieldSource {
        FieldSource::File
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    /// A document without an object at `database.postgres` supplies nothing.
    /// A present field holding anything other than a JSON string fails the
    /// whole read.
    fn read(&self) -> Result<PartialSettings> {
        let bytes = fs::read(&self.path).map_err(|source| BackupError::FileOpen {
            path: self.path.clone(),
            source,
        })?;

        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());
        let document: Value = serde_json::from_slice(bytes).map_err(|e| self.parse_error(&e))?;

        let section = document
            .get("database")
            .and_then(|database| database.get("postgres"))
            .filter(|postgres| postgres.is_object());

        match section {
            Some(postgres) => PostgresSection::deserialize(postgres)
                .map(PartialSettings::from)
                .map_err(|e| self.parse_error(&e)),
            None => Ok(PartialSettings::default()),
        }
    }
}

/// Environment variables `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`,
/// `POSTGRES_USER` and `POSTGRES_PASSWORD`
///
/// Reads either the real process environment or an explicit map, so an
/// env-file can feed the resolver without mutating process state.
#[derive(Clone, Default)]
pub enum EnvSource {
    /// The process environment at read time
    #[default]
    Process,
    /// A fixed set of variables
    Map(HashMap<String, String>),
}

impl EnvSource {
    pub fn process() -> Self {
        EnvSource::Process
    }

    pub fn from_map(vars: HashMap<String, String>) -> Self {
        EnvSource::Map(vars)
    }

    /// Uses the variables of a parsed env-file instead of the process
    /// environment
    pub fn from_env_file(env_file: &EnvFile) -> Self {
        EnvSource::Map(env_file.to_map())
    }

    /// Looks up one variable
    pub fn var(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => {
                std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
            }
            EnvSource::Map(vars) => vars.get(name).cloned(),
        }
    }
}

// Map values can hold the password; show variable names only.
impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvSource::Process => f.write_str("EnvSource::Process"),
            EnvSource::Map(vars) => {
                let mut keys: Vec<_> = vars.keys().collect();
                keys.sort();
                f.debug_tuple("EnvSource::Map").field(&keys).finish()
            }
        }
    }
}

impl ConfigSource for EnvSource {
    fn kind(&self) -> FieldSource {
        FieldSource::Environment
    }

    fn describe(&self) -> String {
        match self {
            EnvSource::Process => "process environment".to_string(),
            EnvSource::Map(_) => "environment map".to_string(),
        }
    }

    fn read(&self) -> Result<PartialSettings> {
        Ok(PartialSettings {
            host: self.var(ConfigField::Host.env_var()),
            port: self.var(ConfigField::Port.env_var()),
            database: self.var(ConfigField::Database.env_var()),
            user: self.var(ConfigField::User.env_var()),
            password: self.var(ConfigField::Password.env_var()).map(secret_string),
        })
    }
}

/// Compiled-in defaults. Merging it restores every field to its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
    fn kind(&self) -> FieldSource {
        FieldSource::Default
    }

    fn describe(&self) -> String {
        "compiled-in defaults".to_string()
    }

    fn read(&self) -> Result<PartialSettings> {
        Ok(PartialSettings {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT.to_string()),
            database: Some(DEFAULT_DATABASE.to_string()),
            user: Some(DEFAULT_USER.to_string()),
            password: Some(secret_string(String::new())),
        })
    }
}
