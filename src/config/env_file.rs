//! Env-file loading
//!
//! Reads `KEY=VALUE` lines (optionally prefixed with `export `) and either
//! applies them to the process environment or hands them to an
//! [`EnvSource`](super::sources::EnvSource) without touching process state.
//!
//! Line rules: surrounding spaces, tabs, carriage returns and newlines are
//! trimmed (other Unicode whitespace is kept); blank lines and lines
//! starting with `#` are skipped; a line without `=` is skipped; the key is
//! everything before the first `=`, the value everything after, both trimmed.
//! Values are taken verbatim: no quote handling, and `#` inside a value is
//! part of the value. Later duplicates win.

use crate::domain::{BackupError, Result};
use crate::logging::CATEGORY_CONFIG;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Files tried by [`load_default`], in order
pub const DEFAULT_ENV_FILES: [&str; 2] = ["backup.env", ".env"];

const EXPORT_PREFIX: &str = "export ";

const TRIMMED: &[char] = &[' ', '\t', '\r', '\n'];

fn trim(text: &str) -> &str {
    text.trim_matches(TRIMMED)
}

/// Parses a single env-file line into a key/value pair
///
/// # Examples
///
/// ```
/// use pgbackup::config::env_file::parse_line;
///
/// assert_eq!(
///     parse_line("export FOO=bar"),
///     Some(("FOO".to_string(), "bar".to_string()))
/// );
/// assert_eq!(parse_line("# comment"), None);
/// assert_eq!(parse_line("BADLINE"), None);
/// ```
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let line = trim(line);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let mut key = trim(key);
    if let Some(stripped) = key.strip_prefix(EXPORT_PREFIX) {
        key = trim(stripped);
    }
    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), trim(value).to_string()))
}

/// Parsed contents of an env-file, in file order
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Parses env-file text. Malformed lines are skipped individually.
    pub fn parse(contents: &str) -> Self {
        Self {
            entries: contents.lines().filter_map(parse_line).collect(),
        }
    }

    /// Reads and parses an env-file
    ///
    /// Invalid UTF-8 is replaced rather than rejected so one bad byte cannot
    /// hide the rest of the file.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::FileOpen`] if the file cannot be read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BackupError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Value for `key`, honouring "later duplicates win"
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Collapses the entries into a map, later duplicates winning
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries.iter().cloned().collect()
    }

    /// Sets every entry in the process environment, overwriting existing
    /// values. Entries whose key or value holds a NUL byte cannot be set;
    /// their keys are returned.
    ///
    /// Must run before other threads start: process environment mutation is
    /// not synchronised.
    pub fn apply_to_process_env(&self) -> Vec<String> {
        let mut skipped = Vec::new();
        for (key, value) in &self.entries {
            if key.contains('\0') || value.contains('\0') {
                skipped.push(key.clone());
                continue;
            }
            std::env::set_var(key, value);
        }
        skipped
    }
}

// Values may hold credentials, so only keys are shown.
impl fmt::Debug for EnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvFile")
            .field(
                "keys",
                &self.entries.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// An env-file that was applied to the process environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFileLoad {
    pub path: PathBuf,
    /// Number of entries set, duplicates included
    pub applied: usize,
    /// Keys skipped because the entry held a NUL byte
    pub skipped: Vec<String>,
}

impl EnvFileLoad {
    /// Emits the events describing this load. Call it once a subscriber is
    /// installed when the file was applied before logging started.
    pub fn log(&self) {
        for key in &self.skipped {
            tracing::warn!(
                category = CATEGORY_CONFIG,
                operation = "load_from_file",
                path = %self.path.display(),
                key = %key,
                "Skipping env-file entry containing a NUL byte"
            );
        }
        tracing::debug!(
            category = CATEGORY_CONFIG,
            operation = "load_from_file",
            path = %self.path.display(),
            applied = self.applied,
            "Loaded env-file"
        );
    }
}

/// Reads `path` and applies it to the process environment without logging
///
/// # Errors
///
/// Returns [`BackupError::FileOpen`] if the file cannot be read.
pub fn apply_file(path: impl AsRef<Path>) -> Result<EnvFileLoad> {
    let path = path.as_ref();
    let env_file = EnvFile::read(path)?;
    let skipped = env_file.apply_to_process_env();
    Ok(EnvFileLoad {
        path: path.to_path_buf(),
        applied: env_file.entries.len() - skipped.len(),
        skipped,
    })
}

/// Applies the first readable file of [`DEFAULT_ENV_FILES`] in `dir`
/// without logging
pub fn apply_default_in(dir: &Path) -> Option<EnvFileLoad> {
    DEFAULT_ENV_FILES
        .iter()
        .find_map(|name| apply_file(dir.join(name)).ok())
}

/// Applies the first readable file of [`DEFAULT_ENV_FILES`] in the current
/// directory without logging
pub fn apply_default() -> Option<EnvFileLoad> {
    apply_default_in(Path::new("."))
}

/// Loads `path` into the process environment.
///
/// Returns `false` only when the file cannot be read; malformed lines never
/// fail the load.
pub fn load_from_file(path: impl AsRef<Path>) -> bool {
    match apply_file(path) {
        Ok(load) => {
            load.log();
            true
        }
        Err(e) => {
            tracing::debug!(
                category = CATEGORY_CONFIG,
                operation = "load_from_file",
                error = %e,
                "Env-file not loaded"
            );
            false
        }
    }
}

/// Loads the first readable file of [`DEFAULT_ENV_FILES`] from the current
/// directory. Returns the file that was loaded, if any; absence of both is
/// not an error.
pub fn load_default() -> Option<PathBuf> {
    load_default_in(Path::new("."))
}

/// Same as [`load_default`] but looks in `dir`
pub fn load_default_in(dir: &Path) -> Option<PathBuf> {
    apply_default_in(dir).map(|load| {
        load.log();
        load.path
    })
}
