//! Connection string composition
//!
//! Builds the libpq keyword/value connection string (`host=... port=...`)
//! handed to the backup engine. Values containing characters that are
//! significant to the keyword/value syntax are single-quoted and have `'` and
//! `\` backslash-escaped.

use super::schema::DatabaseSettings;
use super::secret::{secret_string, SecretString};
use secrecy::ExposeSecret;
use std::borrow::Cow;

/// Placeholder used instead of the password in loggable connection strings
pub const REDACTED_PASSWORD: &str = "********";

fn needs_quoting(c: char) -> bool {
    matches!(c, ' ' | '\'' | '\\' | '=')
}

/// Escapes a single connection parameter value.
///
/// Values without space, `'`, `\` or `=` are returned unchanged (borrowed).
/// Otherwise the value is wrapped in single quotes and every `'` and `\` is
/// prefixed with `\`. Empty input is returned unchanged.
///
/// # Examples
///
/// ```
/// use pgbackup::config::escape_connection_param;
///
/// assert_eq!(escape_connection_param("postgres"), "postgres");
/// assert_eq!(escape_connection_param("pa ss"), "'pa ss'");
/// assert_eq!(escape_connection_param("a'b"), "'a\\'b'");
/// ```
pub fn escape_connection_param(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_quoting) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('\'');
    Cow::Owned(escaped)
}

/// Formats the password token value. An empty password is emitted as `''`
/// so the keyword always carries an explicit value.
fn password_token(password: &str) -> Cow<'_, str> {
    if password.is_empty() {
        Cow::Borrowed("''")
    } else {
        escape_connection_param(password)
    }
}

fn compose(settings: &DatabaseSettings, password: &str) -> String {
    [
        ("host", escape_connection_param(settings.host())),
        ("port", escape_connection_param(settings.port().as_str())),
        ("dbname", escape_connection_param(settings.database())),
        ("user", escape_connection_param(settings.user())),
        ("password", Cow::Borrowed(password)),
    ]
    .iter()
    .map(|(key, value)| format!("{key}={value}"))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Composes the connection string for one settings snapshot.
///
/// Each raw field is escaped exactly once here; stored settings are never
/// pre-escaped.
pub fn connection_string(settings: &DatabaseSettings) -> SecretString {
    let password = settings.password().expose_secret();
    let token = password_token(password.as_ref());
    secret_string(compose(settings, &token))
}

/// Composes the connection string with the password replaced by
/// [`REDACTED_PASSWORD`], suitable for logs and terminal output.
pub fn redacted_connection_string(settings: &DatabaseSettings) -> String {
    compose(settings, REDACTED_PASSWORD)
}
