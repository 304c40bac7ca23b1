//! PostgreSQL port newtype with validation
//!
//! A port is kept as the exact string it was supplied as (leading zeros
//! included) so the connection string reproduces the configured value, while
//! [`Port::value`] exposes the numeric port.

use super::errors::BackupError;
use super::result::Result;
use std::fmt;
use std::str::FromStr;

/// Port used when no source supplies an acceptable one
pub const DEFAULT_PORT: &str = "5432";

const MAX_PORT_DIGITS: usize = 5;

/// Validates a port candidate.
///
/// Accepts iff the candidate is 1 to 5 ASCII digits whose integer value is in
/// `1..=65535`. Leading zeros are permitted.
///
/// # Examples
///
/// ```
/// use pgbackup::domain::port::validate_port;
///
/// assert_eq!(validate_port("08080").unwrap(), 8080);
/// assert!(validate_port("0").is_err());
/// assert!(validate_port("65536").is_err());
/// ```
pub fn validate_port(candidate: &str) -> Result<u16> {
    let reject = |reason| BackupError::InvalidPort {
        value: candidate.to_string(),
        reason,
    };

    if candidate.is_empty() {
        return Err(reject("port cannot be empty"));
    }
    if candidate.len() > MAX_PORT_DIGITS {
        return Err(reject("port has more than 5 digits"));
    }
    if !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(reject("port must contain only ASCII digits"));
    }

    // At most five digits, so this cannot overflow a u32.
    let value: u32 = candidate
        .bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));

    match u16::try_from(value) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(reject("port must be between 1 and 65535")),
    }
}

/// A validated PostgreSQL port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    raw: String,
    value: u16,
}

impl Port {
    /// Creates a port from a candidate string, rejecting invalid values
    pub fn new(candidate: impl Into<String>) -> Result<Self> {
        let raw = candidate.into();
        let value = validate_port(&raw)?;
        Ok(Self { raw, value })
    }

    /// Returns the port exactly as configured
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the numeric port
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl Default for Port {
    fn default() -> Self {
        Self {
            raw: DEFAULT_PORT.to_string(),
            value: 5432,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Port {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Port {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", 1 ; "lowest port")]
    #[test_case("5432", 5432 ; "postgres default")]
    #[test_case("65535", 65535 ; "highest port")]
    #[test_case("08080", 8080 ; "leading zero")]
    #[test_case("00001", 1 ; "padded to five digits")]
    fn test_validate_port_accepts(candidate: &str, expected: u16) {
        assert_eq!(validate_port(candidate).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("0" ; "zero")]
    #[test_case("00000" ; "padded zero")]
    #[test_case("65536" ; "one past the range")]
    #[test_case("99999" ; "five digits out of range")]
    #[test_case("123456" ; "six digits")]
    #[test_case("054321" ; "six digits with leading zero")]
    #[test_case("-1" ; "negative")]
    #[test_case("+80" ; "explicit sign")]
    #[test_case(" 80" ; "leading space")]
    #[test_case("80a" ; "trailing letter")]
    #[test_case("５４３２" ; "full-width digits")]
    fn test_validate_port_rejects(candidate: &str) {
        let err = validate_port(candidate).unwrap_err();
        assert!(matches!(err, BackupError::InvalidPort { .. }));
    }

    #[test]
    fn test_port_keeps_raw_string() {
        let port = Port::new("08080").unwrap();
        assert_eq!(port.as_str(), "08080");
        assert_eq!(port.value(), 8080);
        assert_eq!(port.to_string(), "08080");
    }

    #[test]
    fn test_port_default() {
        let port = Port::default();
        assert_eq!(port.as_str(), DEFAULT_PORT);
        assert_eq!(port.value(), 5432);
    }

    #[test]
    fn test_port_from_str() {
        let port: Port = "6543".parse().unwrap();
        assert_eq!(port.value(), 6543);
        assert!("abc".parse::<Port>().is_err());
    }
}
