//! Login email address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an email address is rejected before it reaches the identity provider.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    BadSeparator,
    #[error("email must have a local part and a domain")]
    MissingPart,
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A normalized email address (trimmed, lower-cased).
///
/// Validation is deliberately shallow: the identity provider owns the real
/// rules. This only catches input that cannot possibly be an address so the
/// login form can answer without a network round trip.
///
/// ```
/// use campus_core::Email;
///
/// let email = Email::parse("  Jane.Doe@School.EDU ").unwrap();
/// assert_eq!(email.as_str(), "jane.doe@school.edu");
///
/// assert!(Email::parse("jane").is_err());
/// assert!(Email::parse("jane@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Normalize and validate an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if normalized.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let mut parts = normalized.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::BadSeparator);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(
            Email::parse(" Teacher@Campus.Example ").map(String::from),
            Ok("teacher@campus.example".to_owned())
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("nobody"), Err(EmailError::BadSeparator));
        assert_eq!(Email::parse("@campus.example"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("jane doe@x.y"), Err(EmailError::Whitespace));
    }

    #[test]
    fn test_rejects_overlong() {
        let raw = format!("{}@campus.example", "a".repeat(250));
        assert_eq!(
            Email::parse(&raw),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Email>("\"ok@campus.example\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"broken\"").is_err());
    }
}
