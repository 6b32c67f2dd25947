//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was refused as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@domain")]
    Malformed,
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A user's email address, trimmed and lowercased.
///
/// Lowercasing makes `Ana@X.com` and `ana@x.com` collide on the unique
/// `usuarios.email` index. Validation is deliberately shallow: one `@` split
/// with something on both sides, no whitespace.
///
/// ```
/// use registry_core::Email;
///
/// let email = Email::parse("  Ana@X.com ").unwrap();
/// assert_eq!(email.as_str(), "ana@x.com");
/// assert!(Email::parse("ana").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit; also the column width.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and normalize.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] describing the first problem found.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let raw = raw.trim();
        match raw.len() {
            0 => return Err(EmailError::Empty),
            n if n > Self::MAX_LENGTH => {
                return Err(EmailError::TooLong {
                    max: Self::MAX_LENGTH,
                });
            }
            _ => {}
        }
        if raw.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        match raw.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(raw.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
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
