//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an address is rejected by [`Email::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain whitespace")]
    Whitespace,
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs a name before the @ symbol")]
    EmptyLocalPart,
    /// The part after @ is not a dotted host name such as `example.com`.
    #[error("email domain must look like example.com")]
    InvalidDomain,
}

/// A syntactically plausible email address.
///
/// The login and registration forms only let values of this type through to
/// the gateway. The check is deliberately shallow (one `@`, a non-empty name,
/// a dotted domain); the backend has the final word.
///
/// ```
/// use foody_core::Email;
///
/// let email: Email = "budi@mail.co.id".parse().unwrap();
/// assert_eq!(email.domain(), "mail.co.id");
///
/// assert!(Email::parse("user@localhost").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 limit on the whole address.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and wrap an address.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks, checked in the order of the
    /// [`EmailError`] variants.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s {
            "" => Err(EmailError::Empty),
            s if s.len() > Self::MAX_LENGTH => Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            }),
            s if s.chars().any(char::is_whitespace) => Err(EmailError::Whitespace),
            s => {
                let (local, domain) = split_address(s)?;
                if local.is_empty() {
                    return Err(EmailError::EmptyLocalPart);
                }
                if !is_dotted_host(domain) {
                    return Err(EmailError::InvalidDomain);
                }
                Ok(Self(s.to_owned()))
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the @.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or("", |(local, _)| local)
    }

    /// The part after the @.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

/// Split on the single @, rejecting zero or several.
fn split_address(s: &str) -> Result<(&str, &str), EmailError> {
    match s.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => Ok((local, domain)),
        _ => Err(EmailError::AtSymbol),
    }
}

/// At least two labels, none of them empty.
fn is_dotted_host(domain: &str) -> bool {
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
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

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
