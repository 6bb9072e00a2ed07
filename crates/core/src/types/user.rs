//! Authenticated user identity.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Identity of the logged-in user as the client knows it.
///
/// Deserializes from the backend user object (`phone` on the wire) and from
/// the client's own cache (`phoneNumber`). Every field but the email is
/// optional because an optimistic login only knows the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, alias = "phone")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl AuthUser {
    /// A provisional user carrying only the email address.
    #[must_use]
    pub fn provisional(email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            email: email.into(),
            phone_number: None,
            avatar: None,
        }
    }

    /// Name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}
