//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form failed local validation; no request was sent.
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationError),

    /// The backend call failed or was rejected.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be read from or written to durable storage.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Another login is still in flight.
    #[error("a login is already in progress")]
    LoginInProgress,

    /// The operation needs a stored token and there is none.
    #[error("not logged in")]
    NotLoggedIn,
}

impl AuthError {
    /// Human-readable message for display next to the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Storage(_) => "Your session could not be saved.".to_string(),
            Self::LoginInProgress => "Please wait, signing you in.".to_string(),
            Self::NotLoggedIn => "Please log in first.".to_string(),
        }
    }
}
