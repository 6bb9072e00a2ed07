//! CLI command implementations.
//!
//! Each command writes its result to the given output; logs go to stderr.

pub mod auth;
pub mod cart;
pub mod restaurants;

use foody_client::ClientError;
use foody_client::services::AuthError;
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The client reported an error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Message shown to the user. Form errors get one line per field.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(ClientError::Auth(AuthError::Validation(e))) => e
                .fields()
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Client(e) => e.user_message(),
            Self::Output(e) => e.to_string(),
        }
    }
}
