//! Unified error handling for the client.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::{AuthError, CartError};
use crate::storage::StorageError;

/// Top-level error for applications built on the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A REST call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Login, registration, or session handling failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A cart change failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

impl ClientError {
    /// Human-readable message for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Storage(_) => "Local data could not be read or saved.".to_string(),
            Self::Api(e) => e.user_message(),
            Self::Auth(e) => e.user_message(),
            Self::Cart(e) => e.user_message(),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
