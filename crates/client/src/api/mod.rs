//! HTTP gateway for the restaurant REST API.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies in both directions
//! - Every response is wrapped in an envelope `{ success, message?, data }`
//!   which is unwrapped here so callers only see typed data or an `ApiError`
//! - Bearer token injected on every call except login and register
//!
//! # Example
//!
//! ```rust,ignore
//! use foody_client::api::{ApiClient, LoginRequest};
//!
//! let api = ApiClient::new(&config)?;
//! let auth = api.login(&LoginRequest { email, password }).await?;
//! api.set_token(auth.token.clone()).await;
//!
//! let restaurants = api.restaurants(ApiCategory::Nearby).await?;
//! ```

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use foody_core::Restaurant;
use serde_json::Value;
use thiserror::Error;

/// Message used when a response body is not JSON at all.
const INVALID_RESPONSE_MESSAGE: &str = "The server returned an invalid response.";

/// Errors that can occur when talking to the REST API.
///
/// Every variant carries a message fit for display; see
/// [`ApiError::user_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The body was not JSON or did not have the expected envelope shape.
    #[error("{message} ({reason})")]
    Envelope { message: String, reason: String },

    /// The envelope reported `success: false` or carried no usable data.
    #[error("{0}")]
    Rejected(String),

    /// A request URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The stored bearer token cannot be sent as a header.
    #[error("Invalid bearer token")]
    InvalidToken,
}

impl ApiError {
    /// Human-readable message for display next to the failed action.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            Self::Transport(_) => "Unable to reach the server. Please try again.".to_string(),
            Self::Status { message, .. } | Self::Envelope { message, .. } | Self::Rejected(message) => {
                message.clone()
            }
            Self::Url(_) | Self::InvalidToken => "The client is misconfigured.".to_string(),
        }
    }

    /// Returns the HTTP status code if the backend answered with one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend refused the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

// =============================================================================
// Envelope Handling
// =============================================================================

/// Extract the `message` string from a response body, if any.
fn body_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Message from the body, or the operation's fallback.
fn message_or(body: &Value, fallback: &str) -> String {
    body_message(body).unwrap_or_else(|| fallback.to_string())
}

/// Build the error for a non-success HTTP status.
fn status_error(status: u16, body_text: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body_text)
        .ok()
        .as_ref()
        .and_then(body_message)
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    ApiError::Status { status, message }
}

/// Parse a success body as JSON. An empty body parses as `null`.
fn parse_body(body_text: &str) -> Result<Value, ApiError> {
    if body_text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body_text).map_err(|e| ApiError::Envelope {
        message: INVALID_RESPONSE_MESSAGE.to_string(),
        reason: e.to_string(),
    })
}

/// Reject an envelope that explicitly reports failure.
fn check_success(body: &Value, fallback: &str) -> Result<(), ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected(message_or(body, fallback)));
    }
    Ok(())
}

/// Unwrap `{ success, message?, data }` into `data`.
///
/// A body that is not an object is an envelope error; `success: false` or a
/// missing `data` is a rejection.
pub(crate) fn unwrap_envelope(body: Value, fallback: &str) -> Result<Value, ApiError> {
    if !body.is_object() {
        return Err(ApiError::Envelope {
            message: fallback.to_string(),
            reason: "response body is not an object".to_string(),
        });
    }

    check_success(&body, fallback)?;

    match body.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ => Err(ApiError::Rejected(message_or(&body, fallback))),
    }
}

/// Whether a body is a `{ success, ... }` envelope.
fn is_envelope(body: &Value) -> bool {
    body.get("success").is_some()
}

/// Unwrap an envelope when present, otherwise accept the bare body.
///
/// An envelope follows [`unwrap_envelope`], so one without `data` is
/// rejected with its message rather than mistaken for the payload.
pub(crate) fn unwrap_envelope_lenient(body: Value, fallback: &str) -> Result<Value, ApiError> {
    if is_envelope(&body) {
        return unwrap_envelope(body, fallback);
    }

    match body.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ if body.is_null() => Err(ApiError::Envelope {
            message: fallback.to_string(),
            reason: "empty response body".to_string(),
        }),
        _ => Ok(body),
    }
}

/// Like [`unwrap_envelope_lenient`], but an envelope without `data` is a
/// success with a `null` payload. Used where the caller needs no data back.
pub(crate) fn unwrap_envelope_optional(body: Value, fallback: &str) -> Result<Value, ApiError> {
    check_success(&body, fallback)?;

    match body {
        Value::Object(mut map) if map.contains_key("success") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => Ok(data),
            Some(data) => {
                map.insert("data".to_string(), data);
                Ok(Value::Object(map))
            }
            None => Ok(Value::Object(map)),
        },
        other => Ok(other),
    }
}

/// Normalize a restaurant listing into a list.
///
/// The listing endpoints answer with a bare array, an envelope whose `data`
/// is the array, or an envelope whose `data.restaurants` is the array. Any
/// other shape is treated as an empty listing. Entries are read one by one;
/// an entry that is not an object is skipped.
pub(crate) fn normalize_restaurants(body: Value) -> Result<Vec<Restaurant>, ApiError> {
    check_success(&body, "Failed to load restaurants.")?;

    let list = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut data)) => match data.remove("restaurants") {
                Some(Value::Array(items)) => items,
                _ => {
                    tracing::warn!("Restaurant listing has no restaurants array, showing none");
                    Vec::new()
                }
            },
            _ => {
                tracing::warn!("Restaurant listing has no data array, showing none");
                Vec::new()
            }
        },
        _ => {
            tracing::warn!("Restaurant listing is neither an array nor an object, showing none");
            Vec::new()
        }
    };

    let total = list.len();
    let restaurants: Vec<Restaurant> = list
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => Some(Restaurant::from_object(map)),
            other => {
                tracing::warn!(entry = %other, "Skipping restaurant entry that is not an object");
                None
            }
        })
        .collect();

    if restaurants.len() < total {
        tracing::warn!(
            skipped = total - restaurants.len(),
            total,
            "Some restaurant entries were unreadable"
        );
    }
    Ok(restaurants)
}
