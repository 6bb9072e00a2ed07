//! REST API client implementation.

use std::sync::Arc;

use foody_core::{ApiCategory, AuthUser, Restaurant};
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

use super::{
    AddToCartRequest, ApiError, AuthResponse, LoginRequest, RegisterRequest, normalize_restaurants,
    parse_body, status_error, unwrap_envelope, unwrap_envelope_lenient, unwrap_envelope_optional,
};
use crate::config::ClientConfig;

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const PROFILE_PATH: &str = "auth/profile";
const CART_PATH: &str = "cart";

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
const PROFILE_FALLBACK: &str = "Failed to load user profile.";
const CART_FALLBACK: &str = "Failed to add to cart.";

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the restaurant REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the bearer
/// token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Base URL every path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Set the bearer token sent on authenticated calls.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Clear the bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is set.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Whether calls to `path` carry the bearer token.
    ///
    /// Login and register are the only unauthenticated endpoints.
    fn sends_token(path: &str) -> bool {
        !(path.starts_with(LOGIN_PATH) || path.starts_with(REGISTER_PATH))
    }

    /// Send a request and return the parsed JSON body.
    ///
    /// Non-success statuses become `ApiError::Status` with the body's
    /// `message` when it has one.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let mut request = self.inner.client.request(method.clone(), url);

        if Self::sends_token(path)
            && let Some(token) = self.inner.token.read().await.as_ref()
        {
            request = request.header(reqwest::header::AUTHORIZATION, bearer_header(token)?);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "Sending API request");
        let response = request.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                path,
                body = %body_text.chars().take(200).collect::<String>(),
                "API returned non-success status"
            );
            return Err(status_error(status.as_u16(), &body_text));
        }

        parse_body(&body_text).inspect_err(|_| {
            tracing::error!(
                path,
                body = %body_text.chars().take(200).collect::<String>(),
                "API response is not JSON"
            );
        })
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects the
    /// credentials, or the response lacks a user or token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let body = self.send(Method::POST, LOGIN_PATH, Some(request)).await?;
        parse_auth_response(body, LOGIN_FALLBACK)
    }

    /// Register a new account. The backend logs the new user in directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects the
    /// registration, or the response lacks a user or token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let body = self.send(Method::POST, REGISTER_PATH, Some(request)).await?;
        parse_auth_response(body, REGISTER_FALLBACK)
    }

    /// Fetch the profile of the user owning the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a user.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<AuthUser, ApiError> {
        let body = self.send::<()>(Method::GET, PROFILE_PATH, None).await?;
        let data = unwrap_envelope_lenient(body, PROFILE_FALLBACK)?;

        serde_json::from_value(data).map_err(|e| ApiError::Envelope {
            message: PROFILE_FALLBACK.to_string(),
            reason: e.to_string(),
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the restaurant listing for a backend category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an entry cannot be parsed.
    #[instrument(skip(self), fields(path = category.path()))]
    pub async fn restaurants(&self, category: ApiCategory) -> Result<Vec<Restaurant>, ApiError> {
        let body = self.send::<()>(Method::GET, category.path(), None).await?;
        let restaurants = normalize_restaurants(body)?;
        debug!(count = restaurants.len(), "Fetched restaurants");
        Ok(restaurants)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Add a restaurant to the cart.
    ///
    /// Returns the envelope's `data` (`null` for an empty body or an envelope
    /// without data, the whole body when there is no envelope).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(restaurant_id = %request.restaurant_id))]
    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<Value, ApiError> {
        let body = self.send(Method::POST, CART_PATH, Some(request)).await?;
        unwrap_envelope_optional(body, CART_FALLBACK)
    }
}

/// `Authorization` value for a token, flagged sensitive so it is redacted
/// from header debug output.
fn bearer_header(token: &SecretString) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| ApiError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Parse the `{ user, token }` payload of login and register.
fn parse_auth_response(body: Value, fallback: &str) -> Result<AuthResponse, ApiError> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string();

    let mut data = unwrap_envelope(body, fallback)?;

    let token = data
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ApiError::Rejected(message.clone()))?;

    let user_value = data
        .get_mut("user")
        .map(Value::take)
        .filter(|u| !u.is_null())
        .ok_or_else(|| ApiError::Rejected(message.clone()))?;

    let user: AuthUser = serde_json::from_value(user_value).map_err(|e| ApiError::Envelope {
        message,
        reason: e.to_string(),
    })?;

    Ok(AuthResponse { token, user })
}
