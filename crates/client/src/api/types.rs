//! Request and response types for the REST API.

use foody_core::{AuthUser, RestaurantId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub restaurant_id: RestaurantId,
}

/// Identity and bearer token returned by login and register.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: SecretString,
    pub user: AuthUser,
}

/// Serialize a secret as its plain value for the request body.
fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
