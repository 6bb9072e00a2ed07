//! Identifiers for backend entities.
//!
//! The backend is loose about identifier types: restaurants come back with
//! numeric or string ids depending on the endpoint, and user ids are numbers
//! that the client treats as opaque strings.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a restaurant (catalog entry).
///
/// Keeps the wire representation so that `POST /cart` echoes the id back in
/// the same shape the catalog returned it.
///
/// # Example
///
/// ```rust
/// use foody_core::RestaurantId;
///
/// let numeric: RestaurantId = "42".parse().unwrap();
/// assert_eq!(numeric, RestaurantId::Number(42));
///
/// let text: RestaurantId = "resto-7".parse().unwrap();
/// assert_eq!(text.to_string(), "resto-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RestaurantId {
    Number(i64),
    Text(String),
}

/// Integral floats above this are not exact in an `f64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl RestaurantId {
    /// Read an id from any JSON value the backend uses for one.
    ///
    /// Integers (including integral floats such as `1.0`) become `Number`,
    /// other numbers and non-empty strings become `Text`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(
                n.as_i64()
                    .or_else(|| n.as_f64().and_then(integral))
                    .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            ),
            serde_json::Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT).then_some(f as i64)
}

impl<'de> Deserialize<'de> for RestaurantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected string or number for restaurant id, got {value}"
            ))
        })
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl std::str::FromStr for RestaurantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Number))
    }
}

impl From<i64> for RestaurantId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RestaurantId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

/// Identifier of a user account, normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            serde_json::Value::Null => Ok(Self::default()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number for user id, got {other}"
            ))),
        }
    }
}
