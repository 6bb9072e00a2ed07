//! Status and selector enums.

use serde::{Deserialize, Serialize};

/// Authentication status of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No login attempted or the user logged out.
    #[default]
    Idle,
    /// A login request is in flight and the session holds a prediction.
    Authenticating,
    /// The backend confirmed the identity and issued a token.
    Authenticated,
    /// The last authentication attempt failed; user and token are cleared.
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Restaurant category as offered to the user on the home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    All,
    Nearby,
    Discount,
    BestSeller,
    Delivery,
    Lunch,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 6] = [
        Self::All,
        Self::Nearby,
        Self::Discount,
        Self::BestSeller,
        Self::Delivery,
        Self::Lunch,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Restaurant",
            Self::Nearby => "Nearby",
            Self::Discount => "Discount",
            Self::BestSeller => "Best Seller",
            Self::Delivery => "Delivery",
            Self::Lunch => "Lunch",
        }
    }

    /// The backend listing that serves this category.
    ///
    /// The backend only has four listings; the remaining categories fall
    /// back to the full list or the recommendations.
    #[must_use]
    pub const fn api_category(self) -> ApiCategory {
        match self {
            Self::All | Self::Discount | Self::Delivery => ApiCategory::All,
            Self::Nearby => ApiCategory::Nearby,
            Self::BestSeller => ApiCategory::BestSeller,
            Self::Lunch => ApiCategory::Recommended,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Nearby => write!(f, "nearby"),
            Self::Discount => write!(f, "discount"),
            Self::BestSeller => write!(f, "best-seller"),
            Self::Delivery => write!(f, "delivery"),
            Self::Lunch => write!(f, "lunch"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "nearby" => Ok(Self::Nearby),
            "discount" => Ok(Self::Discount),
            "best-seller" | "bestSeller" => Ok(Self::BestSeller),
            "delivery" => Ok(Self::Delivery),
            "lunch" => Ok(Self::Lunch),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Restaurant listing exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiCategory {
    All,
    Nearby,
    BestSeller,
    Recommended,
}

impl ApiCategory {
    /// REST path of the listing, relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::All => "resto",
            Self::Nearby => "resto/nearby",
            Self::BestSeller => "resto/best-seller",
            Self::Recommended => "resto/recommended",
        }
    }
}

/// Ordering applied to a restaurant listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    PriceAsc,
    PriceDesc,
    Rating,
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceAsc => write!(f, "price-asc"),
            Self::PriceDesc => write!(f, "price-desc"),
            Self::Rating => write!(f, "rating"),
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" | "priceAsc" => Ok(Self::PriceAsc),
            "price-desc" | "priceDesc" => Ok(Self::PriceDesc),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort option: {s}")),
        }
    }
}
