//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Login, registration, logout, session restore
//! - `catalog` - Restaurant listings, search, and sort
//! - `cart` - Optimistic add-to-cart

pub mod auth;
pub mod cart;
pub mod catalog;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogService, filter_restaurants, sort_restaurants};
