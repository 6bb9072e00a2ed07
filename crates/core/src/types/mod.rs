//! Core types for Foody.
//!
//! This module provides type-safe wrappers for the client's domain concepts.

pub mod email;
pub mod id;
pub mod restaurant;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::{RestaurantId, UserId};
pub use restaurant::Restaurant;
pub use status::*;
pub use user::AuthUser;
