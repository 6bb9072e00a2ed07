//! Foody Core - Shared domain types.
//!
//! This crate provides the types used across all Foody components:
//! - `client` - HTTP gateway, state store, and services
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, emails, users, restaurants, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
