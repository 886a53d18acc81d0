//! ShopSpot Core - Shared types library.
//!
//! This crate provides common types used across the ShopSpot merchant components:
//! - `dashboard` - Merchant administration service (stores, menus, orders, users)
//! - `cli` - Command-line tools for migrations and merchant management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, phone numbers, roles and permissions,
//!   statuses, prices, and store profile rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
