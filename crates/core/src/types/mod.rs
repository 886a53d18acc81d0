//! Core types for ShopSpot.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod role;
pub mod status;
pub mod store;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price};
pub use role::{Capability, Permissions, StoreRole, permissions_for};
pub use status::*;
pub use store::{
    DayHours, OpeningHours, StoreCategory, StoreProfile, Weekday, is_setup_complete,
};
