//! Core types for Cartify.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod role;

pub use id::*;
pub use price::{CurrencyCode, OfferPricing, Price};
pub use role::Role;
