//! Cartify Core - Shared types library.
//!
//! This crate provides common types used across the Cartify components:
//! - `storefront` - Headless navigation bar and product card state
//! - `integration-tests` - Cross-component behaviour tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no timers,
//! no storage access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, offer pricing, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
