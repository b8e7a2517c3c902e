//! Cartify storefront library.
//!
//! Headless state for the storefront's navigation bar and product cards:
//! session resolution from the persisted token, debounced search dispatch,
//! and per-product quantity admission against the shared cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod components;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod session;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod timer;
pub mod token;
