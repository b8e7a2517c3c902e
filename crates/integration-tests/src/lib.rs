//! Integration tests for Cartify.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartify-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_session` - Session resolution, navbar visibility and logout
//! - `storefront_cart` - Product card admission, pricing and cart persistence
//! - `storefront_search` - Debounced search dispatch
//!
//! Every test drives the public storefront API against in-memory or
//! temp-file storage and an in-process router; nothing touches the network.
