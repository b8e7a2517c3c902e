//! Domain models for the storefront.

pub mod product;
pub mod session;

pub use product::{Product, Rating};
pub use session::keys as session_keys;
