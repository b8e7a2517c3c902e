//! Session-related types.
//!
//! Keys under which session state lives in the persisted key-value store.

/// Storage keys for session and cart state.
pub mod keys {
    /// Key for the externally issued session token.
    pub const TOKEN: &str = "token";

    /// Key for the persisted cart snapshot.
    pub const CART_ITEMS: &str = "cartItems";
}
