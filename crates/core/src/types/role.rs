//! User role carried in session token claims.

use serde::{Deserialize, Serialize};

/// Role of the signed-in user.
///
/// Only the exact claim value `"admin"` grants [`Role::Admin`]; any other
/// value, a non-string value, or a missing claim is a regular customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    /// Claim value that marks an administrator.
    pub const ADMIN_CLAIM: &'static str = "admin";

    /// Derive a role from the raw `role` claim.
    #[must_use]
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(Self::ADMIN_CLAIM) => Self::Admin,
            _ => Self::Customer,
        }
    }

    /// Whether this role unlocks admin-only navigation.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}
