//! Session resolution.
//!
//! The session is a projection of the persisted token: it is recomputed from
//! scratch on every location change and never updated incrementally.
//! A malformed token is reported and treated as no token at all.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::cart::CartStore;
use crate::error::{AppError, report};
use crate::models::session_keys;
use crate::router::{Navigation, Navigator};
use crate::storage::SharedStore;
use crate::token::{self, Claims};

/// Resolved identity of the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<Claims>,
    is_admin: bool,
}

impl Session {
    /// A visitor without a valid token.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            is_admin: false,
        }
    }

    /// A signed-in visitor.
    #[must_use]
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            is_admin: claims.role().is_admin(),
            user: Some(claims),
        }
    }

    /// Decoded claims, if signed in.
    #[must_use]
    pub const fn user(&self) -> Option<&Claims> {
        self.user.as_ref()
    }

    /// Whether the visitor is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether a valid token was found.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Derives the [`Session`] from persisted storage.
#[derive(Clone)]
pub struct SessionResolver {
    storage: SharedStore,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver").finish_non_exhaustive()
    }
}

impl SessionResolver {
    /// Create a resolver over `storage`.
    #[must_use]
    pub fn new(storage: SharedStore) -> Self {
        Self { storage }
    }

    /// Read and decode the stored token.
    ///
    /// Never fails: a missing token yields an anonymous session, and a
    /// malformed one is reported before yielding an anonymous session.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Session {
        let Some(raw) = self.storage.get(session_keys::TOKEN) else {
            return Session::anonymous();
        };
        let token = SecretString::from(raw);

        match token::decode(token.expose_secret()) {
            Ok(claims) => Session::from_claims(claims),
            Err(e) => {
                report(&AppError::Token(e));
                Session::anonymous()
            }
        }
    }

    /// Sign out.
    ///
    /// Removes the token and the cart snapshot, empties the in-memory cart,
    /// and only then performs a full reload to `landing_route`. Storage
    /// failures are reported; the reload happens regardless. Callers reset
    /// their own [`Session`] before calling this.
    #[instrument(skip(self, cart, navigator))]
    pub fn logout(&self, cart: &CartStore, navigator: &dyn Navigator, landing_route: &str) {
        for key in [session_keys::TOKEN, session_keys::CART_ITEMS] {
            if let Err(e) = self.storage.remove(key) {
                report(&AppError::Storage(e));
            }
        }
        cart.clear();
        crate::error::clear_sentry_user();

        tracing::info!(landing_route, "Logged out");
        navigator.navigate(Navigation::Reload(landing_route.to_string()));
    }
}
