//! Client-side routing.
//!
//! Components never own the router; they receive a [`Navigator`] and ask it
//! to move. [`HistoryRouter`] is the in-process implementation: it records
//! every navigation and publishes the current location on a
//! [`tokio::sync::watch`] channel so location changes are observable.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

/// Route paths used by the navigation bar.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const ADMIN_LOGIN: &str = "/admin-login";
    pub const DASHBOARD: &str = "/dashboard";
    pub const ADMIN_DASHBOARD: &str = "/admin-dashboard";

    /// Routes on which the cart and search affordances are hidden.
    pub const AUTH_ROUTES: [&str; 3] = [LOGIN, REGISTER, ADMIN_LOGIN];

    /// Whether `path` is one of the authentication pages.
    #[must_use]
    pub fn is_auth_route(path: &str) -> bool {
        AUTH_ROUTES.contains(&path)
    }
}

/// A navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// In-app transition; in-memory state survives.
    Push(String),
    /// Full reload; all in-memory state is discarded.
    Reload(String),
}

impl Navigation {
    /// Target location, including any query string.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::Push(location) | Self::Reload(location) => location,
        }
    }

    /// Whether this is a full reload.
    #[must_use]
    pub const fn is_reload(&self) -> bool {
        matches!(self, Self::Reload(_))
    }
}

/// Router as seen by components.
pub trait Navigator: Send + Sync {
    /// Perform a navigation.
    fn navigate(&self, to: Navigation);

    /// Subscribe to location changes (path plus query string).
    fn subscribe(&self) -> watch::Receiver<String>;
}

/// Shared handle to a router.
pub type SharedNavigator = Arc<dyn Navigator>;

/// Strip the query string and fragment from a location.
#[must_use]
pub fn path_of(location: &str) -> &str {
    location
        .split(['?', '#'])
        .next()
        .unwrap_or(location)
}

/// In-process router with observable location and recorded history.
#[derive(Debug)]
pub struct HistoryRouter {
    location: watch::Sender<String>,
    history: Mutex<Vec<Navigation>>,
}

impl HistoryRouter {
    /// Create a router positioned at `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        let (location, _) = watch::channel(initial.into());
        Self {
            location,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Current location, including any query string.
    #[must_use]
    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    /// Every navigation performed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Navigation> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Most recent navigation, if any.
    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
    }
}

impl Navigator for HistoryRouter {
    fn navigate(&self, to: Navigation) {
        tracing::debug!(location = to.location(), reload = to.is_reload(), "Navigating");
        self.location.send_replace(to.location().to_string());
        if let Ok(mut history) = self.history.lock() {
            history.push(to);
        }
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }
}
