//! Navigation bar state.
//!
//! The navbar owns the resolved [`Session`], the current path and the search
//! dispatcher. Its affordances are a pure function of the admin flag, the
//! identity and the current path (see [`NavVisibility::derive`]).

use tokio::sync::watch;
use tracing::instrument;

use crate::cart::CartStore;
use crate::components::search::SearchDispatcher;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::router::{SharedNavigator, path_of, routes};
use crate::session::{Session, SessionResolver};
use crate::state::Storefront;

/// Which navbar affordances are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NavVisibility {
    pub cart: bool,
    pub search: bool,
    pub admin_link: bool,
    pub login_link: bool,
    pub register_link: bool,
    /// User menu and logout button.
    pub user_menu: bool,
}

impl NavVisibility {
    /// Derive visibility from the session flags and the current path.
    #[must_use]
    pub fn derive(is_admin: bool, is_authenticated: bool, path: &str) -> Self {
        let shopper_page = !is_admin && !routes::is_auth_route(path);
        Self {
            cart: shopper_page,
            search: shopper_page,
            admin_link: is_admin,
            login_link: !is_authenticated && path != routes::LOGIN,
            register_link: !is_authenticated && path != routes::REGISTER,
            user_menu: is_authenticated,
        }
    }
}

/// Display data for the navbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView {
    pub visibility: NavVisibility,
    /// Target of the brand link.
    pub home_link: &'static str,
    /// Cart badge count, shown when the cart is visible and non-empty.
    pub cart_badge: Option<usize>,
    /// Search box contents.
    pub search_term: String,
    /// User menu label.
    pub user_label: Option<String>,
}

/// Navigation bar bound to the shared storefront collaborators.
pub struct Navbar {
    resolver: SessionResolver,
    session: Session,
    location: watch::Receiver<String>,
    current_path: String,
    cart: CartStore,
    navigator: SharedNavigator,
    search: SearchDispatcher,
    landing_route: String,
}

impl std::fmt::Debug for Navbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navbar")
            .field("session", &self.session)
            .field("current_path", &self.current_path)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl Navbar {
    /// Mount a navbar and resolve the initial session.
    #[must_use]
    pub fn new(state: &Storefront) -> Self {
        let navigator = SharedNavigator::clone(state.router());
        let location = navigator.subscribe();
        let config = state.config();

        let mut navbar = Self {
            resolver: SessionResolver::new(state.storage().clone()),
            session: Session::anonymous(),
            location,
            current_path: String::new(),
            cart: state.cart().clone(),
            search: SearchDispatcher::new(
                SharedNavigator::clone(&navigator),
                config.search_debounce,
            ),
            navigator,
            landing_route: config.landing_route.clone(),
        };
        navbar.refresh();
        navbar
    }

    /// Recompute path and session from scratch.
    #[instrument(skip(self))]
    pub fn refresh(&mut self) {
        let location = self.location.borrow_and_update().clone();
        self.current_path = path_of(&location).to_string();
        self.session = self.resolver.resolve();

        match self.session.user() {
            Some(claims) => set_sentry_user(
                claims.user_id().map(|id| id.to_string()),
                claims.display_name(),
            ),
            None => clear_sentry_user(),
        }
        tracing::debug!(
            path = %self.current_path,
            authenticated = self.session.is_authenticated(),
            admin = self.session.is_admin(),
            "Navbar refreshed"
        );
    }

    /// Refresh if the location changed since the last refresh.
    ///
    /// Returns whether a refresh happened.
    pub fn poll_location(&mut self) -> bool {
        let changed = self.location.has_changed().unwrap_or(false);
        if changed {
            self.refresh();
        }
        changed
    }

    /// Wait for the next location change and refresh.
    ///
    /// Returns `false` once the router is gone.
    pub async fn location_changed(&mut self) -> bool {
        if self.location.changed().await.is_err() {
            return false;
        }
        self.refresh();
        true
    }

    /// The resolved session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Path the navbar last saw.
    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Current affordances.
    #[must_use]
    pub fn visibility(&self) -> NavVisibility {
        NavVisibility::derive(
            self.session.is_admin(),
            self.session.is_authenticated(),
            &self.current_path,
        )
    }

    /// Snapshot for display.
    #[must_use]
    pub fn view(&self) -> NavView {
        let visibility = self.visibility();
        let items = self.cart.len();
        NavView {
            visibility,
            home_link: if self.session.is_admin() {
                routes::ADMIN_DASHBOARD
            } else {
                routes::DASHBOARD
            },
            cart_badge: (visibility.cart && items > 0).then_some(items),
            search_term: self.search.term().to_string(),
            user_label: self
                .session
                .user()
                .map(|claims| claims.display_name().unwrap_or("Account").to_string()),
        }
    }

    /// Handle a keystroke in the search box.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn on_search_input(&mut self, value: impl Into<String>) {
        self.search.on_input(value);
    }

    /// Sign out and reload to the landing route.
    pub fn logout(&mut self) {
        self.search.cancel();
        self.session = Session::anonymous();
        self.resolver
            .logout(&self.cart, self.navigator.as_ref(), &self.landing_route);
    }
}
