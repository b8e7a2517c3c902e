//! Debounced product search.
//!
//! Every keystroke updates the echoed search term immediately and
//! (re)schedules a navigation to the dashboard carrying the term. Only the
//! last term of a quiet period is dispatched. Dropping the dispatcher
//! cancels any pending navigation.

use std::time::Duration;

use tracing::instrument;

use crate::router::{Navigation, SharedNavigator, routes};
use crate::timer::TimerSlot;

/// Dashboard location for a search term, percent-encoded.
#[must_use]
pub fn search_location(query: &str) -> String {
    format!("{}?search={}", routes::DASHBOARD, urlencoding::encode(query))
}

/// Debounces search input into dashboard navigations.
pub struct SearchDispatcher {
    term: String,
    navigator: SharedNavigator,
    debounce: Duration,
    pending: TimerSlot,
}

impl std::fmt::Debug for SearchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDispatcher")
            .field("term", &self.term)
            .field("debounce", &self.debounce)
            .field("pending", &self.pending.is_pending())
            .finish_non_exhaustive()
    }
}

impl SearchDispatcher {
    /// Create a dispatcher navigating through `navigator`.
    #[must_use]
    pub fn new(navigator: SharedNavigator, debounce: Duration) -> Self {
        Self {
            term: String::new(),
            navigator,
            debounce,
            pending: TimerSlot::new(),
        }
    }

    /// Handle a keystroke: store `value` verbatim and reschedule dispatch.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[instrument(skip(self, value))]
    pub fn on_input(&mut self, value: impl Into<String>) {
        self.term = value.into();

        let navigator = SharedNavigator::clone(&self.navigator);
        let location = search_location(&self.term);
        self.pending.replace(self.debounce, move || {
            tracing::debug!(%location, "Dispatching search");
            navigator.navigate(Navigation::Push(location));
        });
    }

    /// Current search term, as typed.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether a dispatch is waiting for the quiet period to end.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Drop any pending dispatch.
    pub fn cancel(&mut self) {
        self.pending.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::router::HistoryRouter;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn dispatcher() -> (SearchDispatcher, Arc<HistoryRouter>) {
        let router = Arc::new(HistoryRouter::new("/dashboard"));
        let dispatcher = SearchDispatcher::new(router.clone(), DEBOUNCE);
        (dispatcher, router)
    }

    fn pushes(router: &HistoryRouter) -> Vec<String> {
        router
            .history()
            .iter()
            .map(|nav| nav.location().to_string())
            .collect()
    }

    #[test]
    fn test_search_location_encodes_query() {
        assert_eq!(search_location("app"), "/dashboard?search=app");
        assert_eq!(
            search_location("red & blue shirts"),
            "/dashboard?search=red%20%26%20blue%20shirts"
        );
        assert_eq!(search_location("é?#"), "/dashboard?search=%C3%A9%3F%23");
        assert_eq!(search_location(""), "/dashboard?search=");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_dispatch_once() {
        let (mut search, router) = dispatcher();

        for value in ["a", "ap", "app"] {
            search.on_input(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(search.term(), "app");
        assert!(router.history().is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(pushes(&router), vec!["/dashboard?search=app"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_keystrokes_dispatch_each() {
        let (mut search, router) = dispatcher();

        for value in ["a", "ap", "app"] {
            search.on_input(value);
            tokio::time::sleep(Duration::from_millis(600)).await;
        }

        assert_eq!(
            pushes(&router),
            vec![
                "/dashboard?search=a",
                "/dashboard?search=ap",
                "/dashboard?search=app"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_is_dispatched() {
        let (mut search, router) = dispatcher();
        search.on_input("");
        tokio::time::sleep(Duration::from_millis(501)).await;

        assert_eq!(pushes(&router), vec!["/dashboard?search="]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_dispatch() {
        let (mut search, router) = dispatcher();
        search.on_input("bag");
        assert!(search.is_pending());
        drop(search);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(router.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_term() {
        let (mut search, router) = dispatcher();
        search.on_input("bag");
        search.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(search.term(), "bag");
        assert!(router.history().is_empty());
    }
}
