//! Cartify Storefront - headless storefront shell.
//!
//! Reads one command per line from stdin and drives the navigation bar and
//! product cards against the shared cart, the persisted storage and an
//! in-process router.
//!
//! # Commands
//!
//! - `goto <path>` - Navigate to a path
//! - `login [--role admin] [--name NAME]` - Store an unsigned token and go home
//! - `token <raw>` - Store a raw token as-is
//! - `logout` - Sign out and reload to the landing route
//! - `search <words...>` - Type into the search box
//! - `add <id>`, `inc <id>`, `dec <id>` - Product card buttons
//! - `show` - Log the navbar and every product card
//! - `quit` - Exit

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use cartify_core::ProductId;
use cartify_storefront::components::{Navbar, ProductCard};
use cartify_storefront::config::StorefrontConfig;
use cartify_storefront::error::{AppError, report};
use cartify_storefront::models::{Product, Rating, session_keys};
use cartify_storefront::router::{HistoryRouter, Navigation, Navigator, SharedNavigator, routes};
use cartify_storefront::state::{Storefront, open_storage};
use cartify_storefront::storage::SharedStore;
use cartify_storefront::telemetry::{init_sentry, init_tracing};
use cartify_storefront::token::encode_unsigned;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Navigate to a path
    Goto { path: String },
    /// Sign in with an unsigned token
    Login {
        /// Role claim (`admin` or `customer`)
        #[arg(short, long, default_value = "customer")]
        role: String,

        /// Display name claim
        #[arg(short, long, default_value = "shopper")]
        name: String,
    },
    /// Store a raw token
    Token { raw: String },
    /// Sign out
    Logout,
    /// Type into the search box
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Add a product to the cart
    Add { id: ProductId },
    /// Increment a product's quantity
    Inc { id: ProductId },
    /// Decrement a product's quantity
    Dec { id: ProductId },
    /// Log the current navbar and product cards
    Show,
    /// Exit the shell
    Quit,
}

/// Parse one input line.
///
/// Blank lines, help requests and typos yield `None`. Help is printed as
/// usual; typos are logged as warnings, since they are not faults.
fn parse_line(line: &str) -> Option<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    match Line::try_parse_from(words) {
        Ok(parsed) => Some(parsed.command),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            if let Err(io) = e.print() {
                tracing::warn!(error = %io, "Failed to print help");
            }
            None
        }
        Err(e) => {
            let message = AppError::BadCommand(line.trim().to_string());
            tracing::warn!(error = %message, details = %e, "Ignoring input");
            None
        }
    }
}

/// Fixed catalogue shown on the dashboard.
fn catalogue() -> Vec<Product> {
    let item = |id, title: &str, category: &str, cents, rating: Option<Rating>| Product {
        id: ProductId::new(id),
        title: title.to_string(),
        category: category.to_string(),
        price: Decimal::new(cents, 2),
        image: String::new(),
        rating,
    };
    vec![
        item(1, "Foldsack Backpack", "bags", 10995, Some(Rating { rate: 3.9, count: 120 })),
        item(2, "Slim Fit T-Shirt", "clothing", 2230, Some(Rating { rate: 4.1, count: 259 })),
        item(3, "Silver Dragon Bracelet", "jewelery", 5000, None),
        item(4, "Cotton Jacket", "clothing", 5599, Some(Rating { rate: 4.7, count: 500 })),
    ]
}

/// Mounted components. Rebuilt after a full reload.
struct Shell {
    config: StorefrontConfig,
    storage: SharedStore,
    router: Arc<HistoryRouter>,
    navbar: Navbar,
    cards: Vec<ProductCard>,
    seen_navigations: usize,
}

impl Shell {
    fn mount(config: StorefrontConfig, storage: SharedStore, router: Arc<HistoryRouter>) -> Self {
        let navigator: SharedNavigator = router.clone();
        let state = Storefront::new(config.clone(), SharedStore::clone(&storage), navigator);
        let cards = catalogue()
            .into_iter()
            .map(|product| state.product_card(product))
            .collect();
        let seen_navigations = router.history().len();
        tracing::info!(location = %router.location(), "Storefront mounted");

        Self {
            navbar: state.navbar(),
            config,
            storage,
            router,
            cards,
            seen_navigations,
        }
    }

    fn card_mut(&mut self, id: ProductId) -> Result<&mut ProductCard, AppError> {
        self.cards
            .iter_mut()
            .find(|card| card.product().id == id)
            .ok_or_else(|| AppError::BadCommand(format!("no product with id {id}")))
    }

    /// Run one command. Returns `false` on quit.
    fn run(&mut self, command: Command) -> Result<bool, AppError> {
        match command {
            Command::Goto { path } => self.router.navigate(Navigation::Push(path)),
            Command::Login { role, name } => {
                let token = encode_unsigned(&serde_json::json!({
                    "id": 1,
                    "name": name,
                    "role": role,
                }));
                self.storage.set(session_keys::TOKEN, &token)?;
                let home = if role == "admin" {
                    routes::ADMIN_DASHBOARD
                } else {
                    routes::DASHBOARD
                };
                self.router.navigate(Navigation::Push(home.to_string()));
            }
            Command::Token { raw } => {
                self.storage.set(session_keys::TOKEN, &raw)?;
                let here = self.router.location();
                self.router.navigate(Navigation::Push(here));
            }
            Command::Logout => self.navbar.logout(),
            Command::Search { words } => {
                let term = words.join(" ");
                let mut typed = String::new();
                for ch in term.chars() {
                    typed.push(ch);
                    self.navbar.on_search_input(typed.clone());
                }
                if term.is_empty() {
                    self.navbar.on_search_input(String::new());
                }
            }
            Command::Add { id } => match self.card_mut(id)?.add_to_cart() {
                Ok(quantity) => tracing::info!(%id, quantity, "Added to cart"),
                Err(e) => tracing::info!(%id, "{e}"),
            },
            Command::Inc { id } => match self.card_mut(id)?.increment() {
                Ok(quantity) => tracing::info!(%id, quantity, "Quantity increased"),
                Err(e) => tracing::info!(%id, "{e}"),
            },
            Command::Dec { id } => {
                let quantity = self.card_mut(id)?.decrement();
                tracing::info!(%id, ?quantity, "Quantity decreased");
            }
            Command::Show => self.show(),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Remount after a reload, otherwise let the navbar observe the location.
    fn settle(&mut self) {
        let history = self.router.history();
        let reloaded = history
            .iter()
            .skip(self.seen_navigations)
            .any(Navigation::is_reload);
        self.seen_navigations = history.len();

        if reloaded {
            *self = Self::mount(
                self.config.clone(),
                SharedStore::clone(&self.storage),
                Arc::clone(&self.router),
            );
        } else {
            self.navbar.poll_location();
        }
    }

    fn show(&mut self) {
        self.navbar.poll_location();
        let nav = self.navbar.view();
        tracing::info!(
            location = %self.router.location(),
            home = nav.home_link,
            cart = nav.visibility.cart,
            cart_badge = ?nav.cart_badge,
            search = nav.visibility.search,
            search_term = %nav.search_term,
            admin_link = nav.visibility.admin_link,
            login_link = nav.visibility.login_link,
            register_link = nav.visibility.register_link,
            user = ?nav.user_label,
            "Navbar"
        );
        for card in &self.cards {
            let view = card.view();
            tracing::info!(
                id = %card.product().id,
                title = %view.title,
                price = %view.price,
                offer_price = ?view.offer_price,
                badge = ?view.badge,
                rating = %view.rating,
                quantity = ?view.quantity,
                notice = ?view.limit_notice,
                "Product card"
            );
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    let storage = open_storage(&config).expect("Failed to open storage");
    let router = Arc::new(HistoryRouter::new(routes::DASHBOARD));
    let mut shell = Shell::mount(config, storage, router);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };
        let Some(command) = parse_line(&line) else {
            continue;
        };

        match shell.run(command) {
            Ok(true) => shell.settle(),
            Ok(false) => break,
            Err(e) => report(&e),
        }
    }

    tracing::info!("Shell closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_commands() {
        assert!(matches!(
            parse_line("inc 3"),
            Some(Command::Inc { id }) if id == ProductId::new(3)
        ));
        assert!(matches!(
            parse_line("search red  shoes"),
            Some(Command::Search { words }) if words == ["red", "shoes"]
        ));
        assert!(matches!(
            parse_line("login --role admin"),
            Some(Command::Login { role, .. }) if role == "admin"
        ));
    }

    #[test]
    fn test_parse_line_rejects_without_command() {
        assert!(parse_line("   ").is_none());
        assert!(parse_line("fly away").is_none());
        assert!(parse_line("inc three").is_none());
        assert!(parse_line("help").is_none());
    }

    #[test]
    fn test_help_is_not_a_parse_failure() {
        let err = Line::try_parse_from(["--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Line::try_parse_from(["inc", "three"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
