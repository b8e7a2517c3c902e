//! Stateful UI components.
//!
//! Components hold local UI state and forward actions to the shared
//! collaborators in [`crate::state::Storefront`]. They render nothing; each
//! exposes a `view()` snapshot instead.

pub mod navbar;
pub mod product_card;
pub mod search;

pub use navbar::{NavView, NavVisibility, Navbar};
pub use product_card::{ProductCard, ProductCardView};
pub use search::{SearchDispatcher, search_location};
