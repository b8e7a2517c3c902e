//! Product card state and quantity admission control.
//!
//! A card is bound to one product. Adds and increments are admitted only
//! while the cart quantity is below the cap; a rejected request raises a
//! notice that clears itself after a fixed delay. Re-triggering the notice
//! restarts the delay instead of stacking timers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::instrument;

use crate::cart::{AdmissionError, CartStore};
use crate::error::add_breadcrumb;
use crate::models::Product;
use crate::timer::TimerSlot;

/// Display data for a product card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub title: String,
    pub category: String,
    /// Base price, two decimals.
    pub price: String,
    /// Discounted price, two decimals, when on offer.
    pub offer_price: Option<String>,
    /// Offer badge, e.g. `20% OFF`.
    pub badge: Option<String>,
    pub rating: String,
    pub details_path: String,
    /// Quantity in the cart; `None` shows the add-to-cart button.
    pub quantity: Option<u32>,
    /// Quantity-limit notice, while active.
    pub limit_notice: Option<String>,
}

/// Product card bound to one product and the shared cart.
pub struct ProductCard {
    product: Product,
    cart: CartStore,
    max_quantity: u32,
    notice_duration: Duration,
    /// Generation of the showing notice; 0 when hidden.
    notice: Arc<AtomicU64>,
    notice_generation: u64,
    notice_timer: TimerSlot,
}

/// Hide the notice if it still belongs to `generation`.
///
/// A clear scheduled for an older notice is a no-op, even if its timer was
/// already running when the notice was raised again.
fn clear_notice(notice: &AtomicU64, generation: u64) -> bool {
    notice
        .compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

impl std::fmt::Debug for ProductCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCard")
            .field("product_id", &self.product.id)
            .field("max_quantity", &self.max_quantity)
            .field("limit_reached", &self.is_limit_reached())
            .finish_non_exhaustive()
    }
}

impl ProductCard {
    /// Create a card for `product`.
    #[must_use]
    pub fn new(
        product: Product,
        cart: CartStore,
        max_quantity: u32,
        notice_duration: Duration,
    ) -> Self {
        Self {
            product,
            cart,
            max_quantity,
            notice_duration,
            notice: Arc::new(AtomicU64::new(0)),
            notice_generation: 0,
            notice_timer: TimerSlot::new(),
        }
    }

    /// The bound product.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity of this product in the cart.
    #[must_use]
    pub fn cart_quantity(&self) -> Option<u32> {
        self.cart.quantity(self.product.id)
    }

    /// Whether the quantity-limit notice is showing.
    #[must_use]
    pub fn is_limit_reached(&self) -> bool {
        self.notice.load(Ordering::SeqCst) != 0
    }

    /// Add the product to the cart.
    ///
    /// A product that already has a line is bumped like [`Self::increment`],
    /// so the cap holds on this path too.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::LimitReached`] (and raises the notice) when
    /// the cart already holds the maximum.
    ///
    /// # Panics
    ///
    /// Panics if the limit is hit outside of a Tokio runtime.
    #[instrument(skip(self), fields(product_id = %self.product.id))]
    pub fn add_to_cart(&mut self) -> Result<u32, AdmissionError> {
        let result = self.cart.add_capped(&self.product, self.max_quantity);
        self.on_admission(&result);
        result
    }

    /// Request one more of the product.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::LimitReached`] (and raises the notice) when
    /// the cart already holds the maximum, or [`AdmissionError::NotInCart`]
    /// when the product has not been added yet.
    ///
    /// # Panics
    ///
    /// Panics if the limit is hit outside of a Tokio runtime.
    #[instrument(skip(self), fields(product_id = %self.product.id))]
    pub fn increment(&mut self) -> Result<u32, AdmissionError> {
        let result = self.cart.increment_capped(self.product.id, self.max_quantity);
        self.on_admission(&result);
        result
    }

    fn on_admission(&mut self, result: &Result<u32, AdmissionError>) {
        if let Err(AdmissionError::LimitReached { max }) = *result {
            tracing::info!(max, "Quantity limit reached");
            let product_id = self.product.id.to_string();
            add_breadcrumb(
                "cart",
                "Quantity limit reached",
                Some(&[("product_id", product_id.as_str())]),
            );
            self.raise_limit_notice();
        }
    }

    /// Request one less of the product.
    #[instrument(skip(self), fields(product_id = %self.product.id))]
    pub fn decrement(&self) -> Option<u32> {
        self.cart.decrement_quantity(self.product.id)
    }

    fn raise_limit_notice(&mut self) {
        self.notice_generation += 1;
        let generation = self.notice_generation;
        self.notice.store(generation, Ordering::SeqCst);

        let notice = Arc::clone(&self.notice);
        self.notice_timer.replace(self.notice_duration, move || {
            clear_notice(&notice, generation);
        });
    }

    /// Snapshot for display.
    #[must_use]
    pub fn view(&self) -> ProductCardView {
        let pricing = self.product.pricing();
        ProductCardView {
            title: self.product.title.clone(),
            category: self.product.category.clone(),
            price: pricing.base().amount_string(),
            offer_price: pricing.discounted().map(|price| price.amount_string()),
            badge: pricing.badge(),
            rating: self.product.rating_label(),
            details_path: self.product.details_path(),
            quantity: self.cart_quantity(),
            limit_notice: self.is_limit_reached().then(|| {
                AdmissionError::LimitReached {
                    max: self.max_quantity,
                }
                .to_string()
            }),
        }
    }
}
