//! Shared cart store.
//!
//! The cart is a single owned aggregate behind a mutex. Every component gets
//! a cheap clone of [`CartStore`]; the mutex serialises mutations so two
//! rapid requests can never both pass the quantity cap
//! (see [`CartStore::add_capped`] and [`CartStore::increment_capped`]).
//!
//! When backed by a [`KeyValueStore`], each mutation writes a JSON snapshot
//! under [`session_keys::CART_ITEMS`] so the cart survives restarts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use cartify_core::ProductId;

use crate::error::{AppError, report};
use crate::models::{Product, session_keys};
use crate::storage::SharedStore;

/// A product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// The product this line holds.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }
}

/// Rejections from capped increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Max limit of {max} items per product reached")]
    LimitReached { max: u32 },
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// Cheaply cloneable handle to the cart.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

#[derive(Default)]
struct CartInner {
    lines: Mutex<Vec<CartLine>>,
    storage: Option<SharedStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines().len())
            .field("persistent", &self.inner.storage.is_some())
            .finish()
    }
}

impl CartStore {
    /// Create an empty cart that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restore the cart from `storage` and persist future changes there.
    ///
    /// A malformed snapshot is reported and the cart starts empty.
    #[must_use]
    pub fn load(storage: SharedStore) -> Self {
        let lines = storage
            .get(session_keys::CART_ITEMS)
            .map_or_else(Vec::new, |snapshot| {
                serde_json::from_str::<Vec<CartLine>>(&snapshot).unwrap_or_else(|e| {
                    report(&AppError::CartSnapshot(e));
                    Vec::new()
                })
            });
        tracing::debug!(lines = lines.len(), "Cart restored");

        Self {
            inner: Arc::new(CartInner {
                lines: Mutex::new(lines),
                storage: Some(storage),
            }),
        }
    }

    fn lines(&self) -> MutexGuard<'_, Vec<CartLine>> {
        self.inner
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, lines: &[CartLine]) {
        let Some(storage) = &self.inner.storage else {
            return;
        };

        let result = serde_json::to_string(lines)
            .map_err(AppError::from)
            .and_then(|json| {
                storage
                    .set(session_keys::CART_ITEMS, &json)
                    .map_err(AppError::from)
            });
        if let Err(e) = result {
            report(&e);
        }
    }

    /// Snapshot of the cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.lines().clone()
    }

    /// Quantity of a product, if it is in the cart.
    #[must_use]
    pub fn quantity(&self, id: ProductId) -> Option<u32> {
        self.lines()
            .iter()
            .find(|line| line.product_id() == id)
            .map(|line| line.quantity)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Add a product with quantity 1, or bump it if already present.
    ///
    /// Uncapped. Returns the resulting quantity.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: &Product) -> u32 {
        let mut lines = self.lines();
        let quantity = if let Some(line) = lines.iter_mut().find(|l| l.product_id() == product.id)
        {
            line.quantity = line.quantity.saturating_add(1);
            line.quantity
        } else {
            lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            });
            1
        };
        self.persist(&lines);
        quantity
    }

    /// Add a product with quantity 1; an existing line is bumped only while
    /// below `max`.
    ///
    /// The presence check, the cap check and the mutation happen under one
    /// lock.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::LimitReached`] when the line already holds
    /// `max` or more.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_capped(&self, product: &Product, max: u32) -> Result<u32, AdmissionError> {
        let mut lines = self.lines();
        let quantity = if let Some(line) = lines.iter_mut().find(|l| l.product_id() == product.id)
        {
            if line.quantity >= max {
                return Err(AdmissionError::LimitReached { max });
            }
            line.quantity += 1;
            line.quantity
        } else {
            lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            });
            1
        };
        self.persist(&lines);
        Ok(quantity)
    }

    /// Increment a line without any cap.
    ///
    /// Returns the new quantity, or `None` if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn increment_quantity(&self, id: ProductId) -> Option<u32> {
        let mut lines = self.lines();
        let line = lines.iter_mut().find(|l| l.product_id() == id)?;
        line.quantity = line.quantity.saturating_add(1);
        let quantity = line.quantity;
        self.persist(&lines);
        Some(quantity)
    }

    /// Increment a line unless it is already at `max`.
    ///
    /// The check and the increment happen under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::LimitReached`] when the quantity is already
    /// `max` or more, and [`AdmissionError::NotInCart`] when there is no line.
    #[instrument(skip(self))]
    pub fn increment_capped(&self, id: ProductId, max: u32) -> Result<u32, AdmissionError> {
        let mut lines = self.lines();
        let line = lines
            .iter_mut()
            .find(|l| l.product_id() == id)
            .ok_or(AdmissionError::NotInCart(id))?;
        if line.quantity >= max {
            return Err(AdmissionError::LimitReached { max });
        }
        line.quantity += 1;
        let quantity = line.quantity;
        self.persist(&lines);
        Ok(quantity)
    }

    /// Decrement a line; a line at quantity 1 is removed.
    ///
    /// Returns the new quantity (0 when removed), or `None` if the product
    /// is not in the cart.
    #[instrument(skip(self))]
    pub fn decrement_quantity(&self, id: ProductId) -> Option<u32> {
        let mut lines = self.lines();
        let index = lines.iter().position(|l| l.product_id() == id)?;
        let remaining = lines.get(index).map_or(0, |line| line.quantity.saturating_sub(1));
        if remaining == 0 {
            lines.remove(index);
        } else if let Some(line) = lines.get_mut(index) {
            line.quantity = remaining;
        }
        self.persist(&lines);
        Some(remaining)
    }

    /// Drop every line from memory. The persisted snapshot is left alone.
    pub fn clear(&self) {
        self.lines().clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            category: "misc".to_string(),
            price: Decimal::new(1999, 2),
            image: String::new(),
            rating: None,
        }
    }

    #[test]
    fn test_add_then_add_again_bumps_quantity() {
        let cart = CartStore::in_memory();
        assert_eq!(cart.add_to_cart(&product(1)), 1);
        assert_eq!(cart.add_to_cart(&product(1)), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(ProductId::new(1)), Some(2));
    }

    #[test]
    fn test_increment_missing_line_is_noop() {
        let cart = CartStore::in_memory();
        assert_eq!(cart.increment_quantity(ProductId::new(4)), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_removes_line_at_one() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(&product(1));
        cart.increment_quantity(ProductId::new(1));

        assert_eq!(cart.decrement_quantity(ProductId::new(1)), Some(1));
        assert_eq!(cart.decrement_quantity(ProductId::new(1)), Some(0));
        assert_eq!(cart.quantity(ProductId::new(1)), None);
        assert_eq!(cart.decrement_quantity(ProductId::new(1)), None);
    }

    #[test]
    fn test_increment_capped_stops_at_max() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(&product(1));
        for expected in 2..=6 {
            assert_eq!(cart.increment_capped(ProductId::new(1), 6), Ok(expected));
        }
        assert_eq!(
            cart.increment_capped(ProductId::new(1), 6),
            Err(AdmissionError::LimitReached { max: 6 })
        );
        assert_eq!(cart.quantity(ProductId::new(1)), Some(6));
    }

    #[test]
    fn test_add_capped_never_exceeds_max() {
        let cart = CartStore::in_memory();
        for expected in 1..=6 {
            assert_eq!(cart.add_capped(&product(1), 6), Ok(expected));
        }
        assert_eq!(
            cart.add_capped(&product(1), 6),
            Err(AdmissionError::LimitReached { max: 6 })
        );
        assert_eq!(cart.quantity(ProductId::new(1)), Some(6));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_increment_capped_requires_line() {
        let cart = CartStore::in_memory();
        assert_eq!(
            cart.increment_capped(ProductId::new(9), 6),
            Err(AdmissionError::NotInCart(ProductId::new(9)))
        );
    }

    #[test]
    fn test_concurrent_capped_increments_never_exceed_max() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(&product(1));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cart = cart.clone();
                std::thread::spawn(move || cart.increment_capped(ProductId::new(1), 6).is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 5);
        assert_eq!(cart.quantity(ProductId::new(1)), Some(6));
    }

    #[test]
    fn test_snapshot_round_trips_through_storage() {
        let storage = MemoryStore::new();
        let cart = CartStore::load(Arc::new(storage.clone()));
        cart.add_to_cart(&product(1));
        cart.add_to_cart(&product(2));
        cart.increment_quantity(ProductId::new(2));

        assert!(storage.contains(session_keys::CART_ITEMS));

        let restored = CartStore::load(Arc::new(storage));
        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.quantity(ProductId::new(2)), Some(2));
    }

    #[test]
    fn test_malformed_snapshot_starts_empty() {
        let storage = MemoryStore::new();
        storage.set(session_keys::CART_ITEMS, "{oops").unwrap();

        let cart = CartStore::load(Arc::new(storage));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_keeps_persisted_snapshot() {
        let storage = MemoryStore::new();
        let cart = CartStore::load(Arc::new(storage.clone()));
        cart.add_to_cart(&product(1));
        cart.clear();

        assert!(cart.is_empty());
        assert!(storage.contains(session_keys::CART_ITEMS));
    }
}
