//! Integration tests for product cards and the shared cart.
//!
//! Cards built from the same storefront share one cart, so the quantity cap
//! and the persisted snapshot are checked across cards and across restarts.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use cartify_core::ProductId;
use cartify_storefront::cart::{AdmissionError, CartLine};
use cartify_storefront::config::StorefrontConfig;
use cartify_storefront::models::{Product, Rating, session_keys};
use cartify_storefront::router::HistoryRouter;
use cartify_storefront::state::Storefront;
use cartify_storefront::storage::{FileStore, KeyValueStore, MemoryStore};
use rust_decimal::Decimal;

fn product(id: i32, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        category: "misc".to_string(),
        price: Decimal::new(cents, 2),
        image: String::new(),
        rating: Some(Rating {
            rate: 4.5,
            count: 10,
        }),
    }
}

fn memory_storefront() -> (Storefront, MemoryStore) {
    let storage = MemoryStore::new();
    let state = Storefront::new(
        StorefrontConfig::default(),
        Arc::new(storage.clone()),
        Arc::new(HistoryRouter::new("/dashboard")),
    );
    (state, storage)
}

// =============================================================================
// Admission Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_quantity_never_exceeds_cap() {
    let (state, _) = memory_storefront();
    let mut card = state.product_card(product(1, 2230));
    card.add_to_cart().unwrap();

    let mut admitted = 1;
    for _ in 0..10 {
        if card.increment().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 6);
    assert_eq!(state.cart().quantity(ProductId::new(1)), Some(6));
    assert!(card.is_limit_reached());
}

#[tokio::test(start_paused = true)]
async fn test_add_to_cart_at_cap_keeps_quantity() {
    let (state, _) = memory_storefront();
    let mut card = state.product_card(product(1, 2230));
    for _ in 0..6 {
        card.add_to_cart().unwrap();
    }
    assert!(card.increment().is_err());

    assert_eq!(
        card.add_to_cart(),
        Err(AdmissionError::LimitReached { max: 6 })
    );
    assert_eq!(state.cart().quantity(ProductId::new(1)), Some(6));
    assert!(card.view().limit_notice.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_cap_holds_across_cards_for_same_product() {
    let (state, _) = memory_storefront();
    let mut first = state.product_card(product(1, 2230));
    let mut second = state.product_card(product(1, 2230));
    first.add_to_cart().unwrap();

    for _ in 0..5 {
        first.increment().unwrap();
    }
    assert_eq!(
        second.increment(),
        Err(AdmissionError::LimitReached { max: 6 })
    );
    assert!(second.is_limit_reached());
    assert!(!first.is_limit_reached());
    assert_eq!(first.view().quantity, Some(6));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_admit_exactly_up_to_cap() {
    let (state, _) = memory_storefront();
    state.cart().add_to_cart(&product(1, 2230));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let mut card = state.product_card(product(1, 2230));
            tokio::spawn(async move { card.increment().is_ok() })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(state.cart().quantity(ProductId::new(1)), Some(6));
}

#[tokio::test(start_paused = true)]
async fn test_limit_notice_clears_after_configured_delay() {
    let storage = MemoryStore::new();
    let config = StorefrontConfig {
        max_item_quantity: 2,
        limit_notice: Duration::from_millis(1000),
        ..StorefrontConfig::default()
    };
    let state = Storefront::new(
        config,
        Arc::new(storage),
        Arc::new(HistoryRouter::new("/dashboard")),
    );
    let mut card = state.product_card(product(1, 2230));
    card.add_to_cart().unwrap();
    card.increment().unwrap();

    assert!(card.increment().is_err());
    assert_eq!(
        card.view().limit_notice.as_deref(),
        Some("Max limit of 2 items per product reached")
    );

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(card.view().limit_notice, None);
}

#[test]
fn test_decrement_at_one_removes_line() {
    let (state, storage) = memory_storefront();
    let mut card = state.product_card(product(1, 2230));
    card.add_to_cart().unwrap();

    assert_eq!(card.decrement(), Some(0));
    assert!(state.cart().is_empty());
    assert_eq!(card.view().quantity, None);
    assert_eq!(
        storage.get(session_keys::CART_ITEMS).as_deref(),
        Some("[]")
    );
}

// =============================================================================
// Pricing Tests
// =============================================================================

#[test]
fn test_card_pricing_threshold() {
    let (state, _) = memory_storefront();

    let at_threshold = state.product_card(product(1, 5000)).view();
    assert_eq!(at_threshold.price, "50.00");
    assert_eq!(at_threshold.offer_price, None);
    assert_eq!(at_threshold.badge, None);

    let above = state.product_card(product(2, 5599)).view();
    assert_eq!(above.price, "55.99");
    assert_eq!(above.offer_price.as_deref(), Some("44.79"));
    assert_eq!(above.badge.as_deref(), Some("20% OFF"));
    assert_eq!(above.rating, "4.5");
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_cart_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let state = Storefront::new(
            StorefrontConfig::default(),
            Arc::new(FileStore::open(&path).unwrap()),
            Arc::new(HistoryRouter::new("/dashboard")),
        );
        let mut bag = state.product_card(product(1, 10995));
        let mut shirt = state.product_card(product(2, 2230));
        bag.add_to_cart().unwrap();
        bag.increment().unwrap();
        shirt.add_to_cart().unwrap();
    }

    let config = StorefrontConfig {
        storage_path: Some(path),
        ..StorefrontConfig::default()
    };
    let state =
        Storefront::from_config(config, Arc::new(HistoryRouter::new("/dashboard"))).unwrap();

    let items: Vec<CartLine> = state.cart().items();
    assert_eq!(items.len(), 2);
    assert_eq!(state.cart().quantity(ProductId::new(1)), Some(2));
    assert_eq!(state.cart().quantity(ProductId::new(2)), Some(1));
    assert_eq!(state.navbar().view().cart_badge, Some(2));
}

#[test]
fn test_corrupt_snapshot_starts_empty_cart() {
    let storage = MemoryStore::new();
    storage.set(session_keys::CART_ITEMS, "{not json").unwrap();

    let state = Storefront::new(
        StorefrontConfig::default(),
        Arc::new(storage),
        Arc::new(HistoryRouter::new("/dashboard")),
    );
    assert!(state.cart().is_empty());
}
