//! Storefront state shared across components.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::components::{Navbar, ProductCard};
use crate::config::StorefrontConfig;
use crate::models::Product;
use crate::router::SharedNavigator;
use crate::storage::{FileStore, MemoryStore, SharedStore, StorageError};

/// Collaborators shared by every component.
///
/// This struct is cheaply cloneable via `Arc` and hands out the storage, the
/// cart store and the router to the components it builds.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    storage: SharedStore,
    cart: CartStore,
    router: SharedNavigator,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.inner.config)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create storefront state over explicit collaborators.
    ///
    /// The cart is restored from `storage`.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: SharedStore, router: SharedNavigator) -> Self {
        let cart = CartStore::load(SharedStore::clone(&storage));
        Self {
            inner: Arc::new(StorefrontInner {
                config,
                storage,
                cart,
                router,
            }),
        }
    }

    /// Create storefront state with the storage backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured storage file cannot be opened.
    pub fn from_config(
        config: StorefrontConfig,
        router: SharedNavigator,
    ) -> Result<Self, StorageError> {
        let storage = open_storage(&config)?;
        Ok(Self::new(config, storage, router))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persisted storage.
    #[must_use]
    pub fn storage(&self) -> &SharedStore {
        &self.inner.storage
    }

    /// Get a reference to the shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the router.
    #[must_use]
    pub fn router(&self) -> &SharedNavigator {
        &self.inner.router
    }

    /// Mount a navigation bar.
    #[must_use]
    pub fn navbar(&self) -> Navbar {
        Navbar::new(self)
    }

    /// Mount a product card for `product`.
    #[must_use]
    pub fn product_card(&self, product: Product) -> ProductCard {
        ProductCard::new(
            product,
            self.inner.cart.clone(),
            self.inner.config.max_item_quantity,
            self.inner.config.limit_notice,
        )
    }
}

/// Open the storage backend named by `config`.
///
/// # Errors
///
/// Returns an error if the configured storage file cannot be opened.
pub fn open_storage(config: &StorefrontConfig) -> Result<SharedStore, StorageError> {
    match &config.storage_path {
        Some(path) => Ok(Arc::new(FileStore::open(path)?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
