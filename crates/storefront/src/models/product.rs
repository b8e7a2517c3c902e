//! Catalogue product types.

use cartify_core::{CurrencyCode, OfferPricing, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalogue product as shown on a product card and stored in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    /// Base price in USD.
    pub price: Decimal,
    pub image: String,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Customer rating summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

impl Product {
    /// Base price with currency.
    #[must_use]
    pub const fn base_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::USD)
    }

    /// Offer pricing for this product.
    #[must_use]
    pub fn pricing(&self) -> OfferPricing {
        OfferPricing::for_price(self.base_price())
    }

    /// Rating shown on the card, `N/A` when unrated.
    #[must_use]
    pub fn rating_label(&self) -> String {
        self.rating
            .filter(|rating| rating.rate.abs() > f64::EPSILON)
            .map_or_else(|| "N/A".to_string(), |rating| rating.rate.to_string())
    }

    /// Path of the product detail page.
    #[must_use]
    pub fn details_path(&self) -> String {
        format!("/products/{}", self.id)
    }
}
