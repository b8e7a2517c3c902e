//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are kept as [`Decimal`] so that offer arithmetic never picks up
//! binary floating point drift. Display values always carry two decimals.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a USD price from a number of cents.
    #[must_use]
    pub fn usd_cents(cents: i64) -> Self {
        Self::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    /// Round to two decimal places, halves away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            ..self
        }
    }

    /// The amount formatted with exactly two decimals (e.g., `"50.00"`).
    #[must_use]
    pub fn amount_string(&self) -> String {
        format!("{:.2}", self.rounded().amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency_code.symbol(), self.amount_string())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol used in front of display prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

/// Offer pricing shown on a product card.
///
/// A product is on offer when its base price is strictly greater than
/// [`OfferPricing::THRESHOLD`]. The offer takes a flat
/// [`OfferPricing::DISCOUNT_PERCENT`] off and rounds to cents.
///
/// ```
/// use cartify_core::{OfferPricing, Price};
///
/// let pricing = OfferPricing::for_price(Price::usd_cents(5001));
/// assert!(pricing.has_offer());
/// assert_eq!(pricing.display_amount(), "40.01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferPricing {
    base: Price,
    discounted: Option<Price>,
}

impl OfferPricing {
    /// Base prices above this amount are on offer.
    pub const THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

    /// Fixed offer discount.
    pub const DISCOUNT_PERCENT: u32 = 20;

    /// Compute offer pricing for a base price.
    #[must_use]
    pub fn for_price(base: Price) -> Self {
        let discounted = (base.amount > Self::THRESHOLD).then(|| {
            let factor = Decimal::from(100 - Self::DISCOUNT_PERCENT) / Decimal::ONE_HUNDRED;
            Price::new(base.amount * factor, base.currency_code).rounded()
        });

        Self { base, discounted }
    }

    /// Whether the offer badge applies.
    #[must_use]
    pub const fn has_offer(&self) -> bool {
        self.discounted.is_some()
    }

    /// The undiscounted price.
    #[must_use]
    pub const fn base(&self) -> Price {
        self.base
    }

    /// The discounted price, if on offer.
    #[must_use]
    pub const fn discounted(&self) -> Option<Price> {
        self.discounted
    }

    /// The price the customer pays.
    #[must_use]
    pub fn effective(&self) -> Price {
        self.discounted.unwrap_or(self.base)
    }

    /// Two-decimal amount of the price the customer pays.
    #[must_use]
    pub fn display_amount(&self) -> String {
        self.effective().amount_string()
    }

    /// Offer badge text (e.g., `"20% OFF"`), if on offer.
    #[must_use]
    pub fn badge(&self) -> Option<String> {
        self.has_offer()
            .then(|| format!("{}% OFF", Self::DISCOUNT_PERCENT))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_price_is_not_on_offer() {
        let pricing = OfferPricing::for_price(Price::usd_cents(5000));
        assert!(!pricing.has_offer());
        assert_eq!(pricing.display_amount(), "50.00");
        assert_eq!(pricing.badge(), None);
    }

    #[test]
    fn test_just_above_threshold_is_discounted_and_rounded() {
        let pricing = OfferPricing::for_price(Price::usd_cents(5001));
        assert!(pricing.has_offer());
        // 50.01 * 0.8 = 40.008
        assert_eq!(pricing.display_amount(), "40.01");
        assert_eq!(pricing.base().amount_string(), "50.01");
        assert_eq!(pricing.badge().as_deref(), Some("20% OFF"));
    }

    #[test]
    fn test_cheap_product_keeps_two_decimals() {
        let pricing = OfferPricing::for_price(Price::usd_cents(995));
        assert_eq!(pricing.display_amount(), "9.95");

        let whole = OfferPricing::for_price(Price::new(Decimal::from(7), CurrencyCode::USD));
        assert_eq!(whole.display_amount(), "7.00");
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        // 55.55625 * 0.8 = 44.445 -> 44.45
        let base = Price::new(Decimal::new(5_555_625, 5), CurrencyCode::USD);
        assert_eq!(OfferPricing::for_price(base).display_amount(), "44.45");
    }

    #[test]
    fn test_display_includes_symbol() {
        assert_eq!(Price::usd_cents(10995).to_string(), "$109.95");
        let eur = Price::new(Decimal::new(1250, 2), CurrencyCode::EUR);
        assert_eq!(eur.to_string(), "€12.50");
    }

    #[test]
    fn test_discounted_keeps_currency() {
        let base = Price::new(Decimal::from(100), CurrencyCode::GBP);
        let pricing = OfferPricing::for_price(base);
        assert_eq!(pricing.discounted().unwrap().currency_code, CurrencyCode::GBP);
        assert_eq!(pricing.effective().to_string(), "£80.00");
    }
}
