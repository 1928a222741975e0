//! # Cart
//!
//! The checkout payload submitted to `POST /api/sales` and the rules that
//! must hold before anything is written.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register submits Cart                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::validate()          ← THIS MODULE (pure, no stock knowledge)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::article_demand()    ← units needed per article                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  till-db SaleRepository::record_sale()                                 │
//! │       ├── stock check against demand                                    │
//! │       └── one transaction: debits + header + lines                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Totals sit at the top level next to the item lists:
//! ```json
//! {
//!   "articleItems": [{ "id": 1, "quantity": 3, "price": 10 }],
//!   "serviceItems": [{ "id": 2, "price": 25 }],
//!   "total": 55, "exchange": 5, "paymentCard": 0, "paymentCash": 60,
//!   "discountType": null, "discountValue": 0,
//!   "date": "2024-05-01T14:30:00Z"
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Lines
// =============================================================================

/// An article sold in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleItem {
    #[serde(alias = "id")]
    pub article_id: i64,

    pub quantity: i64,

    /// Unit price charged, captured on the sale line.
    #[serde(alias = "price")]
    pub unit_price: Money,
}

/// A service sold in a cart. Selling a service through a cart has no
/// stock effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceItem {
    #[serde(alias = "id")]
    pub service_id: i64,

    #[serde(alias = "price")]
    pub unit_price: Money,
}

// =============================================================================
// Totals
// =============================================================================

/// Payment totals entered at the register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    #[serde(alias = "total")]
    pub total_price: Money,

    /// Change handed back.
    #[serde(default)]
    pub exchange: Money,

    #[serde(default)]
    pub payment_card: Money,

    #[serde(default)]
    pub payment_cash: Money,

    #[serde(default)]
    pub discount_type: Option<String>,

    #[serde(default)]
    pub discount_value: Money,
}

impl CartTotals {
    /// Cash retained by the drawer: `payment_cash - exchange`.
    ///
    /// Card payments never contribute. With `exchange <= payment_cash`
    /// enforced by [`CartTotals::validate`], a card-only sale yields zero.
    pub fn revenue(&self) -> Money {
        self.payment_cash - self.exchange
    }

    /// Validates the totals in isolation.
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_amount("totalPrice", self.total_price)?;
        validation::validate_amount("exchange", self.exchange)?;
        validation::validate_amount("paymentCard", self.payment_card)?;
        validation::validate_amount("paymentCash", self.payment_cash)?;
        validation::validate_amount("discountValue", self.discount_value)?;
        validation::validate_discount_type(self.discount_type.as_deref())?;

        if self.exchange > self.payment_cash {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!(
                    "exchange {} exceeds cash received {}",
                    self.exchange, self.payment_cash
                ),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A checkout request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    #[serde(default)]
    pub article_items: Vec<ArticleItem>,

    #[serde(default)]
    pub service_items: Vec<ServiceItem>,

    #[serde(flatten)]
    pub totals: CartTotals,

    /// Explicit sale date; the current time is used when absent.
    #[serde(default, deserialize_with = "deserialize_sale_date")]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl Cart {
    /// Total number of lines (articles + services).
    pub fn line_count(&self) -> usize {
        self.article_items.len() + self.service_items.len()
    }

    /// Checks every rule that does not need the database.
    ///
    /// ## Rules
    /// - At least one line, at most [`MAX_CART_ITEMS`]
    /// - Article quantities in `1..=MAX_ITEM_QUANTITY`
    /// - Unit prices and totals not negative
    /// - `exchange <= payment_cash`
    pub fn validate(&self) -> CoreResult<()> {
        if self.line_count() == 0 {
            return Err(CoreError::CartEmpty);
        }

        if self.line_count() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        for item in &self.article_items {
            validation::validate_id("articleId", item.article_id)?;
            if item.quantity > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: item.quantity,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            validation::validate_quantity(item.quantity)?;
            validation::validate_amount("price", item.unit_price)?;
        }

        for item in &self.service_items {
            validation::validate_id("serviceId", item.service_id)?;
            validation::validate_amount("price", item.unit_price)?;
        }

        self.totals.validate()
    }

    /// Units requested per article, summed across lines.
    ///
    /// The same article on two lines must be checked and debited as one
    /// demand, otherwise each line could pass a check the sum fails.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::cart::{ArticleItem, Cart};
    /// use till_core::Money;
    ///
    /// let cart = Cart {
    ///     article_items: vec![
    ///         ArticleItem { article_id: 1, quantity: 2, unit_price: Money::from_cents(100) },
    ///         ArticleItem { article_id: 1, quantity: 1, unit_price: Money::from_cents(100) },
    ///     ],
    ///     ..Default::default()
    /// };
    /// assert_eq!(cart.article_demand().get(&1), Some(&3));
    /// ```
    pub fn article_demand(&self) -> BTreeMap<i64, i64> {
        let mut demand = BTreeMap::new();
        for item in &self.article_items {
            *demand.entry(item.article_id).or_insert(0) += item.quantity;
        }
        demand
    }

    /// Revenue recorded on the sale header.
    pub fn revenue(&self) -> Money {
        self.totals.revenue()
    }
}

fn deserialize_sale_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => validation::parse_sale_date(&raw)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
