//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Article      │   │    Service      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  recipe links   │   │  id             │       │
//! │  │  name           │   │  name           │   │  totals (Money) │       │
//! │  │  quantity >= 0  │   │  price          │   │  date           │       │
//! │  │  price          │   │  category       │   │  service_id?    │       │
//! │  └────────▲────────┘   └────────▲────────┘   └────────┬────────┘       │
//! │           │                     │                     │                 │
//! │  ┌────────┴────────┐   ┌────────┴────────┐            │                 │
//! │  │  ArticleLine    │   │  ServiceLine    │◄───────────┘                 │
//! │  │  qty + price    │   │  price          │   lines captured at sale     │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are SQLite `INTEGER PRIMARY KEY` values. JSON uses camelCase
//! keys and [`Money`] serializes as a decimal number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Article
// =============================================================================

/// A physical inventory item with a tracked quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Article {
    pub id: i64,

    /// Display name shown on the register.
    pub name: String,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Current unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    pub category: String,
}

/// Input for creating an article.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewArticle {
    pub name: String,
    pub price: Money,

    /// Opening stock. Required, zero allowed.
    pub quantity: i64,

    /// Falls back to the configured default category when absent.
    #[serde(default)]
    pub category: Option<String>,
}

/// Quantity of an article after a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockLevel {
    pub id: i64,
    pub quantity: i64,
}

// =============================================================================
// Service
// =============================================================================

/// A sellable offering with a fixed price.
///
/// A service may carry a recipe: a set of articles, one unit of each being
/// consumed whenever the service is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Service {
    pub id: i64,
    pub name: String,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    pub category: String,
}

/// Input for creating a service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewService {
    pub name: String,
    pub price: Money,

    #[serde(default)]
    pub category: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded checkout. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: i64,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_price_cents"))]
    pub total_price: Money,

    /// Change handed back to the customer.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "exchange_cents"))]
    pub exchange: Money,

    /// Cash retained: `payment_cash - exchange`.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "revenue_cents"))]
    pub revenue: Money,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "payment_card_cents"))]
    pub payment_card: Money,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "payment_cash_cents"))]
    pub payment_cash: Money,

    /// Free-form label chosen by the register (e.g. "percent", "fixed").
    pub discount_type: Option<String>,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "discount_value_cents"))]
    pub discount_value: Money,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Set only on sales created by using a service.
    pub service_id: Option<i64>,
}

/// An article line of a sale, joined with the article name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleLine {
    #[serde(skip)]
    #[ts(skip)]
    pub sale_id: i64,

    pub article_id: i64,
    pub name: String,
    pub quantity: i64,

    /// Unit price captured at sale time.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,
}

/// A service line of a sale, joined with the service name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceLine {
    #[serde(skip)]
    #[ts(skip)]
    pub sale_id: i64,

    pub service_id: i64,
    pub name: String,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,
}

/// A sale with its joined line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub articles: Vec<ArticleLine>,
    pub services: Vec<ServiceLine>,
}

/// Identifier of a freshly recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: i64,
}

// =============================================================================
// Reports
// =============================================================================

/// Sums over the sales of one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyTotals {
    pub total_revenue: Money,
    pub total_payment_card: Money,
    pub total_payment_cash: Money,
    pub total_total_price: Money,
}

/// All sales of one day with their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySales {
    pub sales: Vec<SaleDetail>,
    pub totals: DailyTotals,
}

/// Sums over every sale in an inclusive day range. Zero when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RangeTotals {
    pub total_price: Money,
    pub revenue: Money,
    pub payment_card: Money,
    pub payment_cash: Money,
    pub total_discount: Money,
}

/// Sales of a trailing window ending now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub days: u32,
    pub sales: Vec<SaleDetail>,
}

/// Sum of current service prices over every service use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceRevenue {
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
