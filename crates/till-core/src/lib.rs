//! # till-core: Pure Business Logic for Till
//!
//! This crate holds the rules of the point of sale as pure functions with
//! zero I/O dependencies. The database layer (`till-db`) enforces them
//! inside SQL statements and transactions; this crate states them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (till-server)                       │   │
//! │  │   /api/articles  /api/services  /api/sales  /api/sales-summary  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │  stock  │ │ report  │  │   │
//! │  │   │ Article │ │  Money  │ │  Cart   │ │ ledger  │ │ windows │  │   │
//! │  │   │  Sale   │ │ (cents) │ │ totals  │ │  rules  │ │ totals  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │        SQLite repositories, stock ledger, sale recorder         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Article, Service, Sale, report payloads)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Checkout cart, its validation and revenue rule
//! - [`stock`] - Non-negative quantity rules shared by every stock change
//! - [`report`] - Report windows and totals folding
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//! use till_core::stock::apply_delta;
//!
//! let price = Money::from_cents(1050); // 10.50
//! assert_eq!((price * 3_i64).cents(), 3150);
//!
//! // Stock never goes below zero
//! assert_eq!(apply_delta(5, -3), Some(2));
//! assert_eq!(apply_delta(2, -3), None);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{ArticleItem, Cart, CartTotals, ServiceItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::SummaryWindow;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category assigned to articles and services created without one.
pub const DEFAULT_CATEGORY: &str = "outros";

/// Maximum line items (articles + services) allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the sale transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single article line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest single stock change, and largest opening stock of an article.
///
/// Keeps `quantity + delta` far from `i64` overflow, where SQLite would
/// silently promote the column to REAL.
pub const MAX_STOCK_DELTA: i64 = 1_000_000;

/// Largest accepted amount in any money field: one million per value.
///
/// Report sums over billions of sales still fit in `i64` cents.
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000);
