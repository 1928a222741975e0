//! # Repository Module
//!
//! Database repository implementations for Till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(&cart)                                 │
//! │       ▼                                                                 │
//! │  SaleRepository ──uses──► StockLedger::debit (same transaction)        │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ArticleRepository`](articles::ArticleRepository) - Article CRUD
//! - [`ServiceRepository`](services::ServiceRepository) - Services and recipes
//! - [`StockLedger`](stock::StockLedger) - The only writer of article quantities
//! - [`SaleRepository`](sales::SaleRepository) - Sale recorder and service use
//! - [`SalesReportRepository`](reports::SalesReportRepository) - Aggregations

pub mod articles;
pub mod reports;
pub mod sales;
pub mod services;
pub mod stock;
