//! # till-db: Database Layer for Till
//!
//! SQLite persistence for articles, services, stock and sales, using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ ArticleRepo    │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ ServiceRepo    │   │ 001_initial  │   │   │
//! │  │   │ WAL + FKs     │    │ StockLedger    │   │ _schema.sql  │   │   │
//! │  │   │               │    │ SaleRepo       │   │              │   │   │
//! │  │   │               │    │ SalesReportRepo│   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (TILL_DB_PATH, default ./till.db)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./till.db")).await?;
//!
//! let level = db.stock().adjust(article_id, -2).await?;
//! let sale_id = db.sales().record_sale(&cart).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::articles::ArticleRepository;
pub use repository::reports::SalesReportRepository;
pub use repository::sales::SaleRepository;
pub use repository::services::ServiceRepository;
pub use repository::stock::StockLedger;
