//! # Till Server
//!
//! JSON HTTP API over the Till database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till Server                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Articles      │  │  Services      │  │  Sales                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • list/create  │  │ • list/create  │  │ • record (checkout)        ││
//! │  │ • adjust stock │  │ • recipes      │  │ • summary (7/30 days)      ││
//! │  │                │  │ • use          │  │ • by date / by range       ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │                              ▼                                          │
//! │                  AppState { db: Database, ... }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is honoured):
//! - `TILL_HOST` - bind address (default: 0.0.0.0)
//! - `TILL_PORT` - HTTP port (default: 3000)
//! - `TILL_DB_PATH` - SQLite file (default: ./till.db)
//! - `TILL_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `TILL_DEFAULT_CATEGORY` - category for uncategorised items (default: outros)
//! - `TILL_CORS_ALLOW_ANY` - permissive CORS (default: true)
//! - `RUST_LOG` - log filter

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use routes::app;
pub use state::AppState;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,till=debug,sqlx=warn,tower_http=debug";

/// Installs the global tracing subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
