//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState (Clone)                                                       │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────────────────────────┐    │
//! │  │ db: Database         │   │ default_category: Arc<str>          │    │
//! │  │ SqlitePool inside,   │   │ read-only after startup             │    │
//! │  │ clones share it      │   │                                     │    │
//! │  └──────────────────────┘   └─────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use till_db::Database;

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub default_category: Arc<str>,
}

impl AppState {
    pub fn new(db: Database, default_category: impl Into<Arc<str>>) -> Self {
        AppState {
            db,
            default_category: default_category.into(),
        }
    }

    pub fn from_config(db: Database, config: &ServerConfig) -> Self {
        AppState::new(db, config.default_category.as_str())
    }
}
