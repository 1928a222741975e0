//! # HTTP Routes
//!
//! Every endpoint the register frontend calls.
//!
//! ## Route Organization
//! ```text
//! routes/
//! ├── mod.rs       ◄─── You are here (router, health)
//! ├── articles.rs  ◄─── Article listing, creation, stock adjustment
//! ├── services.rs  ◄─── Services, recipes, service use, service revenue
//! └── sales.rs     ◄─── Checkout and sales reports
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client                                                                 │
//! │    │  POST /api/sales  {articleItems, serviceItems, totalPrice, ...}   │
//! │    ▼                                                                    │
//! │  TraceLayer ─► CorsLayer ─► Router                                     │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  async fn record_sale(                                                  │
//! │      State(state): State<AppState>,    ◄── Database handle             │
//! │      payload: Result<Json<Cart>, _>,   ◄── Rejection becomes ApiError  │
//! │  ) -> Result<(StatusCode, Json<SaleReceipt>), ApiError>                 │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  201 {"saleId": 42}   or   400/404/500 {"code": ..., "message": ...}   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod articles;
pub mod sales;
pub mod services;

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    router(state, CorsLayer::permissive())
}

/// Builds the router with an explicit CORS policy.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Articles
        .route(
            "/api/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route("/api/articles/{id}/adjust", post(articles::adjust_stock))
        // Inventory view of the same data
        .route("/api/inventory", get(articles::list_articles))
        .route("/api/inventory/{id}/adjust", post(articles::adjust_stock))
        // Services
        .route(
            "/api/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/api/services/revenue/total",
            get(services::service_revenue_total),
        )
        .route(
            "/api/services/{id}/articles",
            get(services::service_recipe),
        )
        .route(
            "/api/services/{id}/articles/{article_id}",
            put(services::link_article),
        )
        .route("/api/services/{id}/use", post(services::use_service))
        // Sales
        .route("/api/sales", post(sales::record_sale))
        .route("/api/sales-summary", get(sales::sales_summary))
        .route("/api/sales/by-date/details", get(sales::sales_by_date))
        .route("/api/sales/by-date-range", get(sales::sales_by_range))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let healthy = state.db.health_check().await;

    Json(Health {
        status: if healthy { "ok" } else { "degraded" },
        database: if healthy { "connected" } else { "unavailable" },
    })
}
