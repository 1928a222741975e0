//! # Article Routes
//!
//! Listing and creating articles, and the stock adjustment endpoint.
//! Adjustments go through the stock ledger, so a removal larger than the
//! shelf answers 400 and leaves the quantity alone.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use till_core::{Article, NewArticle, StockLevel};

/// `?category=` filter shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStock {
    pub delta: i64,
}

pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let Query(query) = query?;

    let articles = state.db.articles().list(query.category.as_deref()).await?;
    debug!(count = articles.len(), "Articles listed");

    Ok(Json(articles))
}

pub async fn create_article(
    State(state): State<AppState>,
    payload: Result<Json<NewArticle>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let Json(article) = payload?;

    let created = state
        .db
        .articles()
        .insert(&article, &state.default_category)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AdjustStock>, JsonRejection>,
) -> Result<Json<StockLevel>, ApiError> {
    let Path(id) = id?;
    let Json(AdjustStock { delta }) = payload?;

    let level = state.db.stock().adjust(id, delta).await?;
    info!(article_id = id, delta, quantity = level.quantity, "Stock adjustment applied");

    Ok(Json(level))
}
