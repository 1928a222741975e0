//! # Service Routes
//!
//! ```text
//! GET  /api/services?category=             list
//! POST /api/services                       create
//! GET  /api/services/{id}/articles         recipe
//! PUT  /api/services/{id}/articles/{aid}   add article to recipe
//! POST /api/services/{id}/use              consume recipe, record sale
//! GET  /api/services/revenue/total         sum over service uses
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::routes::articles::CategoryQuery;
use crate::state::AppState;
use till_core::{Article, NewService, SaleReceipt, Service, ServiceRevenue};

pub async fn list_services(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let Query(query) = query?;
    let services = state.db.services().list(query.category.as_deref()).await?;
    Ok(Json(services))
}

pub async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<NewService>, JsonRejection>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let Json(service) = payload?;

    let created = state
        .db
        .services()
        .insert(&service, &state.default_category)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn service_recipe(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.db.services().recipe(id).await?))
}

pub async fn link_article(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let Path((service_id, article_id)) = ids?;

    let recipe = state
        .db
        .services()
        .link_article(service_id, article_id)
        .await?;

    Ok(Json(recipe))
}

pub async fn use_service(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let Path(id) = id?;

    let sale_id = state.db.sales().use_service(id).await?;

    Ok((StatusCode::CREATED, Json(SaleReceipt { sale_id })))
}

pub async fn service_revenue_total(
    State(state): State<AppState>,
) -> Result<Json<ServiceRevenue>, ApiError> {
    Ok(Json(state.db.reports().service_revenue_total().await?))
}
