//! # Sale Routes
//!
//! Checkout and the three sales reports.
//!
//! ## Report Parameters
//! ```text
//! ┌──────────────────────────────┬──────────────────────┬───────────────────┐
//! │ Endpoint                     │ Query                │ Bad input         │
//! ├──────────────────────────────┼──────────────────────┼───────────────────┤
//! │ /api/sales-summary           │ days=7|30            │ falls back to 7   │
//! │ /api/sales/by-date/details   │ date=YYYY-MM-DD      │ 400               │
//! │ /api/sales/by-date-range     │ start=..&end=..      │ 400 (also a > b)  │
//! └──────────────────────────────┴──────────────────────┴───────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use till_core::report::parse_range;
use till_core::validation::parse_day;
use till_core::{
    Cart, DailySales, RangeTotals, SaleReceipt, SalesSummary, SummaryWindow, ValidationError,
};

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

pub async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<Cart>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let Json(cart) = payload?;
    debug!(lines = cart.line_count(), "Checkout received");

    let sale_id = state.db.sales().record_sale(&cart).await?;

    Ok((StatusCode::CREATED, Json(SaleReceipt { sale_id })))
}

pub async fn sales_summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SalesSummary>, ApiError> {
    let window = match query {
        Ok(Query(query)) => SummaryWindow::from_param(query.days.as_deref()),
        Err(_) => SummaryWindow::default(),
    };

    Ok(Json(state.db.reports().sales_summary(window).await?))
}

pub async fn sales_by_date(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<DailySales>, ApiError> {
    let Query(query) = query?;
    let raw = required("date", query.date.as_deref())?;
    let day = parse_day("date", raw)?;

    Ok(Json(state.db.reports().sales_by_date(day).await?))
}

pub async fn sales_by_range(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<RangeTotals>, ApiError> {
    let Query(query) = query?;
    let start = required("start", query.start.as_deref())?;
    let end = required("end", query.end.as_deref())?;
    let (start, end) = parse_range(start, end)?;

    Ok(Json(state.db.reports().sales_by_range(start, end).await?))
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}
