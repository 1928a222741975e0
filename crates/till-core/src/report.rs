//! # Report Rules
//!
//! Pure pieces of the sales reports: which trailing window a summary
//! covers, how day ranges are validated, how line items are attached to
//! their sales and how daily totals are folded.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ArticleLine, DailyTotals, Sale, SaleDetail, ServiceLine};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Summary Window
// =============================================================================

/// Trailing window of a sales summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryWindow {
    #[default]
    Week,
    Month,
}

impl SummaryWindow {
    /// Reads the `days` query parameter.
    ///
    /// Only `7` and `30` are meaningful; anything else, including a missing
    /// or unparsable value, falls back to the 7-day window.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::SummaryWindow;
    ///
    /// assert_eq!(SummaryWindow::from_param(Some("30")).days(), 30);
    /// assert_eq!(SummaryWindow::from_param(Some("15")).days(), 7);
    /// assert_eq!(SummaryWindow::from_param(None).days(), 7);
    /// ```
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim).and_then(|s| s.parse::<u32>().ok()) {
            Some(30) => SummaryWindow::Month,
            _ => SummaryWindow::Week,
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            SummaryWindow::Week => 7,
            SummaryWindow::Month => 30,
        }
    }

    /// Start of the window ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days()))
    }
}

// =============================================================================
// Day Ranges
// =============================================================================

/// Parses and checks an inclusive `start..=end` day range.
pub fn parse_range(start: &str, end: &str) -> ValidationResult<(NaiveDate, NaiveDate)> {
    let start = validation::parse_day("start", start)?;
    let end = validation::parse_day("end", end)?;

    if start > end {
        return Err(ValidationError::invalid_format(
            "start",
            format!("{start} is after end {end}"),
        ));
    }

    Ok((start, end))
}

// =============================================================================
// Folding
// =============================================================================

/// Attaches line items to their sales, keeping the order of `sales`.
///
/// Lines keep their relative order within each sale. Lines whose sale is
/// not in `sales` are dropped.
pub fn attach_lines(
    sales: Vec<Sale>,
    articles: Vec<ArticleLine>,
    services: Vec<ServiceLine>,
) -> Vec<SaleDetail> {
    let mut article_lines: HashMap<i64, Vec<ArticleLine>> = HashMap::new();
    for line in articles {
        article_lines.entry(line.sale_id).or_default().push(line);
    }

    let mut service_lines: HashMap<i64, Vec<ServiceLine>> = HashMap::new();
    for line in services {
        service_lines.entry(line.sale_id).or_default().push(line);
    }

    sales
        .into_iter()
        .map(|sale| SaleDetail {
            articles: article_lines.remove(&sale.id).unwrap_or_default(),
            services: service_lines.remove(&sale.id).unwrap_or_default(),
            sale,
        })
        .collect()
}

/// Sums the day totals over a set of sales.
pub fn daily_totals<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> DailyTotals {
    sales
        .into_iter()
        .fold(DailyTotals::default(), |mut totals, sale| {
            totals.total_revenue += sale.revenue;
            totals.total_payment_card += sale.payment_card;
            totals.total_payment_cash += sale.payment_cash;
            totals.total_total_price += sale.total_price;
            totals
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
