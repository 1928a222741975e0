//! # Validation Module
//!
//! Input validation utilities for Till.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  └── Type validation (JSON / query deserialization)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, categories, prices, quantities                             │
//! │  └── Dates and day ranges                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{parse_day, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(parse_day("date", "2024-05-01").is_ok());
//! assert!(parse_day("date", "01/05/2024").is_err());
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::{DEFAULT_CATEGORY, MAX_AMOUNT, MAX_ITEM_QUANTITY, MAX_STOCK_DELTA};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted article or service name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted category or discount label.
pub const MAX_LABEL_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an article or service name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Resolves the category of a new article or service.
///
/// A missing or blank category becomes `default` (normally
/// [`DEFAULT_CATEGORY`]).
///
/// ## Example
/// ```rust
/// use till_core::validation::resolve_category;
///
/// assert_eq!(resolve_category(None, "outros").unwrap(), "outros");
/// assert_eq!(resolve_category(Some(" hair "), "outros").unwrap(), "hair");
/// ```
pub fn resolve_category(category: Option<&str>, default: &str) -> ValidationResult<String> {
    let category = category.map(str::trim).unwrap_or_default();

    if category.is_empty() {
        let default = default.trim();
        return Ok(if default.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            default.to_string()
        });
    }

    validate_label("category", category)?;
    Ok(category.to_string())
}

/// Validates an optional discount label.
///
/// ## Returns
/// The trimmed label, or `None` when absent or blank.
pub fn validate_discount_type(label: Option<&str>) -> ValidationResult<Option<String>> {
    match label.map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => {
            validate_label("discountType", label)?;
            Ok(Some(label.to_string()))
        }
    }
}

fn validate_label(field: &str, label: &str) -> ValidationResult<()> {
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_LABEL_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the opening stock of a new article (zero allowed).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_STOCK_DELTA {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_STOCK_DELTA,
        });
    }

    Ok(())
}

/// Validates a manual stock adjustment.
///
/// ## Rules
/// - `|delta| <= MAX_STOCK_DELTA`
///
/// Zero is accepted and means "read the current level".
pub fn validate_delta(delta: i64) -> ValidationResult<()> {
    if delta.checked_abs().map_or(true, |abs| abs > MAX_STOCK_DELTA) {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_STOCK_DELTA,
            max: MAX_STOCK_DELTA,
        });
    }

    Ok(())
}

/// Validates a monetary amount: not negative, at most [`MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_cents(0)).is_ok());
/// assert!(validate_amount("price", Money::from_cents(-1)).is_err());
/// assert!(validate_amount("price", Money::from_cents(i64::MAX / 2)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

/// Validates an entity identifier taken from a path or body.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a calendar day in `YYYY-MM-DD` form.
pub fn parse_day(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

/// Parses an explicit sale date.
///
/// ## Accepted Forms
/// ```text
/// 2024-05-01T14:30:00Z          RFC 3339 (any offset, converted to UTC)
/// 2024-05-01T14:30:00[.fff]     naive, read as UTC
/// 2024-05-01 14:30:00[.fff]     naive, read as UTC
/// 2024-05-01                    midnight UTC
/// ```
pub fn parse_sale_date(raw: &str) -> ValidationResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(ValidationError::invalid_format(
        "date",
        "expected an ISO-8601 date or date-time",
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
