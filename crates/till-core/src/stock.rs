//! # Stock Rules
//!
//! The invariant every quantity change obeys: an article's quantity never
//! goes below zero. `till-db` enforces it with a conditional `UPDATE`; these
//! functions state the same rule for pre-checks and error reporting.
//!
//! ```text
//! current + delta >= 0  → new quantity
//! current + delta <  0  → InsufficientStock, nothing written
//! ```

use crate::error::{CoreError, CoreResult};

/// Applies `delta` to `current`.
///
/// Returns `None` when the result would be negative or overflow.
///
/// ## Example
/// ```rust
/// use till_core::stock::apply_delta;
///
/// assert_eq!(apply_delta(5, -3), Some(2));
/// assert_eq!(apply_delta(0, 0), Some(0));
/// assert_eq!(apply_delta(2, -3), None);
/// ```
#[inline]
pub fn apply_delta(current: i64, delta: i64) -> Option<i64> {
    current.checked_add(delta).filter(|q| *q >= 0)
}

/// Fails with `InsufficientStock` when `requested` units are not on hand.
pub fn ensure_available(
    article_id: i64,
    name: &str,
    available: i64,
    requested: i64,
) -> CoreResult<()> {
    if apply_delta(available, -requested).is_none() {
        return Err(insufficient(article_id, name, available, requested));
    }

    Ok(())
}

/// Builds the error reported for a rejected debit.
pub fn insufficient(article_id: i64, name: &str, available: i64, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        article_id,
        name: name.to_string(),
        available,
        requested,
    }
}
