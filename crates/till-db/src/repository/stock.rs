//! # Stock Ledger
//!
//! The only code path that changes an article's quantity after creation.
//!
//! ## Conditional Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why not read-then-write?                             │
//! │                                                                         │
//! │  ❌ Read-then-write (two callers, quantity = 1)                         │
//! │     A: SELECT quantity → 1        B: SELECT quantity → 1               │
//! │     A: UPDATE quantity = 0        B: UPDATE quantity = 0               │
//! │     Two units sold, one on the shelf.                                  │
//! │                                                                         │
//! │  ✅ One statement, check and write together                            │
//! │     UPDATE articles SET quantity = quantity + :delta                   │
//! │     WHERE id = :id AND quantity + :delta >= 0                          │
//! │     RETURNING quantity                                                 │
//! │                                                                         │
//! │     A: row returned → 0           B: no row → InsufficientStock        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When no row comes back, a follow-up read tells `NotFound` apart from
//! `InsufficientStock`. That read only shapes the error; it never decides
//! whether the write happens.

use std::collections::BTreeMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use till_core::{stock, validation, StockLevel};

/// Repository enforcing `quantity >= 0` for every article.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Adds `delta` (positive restock, negative removal) to an article.
    ///
    /// ## Returns
    /// * `Ok(StockLevel)` - the new quantity
    /// * `Err(DbError::NotFound)` - unknown article
    /// * `Err(DbError::Domain(InsufficientStock))` - would go negative, nothing written
    /// * `Err(DbError::Domain(Validation))` - `|delta|` above `MAX_STOCK_DELTA`
    ///
    /// A zero delta writes nothing and returns the current quantity.
    pub async fn adjust(&self, article_id: i64, delta: i64) -> DbResult<StockLevel> {
        validation::validate_delta(delta)?;
        debug!(article_id, delta, "Adjusting stock");

        let mut conn = self.pool.acquire().await?;

        let quantity = if delta == 0 {
            current_quantity(&mut conn, article_id)
                .await?
                .map(|(_, quantity)| quantity)
                .ok_or_else(|| DbError::not_found("Article", article_id))?
        } else {
            apply(&mut conn, article_id, delta).await?
        };

        info!(article_id, delta, quantity, "Stock adjusted");
        Ok(StockLevel {
            id: article_id,
            quantity,
        })
    }

    /// Checks that every article in `demand` exists and has enough units.
    ///
    /// Writes nothing. Used before a sale transaction begins so that the
    /// common rejection never opens a write transaction; the debits inside
    /// the transaction still re-check atomically.
    pub async fn check(&self, demand: &BTreeMap<i64, i64>) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;

        for (&article_id, &requested) in demand {
            let (name, available) = current_quantity(&mut conn, article_id)
                .await?
                .ok_or_else(|| DbError::not_found("Article", article_id))?;

            if let Err(err) = stock::ensure_available(article_id, &name, available, requested) {
                warn!(article_id, available, requested, "Stock check failed");
                return Err(err.into());
            }
        }

        Ok(())
    }

    /// Removes `units` from an article on an open connection or transaction.
    ///
    /// Returns the new quantity. Sale recording and service use call this
    /// inside their transaction so the debit commits or rolls back with the
    /// sale rows.
    pub async fn debit(conn: &mut SqliteConnection, article_id: i64, units: i64) -> DbResult<i64> {
        apply(conn, article_id, -units).await
    }
}

/// Runs the conditional update, explaining a rejection.
async fn apply(conn: &mut SqliteConnection, article_id: i64, delta: i64) -> DbResult<i64> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE articles
        SET quantity = quantity + ?2
        WHERE id = ?1 AND quantity + ?2 >= 0
        RETURNING quantity
        "#,
    )
    .bind(article_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(quantity) = updated {
        return Ok(quantity);
    }

    match current_quantity(conn, article_id).await? {
        None => Err(DbError::not_found("Article", article_id)),
        Some((name, available)) => {
            warn!(article_id, available, delta, "Stock change rejected");
            Err(stock::insufficient(article_id, &name, available, -delta).into())
        }
    }
}

async fn current_quantity(
    conn: &mut SqliteConnection,
    article_id: i64,
) -> DbResult<Option<(String, i64)>> {
    let row: Option<(String, i64)> =
        sqlx::query_as("SELECT name, quantity FROM articles WHERE id = ?1")
            .bind(article_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDb;
    use crate::{Database, DbConfig};
    use till_core::{CoreError, Money, NewArticle, ValidationError};

    async fn setup(quantity: i64) -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = add_article(&db, quantity).await;
        (db, id)
    }

    async fn add_article(db: &Database, quantity: i64) -> i64 {
        db.articles()
            .insert(
                &NewArticle {
                    name: "Shampoo".to_string(),
                    price: Money::from_cents(1000),
                    quantity,
                    category: None,
                },
                "outros",
            )
            .await
            .unwrap()
            .id
    }

    async fn quantity_of(db: &Database, id: i64) -> i64 {
        db.articles().get(id).await.unwrap().quantity
    }

    #[tokio::test]
    async fn test_adjust_up_and_down() {
        let (db, id) = setup(5).await;

        assert_eq!(db.stock().adjust(id, 3).await.unwrap().quantity, 8);
        assert_eq!(db.stock().adjust(id, -8).await.unwrap().quantity, 0);
        assert_eq!(quantity_of(&db, id).await, 0);
    }

    #[tokio::test]
    async fn test_adjust_rejects_negative_result() {
        let (db, id) = setup(2).await;

        let err = db.stock().adjust(id, -3).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                article_id,
                available,
                requested,
                ..
            }) => {
                assert_eq!(article_id, id);
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(quantity_of(&db, id).await, 2);
    }

    #[tokio::test]
    async fn test_zero_delta_is_noop() {
        let (db, id) = setup(4).await;
        let level = db.stock().adjust(id, 0).await.unwrap();
        assert_eq!(level, StockLevel { id, quantity: 4 });
    }

    #[tokio::test]
    async fn test_unknown_article() {
        let (db, _) = setup(1).await;

        assert!(matches!(
            db.stock().adjust(404, -1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.stock().adjust(404, 0).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.stock().adjust(404, 5).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_delta_is_rejected() {
        let (db, id) = setup(1).await;

        for delta in [i64::MAX, i64::MIN, till_core::MAX_STOCK_DELTA + 1] {
            let err = db.stock().adjust(id, delta).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
                ),
                "delta {delta}: {err:?}"
            );
        }

        assert_eq!(quantity_of(&db, id).await, 1);
        assert_eq!(db.stock().adjust(id, -1).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_overflowing_quantity_violates_schema() {
        let (db, id) = setup(1).await;

        // Bypasses the ledger: SQLite would store the overflowed sum as REAL
        let err = sqlx::query("UPDATE articles SET quantity = quantity + ?2 WHERE id = ?1")
            .bind(id)
            .bind(i64::MAX)
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();

        assert!(matches!(err, DbError::CheckViolation { .. }), "{err:?}");
        assert_eq!(quantity_of(&db, id).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_of_last_unit() {
        let temp = TempDb::open(5).await;
        let id = add_article(&temp.db, 1).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = temp.db.stock();
                tokio::spawn(async move { ledger.adjust(id, -1).await })
            })
            .collect();

        let mut successes = 0;
        let mut shortfalls = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(level) => {
                    assert_eq!(level.quantity, 0);
                    successes += 1;
                }
                Err(e) if e.is_insufficient_stock() => shortfalls += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(shortfalls, 7);
        assert_eq!(quantity_of(&temp.db, id).await, 0);
    }

    #[tokio::test]
    async fn test_check_demand() {
        let (db, id) = setup(3).await;

        let mut demand = BTreeMap::new();
        demand.insert(id, 3);
        assert!(db.stock().check(&demand).await.is_ok());

        demand.insert(id, 4);
        assert!(db.stock().check(&demand).await.unwrap_err().is_insufficient_stock());

        demand.clear();
        demand.insert(77, 1);
        assert!(matches!(
            db.stock().check(&demand).await,
            Err(DbError::NotFound { .. })
        ));

        assert_eq!(quantity_of(&db, id).await, 3);
    }
}
