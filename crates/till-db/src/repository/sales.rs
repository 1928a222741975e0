//! # Sale Repository
//!
//! Records sales. Two entry points write sales, both all-or-nothing:
//!
//! ## Sale Recorder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(cart)                                                      │
//! │                                                                         │
//! │  1. cart.validate()                 pure rules, nothing written         │
//! │  2. StockLedger::check(demand)      read-only pre-check                 │
//! │  3. BEGIN                                                               │
//! │     ├── debit each article          conditional UPDATE (first write)    │
//! │     ├── INSERT sales                header, revenue = cash - exchange   │
//! │     ├── INSERT sales_articles       one row per cart line               │
//! │     └── INSERT sales_services       one row per cart line               │
//! │  4. COMMIT                                                              │
//! │                                                                         │
//! │  Any `?` inside step 3 drops the transaction → ROLLBACK                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Service Use
//! ```text
//! use_service(id) → recipe pre-check → BEGIN → debit 1 of each article
//!                 → INSERT sales (service_id set, money fields 0) → COMMIT
//! ```
//!
//! Debits run first inside the transaction so the transaction takes
//! SQLite's write lock on its first statement. Concurrent checkouts then
//! queue on the busy timeout instead of failing on a stale read snapshot.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::services::ServiceRepository;
use crate::repository::stock::StockLedger;
use till_core::{stock, Cart, Money, Sale};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

/// Header values written to the `sales` table.
struct SaleHeader<'a> {
    total_price: Money,
    exchange: Money,
    revenue: Money,
    payment_card: Money,
    payment_cash: Money,
    discount_type: Option<&'a str>,
    discount_value: Money,
    date: DateTime<Utc>,
    service_id: Option<i64>,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a checkout atomically and returns the new sale id.
    ///
    /// ## Errors
    /// * `Domain(..)` - cart rules or insufficient stock
    /// * `NotFound` - an article id does not exist
    /// * `ForeignKeyViolation` - a service id does not exist
    ///
    /// Every error leaves the database unchanged.
    pub async fn record_sale(&self, cart: &Cart) -> DbResult<i64> {
        cart.validate()?;

        let demand = cart.article_demand();
        StockLedger::new(self.pool.clone()).check(&demand).await?;

        let discount_type = till_core::validation::validate_discount_type(
            cart.totals.discount_type.as_deref(),
        )?;
        let header = SaleHeader {
            total_price: cart.totals.total_price,
            exchange: cart.totals.exchange,
            revenue: cart.revenue(),
            payment_card: cart.totals.payment_card,
            payment_cash: cart.totals.payment_cash,
            discount_type: discount_type.as_deref(),
            discount_value: cart.totals.discount_value,
            date: cart.date.unwrap_or_else(Utc::now),
            service_id: None,
        };

        debug!(
            articles = cart.article_items.len(),
            services = cart.service_items.len(),
            "Recording sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        for (&article_id, &units) in &demand {
            StockLedger::debit(&mut tx, article_id, units).await?;
        }

        let sale_id = insert_header(&mut tx, &header).await?;

        for item in &cart.article_items {
            sqlx::query(
                r#"
                INSERT INTO sales_articles (sale_id, article_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(sale_id)
            .bind(item.article_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        for item in &cart.service_items {
            sqlx::query(
                r#"
                INSERT INTO sales_services (sale_id, service_id, price_cents)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(sale_id)
            .bind(item.service_id)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            sale_id,
            total = %header.total_price,
            revenue = %header.revenue,
            "Sale recorded"
        );
        Ok(sale_id)
    }

    /// Performs a service once: consumes its recipe and records a sale.
    ///
    /// ## Errors
    /// * `NotFound` - unknown service
    /// * `Domain(InsufficientStock)` - a recipe article has no units left
    pub async fn use_service(&self, service_id: i64) -> DbResult<i64> {
        let services = ServiceRepository::new(self.pool.clone());
        let service = services.get(service_id).await?;
        let recipe = services.recipe(service_id).await?;

        for article in &recipe {
            if let Err(err) = stock::ensure_available(article.id, &article.name, article.quantity, 1)
            {
                warn!(service_id, article_id = article.id, "Service recipe out of stock");
                return Err(err.into());
            }
        }

        debug!(service_id, articles = recipe.len(), "Using service");

        let header = SaleHeader {
            total_price: Money::zero(),
            exchange: Money::zero(),
            revenue: Money::zero(),
            payment_card: Money::zero(),
            payment_cash: Money::zero(),
            discount_type: None,
            discount_value: Money::zero(),
            date: Utc::now(),
            service_id: Some(service.id),
        };

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        for article in &recipe {
            StockLedger::debit(&mut tx, article.id, 1).await?;
        }

        let sale_id = insert_header(&mut tx, &header).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(sale_id, service_id, service = %service.name, "Service used");
        Ok(sale_id)
    }

    /// Gets a sale header by ID.
    pub async fn get(&self, id: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, total_price_cents, exchange_cents, revenue_cents,
                   payment_card_cents, payment_cash_cents,
                   discount_type, discount_value_cents, date, service_id
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Counts recorded sales (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_header(conn: &mut SqliteConnection, header: &SaleHeader<'_>) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sales (
            total_price_cents, exchange_cents, revenue_cents,
            payment_card_cents, payment_cash_cents,
            discount_type, discount_value_cents, date, service_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING id
        "#,
    )
    .bind(header.total_price)
    .bind(header.exchange)
    .bind(header.revenue)
    .bind(header.payment_card)
    .bind(header.payment_cash)
    .bind(header.discount_type)
    .bind(header.discount_value)
    .bind(header.date)
    .bind(header.service_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use crate::testing::TempDb;
    use till_core::{
        ArticleItem, CartTotals, CoreError, NewArticle, NewService, ServiceItem, ValidationError,
        MAX_AMOUNT,
    };

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_article(db: &Database, name: &str, quantity: i64) -> i64 {
        db.articles()
            .insert(
                &NewArticle {
                    name: name.to_string(),
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

    async fn add_service(db: &Database, name: &str) -> i64 {
        db.services()
            .insert(
                &NewService {
                    name: name.to_string(),
                    price: Money::from_cents(2500),
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

    async fn line_counts(db: &Database) -> (i64, i64) {
        let articles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_articles")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let services: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_services")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (articles, services)
    }

    fn card_cart(article_id: i64, quantity: i64) -> Cart {
        Cart {
            article_items: vec![ArticleItem {
                article_id,
                quantity,
                unit_price: Money::from_cents(1000),
            }],
            totals: CartTotals {
                total_price: Money::from_cents(1000 * quantity),
                payment_card: Money::from_cents(1000 * quantity),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_record_sale_debits_stock() {
        let db = setup().await;
        let id = add_article(&db, "Shampoo", 5).await;

        let sale_id = db.sales().record_sale(&card_cart(id, 3)).await.unwrap();

        assert_eq!(quantity_of(&db, id).await, 2);
        let sale = db.sales().get(sale_id).await.unwrap();
        assert_eq!(sale.total_price.cents(), 3000);
        assert_eq!(sale.payment_card.cents(), 3000);
        assert!(sale.revenue.is_zero());
        assert_eq!(sale.service_id, None);
        assert_eq!(line_counts(&db).await, (1, 0));
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = setup().await;
        let id = add_article(&db, "Shampoo", 2).await;

        let err = db.sales().record_sale(&card_cart(id, 3)).await.unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(quantity_of(&db, id).await, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(line_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_demand_is_summed_across_lines() {
        let db = setup().await;
        let id = add_article(&db, "Shampoo", 3).await;

        let mut cart = card_cart(id, 2);
        cart.article_items.push(ArticleItem {
            article_id: id,
            quantity: 2,
            unit_price: Money::from_cents(1000),
        });

        assert!(db.sales().record_sale(&cart).await.unwrap_err().is_insufficient_stock());
        assert_eq!(quantity_of(&db, id).await, 3);
    }

    #[tokio::test]
    async fn test_unknown_service_rolls_back_debits() {
        let db = setup().await;
        let id = add_article(&db, "Shampoo", 5).await;

        let mut cart = card_cart(id, 2);
        cart.service_items.push(ServiceItem {
            service_id: 999,
            unit_price: Money::from_cents(500),
        });

        let err = db.sales().record_sale(&cart).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(quantity_of(&db, id).await, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(line_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() {
        let db = setup().await;

        let err = db.sales().record_sale(&card_cart(42, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_cart_rejected() {
        let db = setup().await;

        let err = db.sales().record_sale(&Cart::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CartEmpty)));
    }

    #[tokio::test]
    async fn test_oversized_amount_rejected() {
        let db = setup().await;
        let id = add_article(&db, "Shampoo", 5).await;

        let mut cart = card_cart(id, 1);
        cart.totals.payment_card = Money::from_cents(9_000_000_000_000_000);

        let err = db.sales().record_sale(&cart).await.unwrap_err();
        assert!(
            matches!(
                err,
                DbError::Domain(CoreError::Validation(ValidationError::AmountTooLarge { .. }))
            ),
            "{err:?}"
        );
        assert_eq!(quantity_of(&db, id).await, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        cart.totals.payment_card = MAX_AMOUNT;
        assert!(db.sales().record_sale(&cart).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_of_last_unit() {
        let temp = TempDb::open(5).await;
        let id = add_article(&temp.db, "Shampoo", 1).await;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sales = temp.db.sales();
                tokio::spawn(async move { sales.record_sale(&card_cart(id, 1)).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(e.is_insufficient_stock(), "unexpected error: {e:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(quantity_of(&temp.db, id).await, 0);
        assert_eq!(temp.db.sales().count().await.unwrap(), 1);
        assert_eq!(line_counts(&temp.db).await, (1, 0));
    }

    #[tokio::test]
    async fn test_cash_sale_with_services_and_explicit_date() {
        let db = setup().await;
        let article = add_article(&db, "Gel", 10).await;
        let service = add_service(&db, "Haircut").await;
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();

        let cart = Cart {
            article_items: vec![ArticleItem {
                article_id: article,
                quantity: 1,
                unit_price: Money::from_cents(1000),
            }],
            service_items: vec![ServiceItem {
                service_id: service,
                unit_price: Money::from_cents(2500),
            }],
            totals: CartTotals {
                total_price: Money::from_cents(3500),
                exchange: Money::from_cents(1500),
                payment_cash: Money::from_cents(5000),
                discount_type: Some("fixed".to_string()),
                discount_value: Money::from_cents(200),
                ..Default::default()
            },
            date: Some(date),
        };

        let sale_id = db.sales().record_sale(&cart).await.unwrap();
        let sale = db.sales().get(sale_id).await.unwrap();

        assert_eq!(sale.date, date);
        assert_eq!(sale.revenue.cents(), 3500);
        assert_eq!(sale.exchange.cents(), 1500);
        assert_eq!(sale.discount_type.as_deref(), Some("fixed"));
        assert_eq!(sale.discount_value.cents(), 200);
        assert_eq!(quantity_of(&db, article).await, 9);
        assert_eq!(line_counts(&db).await, (1, 1));
    }

    #[tokio::test]
    async fn test_use_service_consumes_recipe() {
        let db = setup().await;
        let polish = add_article(&db, "Polish", 2).await;
        let pads = add_article(&db, "Cotton pads", 1).await;
        let service = add_service(&db, "Manicure").await;
        db.services().link_article(service, polish).await.unwrap();
        db.services().link_article(service, pads).await.unwrap();

        let sale_id = db.sales().use_service(service).await.unwrap();

        let sale = db.sales().get(sale_id).await.unwrap();
        assert_eq!(sale.service_id, Some(service));
        assert!(sale.total_price.is_zero());
        assert!(sale.revenue.is_zero());
        assert_eq!(quantity_of(&db, polish).await, 1);
        assert_eq!(quantity_of(&db, pads).await, 0);

        // Pads are gone: the second use fails and touches nothing
        let err = db.sales().use_service(service).await.unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(quantity_of(&db, polish).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_use_service_without_recipe() {
        let db = setup().await;
        let service = add_service(&db, "Consultation").await;

        let sale_id = db.sales().use_service(service).await.unwrap();
        assert_eq!(db.sales().get(sale_id).await.unwrap().service_id, Some(service));
    }

    #[tokio::test]
    async fn test_use_unknown_service() {
        let db = setup().await;
        assert!(matches!(
            db.sales().use_service(7).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }
}
