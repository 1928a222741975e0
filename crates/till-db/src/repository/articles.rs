//! # Article Repository
//!
//! Database operations for inventory articles.
//!
//! Quantities are written here only when an article is created. Every later
//! change goes through [`StockLedger`](super::stock::StockLedger).

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use till_core::validation;
use till_core::{Article, NewArticle};

/// Repository for article database operations.
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    /// Creates a new ArticleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ArticleRepository { pool }
    }

    /// Lists articles, optionally restricted to one category.
    pub async fn list(&self, category: Option<&str>) -> DbResult<Vec<Article>> {
        debug!(category = ?category, "Listing articles");

        let articles = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => {
                sqlx::query_as::<_, Article>(
                    r#"
                    SELECT id, name, quantity, price_cents, category
                    FROM articles
                    WHERE category = ?1
                    ORDER BY name, id
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Article>(
                    r#"
                    SELECT id, name, quantity, price_cents, category
                    FROM articles
                    ORDER BY name, id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = articles.len(), "Listed articles");
        Ok(articles)
    }

    /// Gets an article by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Article))` - Article found
    /// * `Ok(None)` - Article not found
    pub async fn find(&self, id: i64) -> DbResult<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, name, quantity, price_cents, category
            FROM articles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    /// Gets an article by its ID, failing with `NotFound` when absent.
    pub async fn get(&self, id: i64) -> DbResult<Article> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Article", id))
    }

    /// Inserts a new article.
    ///
    /// ## Validation
    /// - name: required, at most 200 characters
    /// - price and opening quantity: not negative
    /// - category: blank or missing becomes `default_category`
    pub async fn insert(&self, article: &NewArticle, default_category: &str) -> DbResult<Article> {
        let name = validation::validate_name(&article.name)?;
        validation::validate_amount("price", article.price)?;
        validation::validate_stock_quantity(article.quantity)?;
        let category = validation::resolve_category(article.category.as_deref(), default_category)?;

        debug!(name = %name, category = %category, "Inserting article");

        let inserted = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (name, quantity, price_cents, category)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, quantity, price_cents, category
            "#,
        )
        .bind(&name)
        .bind(article.quantity)
        .bind(article.price)
        .bind(&category)
        .fetch_one(&self.pool)
        .await?;

        info!(id = inserted.id, name = %inserted.name, "Article created");
        Ok(inserted)
    }

    /// Counts articles (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
