//! # Service Repository
//!
//! Database operations for services and their article recipes.
//!
//! ## Recipes
//! ```text
//! services ──< service_articles >── articles
//!
//! "Manicure" ─┬─ "Polish"        Using the service once consumes
//!             └─ "Cotton pads"   one unit of every linked article.
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use till_core::validation;
use till_core::{Article, NewService, Service};

/// Repository for service database operations.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    /// Creates a new ServiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    /// Lists services, optionally restricted to one category.
    pub async fn list(&self, category: Option<&str>) -> DbResult<Vec<Service>> {
        debug!(category = ?category, "Listing services");

        let services = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => {
                sqlx::query_as::<_, Service>(
                    r#"
                    SELECT id, name, price_cents, category
                    FROM services
                    WHERE category = ?1
                    ORDER BY name, id
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Service>(
                    r#"
                    SELECT id, name, price_cents, category
                    FROM services
                    ORDER BY name, id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(services)
    }

    /// Gets a service by its ID.
    pub async fn find(&self, id: i64) -> DbResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, price_cents, category
            FROM services
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    /// Gets a service by its ID, failing with `NotFound` when absent.
    pub async fn get(&self, id: i64) -> DbResult<Service> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Service", id))
    }

    /// Inserts a new service.
    pub async fn insert(&self, service: &NewService, default_category: &str) -> DbResult<Service> {
        let name = validation::validate_name(&service.name)?;
        validation::validate_amount("price", service.price)?;
        let category = validation::resolve_category(service.category.as_deref(), default_category)?;

        debug!(name = %name, category = %category, "Inserting service");

        let inserted = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, price_cents, category)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, price_cents, category
            "#,
        )
        .bind(&name)
        .bind(service.price)
        .bind(&category)
        .fetch_one(&self.pool)
        .await?;

        info!(id = inserted.id, name = %inserted.name, "Service created");
        Ok(inserted)
    }

    /// Adds an article to a service's recipe and returns the full recipe.
    ///
    /// Linking an article twice is a no-op.
    pub async fn link_article(&self, service_id: i64, article_id: i64) -> DbResult<Vec<Article>> {
        self.get(service_id).await?;

        let article_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM articles WHERE id = ?1")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;
        if article_exists.is_none() {
            return Err(DbError::not_found("Article", article_id));
        }

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO service_articles (service_id, article_id)
            VALUES (?1, ?2)
            "#,
        )
        .bind(service_id)
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        info!(service_id, article_id, "Article linked to service recipe");
        self.recipe(service_id).await
    }

    /// Lists the articles a service consumes, one unit each per use.
    pub async fn recipe(&self, service_id: i64) -> DbResult<Vec<Article>> {
        self.get(service_id).await?;

        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.name, a.quantity, a.price_cents, a.category
            FROM service_articles sa
            JOIN articles a ON a.id = sa.article_id
            WHERE sa.service_id = ?1
            ORDER BY a.id
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use till_core::{Money, NewArticle};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_service(name: &str, category: Option<&str>) -> NewService {
        NewService {
            name: name.to_string(),
            price: Money::from_cents(2500),
            category: category.map(str::to_string),
        }
    }

    async fn add_article(db: &Database, name: &str) -> Article {
        db.articles()
            .insert(
                &NewArticle {
                    name: name.to_string(),
                    price: Money::from_cents(300),
                    quantity: 4,
                    category: None,
                },
                "outros",
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = setup().await;
        let repo = db.services();

        let cut = repo.insert(&new_service("Haircut", Some("hair")), "outros").await.unwrap();
        repo.insert(&new_service("Manicure", None), "outros").await.unwrap();

        assert_eq!(cut.price.cents(), 2500);
        assert_eq!(repo.list(None).await.unwrap().len(), 2);

        let outros = repo.list(Some("outros")).await.unwrap();
        assert_eq!(outros.len(), 1);
        assert_eq!(outros[0].name, "Manicure");

        assert_eq!(repo.get(cut.id).await.unwrap(), cut);
    }

    #[tokio::test]
    async fn test_recipe_links_are_idempotent() {
        let db = setup().await;
        let repo = db.services();
        let service = repo.insert(&new_service("Manicure", None), "outros").await.unwrap();
        let polish = add_article(&db, "Polish").await;
        let pads = add_article(&db, "Cotton pads").await;

        repo.link_article(service.id, polish.id).await.unwrap();
        repo.link_article(service.id, pads.id).await.unwrap();
        let recipe = repo.link_article(service.id, polish.id).await.unwrap();

        let ids: Vec<i64> = recipe.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![polish.id, pads.id]);
    }

    #[tokio::test]
    async fn test_link_unknown_ids() {
        let db = setup().await;
        let repo = db.services();
        let service = repo.insert(&new_service("Manicure", None), "outros").await.unwrap();
        let polish = add_article(&db, "Polish").await;

        assert!(matches!(
            repo.link_article(999, polish.id).await,
            Err(DbError::NotFound { ref entity, .. }) if entity == "Service"
        ));
        assert!(matches!(
            repo.link_article(service.id, 999).await,
            Err(DbError::NotFound { ref entity, .. }) if entity == "Article"
        ));
        assert!(matches!(repo.recipe(999).await, Err(DbError::NotFound { .. })));
    }
}
