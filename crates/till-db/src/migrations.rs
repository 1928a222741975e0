//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in version order when a [`Database`](crate::Database) opens.
//! sqlx records each applied version with its checksum in
//! `_sqlx_migrations`, so editing an applied file is detected as an error
//! rather than silently diverging. Schema changes always go in a new file.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   articles, services, service_articles,
//!                              sales, sales_articles, sales_services
//! ```

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded. A no-op on an up-to-date schema.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = schema_version(pool).await.unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let after = schema_version(pool).await?;
    if after != before {
        info!(from = before, to = after, "Schema migrated");
    } else {
        debug!(version = after, "Schema up to date");
    }
    Ok(())
}

/// Highest successfully applied version, 0 on a fresh database.
pub async fn schema_version(pool: &SqlitePool) -> DbResult<i64> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Highest version embedded in this build.
pub fn latest_version() -> i64 {
    MIGRATOR
        .iter()
        .map(|migration| migration.version)
        .max()
        .unwrap_or(0)
}
