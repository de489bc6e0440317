//! SQLite persistence for the book catalog.
//!
//! [`connect`] builds a `sqlx::SqlitePool` from [`DatabaseSettings`] with
//! foreign keys enforced on every connection. [`run_migrations`] applies the
//! SQL contributed by each module exactly once, recording applied ids in the
//! `_migrations` table.
//!
//! Repositories implement [`Repository`] and return [`DbError`] so the HTTP
//! layer can map store failures onto status codes.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use bookapi_kernel::{settings::DatabaseSettings, Migration};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

mod error;
pub mod repository;

pub use error::{DbError, Result};
pub use repository::Repository;
pub use sqlx::SqlitePool;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        id         TEXT PRIMARY KEY NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

fn connect_options(url: &str) -> anyhow::Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url '{}'", url))?
        .create_if_missing(true)
        .foreign_keys(true))
}

/// Open a connection pool for the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    tracing::info!(target: "bookapi-db", url = %settings.url, "opening database pool");

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options(&settings.url)?)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    Ok(pool)
}

/// Build a pool without opening any connection until first use.
pub fn connect_lazy(url: &str) -> anyhow::Result<SqlitePool> {
    Ok(SqlitePoolOptions::new().connect_lazy_with(connect_options(url)?))
}

/// Private in-memory database, used by tests and throwaway runs.
///
/// Every SQLite connection to `:memory:` is a separate database, so the pool
/// is pinned to one connection that never expires.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options("sqlite::memory:")?)
        .await
        .context("failed to open in-memory database")?;

    Ok(pool)
}

/// Apply pending migrations in the given order.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;

    for (module, migration) in migrations {
        let key = format!("{}/{}", module, migration.id);

        let already_applied: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM _migrations WHERE id = ?")
                .bind(&key)
                .fetch_one(pool)
                .await
                .with_context(|| format!("failed to check migration '{}'", key))?;

        if already_applied > 0 {
            tracing::debug!(target: "bookapi-db", migration = %key, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration '{}' failed", key))?;

        sqlx::query("INSERT INTO _migrations (id) VALUES (?)")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration '{}'", key))?;

        tracing::info!(target: "bookapi-db", migration = %key, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
