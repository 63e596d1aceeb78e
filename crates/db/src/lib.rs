//! Relational store bootstrap for the bookstore service.
//!
//! Owns the process-wide SQLite pool. The pool is acquired once at startup,
//! handed to domain modules by clone, and closed when the `db` core module
//! is stopped.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bookstore_kernel::{InitCtx, Migration, Module};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Database connection pool shared by every module.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `url` (e.g. `sqlite://bookstore.db`).
    ///
    /// The file is created if it doesn't exist. In-memory URLs are pinned to
    /// a single connection, otherwise each pooled connection would see its
    /// own empty database.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(1500));

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        }
        .connect_with(options)
        .await
        .context("failed to connect to database")?;

        tracing::info!(target: "bookstore-db", url, "database pool ready");
        Ok(Self { pool })
    }

    /// Connect to a fresh in-memory database (useful for testing).
    pub async fn connect_in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query to prove the pool is usable.
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    /// Apply module migrations that have not been applied yet.
    ///
    /// Each migration runs in its own transaction together with its
    /// bookkeeping row, so a failed migration leaves no trace. Returns the
    /// number of migrations applied by this call.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        sqlx::query(MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create migrations table")?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let done: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ? AND id = ?")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await
                    .context("failed to read migrations table")?;
            if done.is_some() {
                continue;
            }

            tracing::info!(target: "bookstore-db", module = %module, id = migration.id, "applying migration");
            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration {module}/{} failed", migration.id))?;
            sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Core `db` module: verifies the pool on init and closes it on stop.
pub struct DatabaseModule {
    db: Database,
}

impl DatabaseModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db.ping().await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.db.close().await;
        tracing::info!(target: "bookstore-db", "database pool closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![(
            "shelf".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY); CREATE INDEX shelf_id ON shelf (id);",
            },
        )]
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        db.ping().await.unwrap();
        assert!(!db.pool().is_closed());
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        assert_eq!(db.migrate(&migrations()).await.unwrap(), 1);
        assert_eq!(db.migrate(&migrations()).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_failed_migration_is_not_recorded() {
        let db = Database::connect_in_memory().await.unwrap();
        let broken = vec![(
            "shelf".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE oops (",
            },
        )];
        assert!(db.migrate(&broken).await.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_module_stop_closes_pool() {
        let db = Database::connect_in_memory().await.unwrap();
        let module = DatabaseModule::new(db.clone());
        module.stop().await.unwrap();
        assert!(db.pool().is_closed());
    }
}
