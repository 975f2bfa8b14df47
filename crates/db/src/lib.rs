//! SQLite persistence bootstrap: pool construction, the migration runner and
//! the `db` core module that owns the pool's lifecycle.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use bookshelf_kernel::{settings::DatabaseSettings, InitCtx, Migration, Module};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Open a connection pool for the configured database, creating the file if
/// needed. In-memory databases keep a single connection alive for the
/// lifetime of the pool, since each connection would otherwise see its own
/// empty database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let in_memory = settings.url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(settings.max_connections);
    if in_memory {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.url))?;

    tracing::info!(target: "bookshelf-db", url = %settings.url, "database pool ready");
    Ok(pool)
}

/// Apply every migration not yet recorded in `_migrations`, each in its own
/// transaction. Returns how many were applied.
pub async fn apply_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            PRIMARY KEY (module, id)
        )",
    )
    .execute(pool)
    .await
    .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let seen: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;
        if seen.is_some() {
            tracing::debug!(target: "bookshelf-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;
        sqlx::query("INSERT INTO _migrations (module, id, applied_at) VALUES (?, ?, ?)")
            .bind(module)
            .bind(migration.id)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "bookshelf-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

/// Core module wrapping the shared pool.
pub struct DbModule {
    pool: SqlitePool,
}

impl DbModule {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![(
            "notes".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL);
                     CREATE INDEX notes_body ON notes (body);",
            },
        )]
    }

    #[tokio::test]
    async fn in_memory_pool_keeps_its_schema() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE t (a INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (a) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();

        assert_eq!(apply_migrations(&pool, &migrations()).await.unwrap(), 1);
        assert_eq!(apply_migrations(&pool, &migrations()).await.unwrap(), 0);

        let (recorded,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 1);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE oops (",
            },
        )];

        assert!(apply_migrations(&pool, &broken).await.is_err());

        let (recorded,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }

    #[tokio::test]
    async fn db_module_pings_and_closes_pool() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let module = DbModule::new(pool.clone());
        let settings = bookshelf_kernel::settings::Settings::default();

        module.init(&InitCtx { settings: &settings }).await.unwrap();
        module.stop().await.unwrap();
        assert!(pool.is_closed());
    }
}
