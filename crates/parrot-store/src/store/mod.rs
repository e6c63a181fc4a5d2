//! SQLite-backed durable store.
//!
//! Split into focused submodules:
//! - `rules` — trigger→reply CRUD and the owned rule-set cache
//! - `contacts` — allow-list set membership
//! - `schedules` — recurring-schedule rows and the composite schedule id

mod contacts;
mod rules;
mod schedules;

pub use schedules::{schedule_id, Schedule};

use parrot_core::{config::StoreConfig, error::ParrotError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use rules::RuleCache;

/// Persistent store backed by SQLite.
///
/// Clones share one pool and one rule cache.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    /// Cached rule snapshot. Refreshed after confirmed writes, lazily
    /// loaded on read-miss; callers only ever get `Arc` snapshots.
    rule_cache: Arc<RwLock<RuleCache>>,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, ParrotError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ParrotError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| ParrotError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| ParrotError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Store initialized at {db_path}");

        Ok(Self {
            pool,
            rule_cache: Arc::new(RwLock::new(RuleCache::default())),
        })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), ParrotError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| ParrotError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        ParrotError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| ParrotError::Store(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    ParrotError::Store(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
