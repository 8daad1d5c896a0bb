use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::config::StoreConfig;
use crate::error::StoreError;
use crate::key::SequenceKey;
use crate::store::{Counter, CounterStore};

/// Counter store backed by the `auto_increment_counters` table.
///
/// Each allocation is a single `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`
/// statement, so concurrent writers on the same key are serialized by
/// Postgres row locking and never lose an update.
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from `config`. Does not run migrations.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the counter table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("../../sql/schema.sql"))
            .execute(&self.pool)
            .await?;
        tracing::debug!("auto_increment_counters schema applied");
        Ok(())
    }

    /// Read a counter without touching it.
    pub async fn current(&self, key: &SequenceKey) -> Result<Option<Counter>, StoreError> {
        let counter = sqlx::query_as::<_, Counter>(
            "SELECT key, value FROM auto_increment_counters WHERE key = $1",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(counter)
    }
}

impl CounterStore for PgCounterStore {
    async fn increment_by(
        &self,
        key: &SequenceKey,
        seed: i64,
        step: i64,
    ) -> Result<i64, StoreError> {
        let value: i64 = sqlx::query_scalar(include_str!("../../sql/increment.sql"))
            .bind(key.as_str())
            .bind(seed)
            .bind(step)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(%key, value, "counter incremented");
        Ok(value)
    }
}
