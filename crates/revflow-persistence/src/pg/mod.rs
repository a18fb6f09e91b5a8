//! Postgres backend (Diesel) for `KeyValueStore`.
//!
//! One table, `kv_store(key, value JSONB, updated_at)`. `update` runs inside
//! a read-write transaction and locks the row with `SELECT ... FOR UPDATE`,
//! so concurrent writers of the same key are serialized by the database.
//! Transient failures (serialization conflicts, dropped connections) are
//! retried with a small backoff.

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};
use serde_json::Value;

use crate::error::PersistenceError;
use crate::kv::{KeyValueStore, UpdateFn};
use crate::migrations::run_pending_migrations;
use crate::schema::kv_store;

/// r2d2 pool of Postgres connections. Built with migrations already applied.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Source of connections; lets tests inject something other than a pool.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

#[derive(Clone)]
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => true,
        // Some driver messages only arrive as text.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access")
            || m.contains("connection closed")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Up to 3 retries, 15ms / 30ms / 45ms apart.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// JSON `null` marks a key reserved by `update` but never written.
fn non_null(value: Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

#[derive(Clone)]
pub struct PgKeyValueStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgKeyValueStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl PgKeyValueStore<PoolProvider> {
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(PoolProvider { pool })
    }
}

impl<P: ConnectionProvider> KeyValueStore for PgKeyValueStore<P> {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            let value: Option<Value> = kv_store::table.find(key)
                                                      .select(kv_store::value)
                                                      .first(&mut conn)
                                                      .optional()?;
            Ok(value.and_then(non_null))
        })
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(kv_store::table).values((kv_store::key.eq(key),
                                                         kv_store::value.eq(&value),
                                                         kv_store::updated_at.eq(Utc::now())))
                                                .on_conflict(kv_store::key)
                                                .do_update()
                                                .set((kv_store::value.eq(&value), kv_store::updated_at.eq(Utc::now())))
                                                .execute(&mut conn)?;
            Ok(())
        })
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), PersistenceError> {
        debug!("update:start key={key}");
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                // Reserve the row so there is something to lock on first write.
                diesel::insert_into(kv_store::table).values((kv_store::key.eq(key), kv_store::value.eq(Value::Null)))
                                                    .on_conflict(kv_store::key)
                                                    .do_nothing()
                                                    .execute(tx)?;
                let current: Value = kv_store::table.find(key)
                                                    .select(kv_store::value)
                                                    .for_update()
                                                    .first(tx)?;
                let next = f(non_null(current))?;
                diesel::update(kv_store::table.find(key)).set((kv_store::value.eq(&next),
                                                               kv_store::updated_at.eq(Utc::now())))
                                                         .execute(tx)?;
                Ok::<(), PersistenceError>(())
            })
        })?;
        debug!("update:done key={key}");
        Ok(())
    }
}

/// Builds an r2d2 pool and applies pending migrations.
///
/// Sizes of 0 are raised to 1; `min_size > max_size` is clamped to
/// `max_size`.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let max = max_size.max(1);
    let min = min_size.max(1);
    if min > max {
        warn!("min_size > max_size ({min} > {max}), using min = max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(min.min(max)))
                                    .max_size(max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Loads `.env`, reads `DbConfig` and builds a migrated pool.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_gives_up_on_permanent_errors() {
        let mut calls = 0;
        let res: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::UniqueViolation("dup".into()))
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_bounded_for_transient_errors() {
        let mut calls = 0;
        let res: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::SerializationConflict)
        });
        assert!(res.is_err());
        assert_eq!(calls, 4);
    }

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let res = with_retry(|| {
            calls += 1;
            if calls < 2 {
                Err(PersistenceError::TransientIo("blip".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(res.unwrap(), 2);
    }
}
