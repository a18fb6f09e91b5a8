//! revflow-persistence
//!
//! Persistence adapter for the approval engine. Revisions, approvals and the
//! audit trail are stored as ordered JSON lists under fixed keys of a
//! key-value store.
//!
//! Modules:
//! - `kv`: `KeyValueStore` trait and the in-memory backend.
//! - `pg`: Postgres backend (Diesel + r2d2), pool helpers, retry.
//! - `keyed`: core repository traits implemented over any `KeyValueStore`.
//! - `migrations`: embedded Diesel migrations.
//! - `config`: connection settings from `.env` / environment.
//! - `schema`: Diesel table declarations.

pub mod config;
pub mod error;
pub mod keyed;
pub mod kv;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use keyed::{keyed_engine, KvApprovalRepository, KvAuditLog, KvRevisionRepository, KEY_APPROVALS, KEY_APPROVAL_EVENTS,
                KEY_REVISIONS};
pub use kv::{InMemoryKeyValueStore, KeyValueStore};
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgKeyValueStore, PgPool, PoolProvider};
