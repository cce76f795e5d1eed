//! Database layer
//!
//! Storage for the multi-tenant blog: SQLite by default (single-binary
//! deployment) or MySQL, selected by configuration.
//!
//! The layer uses a trait-based abstraction (`DatabasePool`) so the rest of
//! the application works with either backend without knowing which one is in
//! use. Repositories branch on the driver and run per-backend queries.
//!
//! # Usage
//!
//! ```ignore
//! use multiblog::config::DatabaseConfig;
//! use multiblog::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

#[cfg(test)]
pub(crate) mod fixtures;

pub use pool::{
    create_pool, create_test_pool, mysql_pool, sqlite_pool, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};
