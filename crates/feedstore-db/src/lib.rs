//! # feedstore-db
//!
//! Database layer for the feedstore retrieval core.
//!
//! This crate provides:
//! - Connection pool management for PostgreSQL and SQLite
//! - Schema migrations for both backends
//! - A dialect-parameterized search predicate builder shared by count and
//!   search queries
//! - Article and source repositories for both backends
//! - A pgvector-backed article embedding store (PostgreSQL)
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedstore_db::{ArticleRepository, ArticleSearchFilters, PageRequest, SqliteDatabase};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = SqliteDatabase::connect("sqlite://feedstore.db").await?;
//!     db.migrate().await?;
//!
//!     let page = db
//!         .articles
//!         .search_paginated(
//!             &["rust".to_string()],
//!             &ArticleSearchFilters::new(),
//!             PageRequest::new(1, 20),
//!         )
//!         .await?;
//!     println!("{} of {} matches", page.data.len(), page.pagination.total);
//!     Ok(())
//! }
//! ```
pub mod dialect;
pub mod escape;
mod instrument;
pub mod pool;
pub mod postgres;
pub mod predicate;
mod repository;
mod rows;
pub mod sql;
pub mod sqlite;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use feedstore_core::*;

pub use dialect::Dialect;
pub use escape::{contains_pattern, escape_like};
pub use pool::{
    create_pool, create_pool_with_config, create_sqlite_pool, create_sqlite_pool_with_config,
    log_pool_metrics, PoolConfig,
};
pub use postgres::{PgArticleRepository, PgEmbeddingRepository, PgSourceRepository};
pub use predicate::{FilterSet, Predicate, PredicateBuilder, QueryParam};
pub use sqlite::{SqliteArticleRepository, SqliteSourceRepository};

use std::time::Instant;

use sqlx::{Pool, Postgres, Sqlite};
use tracing::info;

fn migrate_error(e: sqlx::migrate::MigrateError) -> Error {
    Error::Database(sqlx::Error::Migrate(Box::new(e)))
}

/// PostgreSQL database context bundling all repositories.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
    /// Article repository.
    pub articles: PgArticleRepository,
    /// Source repository.
    pub sources: PgSourceRepository,
    /// Article embedding store.
    pub embeddings: PgEmbeddingRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    /// Create a Database whose repositories share one retrieval configuration.
    pub fn with_config(pool: Pool<Postgres>, config: RetrievalConfig) -> Self {
        Self {
            articles: PgArticleRepository::with_config(pool.clone(), config.clone()),
            sources: PgSourceRepository::with_config(pool.clone(), config.clone()),
            embeddings: PgEmbeddingRepository::with_config(pool.clone(), config),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations, including `CREATE EXTENSION vector`.
    pub async fn migrate(&self) -> Result<()> {
        let start = Instant::now();
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(migrate_error)?;
        info!(
            subsystem = "db",
            component = "migrations",
            backend = "postgres",
            duration_ms = start.elapsed().as_millis() as u64,
            "Migrations applied"
        );
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

/// SQLite database context (articles and sources only).
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
    /// Article repository.
    pub articles: SqliteArticleRepository,
    /// Source repository.
    pub sources: SqliteSourceRepository,
}

impl SqliteDatabase {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Sqlite>, config: RetrievalConfig) -> Self {
        Self {
            articles: SqliteArticleRepository::with_config(pool.clone(), config.clone()),
            sources: SqliteSourceRepository::with_config(pool.clone(), config),
            pool,
        }
    }

    /// Connect to a SQLite URL such as `sqlite://feedstore.db`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_sqlite_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect to a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool =
            create_sqlite_pool_with_config("sqlite::memory:", PoolConfig::single_connection())
                .await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        let start = Instant::now();
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(migrate_error)?;
        info!(
            subsystem = "db",
            component = "migrations",
            backend = "sqlite",
            duration_ms = start.elapsed().as_millis() as u64,
            "Migrations applied"
        );
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
