//! SQLite source repository.

use sqlx::{Pool, Sqlite};

use feedstore_core::RetrievalConfig;

use crate::dialect::Dialect;
use crate::repository::impl_source_repository;
use crate::sql::SourceSql;

/// SQLite implementation of SourceRepository.
#[derive(Debug, Clone)]
pub struct SqliteSourceRepository {
    pool: Pool<Sqlite>,
    config: RetrievalConfig,
    sql: SourceSql,
}

impl SqliteSourceRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Sqlite>, config: RetrievalConfig) -> Self {
        Self {
            pool,
            config,
            sql: SourceSql::new(Dialect::SQLITE),
        }
    }
}

impl_source_repository!(SqliteSourceRepository, Dialect::SQLITE);
