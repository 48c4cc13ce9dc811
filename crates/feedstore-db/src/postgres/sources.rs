//! PostgreSQL source repository.

use sqlx::{Pool, Postgres};

use feedstore_core::RetrievalConfig;

use crate::dialect::Dialect;
use crate::repository::impl_source_repository;
use crate::sql::SourceSql;

/// PostgreSQL implementation of SourceRepository.
#[derive(Debug, Clone)]
pub struct PgSourceRepository {
    pool: Pool<Postgres>,
    config: RetrievalConfig,
    sql: SourceSql,
}

impl PgSourceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Postgres>, config: RetrievalConfig) -> Self {
        Self {
            pool,
            config,
            sql: SourceSql::new(Dialect::POSTGRES),
        }
    }
}

impl_source_repository!(PgSourceRepository, Dialect::POSTGRES);
