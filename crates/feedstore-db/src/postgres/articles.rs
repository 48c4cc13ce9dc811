//! PostgreSQL article repository.

use sqlx::{Pool, Postgres};

use feedstore_core::{Error, Result, RetrievalConfig};

use crate::dialect::Dialect;
use crate::repository::impl_article_repository;
use crate::sql::ArticleSql;

/// PostgreSQL implementation of ArticleRepository.
#[derive(Debug, Clone)]
pub struct PgArticleRepository {
    pool: Pool<Postgres>,
    config: RetrievalConfig,
    sql: ArticleSql,
}

impl PgArticleRepository {
    /// Create a repository with the default retrieval configuration.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Postgres>, config: RetrievalConfig) -> Self {
        Self {
            pool,
            config,
            sql: ArticleSql::new(Dialect::POSTGRES),
        }
    }

    /// URLs from `urls` that are stored. One array parameter, so there is no
    /// bind ceiling to chunk around.
    async fn fetch_existing_urls(&self, urls: &[String]) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT url FROM articles WHERE url = ANY($1)")
            .bind(urls)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::query("exists_by_url_batch"))
    }
}

impl_article_repository!(PgArticleRepository, Dialect::POSTGRES);
