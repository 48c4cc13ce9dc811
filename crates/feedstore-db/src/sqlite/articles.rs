//! SQLite article repository.

use sqlx::{Pool, Sqlite};

use feedstore_core::{defaults, Error, Result, RetrievalConfig};

use crate::dialect::Dialect;
use crate::repository::impl_article_repository;
use crate::sql::ArticleSql;

/// SQLite implementation of ArticleRepository.
#[derive(Debug, Clone)]
pub struct SqliteArticleRepository {
    pool: Pool<Sqlite>,
    config: RetrievalConfig,
    sql: ArticleSql,
    url_batch_size: usize,
}

impl SqliteArticleRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Sqlite>, config: RetrievalConfig) -> Self {
        Self {
            pool,
            config,
            sql: ArticleSql::new(Dialect::SQLITE),
            url_batch_size: defaults::SQLITE_URL_BATCH_SIZE,
        }
    }

    /// Override how many URLs each batch existence statement binds.
    ///
    /// Sizes above the SQLite parameter ceiling make the lookup fail with
    /// a predicate error instead of issuing an oversized statement.
    pub fn with_url_batch_size(mut self, size: usize) -> Self {
        self.url_batch_size = size.max(1);
        self
    }

    /// URLs from `urls` that are stored, queried in chunks of
    /// `url_batch_size` placeholders.
    async fn fetch_existing_urls(&self, urls: &[String]) -> Result<Vec<String>> {
        let mut existing = Vec::new();
        for chunk in urls.chunks(self.url_batch_size) {
            Dialect::SQLITE.check_param_count(chunk.len())?;
            let sql = self.sql.existing_urls_in(chunk.len());
            let mut query = sqlx::query_scalar::<_, String>(&sql);
            for url in chunk {
                query = query.bind(url);
            }
            let found = query
                .fetch_all(&self.pool)
                .await
                .map_err(Error::query("exists_by_url_batch"))?;
            existing.extend(found);
        }
        Ok(existing)
    }
}

impl_article_repository!(SqliteArticleRepository, Dialect::SQLITE);
