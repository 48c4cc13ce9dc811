//! Article embedding store backed by pgvector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::{Pool, Postgres};
use tracing::debug;

use feedstore_core::{
    ArticleEmbedding, EmbeddingRepository, EmbeddingType, Error, Result, RetrievalConfig,
    SimilarArticle, UpsertEmbeddingRequest,
};

use crate::instrument::{bounded, rejected};

const COMPONENT: &str = "embeddings";

const EMBEDDING_COLUMNS: &str =
    "id, article_id, embedding_type, provider, model, dimension, embedding, created_at, updated_at";

/// A stored `article_embeddings` row.
#[derive(Debug, sqlx::FromRow)]
struct EmbeddingRow {
    id: i64,
    article_id: i64,
    embedding_type: String,
    provider: String,
    model: String,
    dimension: i32,
    embedding: Vector,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmbeddingRow> for ArticleEmbedding {
    type Error = Error;

    fn try_from(row: EmbeddingRow) -> Result<Self> {
        let stored = |e: Error| Error::Serialization(format!("embedding {}: {}", row.id, e));
        Ok(ArticleEmbedding {
            id: row.id,
            article_id: row.article_id,
            embedding_type: row.embedding_type.parse().map_err(stored)?,
            provider: row.provider.parse().map_err(stored)?,
            model: row.model,
            dimension: row.dimension,
            embedding: row.embedding.to_vec(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn require_article_id(op: &'static str, article_id: i64) -> Result<()> {
    if article_id <= 0 {
        let err = Error::InvalidInput(format!("article_id must be positive, got {}", article_id));
        rejected(COMPONENT, op, &err);
        return Err(err);
    }
    Ok(())
}

/// PostgreSQL implementation of EmbeddingRepository.
#[derive(Debug, Clone)]
pub struct PgEmbeddingRepository {
    pool: Pool<Postgres>,
    config: RetrievalConfig,
}

impl PgEmbeddingRepository {
    /// Create a new PgEmbeddingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_config(pool, RetrievalConfig::default())
    }

    pub fn with_config(pool: Pool<Postgres>, config: RetrievalConfig) -> Self {
        Self { pool, config }
    }
}

#[async_trait]
impl EmbeddingRepository for PgEmbeddingRepository {
    async fn upsert(&self, req: UpsertEmbeddingRequest) -> Result<ArticleEmbedding> {
        let embedding = match req.validate() {
            Ok(v) => v,
            Err(e) => {
                rejected(COMPONENT, "upsert_embedding", &e);
                return Err(e);
            }
        };

        // The conflict target is the uniqueness tuple; id and created_at of
        // an existing row are kept.
        let sql = format!(
            "INSERT INTO article_embeddings \
             (article_id, embedding_type, provider, model, dimension, embedding) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (article_id, embedding_type, provider, model) DO UPDATE SET \
             dimension = EXCLUDED.dimension, \
             embedding = EXCLUDED.embedding, \
             updated_at = NOW() \
             RETURNING {}",
            EMBEDDING_COLUMNS
        );
        let row = sqlx::query_as::<_, EmbeddingRow>(&sql)
            .bind(embedding.article_id)
            .bind(embedding.embedding_type.as_str())
            .bind(embedding.provider.as_str())
            .bind(&embedding.model)
            .bind(embedding.dimension)
            .bind(Vector::from(embedding.embedding))
            .fetch_one(&self.pool)
            .await
            .map_err(Error::query("upsert_embedding"))?;

        debug!(
            subsystem = "embeddings",
            component = COMPONENT,
            op = "upsert_embedding",
            article_id = row.article_id,
            embedding_type = %row.embedding_type,
            dimension = row.dimension,
            "Embedding stored"
        );
        ArticleEmbedding::try_from(row)
    }

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<ArticleEmbedding>> {
        require_article_id("find_embeddings", article_id)?;
        let sql = format!(
            "SELECT {} FROM article_embeddings WHERE article_id = $1 \
             ORDER BY embedding_type, provider, model",
            EMBEDDING_COLUMNS
        );
        let rows = sqlx::query_as::<_, EmbeddingRow>(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::query("find_embeddings"))?;
        rows.into_iter().map(ArticleEmbedding::try_from).collect()
    }

    async fn search_similar(
        &self,
        query: &[f32],
        embedding_type: EmbeddingType,
        limit: i64,
    ) -> Result<Vec<SimilarArticle>> {
        if query.is_empty() {
            let err = Error::InvalidInput("query vector must not be empty".to_string());
            rejected(COMPONENT, "search_similar", &err);
            return Err(err);
        }
        let dimension = i32::try_from(query.len())
            .map_err(|_| Error::InvalidInput(format!("query vector too long: {}", query.len())))?;
        let limit = self.config.similarity_limit(limit);

        // Only vectors of the query's dimension are comparable.
        let similar = sqlx::query_as::<_, SimilarArticle>(
            "SELECT article_id, 1 - (embedding <=> $1) AS similarity \
             FROM article_embeddings \
             WHERE embedding_type = $2 AND dimension = $3 \
             ORDER BY embedding <=> $1 \
             LIMIT $4",
        )
        .bind(Vector::from(query.to_vec()))
        .bind(embedding_type.as_str())
        .bind(dimension)
        .bind(limit)
        .fetch_all(&self.pool);

        let results = bounded(
            COMPONENT,
            "search_similar",
            self.config.query_timeout,
            similar,
        )
        .await?;

        debug!(
            subsystem = "embeddings",
            component = COMPONENT,
            op = "search_similar",
            embedding_type = embedding_type.as_str(),
            limit,
            result_count = results.len(),
            "Similarity search complete"
        );
        Ok(results)
    }

    async fn delete_by_article_id(&self, article_id: i64) -> Result<u64> {
        require_article_id("delete_embeddings", article_id)?;
        let result = sqlx::query("DELETE FROM article_embeddings WHERE article_id = $1")
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(Error::query("delete_embeddings"))?;
        Ok(result.rows_affected())
    }
}
