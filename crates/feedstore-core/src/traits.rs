//! Repository traits for feedstore.
//!
//! Each backend implements these against its own pool. Search and count
//! methods on the same repository share one predicate construction path.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filters::{ArticleSearchFilters, SourceSearchFilters};
use crate::models::*;
use crate::pagination::{PageRequest, Paginated};

// =============================================================================
// ARTICLE REPOSITORY
// =============================================================================

/// Request for creating an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub source_id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub summary: String,
    pub published_at: DateTime<Utc>,
}

/// Partial article update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub source_id: Option<i64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl UpdateArticleRequest {
    pub fn is_empty(&self) -> bool {
        self.source_id.is_none()
            && self.title.is_none()
            && self.url.is_none()
            && self.summary.is_none()
            && self.published_at.is_none()
    }
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a validated article.
    async fn create(&self, req: CreateArticleRequest) -> Result<Article>;

    /// Apply a partial update. `NotFound` when the article does not exist.
    async fn update(&self, id: i64, req: UpdateArticleRequest) -> Result<Article>;

    /// Delete an article. `NotFound` when the article does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Fetch an article joined with its source name.
    async fn get_with_source(&self, id: i64) -> Result<Option<ArticleWithSource>>;

    /// All articles, newest published first.
    async fn list_all(&self) -> Result<Vec<Article>>;

    async fn exists_by_url(&self, url: &str) -> Result<bool>;

    /// Existence check for many URLs. The map holds only URLs that exist.
    async fn exists_by_url_batch(&self, urls: &[String]) -> Result<HashMap<String, bool>>;

    /// Keyword and filter search. Empty keywords with no filters yields nothing.
    async fn search(
        &self,
        keywords: &[String],
        filters: &ArticleSearchFilters,
    ) -> Result<Vec<Article>>;

    /// Number of rows `search` would return for the same arguments.
    async fn count_matching(
        &self,
        keywords: &[String],
        filters: &ArticleSearchFilters,
    ) -> Result<i64>;

    /// One page of matches joined with source names, newest first.
    async fn search_paginated(
        &self,
        keywords: &[String],
        filters: &ArticleSearchFilters,
        page: PageRequest,
    ) -> Result<Paginated<ArticleWithSource>>;
}

// =============================================================================
// SOURCE REPOSITORY
// =============================================================================

/// Request for creating a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSourceRequest {
    pub name: String,
    pub feed_url: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Defaults to RSS when unset.
    #[serde(default)]
    pub source_type: Option<SourceType>,
    #[serde(default)]
    pub scraper_config: Option<ScraperConfig>,
}

fn default_active() -> bool {
    true
}

/// Partial source update.
///
/// `source_type` and `scraper_config` are replaced together: setting a type
/// replaces the stored config with `scraper_config` (cleared for RSS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSourceRequest {
    pub name: Option<String>,
    pub feed_url: Option<String>,
    pub active: Option<bool>,
    pub source_type: Option<SourceType>,
    pub scraper_config: Option<ScraperConfig>,
}

impl UpdateSourceRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.feed_url.is_none()
            && self.active.is_none()
            && self.source_type.is_none()
            && self.scraper_config.is_none()
    }
}

#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn create(&self, req: CreateSourceRequest) -> Result<Source>;

    /// Apply a partial update. `NotFound` when the source does not exist.
    async fn update(&self, id: i64, req: UpdateSourceRequest) -> Result<Source>;

    /// Delete a source. `NotFound` when the source does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Source>>;

    async fn list_all(&self) -> Result<Vec<Source>>;

    async fn list_active(&self) -> Result<Vec<Source>>;

    /// Record a crawl time. `NotFound` when the source does not exist.
    async fn touch_crawled_at(&self, id: i64, at: DateTime<Utc>) -> Result<()>;

    async fn exists_by_feed_url(&self, feed_url: &str) -> Result<bool>;

    /// Keyword and filter search. Empty keywords with no filters yields every source.
    async fn search(
        &self,
        keywords: &[String],
        filters: &SourceSearchFilters,
    ) -> Result<Vec<Source>>;

    /// Number of rows `search` would return for the same arguments.
    async fn count_matching(
        &self,
        keywords: &[String],
        filters: &SourceSearchFilters,
    ) -> Result<i64>;
}

// =============================================================================
// EMBEDDING REPOSITORY
// =============================================================================

/// Request for storing an article embedding.
///
/// Kind and provider arrive as raw strings and are checked by `validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertEmbeddingRequest {
    pub article_id: i64,
    pub embedding_type: String,
    pub provider: String,
    pub model: String,
    pub dimension: i32,
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    /// Insert or replace the embedding for its (article, type, provider, model) tuple.
    async fn upsert(&self, req: UpsertEmbeddingRequest) -> Result<ArticleEmbedding>;

    /// Embeddings for one article, ordered by (type, provider, model).
    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<ArticleEmbedding>>;

    /// Nearest neighbours by cosine distance among embeddings of one type.
    async fn search_similar(
        &self,
        query: &[f32],
        embedding_type: EmbeddingType,
        limit: i64,
    ) -> Result<Vec<SimilarArticle>>;

    /// Remove all embeddings for an article; returns the number removed.
    async fn delete_by_article_id(&self, article_id: i64) -> Result<u64>;
}
