//! Core data models for feedstore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// ARTICLE TYPES
// =============================================================================

/// A stored article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An article joined with the name of its source (paginated search rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleWithSource {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub article: Article,
    pub source_name: String,
}

// =============================================================================
// SOURCE TYPES
// =============================================================================

/// Kind of feed a source is crawled as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[default]
    #[serde(rename = "RSS")]
    Rss,
    #[serde(rename = "Webflow")]
    Webflow,
    #[serde(rename = "NextJS")]
    NextJs,
    #[serde(rename = "Remix")]
    Remix,
}

impl SourceType {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rss => "RSS",
            Self::Webflow => "Webflow",
            Self::NextJs => "NextJS",
            Self::Remix => "Remix",
        }
    }

    /// Whether sources of this type are scraped and therefore carry a [`ScraperConfig`].
    pub fn is_scraped(&self) -> bool {
        !matches!(self, Self::Rss)
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rss" => Ok(Self::Rss),
            "webflow" => Ok(Self::Webflow),
            "nextjs" => Ok(Self::NextJs),
            "remix" => Ok(Self::Remix),
            _ => Err(Error::InvalidInput(format!("Invalid source type: {}", s))),
        }
    }
}

/// CSS selectors for scraping a Webflow blog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebflowConfig {
    pub item_selector: String,
    pub title_selector: String,
    pub url_selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_selector: Option<String>,
}

/// Location of the article list inside a Next.js `__NEXT_DATA__` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NextJsConfig {
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
}

/// Location of the article list inside a Remix `window.__remixContext` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemixConfig {
    pub context_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
}

/// Per-source-type scraper configuration.
///
/// Stored as the JSON of the inner struct; the variant is recovered from the
/// source's `source_type` column on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScraperConfig {
    Webflow(WebflowConfig),
    NextJs(NextJsConfig),
    Remix(RemixConfig),
}

impl ScraperConfig {
    /// Source type this configuration belongs to.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Webflow(_) => SourceType::Webflow,
            Self::NextJs(_) => SourceType::NextJs,
            Self::Remix(_) => SourceType::Remix,
        }
    }

    /// Check required fields are present.
    pub fn validate(&self) -> Result<()> {
        let missing = match self {
            Self::Webflow(c) => [
                ("item_selector", &c.item_selector),
                ("title_selector", &c.title_selector),
                ("url_selector", &c.url_selector),
            ]
            .into_iter()
            .find(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k),
            Self::NextJs(c) if c.data_key.trim().is_empty() => Some("data_key"),
            Self::Remix(c) if c.context_key.trim().is_empty() => Some("context_key"),
            _ => None,
        };
        match missing {
            Some(field) => Err(Error::InvalidInput(format!(
                "scraper config for {} requires {}",
                self.source_type(),
                field
            ))),
            None => Ok(()),
        }
    }

    /// Serialize to the stored blob.
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            Self::Webflow(c) => serde_json::to_string(c)?,
            Self::NextJs(c) => serde_json::to_string(c)?,
            Self::Remix(c) => serde_json::to_string(c)?,
        };
        Ok(json)
    }

    /// Decode a stored blob for the given source type.
    ///
    /// A blob that does not parse, or a blob on an RSS source, is an error.
    pub fn from_json(source_type: SourceType, raw: &str) -> Result<Self> {
        let config = match source_type {
            SourceType::Webflow => Self::Webflow(serde_json::from_str(raw)?),
            SourceType::NextJs => Self::NextJs(serde_json::from_str(raw)?),
            SourceType::Remix => Self::Remix(serde_json::from_str(raw)?),
            SourceType::Rss => {
                return Err(Error::Serialization(
                    "RSS sources cannot carry a scraper config".to_string(),
                ))
            }
        };
        Ok(config)
    }
}

/// A feed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub feed_url: String,
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub source_type: SourceType,
    pub scraper_config: Option<ScraperConfig>,
}

// =============================================================================
// EMBEDDING TYPES
// =============================================================================

/// Which article field an embedding was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingType {
    Title,
    Content,
    Summary,
}

impl EmbeddingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Summary => "summary",
        }
    }
}

impl std::fmt::Display for EmbeddingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmbeddingType {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            "summary" => Ok(Self::Summary),
            _ => Err(Error::InvalidInput(format!(
                "invalid embedding type: {:?} (expected title, content or summary)",
                s
            ))),
        }
    }
}

/// Service that produced an embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    OpenAi,
    Voyage,
}

impl EmbeddingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Voyage => "voyage",
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "voyage" => Ok(Self::Voyage),
            _ => Err(Error::InvalidInput(format!(
                "invalid provider: {:?} (expected openai or voyage)",
                s
            ))),
        }
    }
}

/// A stored article embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleEmbedding {
    pub id: i64,
    pub article_id: i64,
    pub embedding_type: EmbeddingType,
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: i32,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SimilarArticle {
    pub article_id: i64,
    /// `1 - cosine distance`, roughly in [-1, 1].
    pub similarity: f64,
}
