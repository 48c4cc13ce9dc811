//! Input validation run before any query is issued.

use url::Url;

use crate::error::{Error, Result};
use crate::models::{EmbeddingProvider, EmbeddingType, ScraperConfig, SourceType};
use crate::traits::{
    CreateArticleRequest, CreateSourceRequest, UpdateArticleRequest, UpdateSourceRequest,
    UpsertEmbeddingRequest,
};

/// Require a well-formed absolute URL with a host.
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    let parsed = Url::parse(raw)
        .map_err(|e| Error::InvalidInput(format!("{} is not a valid URL: {}", field, e)))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(Error::InvalidInput(format!(
            "{} must be an absolute URL with a host",
            field
        )));
    }
    Ok(())
}

fn validate_source_id(source_id: i64) -> Result<()> {
    if source_id <= 0 {
        return Err(Error::InvalidInput(format!(
            "source_id must be positive, got {}",
            source_id
        )));
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

impl CreateArticleRequest {
    pub fn validate(&self) -> Result<()> {
        validate_source_id(self.source_id)?;
        validate_non_empty("title", &self.title)?;
        validate_url("url", &self.url)
    }
}

impl UpdateArticleRequest {
    /// Validate only the fields being changed.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput("no fields to update".to_string()));
        }
        if let Some(source_id) = self.source_id {
            validate_source_id(source_id)?;
        }
        if let Some(title) = &self.title {
            validate_non_empty("title", title)?;
        }
        if let Some(url) = &self.url {
            validate_url("url", url)?;
        }
        Ok(())
    }
}

/// A scraper config must match its source type; RSS carries none.
fn validate_scraper_config(source_type: SourceType, config: Option<&ScraperConfig>) -> Result<()> {
    match config {
        Some(config) if config.source_type() != source_type => Err(Error::InvalidInput(format!(
            "scraper config for {} does not match source type {}",
            config.source_type(),
            source_type
        ))),
        Some(config) => config.validate(),
        None if source_type.is_scraped() => Err(Error::InvalidInput(format!(
            "{} sources require a scraper config",
            source_type
        ))),
        None => Ok(()),
    }
}

impl CreateSourceRequest {
    pub fn validate(&self) -> Result<()> {
        validate_non_empty("name", &self.name)?;
        validate_url("feed_url", &self.feed_url)?;
        validate_scraper_config(
            self.source_type.unwrap_or_default(),
            self.scraper_config.as_ref(),
        )
    }
}

impl UpdateSourceRequest {
    /// Validate only the fields being changed. A scraper config can only be
    /// set together with the source type it belongs to.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput("no fields to update".to_string()));
        }
        if let Some(name) = &self.name {
            validate_non_empty("name", name)?;
        }
        if let Some(feed_url) = &self.feed_url {
            validate_url("feed_url", feed_url)?;
        }
        match self.source_type {
            Some(source_type) => validate_scraper_config(source_type, self.scraper_config.as_ref()),
            None if self.scraper_config.is_some() => Err(Error::InvalidInput(
                "scraper_config requires source_type".to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// An embedding that has passed every precondition for `upsert`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEmbedding {
    pub article_id: i64,
    pub embedding_type: EmbeddingType,
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: i32,
    pub embedding: Vec<f32>,
}

impl UpsertEmbeddingRequest {
    /// Check preconditions in a fixed order so error messages are deterministic:
    /// article id, non-empty vector, dimension, embedding type, provider, model.
    pub fn validate(self) -> Result<ValidatedEmbedding> {
        if self.article_id <= 0 {
            return Err(Error::InvalidInput(format!(
                "article_id must be positive, got {}",
                self.article_id
            )));
        }
        if self.embedding.is_empty() {
            return Err(Error::InvalidInput("embedding must not be empty".to_string()));
        }
        if usize::try_from(self.dimension).ok() != Some(self.embedding.len()) {
            return Err(Error::InvalidInput(format!(
                "dimension mismatch: declared {}, vector has {}",
                self.dimension,
                self.embedding.len()
            )));
        }
        let embedding_type: EmbeddingType = self.embedding_type.parse()?;
        let provider: EmbeddingProvider = self.provider.parse()?;
        if self.model.trim().is_empty() {
            return Err(Error::InvalidInput("model is required".to_string()));
        }
        Ok(ValidatedEmbedding {
            article_id: self.article_id,
            embedding_type,
            provider,
            model: self.model,
            dimension: self.dimension,
            embedding: self.embedding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NextJsConfig, RemixConfig};
    use chrono::Utc;

    fn embedding_request() -> UpsertEmbeddingRequest {
        UpsertEmbeddingRequest {
            article_id: 5,
            embedding_type: "content".to_string(),
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 3,
            embedding: vec![0.1, 0.2, 0.3],
        }
    }

    #[test]
    fn test_valid_embedding_passes() {
        let v = embedding_request().validate().unwrap();
        assert_eq!(v.embedding_type, EmbeddingType::Content);
        assert_eq!(v.provider, EmbeddingProvider::OpenAi);
        assert_eq!(v.dimension, 3);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let req = UpsertEmbeddingRequest {
            dimension: 100,
            ..embedding_request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn test_validation_order_article_id_first() {
        // Every field is bad; the article id check must win.
        let req = UpsertEmbeddingRequest {
            article_id: 0,
            embedding_type: "bogus".to_string(),
            provider: "bogus".to_string(),
            model: String::new(),
            dimension: 7,
            embedding: vec![],
        };
        assert!(req.validate().unwrap_err().to_string().contains("article_id"));
    }

    #[test]
    fn test_validation_order_empty_vector_before_dimension() {
        let req = UpsertEmbeddingRequest {
            dimension: 7,
            embedding: vec![],
            ..embedding_request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validation_order_type_before_provider_before_model() {
        let req = UpsertEmbeddingRequest {
            embedding_type: "body".to_string(),
            provider: "cohere".to_string(),
            model: String::new(),
            ..embedding_request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("embedding type"));

        let req = UpsertEmbeddingRequest {
            provider: "cohere".to_string(),
            model: String::new(),
            ..embedding_request()
        };
        assert!(req.validate().unwrap_err().to_string().contains("provider"));

        let req = UpsertEmbeddingRequest {
            model: "  ".to_string(),
            ..embedding_request()
        };
        assert!(req.validate().unwrap_err().to_string().contains("model"));
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let req = UpsertEmbeddingRequest {
            dimension: -3,
            ..embedding_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("url", "https://example.com/post/1").is_ok());
        assert!(validate_url("url", "").is_err());
        assert!(validate_url("url", "/relative/path").is_err());
        assert!(validate_url("url", "mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_create_article_validation() {
        let req = CreateArticleRequest {
            source_id: 1,
            title: "Hello".to_string(),
            url: "https://example.com/a".to_string(),
            summary: String::new(),
            published_at: Utc::now(),
        };
        assert!(req.validate().is_ok());

        let bad = CreateArticleRequest {
            source_id: 0,
            ..req.clone()
        };
        assert!(bad.validate().unwrap_err().to_string().contains("source_id"));

        let bad = CreateArticleRequest {
            title: " ".to_string(),
            ..req
        };
        assert!(bad.validate().unwrap_err().to_string().contains("title"));
    }

    #[test]
    fn test_update_article_requires_a_field() {
        assert!(UpdateArticleRequest::default().validate().is_err());
        let req = UpdateArticleRequest {
            url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        let req = UpdateArticleRequest {
            summary: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_source_scraper_config_must_match_type() {
        let remix = ScraperConfig::Remix(RemixConfig {
            context_key: "routes/blog".to_string(),
            url_prefix: None,
        });
        let req = CreateSourceRequest {
            name: "Blog".to_string(),
            feed_url: "https://example.com/blog".to_string(),
            active: true,
            source_type: Some(SourceType::Webflow),
            scraper_config: Some(remix.clone()),
        };
        assert!(req.validate().is_err());

        let req = CreateSourceRequest {
            source_type: Some(SourceType::Remix),
            ..req
        };
        assert!(req.validate().is_ok());

        let rss_with_config = CreateSourceRequest {
            source_type: None,
            ..req.clone()
        };
        assert!(rss_with_config.validate().is_err());

        let scraped_without_config = CreateSourceRequest {
            scraper_config: None,
            ..req
        };
        assert!(scraped_without_config.validate().is_err());
    }

    #[test]
    fn test_update_source_scraper_config_needs_type() {
        let config = ScraperConfig::NextJs(NextJsConfig {
            data_key: "props.pageProps.posts".to_string(),
            url_prefix: Some("https://example.com/blog/".to_string()),
        });
        let req = UpdateSourceRequest {
            scraper_config: Some(config.clone()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateSourceRequest {
            source_type: Some(SourceType::NextJs),
            scraper_config: Some(config),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let back_to_rss = UpdateSourceRequest {
            source_type: Some(SourceType::Rss),
            ..Default::default()
        };
        assert!(back_to_rss.validate().is_ok());
        assert!(UpdateSourceRequest::default().validate().is_err());
    }
}
