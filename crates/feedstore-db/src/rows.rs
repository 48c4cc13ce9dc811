//! Raw row shapes that need decoding before they become core models.

use chrono::{DateTime, Utc};

use feedstore_core::{Error, Result, ScraperConfig, Source, SourceType};

/// A `sources` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SourceRow {
    pub id: i64,
    pub name: String,
    pub feed_url: String,
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub source_type: String,
    pub scraper_config: Option<String>,
}

impl TryFrom<SourceRow> for Source {
    type Error = Error;

    /// A stored scraper config that does not decode is an error, not `None`.
    fn try_from(row: SourceRow) -> Result<Self> {
        let source_type: SourceType = row.source_type.parse().map_err(|_| {
            Error::Serialization(format!(
                "source {} has unknown source_type {:?}",
                row.id, row.source_type
            ))
        })?;
        let scraper_config = row
            .scraper_config
            .as_deref()
            .map(|raw| ScraperConfig::from_json(source_type, raw))
            .transpose()
            .map_err(|e| {
                Error::Serialization(format!("source {} scraper_config: {}", row.id, e))
            })?;
        Ok(Source {
            id: row.id,
            name: row.name,
            feed_url: row.feed_url,
            last_crawled_at: row.last_crawled_at,
            active: row.active,
            source_type,
            scraper_config,
        })
    }
}

/// Decode a batch of source rows, failing on the first corrupt one.
pub(crate) fn sources_from_rows(rows: Vec<SourceRow>) -> Result<Vec<Source>> {
    rows.into_iter().map(Source::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source_type: &str, scraper_config: Option<&str>) -> SourceRow {
        SourceRow {
            id: 3,
            name: "Example".to_string(),
            feed_url: "https://example.com/feed".to_string(),
            last_crawled_at: None,
            active: true,
            source_type: source_type.to_string(),
            scraper_config: scraper_config.map(str::to_string),
        }
    }

    #[test]
    fn test_rss_without_config() {
        let source = Source::try_from(row("RSS", None)).unwrap();
        assert_eq!(source.source_type, SourceType::Rss);
        assert!(source.scraper_config.is_none());
    }

    #[test]
    fn test_remix_config_decodes() {
        let source =
            Source::try_from(row("Remix", Some(r#"{"context_key":"routes/blog"}"#))).unwrap();
        match source.scraper_config {
            Some(ScraperConfig::Remix(c)) => assert_eq!(c.context_key, "routes/blog"),
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let err = Source::try_from(row("Webflow", Some("{not json"))).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_unknown_source_type_is_an_error() {
        let err = Source::try_from(row("Atom", None)).unwrap_err();
        assert!(err.to_string().contains("unknown source_type"));
    }
}
