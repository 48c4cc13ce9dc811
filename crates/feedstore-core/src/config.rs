//! Retrieval configuration.
//!
//! Values are passed explicitly into repository constructors. They can be
//! built in code, loaded from TOML, or read from `FEEDSTORE_*` environment
//! variables by the surrounding process.
//!
//! ```rust
//! use std::time::Duration;
//! use feedstore_core::config::RetrievalConfig;
//!
//! let config = RetrievalConfig::new()
//!     .query_timeout(Duration::from_secs(2))
//!     .similarity_max_limit(50);
//! assert!(config.validate().is_ok());
//! ```

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults;
use crate::error::{Error, Result};

/// Bounds applied to search, count and similarity queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Deadline for each bounded query.
    #[serde(with = "duration_ms")]
    pub query_timeout: Duration,
    /// Similarity results returned for a non-positive limit.
    pub similarity_default_limit: i64,
    /// Upper bound on similarity results.
    pub similarity_max_limit: i64,
    /// Page size used for a non-positive page limit.
    pub page_default_limit: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_millis(defaults::QUERY_TIMEOUT_MS),
            similarity_default_limit: defaults::SIMILARITY_LIMIT,
            similarity_max_limit: defaults::SIMILARITY_LIMIT_MAX,
            page_default_limit: defaults::PAGE_LIMIT,
        }
    }
}

impl RetrievalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn similarity_default_limit(mut self, n: i64) -> Self {
        self.similarity_default_limit = n;
        self
    }

    pub fn similarity_max_limit(mut self, n: i64) -> Self {
        self.similarity_max_limit = n;
        self
    }

    pub fn page_default_limit(mut self, n: i64) -> Self {
        self.page_default_limit = n;
        self
    }

    /// Timeout in whole milliseconds (for error tagging and logs).
    pub fn query_timeout_ms(&self) -> u64 {
        self.query_timeout.as_millis() as u64
    }

    /// Clamp a caller-supplied similarity limit: non-positive becomes the
    /// default, anything above the maximum becomes the maximum.
    pub fn similarity_limit(&self, requested: i64) -> i64 {
        if requested <= 0 {
            self.similarity_default_limit
        } else {
            requested.min(self.similarity_max_limit)
        }
    }

    /// Reject configurations that would make queries unbounded or empty.
    pub fn validate(&self) -> Result<()> {
        if self.query_timeout.is_zero() {
            return Err(Error::Config("query_timeout must be non-zero".to_string()));
        }
        if self.similarity_default_limit <= 0 || self.similarity_max_limit <= 0 {
            return Err(Error::Config(
                "similarity limits must be positive".to_string(),
            ));
        }
        if self.similarity_default_limit > self.similarity_max_limit {
            return Err(Error::Config(format!(
                "similarity_default_limit ({}) exceeds similarity_max_limit ({})",
                self.similarity_default_limit, self.similarity_max_limit
            )));
        }
        if self.page_default_limit <= 0 {
            return Err(Error::Config(
                "page_default_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Read overrides from `FEEDSTORE_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_parse::<u64>("FEEDSTORE_QUERY_TIMEOUT_MS") {
            config.query_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = env_parse("FEEDSTORE_SIMILARITY_DEFAULT_LIMIT") {
            config.similarity_default_limit = n;
        }
        if let Some(n) = env_parse("FEEDSTORE_SIMILARITY_MAX_LIMIT") {
            config.similarity_max_limit = n;
        }
        if let Some(n) = env_parse("FEEDSTORE_PAGE_DEFAULT_LIMIT") {
            config.page_default_limit = n;
        }
        debug!(
            subsystem = "config",
            query_timeout_ms = config.query_timeout_ms(),
            similarity_default_limit = config.similarity_default_limit,
            similarity_max_limit = config.similarity_max_limit,
            page_default_limit = config.page_default_limit,
            "Loaded retrieval config from environment"
        );
        config
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.similarity_default_limit, 10);
        assert_eq!(config.similarity_max_limit, 100);
        assert_eq!(config.page_default_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RetrievalConfig::new()
            .query_timeout(Duration::from_millis(250))
            .similarity_default_limit(5)
            .similarity_max_limit(20)
            .page_default_limit(25);
        assert_eq!(config.query_timeout_ms(), 250);
        assert_eq!(config.similarity_default_limit, 5);
        assert_eq!(config.similarity_max_limit, 20);
        assert_eq!(config.page_default_limit, 25);
    }

    #[test]
    fn test_similarity_limit_clamping() {
        let config = RetrievalConfig::default();
        assert_eq!(config.similarity_limit(0), 10);
        assert_eq!(config.similarity_limit(-4), 10);
        assert_eq!(config.similarity_limit(25), 25);
        assert_eq!(config.similarity_limit(100), 100);
        assert_eq!(config.similarity_limit(150), 100);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RetrievalConfig::new().query_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let config = RetrievalConfig::new()
            .similarity_default_limit(50)
            .similarity_max_limit(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RetrievalConfig::from_toml_str("query_timeout = 1500\n").unwrap();
        assert_eq!(config.query_timeout, Duration::from_millis(1500));
        assert_eq!(config.similarity_max_limit, 100);
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(RetrievalConfig::from_toml_str("query_timeout = \"soon\"").is_err());
        assert!(RetrievalConfig::from_toml_str("page_default_limit = 0").is_err());
    }
}
