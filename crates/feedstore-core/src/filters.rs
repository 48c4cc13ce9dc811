//! Structured search filters for articles and sources.
//!
//! Keyword semantics are shared by both entity kinds: every keyword must
//! match (AND), and a single keyword matches if any of the entity's text
//! columns contains it (OR).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SourceType;

/// Structured filters for article search.
///
/// Date bounds are inclusive and apply to `published_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSearchFilters {
    pub source_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ArticleSearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_id(mut self, source_id: i64) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn published_from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn published_to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// True when no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.source_id.is_none() && self.from.is_none() && self.to.is_none()
    }
}

/// Structured filters for source search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSearchFilters {
    pub source_type: Option<SourceType>,
    pub active: Option<bool>,
}

impl SourceSearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// True when no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.source_type.is_none() && self.active.is_none()
    }
}
