//! Search predicate builder shared by count and search queries.
//!
//! A [`PredicateBuilder`] turns keywords plus a structured [`FilterSet`] into
//! one parameterized WHERE fragment for a given [`Dialect`]. Count queries and
//! search queries call it with identical arguments, so both evaluate exactly
//! the same condition.
//!
//! ```rust
//! use feedstore_db::dialect::Dialect;
//! use feedstore_db::predicate::PredicateBuilder;
//! use feedstore_db::ArticleSearchFilters;
//!
//! let filters = ArticleSearchFilters::new().with_source_id(7);
//! let predicate = PredicateBuilder::new(Dialect::POSTGRES)
//!     .build(&["rust".to_string()], &filters)
//!     .unwrap();
//! assert_eq!(
//!     predicate.clause,
//!     "(title ILIKE $1 ESCAPE '\\' OR summary ILIKE $2 ESCAPE '\\') AND source_id = $3"
//! );
//! assert_eq!(predicate.params.len(), 3);
//! ```

use chrono::{DateTime, Utc};
use tracing::trace;

use feedstore_core::{ArticleSearchFilters, Result, SourceSearchFilters};

use crate::dialect::Dialect;
use crate::escape::contains_pattern;

/// Type-safe parameter binding for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Integer parameter.
    Int(i64),
    /// Boolean parameter.
    Bool(bool),
    /// Timestamp parameter.
    Timestamp(DateTime<Utc>),
    /// String parameter (including escaped LIKE patterns).
    String(String),
}

/// Bind a sequence of [`QueryParam`]s to a sqlx query, in order.
macro_rules! bind_query_params {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for param in $params {
            q = match param {
                $crate::predicate::QueryParam::Int(v) => q.bind(v),
                $crate::predicate::QueryParam::Bool(v) => q.bind(v),
                $crate::predicate::QueryParam::Timestamp(v) => q.bind(v),
                $crate::predicate::QueryParam::String(v) => q.bind(v),
            };
        }
        q
    }};
}
pub(crate) use bind_query_params;

/// Comparison used by a structured filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    AtLeast,
    AtMost,
}

impl Comparison {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }
}

/// One structured filter condition: `<column> <cmp> <param>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: &'static str,
    pub comparison: Comparison,
    pub param: QueryParam,
}

impl FilterCondition {
    fn new(column: &'static str, comparison: Comparison, param: QueryParam) -> Self {
        Self {
            column,
            comparison,
            param,
        }
    }
}

/// A structured filter set for one entity kind.
pub trait FilterSet {
    /// Columns a single keyword is matched against (OR).
    const KEYWORD_COLUMNS: [&'static str; 2];

    /// Active conditions, in binding order.
    fn conditions(&self) -> Vec<FilterCondition>;
}

impl FilterSet for ArticleSearchFilters {
    const KEYWORD_COLUMNS: [&'static str; 2] = ["title", "summary"];

    fn conditions(&self) -> Vec<FilterCondition> {
        let mut out = Vec::new();
        if let Some(source_id) = self.source_id {
            out.push(FilterCondition::new(
                "source_id",
                Comparison::Eq,
                QueryParam::Int(source_id),
            ));
        }
        if let Some(from) = self.from {
            out.push(FilterCondition::new(
                "published_at",
                Comparison::AtLeast,
                QueryParam::Timestamp(from),
            ));
        }
        if let Some(to) = self.to {
            out.push(FilterCondition::new(
                "published_at",
                Comparison::AtMost,
                QueryParam::Timestamp(to),
            ));
        }
        out
    }
}

impl FilterSet for SourceSearchFilters {
    const KEYWORD_COLUMNS: [&'static str; 2] = ["name", "feed_url"];

    fn conditions(&self) -> Vec<FilterCondition> {
        let mut out = Vec::new();
        if let Some(source_type) = self.source_type {
            out.push(FilterCondition::new(
                "source_type",
                Comparison::Eq,
                QueryParam::String(source_type.as_str().to_string()),
            ));
        }
        if let Some(active) = self.active {
            out.push(FilterCondition::new(
                "active",
                Comparison::Eq,
                QueryParam::Bool(active),
            ));
        }
        out
    }
}

/// A built WHERE fragment and its parameters in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    /// Conditions joined with ` AND `, without the `WHERE` keyword.
    pub clause: String,
    pub params: Vec<QueryParam>,
}

impl Predicate {
    /// True when neither keywords nor filters produced a condition.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// ` WHERE <clause>`, or an empty string for an empty predicate.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clause)
        }
    }
}

/// Builds search predicates for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'a> {
    dialect: Dialect,
    alias: Option<&'a str>,
    param_offset: usize,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            alias: None,
            param_offset: 0,
        }
    }

    /// Qualify every column with `alias.` (for joined queries).
    pub fn with_alias(mut self, alias: &'a str) -> Self {
        self.alias = if alias.is_empty() { None } else { Some(alias) };
        self
    }

    /// Number of parameters already bound ahead of the predicate.
    pub fn with_param_offset(mut self, param_offset: usize) -> Self {
        self.param_offset = param_offset;
        self
    }

    fn column(&self, name: &str) -> String {
        match self.alias {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        }
    }

    /// Build the predicate.
    ///
    /// Keyword groups come first in input order, then the filter set's
    /// conditions in their declared order. Placeholder numbering follows the
    /// same order.
    pub fn build<F: FilterSet>(&self, keywords: &[String], filters: &F) -> Result<Predicate> {
        let conditions = filters.conditions();
        if keywords.is_empty() && conditions.is_empty() {
            return Ok(Predicate::default());
        }

        let mut clauses = Vec::with_capacity(keywords.len() + conditions.len());
        let mut params = Vec::with_capacity(keywords.len() * 2 + conditions.len());
        let mut param_idx = self.param_offset;

        for keyword in keywords {
            let pattern = contains_pattern(keyword);
            let group = F::KEYWORD_COLUMNS
                .iter()
                .map(|col| {
                    param_idx += 1;
                    params.push(QueryParam::String(pattern.clone()));
                    format!(
                        "{} {} {} ESCAPE '\\'",
                        self.column(col),
                        self.dialect.pattern_op,
                        self.dialect.placeholder(param_idx)
                    )
                })
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({})", group));
        }

        for condition in conditions {
            param_idx += 1;
            clauses.push(format!(
                "{} {} {}",
                self.column(condition.column),
                condition.comparison.as_sql(),
                self.dialect.placeholder(param_idx)
            ));
            params.push(condition.param);
        }

        self.dialect.check_param_count(param_idx)?;

        let clause = clauses.join(" AND ");
        trace!(
            subsystem = "db",
            component = "predicate",
            backend = self.dialect.name,
            keyword_count = keywords.len(),
            param_count = params.len(),
            clause = %clause,
            "Built search predicate"
        );
        Ok(Predicate { clause, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use feedstore_core::SourceType;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_empty_inputs_give_empty_predicate() {
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .build(&[], &ArticleSearchFilters::new())
            .unwrap();
        assert!(p.is_empty());
        assert!(p.params.is_empty());
        assert_eq!(p.where_sql(), "");
    }

    #[test]
    fn test_keywords_are_anded_columns_ored() {
        let p = PredicateBuilder::new(Dialect::SQLITE)
            .build(&kw(&["rust", "tokio"]), &ArticleSearchFilters::new())
            .unwrap();
        assert_eq!(
            p.clause,
            "(title LIKE ? ESCAPE '\\' OR summary LIKE ? ESCAPE '\\') AND \
             (title LIKE ? ESCAPE '\\' OR summary LIKE ? ESCAPE '\\')"
        );
        assert_eq!(
            p.params,
            vec![
                QueryParam::String("%rust%".to_string()),
                QueryParam::String("%rust%".to_string()),
                QueryParam::String("%tokio%".to_string()),
                QueryParam::String("%tokio%".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_are_escaped() {
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .build(&kw(&["100%"]), &ArticleSearchFilters::new())
            .unwrap();
        assert_eq!(p.params[0], QueryParam::String("%100\\%%".to_string()));
    }

    #[test]
    fn test_parameter_order_keywords_then_filters() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let filters = ArticleSearchFilters::new()
            .published_to(to)
            .with_source_id(4)
            .published_from(from);
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .build(&kw(&["x"]), &filters)
            .unwrap();
        assert_eq!(
            p.clause,
            "(title ILIKE $1 ESCAPE '\\' OR summary ILIKE $2 ESCAPE '\\') \
             AND source_id = $3 AND published_at >= $4 AND published_at <= $5"
        );
        assert_eq!(p.params[2], QueryParam::Int(4));
        assert_eq!(p.params[3], QueryParam::Timestamp(from));
        assert_eq!(p.params[4], QueryParam::Timestamp(to));
    }

    #[test]
    fn test_alias_prefixes_every_column() {
        let filters = ArticleSearchFilters::new().with_source_id(1);
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .with_alias("a")
            .build(&kw(&["q"]), &filters)
            .unwrap();
        assert_eq!(
            p.clause,
            "(a.title ILIKE $1 ESCAPE '\\' OR a.summary ILIKE $2 ESCAPE '\\') AND a.source_id = $3"
        );
    }

    #[test]
    fn test_empty_alias_is_bare() {
        let filters = ArticleSearchFilters::new().with_source_id(1);
        let p = PredicateBuilder::new(Dialect::SQLITE)
            .with_alias("")
            .build(&[], &filters)
            .unwrap();
        assert_eq!(p.clause, "source_id = ?");
    }

    #[test]
    fn test_param_offset_shifts_numbering() {
        let filters = SourceSearchFilters::new().with_active(true);
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .with_param_offset(2)
            .build(&[], &filters)
            .unwrap();
        assert_eq!(p.clause, "active = $3");
    }

    #[test]
    fn test_source_filters() {
        let filters = SourceSearchFilters::new()
            .with_active(false)
            .with_source_type(SourceType::NextJs);
        let p = PredicateBuilder::new(Dialect::POSTGRES)
            .build(&kw(&["blog"]), &filters)
            .unwrap();
        assert_eq!(
            p.clause,
            "(name ILIKE $1 ESCAPE '\\' OR feed_url ILIKE $2 ESCAPE '\\') \
             AND source_type = $3 AND active = $4"
        );
        assert_eq!(p.params[2], QueryParam::String("NextJS".to_string()));
        assert_eq!(p.params[3], QueryParam::Bool(false));
    }

    #[test]
    fn test_same_inputs_give_same_predicate() {
        let filters = ArticleSearchFilters::new().with_source_id(9);
        let words = kw(&["a", "b"]);
        let builder = PredicateBuilder::new(Dialect::SQLITE).with_alias("a");
        assert_eq!(
            builder.build(&words, &filters).unwrap(),
            builder.build(&words, &filters).unwrap()
        );
    }

    #[test]
    fn test_sqlite_ceiling_is_an_error() {
        let words: Vec<String> = (0..500).map(|i| format!("w{}", i)).collect();
        let err = PredicateBuilder::new(Dialect::SQLITE)
            .build(&words, &ArticleSearchFilters::new())
            .unwrap_err();
        assert!(matches!(err, feedstore_core::Error::PredicateBuild(_)));

        assert!(PredicateBuilder::new(Dialect::POSTGRES)
            .build(&words, &ArticleSearchFilters::new())
            .is_ok());
    }

    #[test]
    fn test_postgres_ceiling_is_an_error() {
        // Two parameters per keyword: 32767 keywords fit, 32768 do not.
        let fits: Vec<String> = (0..32767).map(|i| format!("w{}", i)).collect();
        assert!(PredicateBuilder::new(Dialect::POSTGRES)
            .build(&fits, &ArticleSearchFilters::new())
            .is_ok());

        let too_many: Vec<String> = (0..32768).map(|i| format!("w{}", i)).collect();
        let err = PredicateBuilder::new(Dialect::POSTGRES)
            .build(&too_many, &ArticleSearchFilters::new())
            .unwrap_err();
        assert!(matches!(err, feedstore_core::Error::PredicateBuild(_)));
    }
}
