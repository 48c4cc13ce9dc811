//! SQL dialect descriptors.
//!
//! The predicate builder and the shared query text are parameterized by a
//! [`Dialect`] instead of being written once per backend.

use feedstore_core::{defaults, Error, Result};

/// How bound parameters are written in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
    /// `?` (SQLite)
    Positional,
}

/// Backend-specific SQL details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub placeholder: PlaceholderStyle,
    /// Case-insensitive substring operator available to the backend.
    pub pattern_op: &'static str,
    /// Hard ceiling on bound parameters per statement, if any.
    pub max_bind_params: Option<usize>,
}

impl Dialect {
    pub const POSTGRES: Dialect = Dialect {
        name: "postgres",
        placeholder: PlaceholderStyle::Numbered,
        pattern_op: "ILIKE",
        max_bind_params: Some(defaults::POSTGRES_MAX_BIND_PARAMS),
    };

    /// SQLite `LIKE` is case-insensitive for ASCII only.
    pub const SQLITE: Dialect = Dialect {
        name: "sqlite",
        placeholder: PlaceholderStyle::Positional,
        pattern_op: "LIKE",
        max_bind_params: Some(defaults::SQLITE_MAX_BIND_PARAMS),
    };

    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self.placeholder {
            PlaceholderStyle::Numbered => format!("${}", index),
            PlaceholderStyle::Positional => "?".to_string(),
        }
    }

    /// Comma-separated placeholders for `count` parameters starting after `offset`.
    pub fn placeholder_list(&self, offset: usize, count: usize) -> String {
        (offset + 1..=offset + count)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fail when a statement would bind more parameters than the backend allows.
    pub fn check_param_count(&self, count: usize) -> Result<()> {
        match self.max_bind_params {
            Some(max) if count > max => Err(Error::PredicateBuild(format!(
                "{} parameters exceed the {} limit of {}",
                count, self.name, max
            ))),
            _ => Ok(()),
        }
    }
}
