//! Escaping of user search terms for LIKE/ILIKE predicates.
//!
//! Every pattern predicate generated by this crate carries `ESCAPE '\'`, so
//! the same escaping is correct for PostgreSQL and SQLite.

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
///
/// Backslash is escaped first so the escapes added for `%` and `_` are not
/// doubled.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for a term: `%<escaped>%`.
///
/// An empty term yields `%%`, which matches every row.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_like("rust async"), "rust async");
    }

    #[test]
    fn test_escape_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
    }

    #[test]
    fn test_escape_backslash_first() {
        // A literal backslash before a wildcard must not merge with the
        // escape added for the wildcard.
        assert_eq!(escape_like("a\\%b"), "a\\\\\\%b");
        assert_eq!(escape_like("\\_"), "\\\\\\_");
    }

    #[test]
    fn test_contains_pattern_wraps() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_empty_term_matches_everything() {
        assert_eq!(contains_pattern(""), "%%");
    }
}
