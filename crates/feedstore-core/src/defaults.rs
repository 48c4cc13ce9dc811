//! Centralized default constants for feedstore.
//!
//! **This module is the single source of truth** for shared default values.
//! Runtime code reads these through [`crate::config::RetrievalConfig`] rather
//! than referencing them directly, so deployments can override them.

// =============================================================================
// QUERY BOUNDS
// =============================================================================

/// Deadline for search, count and similarity queries, in milliseconds.
pub const QUERY_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size when the caller passes a non-positive limit.
pub const PAGE_LIMIT: i64 = 10;

/// First page number (pages are 1-based).
pub const FIRST_PAGE: i64 = 1;

// =============================================================================
// SIMILARITY SEARCH
// =============================================================================

/// Result count used when the caller passes a non-positive limit.
pub const SIMILARITY_LIMIT: i64 = 10;

/// Hard cap on similarity search results.
pub const SIMILARITY_LIMIT_MAX: i64 = 100;

// =============================================================================
// STORAGE
// =============================================================================

/// Maximum bound parameters per PostgreSQL statement (the wire protocol
/// carries the parameter count in a 16-bit field).
pub const POSTGRES_MAX_BIND_PARAMS: usize = 65535;

/// Maximum bound parameters per SQLite statement.
pub const SQLITE_MAX_BIND_PARAMS: usize = 999;

/// URLs checked per statement by SQLite batch existence lookups.
pub const SQLITE_URL_BATCH_SIZE: usize = 500;
