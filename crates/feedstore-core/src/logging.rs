//! Structured logging schema and field name constants for feedstore.
//!
//! All crates use these names for structured `tracing` fields so that an
//! external observer (log pipeline, metrics bridge) can derive load events,
//! validation failures and timeouts without the core emitting telemetry
//! itself.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Timeouts, slow queries, validation rejections |
//! | INFO  | Lifecycle events (pool creation, migrations) |
//! | DEBUG | Query completions with counts and durations |
//! | TRACE | Generated predicate text and parameter counts |
//!
//! Row values are never logged.

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event. Values: "db", "search", "embeddings"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem. Examples: "articles", "sources", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name. Examples: "search", "count_matching", "upsert"
pub const OPERATION: &str = "op";

/// Storage backend. Values: "postgres", "sqlite"
pub const BACKEND: &str = "backend";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Article id being operated on.
pub const ARTICLE_ID: &str = "article_id";

/// Source id being operated on.
pub const SOURCE_ID: &str = "source_id";

/// Embedding type (title, content, summary).
pub const EMBEDDING_TYPE: &str = "embedding_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Total rows matching a predicate (count query).
pub const TOTAL_COUNT: &str = "total";

/// Number of keywords in a search request.
pub const KEYWORD_COUNT: &str = "keyword_count";

/// Number of bound parameters in a generated predicate.
pub const PARAM_COUNT: &str = "param_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";

/// Queries slower than this are logged at WARN with `slow = true`.
pub const SLOW_QUERY_MS: u64 = 1_000;
