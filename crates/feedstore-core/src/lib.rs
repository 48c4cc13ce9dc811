//! # feedstore-core
//!
//! Core types, traits, and abstractions for the feedstore retrieval layer.
//!
//! This crate provides the data model, search filters, pagination, validation
//! and repository traits that the database crate implements.

pub mod config;
pub mod defaults;
pub mod error;
pub mod filters;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::RetrievalConfig;
pub use error::{Error, Result};
pub use filters::{ArticleSearchFilters, SourceSearchFilters};
pub use models::*;
pub use pagination::{PageRequest, Paginated, PaginationMeta};
pub use traits::*;
pub use validation::{validate_url, ValidatedEmbedding};
