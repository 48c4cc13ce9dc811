//! PostgreSQL backend: articles, sources and pgvector embeddings.

mod articles;
mod embeddings;
mod sources;

pub use articles::PgArticleRepository;
pub use embeddings::PgEmbeddingRepository;
pub use sources::PgSourceRepository;
