//! SQLite backend: articles and sources.

mod articles;
mod sources;

pub use articles::SqliteArticleRepository;
pub use sources::SqliteSourceRepository;
