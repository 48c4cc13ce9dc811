//! Statement text shared by the PostgreSQL and SQLite repositories.
//!
//! Fixed statements are rendered once per repository for its dialect.
//! Search statements take a built [`Predicate`] so that a search and its
//! count always embed the same WHERE fragment.

use crate::dialect::Dialect;
use crate::predicate::Predicate;

const ARTICLE_COLUMNS: [&str; 7] = [
    "id",
    "source_id",
    "title",
    "url",
    "summary",
    "published_at",
    "created_at",
];

const SOURCE_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "feed_url",
    "last_crawled_at",
    "active",
    "source_type",
    "scraper_config",
];

/// Newest published first, id as tie-breaker.
const ARTICLE_ORDER: &str = "published_at DESC, id DESC";

const SOURCE_ORDER: &str = "name, id";

/// Alias used when articles are joined with sources.
pub const ARTICLE_ALIAS: &str = "a";

fn columns(cols: &[&str]) -> String {
    cols.join(", ")
}

fn qualified(alias: &str, cols: &[&str]) -> String {
    cols.iter()
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Article statements for one dialect.
#[derive(Debug, Clone)]
pub struct ArticleSql {
    dialect: Dialect,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub get_by_id: String,
    pub get_with_source: String,
    pub list_all: String,
    pub exists_by_url: String,
}

impl ArticleSql {
    pub fn new(dialect: Dialect) -> Self {
        let cols = columns(&ARTICLE_COLUMNS);
        let p = |i| dialect.placeholder(i);
        Self {
            dialect,
            insert: format!(
                "INSERT INTO articles (source_id, title, url, summary, published_at, created_at) \
                 VALUES ({}) RETURNING {}",
                dialect.placeholder_list(0, 6),
                cols
            ),
            update: format!(
                "UPDATE articles SET \
                 source_id = COALESCE({}, source_id), \
                 title = COALESCE({}, title), \
                 url = COALESCE({}, url), \
                 summary = COALESCE({}, summary), \
                 published_at = COALESCE({}, published_at) \
                 WHERE id = {} RETURNING {}",
                p(1),
                p(2),
                p(3),
                p(4),
                p(5),
                p(6),
                cols
            ),
            delete: format!("DELETE FROM articles WHERE id = {}", p(1)),
            get_by_id: format!("SELECT {} FROM articles WHERE id = {}", cols, p(1)),
            get_with_source: format!(
                "SELECT {}, s.name AS source_name FROM articles {a} \
                 JOIN sources s ON s.id = {a}.source_id WHERE {a}.id = {}",
                qualified(ARTICLE_ALIAS, &ARTICLE_COLUMNS),
                p(1),
                a = ARTICLE_ALIAS
            ),
            list_all: format!("SELECT {} FROM articles ORDER BY {}", cols, ARTICLE_ORDER),
            exists_by_url: format!("SELECT EXISTS(SELECT 1 FROM articles WHERE url = {})", p(1)),
        }
    }

    /// Matching articles, newest first. Built with no alias.
    pub fn search(&self, predicate: &Predicate) -> String {
        format!(
            "SELECT {} FROM articles{} ORDER BY {}",
            columns(&ARTICLE_COLUMNS),
            predicate.where_sql(),
            ARTICLE_ORDER
        )
    }

    /// Count for [`Self::search`]. Built with no alias.
    pub fn count(&self, predicate: &Predicate) -> String {
        format!("SELECT COUNT(*) FROM articles{}", predicate.where_sql())
    }

    /// One page joined with source names. Built with [`ARTICLE_ALIAS`];
    /// LIMIT and OFFSET are bound after the predicate's parameters.
    pub fn page(&self, predicate: &Predicate) -> String {
        let next = predicate.params.len();
        format!(
            "SELECT {}, s.name AS source_name FROM articles {a} \
             JOIN sources s ON s.id = {a}.source_id{} \
             ORDER BY {a}.published_at DESC, {a}.id DESC LIMIT {} OFFSET {}",
            qualified(ARTICLE_ALIAS, &ARTICLE_COLUMNS),
            predicate.where_sql(),
            self.dialect.placeholder(next + 1),
            self.dialect.placeholder(next + 2),
            a = ARTICLE_ALIAS
        )
    }

    /// Count for [`Self::page`]. Built with [`ARTICLE_ALIAS`].
    pub fn page_count(&self, predicate: &Predicate) -> String {
        format!(
            "SELECT COUNT(*) FROM articles {}{}",
            ARTICLE_ALIAS,
            predicate.where_sql()
        )
    }

    /// URLs from a list of `n` candidates that exist.
    pub fn existing_urls_in(&self, n: usize) -> String {
        format!(
            "SELECT url FROM articles WHERE url IN ({})",
            self.dialect.placeholder_list(0, n)
        )
    }
}

/// Source statements for one dialect.
#[derive(Debug, Clone)]
pub struct SourceSql {
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub get_by_id: String,
    pub list_all: String,
    pub list_active: String,
    pub touch_crawled_at: String,
    pub exists_by_feed_url: String,
}

impl SourceSql {
    pub fn new(dialect: Dialect) -> Self {
        let cols = columns(&SOURCE_COLUMNS);
        let p = |i| dialect.placeholder(i);
        Self {
            insert: format!(
                "INSERT INTO sources (name, feed_url, active, source_type, scraper_config) \
                 VALUES ({}) RETURNING {}",
                dialect.placeholder_list(0, 5),
                cols
            ),
            // Parameter 5 is a flag: when true, scraper_config is replaced by
            // parameter 6 (possibly NULL).
            update: format!(
                "UPDATE sources SET \
                 name = COALESCE({}, name), \
                 feed_url = COALESCE({}, feed_url), \
                 active = COALESCE({}, active), \
                 source_type = COALESCE({}, source_type), \
                 scraper_config = CASE WHEN {} THEN {} ELSE scraper_config END \
                 WHERE id = {} RETURNING {}",
                p(1),
                p(2),
                p(3),
                p(4),
                p(5),
                p(6),
                p(7),
                cols
            ),
            delete: format!("DELETE FROM sources WHERE id = {}", p(1)),
            get_by_id: format!("SELECT {} FROM sources WHERE id = {}", cols, p(1)),
            list_all: format!("SELECT {} FROM sources ORDER BY {}", cols, SOURCE_ORDER),
            list_active: format!(
                "SELECT {} FROM sources WHERE active = TRUE ORDER BY {}",
                cols, SOURCE_ORDER
            ),
            touch_crawled_at: format!(
                "UPDATE sources SET last_crawled_at = {} WHERE id = {}",
                p(1),
                p(2)
            ),
            exists_by_feed_url: format!(
                "SELECT EXISTS(SELECT 1 FROM sources WHERE feed_url = {})",
                p(1)
            ),
        }
    }

    /// Matching sources ordered by name. An empty predicate selects all rows.
    pub fn search(&self, predicate: &Predicate) -> String {
        format!(
            "SELECT {} FROM sources{} ORDER BY {}",
            columns(&SOURCE_COLUMNS),
            predicate.where_sql(),
            SOURCE_ORDER
        )
    }

    /// Count for [`Self::search`].
    pub fn count(&self, predicate: &Predicate) -> String {
        format!("SELECT COUNT(*) FROM sources{}", predicate.where_sql())
    }
}
