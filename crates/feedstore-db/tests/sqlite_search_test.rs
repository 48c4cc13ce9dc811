//! Search, count and pagination against an in-memory SQLite database.
//!
//! These run without any external service.

use feedstore_db::test_fixtures::{jan, seed_search_corpus, TestData, TestSqlite};
use feedstore_db::{
    ArticleRepository, ArticleSearchFilters, PageRequest, SourceRepository, SourceSearchFilters,
    SourceType,
};

fn kw(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

async fn seeded() -> (TestSqlite, TestData) {
    let test_db = TestSqlite::new().await;
    let data = seed_search_corpus(&test_db.db.articles, &test_db.db.sources).await;
    (test_db, data)
}

fn titles(articles: &[feedstore_db::Article]) -> Vec<String> {
    articles.iter().map(|a| a.title.clone()).collect()
}

#[tokio::test]
async fn test_count_matches_search_len_for_every_combination() {
    let (test_db, data) = seeded().await;
    let repo = &test_db.db.articles;
    let systems = data.sources[0].id;

    let keyword_sets = vec![
        kw(&[]),
        kw(&["rust"]),
        kw(&["RUST", "borrowing"]),
        kw(&["50%"]),
        kw(&["e_c"]),
        kw(&["nothing-matches-this"]),
        kw(&[""]),
    ];
    let filter_sets = vec![
        ArticleSearchFilters::new(),
        ArticleSearchFilters::new().with_source_id(systems),
        ArticleSearchFilters::new().published_from(jan(2)),
        ArticleSearchFilters::new().published_to(jan(3)),
        ArticleSearchFilters::new()
            .with_source_id(systems)
            .published_from(jan(2))
            .published_to(jan(3)),
    ];

    for keywords in &keyword_sets {
        for filters in &filter_sets {
            let rows = repo.search(keywords, filters).await.unwrap();
            let count = repo.count_matching(keywords, filters).await.unwrap();
            assert_eq!(
                count,
                rows.len() as i64,
                "count/search mismatch for {:?} / {:?}",
                keywords,
                filters
            );
        }
    }
}

#[tokio::test]
async fn test_keywords_and_across_or_within() {
    let (test_db, _) = seeded().await;
    let repo = &test_db.db.articles;

    // "rust" hits the title of one article and the summary of another.
    let rows = repo
        .search(&kw(&["rust"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // Both keywords must match.
    let rows = repo
        .search(&kw(&["rust", "tokio"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Rust async runtimes compared"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive_for_ascii() {
    let (test_db, _) = seeded().await;
    let rows = test_db
        .db
        .articles
        .search(&kw(&["VECTOR SEARCH"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Vector search at scale"]);
}

#[tokio::test]
async fn test_percent_is_matched_literally() {
    let (test_db, _) = seeded().await;
    // Unescaped, "50%" would also match "5000 rows".
    let rows = test_db
        .db
        .articles
        .search(&kw(&["50%"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Discount: 50% off conference tickets"]);
}

#[tokio::test]
async fn test_underscore_is_matched_literally() {
    let (test_db, _) = seeded().await;
    // Unescaped, "e_c" would also match "conference".
    let rows = test_db
        .db
        .articles
        .search(&kw(&["e_c"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["snake_case vs camelCase"]);
}

#[tokio::test]
async fn test_backslash_is_matched_literally() {
    let (test_db, _) = seeded().await;
    let rows = test_db
        .db
        .articles
        .search(&kw(&["C:\\data"]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Windows paths like C:\\data"]);
}

#[tokio::test]
async fn test_empty_keyword_matches_everything() {
    let (test_db, data) = seeded().await;
    let rows = test_db
        .db
        .articles
        .search(&kw(&[""]), &ArticleSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), data.articles.len());
}

#[tokio::test]
async fn test_date_bounds_are_inclusive() {
    let (test_db, _) = seeded().await;
    // Fixture articles are published on Jan 1..=7, one per day.
    let filters = ArticleSearchFilters::new()
        .published_from(jan(2))
        .published_to(jan(4));
    let rows = test_db.db.articles.search(&[], &filters).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].published_at, jan(4));
    assert_eq!(rows[2].published_at, jan(2));
}

#[tokio::test]
async fn test_source_filter() {
    let (test_db, data) = seeded().await;
    let digest = data.sources[1].id;
    let rows = test_db
        .db
        .articles
        .search(&[], &ArticleSearchFilters::new().with_source_id(digest))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|a| a.source_id == digest));
}

#[tokio::test]
async fn test_empty_article_search_returns_nothing() {
    let (test_db, _) = seeded().await;
    let repo = &test_db.db.articles;
    let rows = repo.search(&[], &ArticleSearchFilters::new()).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(
        repo.count_matching(&[], &ArticleSearchFilters::new())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_empty_source_search_returns_everything() {
    let (test_db, data) = seeded().await;
    let repo = &test_db.db.sources;
    let rows = repo.search(&[], &SourceSearchFilters::new()).await.unwrap();
    assert_eq!(rows.len(), data.sources.len());
    assert_eq!(
        repo.count_matching(&[], &SourceSearchFilters::new())
            .await
            .unwrap(),
        data.sources.len() as i64
    );
}

#[tokio::test]
async fn test_source_keyword_search_covers_name_and_feed_url() {
    let (test_db, data) = seeded().await;
    let repo = &test_db.db.sources;

    let rows = repo
        .search(&kw(&["digest"]), &SourceSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Data Digest");

    // Every fixture feed URL lives under feeds.example.com.
    let rows = repo
        .search(&kw(&["feeds.example"]), &SourceSearchFilters::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), data.sources.len());
}

#[tokio::test]
async fn test_source_filters() {
    let (test_db, data) = seeded().await;
    let repo = &test_db.db.sources;
    repo.update(
        data.sources[1].id,
        feedstore_db::UpdateSourceRequest {
            active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let active = repo
        .search(&[], &SourceSearchFilters::new().with_active(true))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Systems Weekly");

    let remix = SourceSearchFilters::new().with_source_type(SourceType::Remix);
    assert!(repo.search(&[], &remix).await.unwrap().is_empty());
    assert_eq!(repo.count_matching(&[], &remix).await.unwrap(), 0);

    let rss = SourceSearchFilters::new().with_source_type(SourceType::Rss);
    assert_eq!(repo.count_matching(&[], &rss).await.unwrap(), 2);
}

#[tokio::test]
async fn test_search_paginated_pages_and_metadata() {
    let (test_db, data) = seeded().await;
    let repo = &test_db.db.articles;
    let systems = data.sources[0].id;
    let filters = ArticleSearchFilters::new().with_source_id(systems);

    let first = repo
        .search_paginated(&[], &filters, PageRequest::new(1, 3))
        .await
        .unwrap();
    assert_eq!(first.data.len(), 3);
    assert_eq!(first.pagination.total, 4);
    assert_eq!(first.pagination.total_pages, 2);
    assert!(first.pagination.has_more);
    // Newest published first, joined with the source name.
    assert_eq!(first.data[0].article.published_at, jan(4));
    assert!(first.data.iter().all(|r| r.source_name == "Systems Weekly"));

    let second = repo
        .search_paginated(&[], &filters, PageRequest::new(2, 3))
        .await
        .unwrap();
    assert_eq!(second.data.len(), 1);
    assert!(!second.pagination.has_more);
    assert_eq!(second.data[0].article.published_at, jan(1));
}

#[tokio::test]
async fn test_search_paginated_normalizes_page_and_limit() {
    let (test_db, _) = seeded().await;
    let page = test_db
        .db
        .articles
        .search_paginated(
            &kw(&[""]),
            &ArticleSearchFilters::new(),
            PageRequest::new(0, 0),
        )
        .await
        .unwrap();
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, 10);
    assert_eq!(page.data.len(), 7);
    assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_search_paginated_total_matches_count_matching() {
    let (test_db, _) = seeded().await;
    let repo = &test_db.db.articles;
    let keywords = kw(&["rust"]);
    let filters = ArticleSearchFilters::new();
    let page = repo
        .search_paginated(&keywords, &filters, PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(
        page.pagination.total,
        repo.count_matching(&keywords, &filters).await.unwrap()
    );
}

#[tokio::test]
async fn test_empty_paginated_search_is_page_one_of_one() {
    let (test_db, _) = seeded().await;
    let page = test_db
        .db
        .articles
        .search_paginated(&[], &ArticleSearchFilters::new(), PageRequest::new(3, 10))
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_too_many_keywords_is_predicate_error() {
    let test_db = TestSqlite::new().await;
    let keywords: Vec<String> = (0..600).map(|i| format!("k{}", i)).collect();
    let err = test_db
        .db
        .articles
        .search(&keywords, &ArticleSearchFilters::new())
        .await
        .unwrap_err();
    assert!(matches!(err, feedstore_db::Error::PredicateBuild(_)));
}

#[tokio::test]
async fn test_paginated_ceiling_counts_limit_and_offset() {
    let (test_db, _) = seeded().await;
    let repo = &test_db.db.articles;
    // 499 keywords bind 998 parameters: a plain search fits under 999, the
    // page query with LIMIT and OFFSET does not.
    let keywords: Vec<String> = (0..499).map(|i| format!("k{}", i)).collect();
    let filters = ArticleSearchFilters::new();

    assert!(repo.search(&keywords, &filters).await.unwrap().is_empty());
    let err = repo
        .search_paginated(&keywords, &filters, PageRequest::new(1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, feedstore_db::Error::PredicateBuild(_)));
}
