//! Repository bodies shared by the PostgreSQL and SQLite backends.
//!
//! Each backend declares its repository structs (a `pool`, a
//! `RetrievalConfig` named `config` and the rendered statement text named
//! `sql`) and expands these macros once per struct. Everything that differs
//! between backends lives in the [`Dialect`](crate::dialect::Dialect) and in
//! one hook: article repositories provide
//! `fetch_existing_urls(&self, &[String]) -> Result<Vec<String>>`, which binds
//! a single array on PostgreSQL and chunks an `IN` list on SQLite.

/// Implement `ArticleRepository` for a backend repository struct.
macro_rules! impl_article_repository {
    ($repo:ty, $dialect:expr) => {
        impl $repo {
            const COMPONENT: &'static str = "articles";
            const DIALECT: $crate::dialect::Dialect = $dialect;

            /// The one predicate used by both `search` and `count_matching`.
            fn search_predicate(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::ArticleSearchFilters,
            ) -> ::feedstore_core::Result<$crate::predicate::Predicate> {
                $crate::predicate::PredicateBuilder::new(Self::DIALECT).build(keywords, filters)
            }
        }

        #[::async_trait::async_trait]
        impl ::feedstore_core::ArticleRepository for $repo {
            async fn create(
                &self,
                req: ::feedstore_core::CreateArticleRequest,
            ) -> ::feedstore_core::Result<::feedstore_core::Article> {
                if let Err(e) = req.validate() {
                    $crate::instrument::rejected(Self::COMPONENT, "create_article", &e);
                    return Err(e);
                }
                let article = ::sqlx::query_as::<_, ::feedstore_core::Article>(&self.sql.insert)
                    .bind(req.source_id)
                    .bind(&req.title)
                    .bind(&req.url)
                    .bind(&req.summary)
                    .bind(req.published_at)
                    .bind(::chrono::Utc::now())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("create_article"))?;
                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "create_article",
                    backend = Self::DIALECT.name,
                    article_id = article.id,
                    source_id = article.source_id,
                    "Article created"
                );
                Ok(article)
            }

            async fn update(
                &self,
                id: i64,
                req: ::feedstore_core::UpdateArticleRequest,
            ) -> ::feedstore_core::Result<::feedstore_core::Article> {
                if let Err(e) = req.validate() {
                    $crate::instrument::rejected(Self::COMPONENT, "update_article", &e);
                    return Err(e);
                }
                ::sqlx::query_as::<_, ::feedstore_core::Article>(&self.sql.update)
                    .bind(req.source_id)
                    .bind(req.title)
                    .bind(req.url)
                    .bind(req.summary)
                    .bind(req.published_at)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("update_article"))?
                    .ok_or_else(|| ::feedstore_core::Error::NotFound(format!("article {}", id)))
            }

            async fn delete(&self, id: i64) -> ::feedstore_core::Result<()> {
                let result = ::sqlx::query(&self.sql.delete)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("delete_article"))?;
                if result.rows_affected() == 0 {
                    return Err(::feedstore_core::Error::NotFound(format!("article {}", id)));
                }
                Ok(())
            }

            async fn get_by_id(
                &self,
                id: i64,
            ) -> ::feedstore_core::Result<Option<::feedstore_core::Article>> {
                ::sqlx::query_as::<_, ::feedstore_core::Article>(&self.sql.get_by_id)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("get_article"))
            }

            async fn get_with_source(
                &self,
                id: i64,
            ) -> ::feedstore_core::Result<Option<::feedstore_core::ArticleWithSource>> {
                ::sqlx::query_as::<_, ::feedstore_core::ArticleWithSource>(
                    &self.sql.get_with_source,
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(::feedstore_core::Error::query("get_article_with_source"))
            }

            async fn list_all(&self) -> ::feedstore_core::Result<Vec<::feedstore_core::Article>> {
                ::sqlx::query_as::<_, ::feedstore_core::Article>(&self.sql.list_all)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("list_articles"))
            }

            async fn exists_by_url(&self, url: &str) -> ::feedstore_core::Result<bool> {
                ::sqlx::query_scalar::<_, bool>(&self.sql.exists_by_url)
                    .bind(url)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("exists_by_url"))
            }

            async fn exists_by_url_batch(
                &self,
                urls: &[String],
            ) -> ::feedstore_core::Result<::std::collections::HashMap<String, bool>> {
                if urls.is_empty() {
                    return Ok(::std::collections::HashMap::new());
                }
                let existing: ::std::collections::HashMap<String, bool> = self
                    .fetch_existing_urls(urls)
                    .await?
                    .into_iter()
                    .map(|url| (url, true))
                    .collect();
                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "exists_by_url_batch",
                    backend = Self::DIALECT.name,
                    requested = urls.len(),
                    result_count = existing.len(),
                    "Batch URL existence check"
                );
                Ok(existing)
            }

            async fn search(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::ArticleSearchFilters,
            ) -> ::feedstore_core::Result<Vec<::feedstore_core::Article>> {
                let predicate = self.search_predicate(keywords, filters)?;
                if predicate.is_empty() {
                    ::tracing::debug!(
                        subsystem = "db",
                        component = Self::COMPONENT,
                        op = "search_articles",
                        backend = Self::DIALECT.name,
                        "No keywords or filters, returning no articles"
                    );
                    return Ok(Vec::new());
                }

                let sql = self.sql.search(&predicate);
                let query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_as::<_, ::feedstore_core::Article>(&sql),
                    &predicate.params
                );
                let articles = $crate::instrument::bounded(
                    Self::COMPONENT,
                    "search_articles",
                    self.config.query_timeout,
                    query.fetch_all(&self.pool),
                )
                .await?;

                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "search_articles",
                    backend = Self::DIALECT.name,
                    keyword_count = keywords.len(),
                    result_count = articles.len(),
                    "Article search complete"
                );
                Ok(articles)
            }

            async fn count_matching(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::ArticleSearchFilters,
            ) -> ::feedstore_core::Result<i64> {
                let predicate = self.search_predicate(keywords, filters)?;
                if predicate.is_empty() {
                    return Ok(0);
                }

                let sql = self.sql.count(&predicate);
                let query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_scalar::<_, i64>(&sql),
                    &predicate.params
                );
                $crate::instrument::bounded(
                    Self::COMPONENT,
                    "count_articles",
                    self.config.query_timeout,
                    query.fetch_one(&self.pool),
                )
                .await
            }

            async fn search_paginated(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::ArticleSearchFilters,
                page: ::feedstore_core::PageRequest,
            ) -> ::feedstore_core::Result<
                ::feedstore_core::Paginated<::feedstore_core::ArticleWithSource>,
            > {
                let page = ::feedstore_core::PageRequest::with_default_limit(
                    page.page,
                    page.limit,
                    self.config.page_default_limit,
                );
                let predicate = $crate::predicate::PredicateBuilder::new(Self::DIALECT)
                    .with_alias($crate::sql::ARTICLE_ALIAS)
                    .build(keywords, filters)?;
                if predicate.is_empty() {
                    return Ok(::feedstore_core::Paginated::empty(page));
                }
                // LIMIT and OFFSET are bound after the predicate.
                Self::DIALECT.check_param_count(predicate.params.len() + 2)?;

                // The count and the page share one deadline.
                let deadline = $crate::instrument::Deadline::after(self.config.query_timeout);

                let count_sql = self.sql.page_count(&predicate);
                let count_query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_scalar::<_, i64>(&count_sql),
                    &predicate.params
                );
                let total = $crate::instrument::bounded_until(
                    Self::COMPONENT,
                    "count_articles_page",
                    deadline,
                    count_query.fetch_one(&self.pool),
                )
                .await?;

                let page_sql = self.sql.page(&predicate);
                let page_query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_as::<_, ::feedstore_core::ArticleWithSource>(&page_sql),
                    &predicate.params
                )
                .bind(page.limit)
                .bind(page.offset());
                let rows = $crate::instrument::bounded_until(
                    Self::COMPONENT,
                    "search_articles_page",
                    deadline,
                    page_query.fetch_all(&self.pool),
                )
                .await?;

                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "search_articles_page",
                    backend = Self::DIALECT.name,
                    keyword_count = keywords.len(),
                    page = page.page,
                    result_count = rows.len(),
                    total,
                    "Paginated article search complete"
                );
                Ok(::feedstore_core::Paginated::new(rows, total, page))
            }
        }
    };
}
pub(crate) use impl_article_repository;

/// Implement `SourceRepository` for a backend repository struct.
macro_rules! impl_source_repository {
    ($repo:ty, $dialect:expr) => {
        impl $repo {
            const COMPONENT: &'static str = "sources";
            const DIALECT: $crate::dialect::Dialect = $dialect;

            fn search_predicate(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::SourceSearchFilters,
            ) -> ::feedstore_core::Result<$crate::predicate::Predicate> {
                $crate::predicate::PredicateBuilder::new(Self::DIALECT).build(keywords, filters)
            }
        }

        #[::async_trait::async_trait]
        impl ::feedstore_core::SourceRepository for $repo {
            async fn create(
                &self,
                req: ::feedstore_core::CreateSourceRequest,
            ) -> ::feedstore_core::Result<::feedstore_core::Source> {
                if let Err(e) = req.validate() {
                    $crate::instrument::rejected(Self::COMPONENT, "create_source", &e);
                    return Err(e);
                }
                let source_type = req.source_type.unwrap_or_default();
                let scraper_config = req
                    .scraper_config
                    .as_ref()
                    .map(|c| c.to_json())
                    .transpose()?;

                let row = ::sqlx::query_as::<_, $crate::rows::SourceRow>(&self.sql.insert)
                    .bind(&req.name)
                    .bind(&req.feed_url)
                    .bind(req.active)
                    .bind(source_type.as_str())
                    .bind(scraper_config)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("create_source"))?;
                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "create_source",
                    backend = Self::DIALECT.name,
                    source_id = row.id,
                    source_type = source_type.as_str(),
                    "Source created"
                );
                ::feedstore_core::Source::try_from(row)
            }

            async fn update(
                &self,
                id: i64,
                req: ::feedstore_core::UpdateSourceRequest,
            ) -> ::feedstore_core::Result<::feedstore_core::Source> {
                if let Err(e) = req.validate() {
                    $crate::instrument::rejected(Self::COMPONENT, "update_source", &e);
                    return Err(e);
                }
                let scraper_config = req
                    .scraper_config
                    .as_ref()
                    .map(|c| c.to_json())
                    .transpose()?;

                let row = ::sqlx::query_as::<_, $crate::rows::SourceRow>(&self.sql.update)
                    .bind(req.name)
                    .bind(req.feed_url)
                    .bind(req.active)
                    .bind(req.source_type.map(|t| t.as_str()))
                    .bind(req.source_type.is_some())
                    .bind(scraper_config)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("update_source"))?
                    .ok_or_else(|| ::feedstore_core::Error::NotFound(format!("source {}", id)))?;
                ::feedstore_core::Source::try_from(row)
            }

            async fn delete(&self, id: i64) -> ::feedstore_core::Result<()> {
                let result = ::sqlx::query(&self.sql.delete)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("delete_source"))?;
                if result.rows_affected() == 0 {
                    return Err(::feedstore_core::Error::NotFound(format!("source {}", id)));
                }
                Ok(())
            }

            async fn get_by_id(
                &self,
                id: i64,
            ) -> ::feedstore_core::Result<Option<::feedstore_core::Source>> {
                ::sqlx::query_as::<_, $crate::rows::SourceRow>(&self.sql.get_by_id)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("get_source"))?
                    .map(::feedstore_core::Source::try_from)
                    .transpose()
            }

            async fn list_all(&self) -> ::feedstore_core::Result<Vec<::feedstore_core::Source>> {
                let rows = ::sqlx::query_as::<_, $crate::rows::SourceRow>(&self.sql.list_all)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("list_sources"))?;
                $crate::rows::sources_from_rows(rows)
            }

            async fn list_active(
                &self,
            ) -> ::feedstore_core::Result<Vec<::feedstore_core::Source>> {
                let rows = ::sqlx::query_as::<_, $crate::rows::SourceRow>(&self.sql.list_active)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("list_active_sources"))?;
                $crate::rows::sources_from_rows(rows)
            }

            async fn touch_crawled_at(
                &self,
                id: i64,
                at: ::chrono::DateTime<::chrono::Utc>,
            ) -> ::feedstore_core::Result<()> {
                let result = ::sqlx::query(&self.sql.touch_crawled_at)
                    .bind(at)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("touch_crawled_at"))?;
                if result.rows_affected() == 0 {
                    return Err(::feedstore_core::Error::NotFound(format!("source {}", id)));
                }
                Ok(())
            }

            async fn exists_by_feed_url(&self, feed_url: &str) -> ::feedstore_core::Result<bool> {
                ::sqlx::query_scalar::<_, bool>(&self.sql.exists_by_feed_url)
                    .bind(feed_url)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(::feedstore_core::Error::query("exists_by_feed_url"))
            }

            async fn search(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::SourceSearchFilters,
            ) -> ::feedstore_core::Result<Vec<::feedstore_core::Source>> {
                // An empty predicate lists every source.
                let predicate = self.search_predicate(keywords, filters)?;
                let sql = self.sql.search(&predicate);
                let query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_as::<_, $crate::rows::SourceRow>(&sql),
                    &predicate.params
                );
                let rows = $crate::instrument::bounded(
                    Self::COMPONENT,
                    "search_sources",
                    self.config.query_timeout,
                    query.fetch_all(&self.pool),
                )
                .await?;

                ::tracing::debug!(
                    subsystem = "db",
                    component = Self::COMPONENT,
                    op = "search_sources",
                    backend = Self::DIALECT.name,
                    keyword_count = keywords.len(),
                    result_count = rows.len(),
                    "Source search complete"
                );
                $crate::rows::sources_from_rows(rows)
            }

            async fn count_matching(
                &self,
                keywords: &[String],
                filters: &::feedstore_core::SourceSearchFilters,
            ) -> ::feedstore_core::Result<i64> {
                let predicate = self.search_predicate(keywords, filters)?;
                let sql = self.sql.count(&predicate);
                let query = $crate::predicate::bind_query_params!(
                    ::sqlx::query_scalar::<_, i64>(&sql),
                    &predicate.params
                );
                $crate::instrument::bounded(
                    Self::COMPONENT,
                    "count_sources",
                    self.config.query_timeout,
                    query.fetch_one(&self.pool),
                )
                .await
            }
        }
    };
}
pub(crate) use impl_source_repository;
