//! Article repository
//!
//! Read-side queries over a blog's articles: path lookup for content
//! resolution, the ranked widget lists and the listing pages. Every query is
//! scoped to a blog. Ranking happens here; callers only pass a limit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Article;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Get the article stored under `path` within a blog
    async fn get_by_path(&self, blog_id: i64, path: &str) -> Result<Option<Article>>;

    /// Most viewed articles, highest view count first
    async fn most_viewed(&self, size: usize, blog_id: i64) -> Result<Vec<Article>>;

    /// Most commented articles, highest comment count first
    async fn most_commented(&self, size: usize, blog_id: i64) -> Result<Vec<Article>>;

    /// Latest articles, newest first
    async fn list_recent(&self, size: usize, blog_id: i64) -> Result<Vec<Article>>;

    /// Latest articles filed under a category
    async fn list_by_category(&self, category_id: i64, size: usize, blog_id: i64) -> Result<Vec<Article>>;

    /// Latest articles carrying a tag
    async fn list_by_tag(&self, tag_id: i64, size: usize, blog_id: i64) -> Result<Vec<Article>>;
}

/// SQLx-based article repository
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }

    /// Run one of the ranked list queries, binding the blog first and the
    /// limit last.
    async fn ranked(&self, sql: &str, filter: Option<i64>, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(sqlite_pool(&self.pool)?, sql, blog_id, filter, limit).await,
            DatabaseDriver::Mysql => list_mysql(mysql_pool(&self.pool)?, sql, blog_id, filter, limit).await,
        }
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn get_by_path(&self, blog_id: i64, path: &str) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_path_sqlite(sqlite_pool(&self.pool)?, blog_id, path).await,
            DatabaseDriver::Mysql => get_by_path_mysql(mysql_pool(&self.pool)?, blog_id, path).await,
        }
        .with_context(|| format!("Failed to look up article '{}' of blog {}", path, blog_id))
    }

    async fn most_viewed(&self, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        self.ranked(MOST_VIEWED_SQL, None, size, blog_id)
            .await
            .with_context(|| format!("Failed to list most viewed articles of blog {}", blog_id))
    }

    async fn most_commented(&self, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        self.ranked(MOST_COMMENTED_SQL, None, size, blog_id)
            .await
            .with_context(|| format!("Failed to list most commented articles of blog {}", blog_id))
    }

    async fn list_recent(&self, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        self.ranked(RECENT_SQL, None, size, blog_id)
            .await
            .with_context(|| format!("Failed to list articles of blog {}", blog_id))
    }

    async fn list_by_category(&self, category_id: i64, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        self.ranked(BY_CATEGORY_SQL, Some(category_id), size, blog_id)
            .await
            .with_context(|| format!("Failed to list articles of category {}", category_id))
    }

    async fn list_by_tag(&self, tag_id: i64, size: usize, blog_id: i64) -> Result<Vec<Article>> {
        self.ranked(BY_TAG_SQL, Some(tag_id), size, blog_id)
            .await
            .with_context(|| format!("Failed to list articles of tag {}", tag_id))
    }
}

const GET_BY_PATH_SQL: &str = r#"
    SELECT id, blog_id, author_id, title, content, path, category_id,
           view_count, comment_count, created_at, updated_at
    FROM articles
    WHERE blog_id = ? AND path = ?
"#;

const MOST_VIEWED_SQL: &str = r#"
    SELECT id, blog_id, author_id, title, content, path, category_id,
           view_count, comment_count, created_at, updated_at
    FROM articles
    WHERE blog_id = ?
    ORDER BY view_count DESC, id DESC
    LIMIT ?
"#;

const MOST_COMMENTED_SQL: &str = r#"
    SELECT id, blog_id, author_id, title, content, path, category_id,
           view_count, comment_count, created_at, updated_at
    FROM articles
    WHERE blog_id = ?
    ORDER BY comment_count DESC, id DESC
    LIMIT ?
"#;

const RECENT_SQL: &str = r#"
    SELECT id, blog_id, author_id, title, content, path, category_id,
           view_count, comment_count, created_at, updated_at
    FROM articles
    WHERE blog_id = ?
    ORDER BY created_at DESC, id DESC
    LIMIT ?
"#;

const BY_CATEGORY_SQL: &str = r#"
    SELECT id, blog_id, author_id, title, content, path, category_id,
           view_count, comment_count, created_at, updated_at
    FROM articles
    WHERE blog_id = ? AND category_id = ?
    ORDER BY created_at DESC, id DESC
    LIMIT ?
"#;

const BY_TAG_SQL: &str = r#"
    SELECT a.id, a.blog_id, a.author_id, a.title, a.content, a.path, a.category_id,
           a.view_count, a.comment_count, a.created_at, a.updated_at
    FROM articles a
    INNER JOIN article_tags at ON a.id = at.article_id
    WHERE a.blog_id = ? AND at.tag_id = ?
    ORDER BY a.created_at DESC, a.id DESC
    LIMIT ?
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_by_path_sqlite(pool: &SqlitePool, blog_id: i64, path: &str) -> Result<Option<Article>> {
    let row = sqlx::query(GET_BY_PATH_SQL)
        .bind(blog_id)
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_article_sqlite))
}

async fn list_sqlite(
    pool: &SqlitePool,
    sql: &str,
    blog_id: i64,
    filter: Option<i64>,
    limit: i64,
) -> Result<Vec<Article>> {
    let mut query = sqlx::query(sql).bind(blog_id);
    if let Some(id) = filter {
        query = query.bind(id);
    }
    let rows = query.bind(limit).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_article_sqlite).collect())
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        path: row.get("path"),
        category_id: row.get("category_id"),
        view_count: row.try_get("view_count").unwrap_or(0),
        comment_count: row.try_get("comment_count").unwrap_or(0),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_by_path_mysql(pool: &MySqlPool, blog_id: i64, path: &str) -> Result<Option<Article>> {
    let row = sqlx::query(GET_BY_PATH_SQL)
        .bind(blog_id)
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_article_mysql))
}

async fn list_mysql(
    pool: &MySqlPool,
    sql: &str,
    blog_id: i64,
    filter: Option<i64>,
    limit: i64,
) -> Result<Vec<Article>> {
    let mut query = sqlx::query(sql).bind(blog_id);
    if let Some(id) = filter {
        query = query.bind(id);
    }
    let rows = query.bind(limit).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_article_mysql).collect())
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Article {
    Article {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        path: row.get("path"),
        category_id: row.get("category_id"),
        view_count: row.try_get("view_count").unwrap_or(0),
        comment_count: row.try_get("comment_count").unwrap_or(0),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
