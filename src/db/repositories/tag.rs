//! Tag repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags of a blog ordered by how many articles carry them
    async fn most_used(&self, size: usize, blog_id: i64) -> Result<Vec<Tag>>;

    /// Get a tag of a blog by its title
    async fn get_by_title(&self, blog_id: i64, title: &str) -> Result<Option<Tag>>;
}

/// SQLx-based tag repository
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn most_used(&self, size: usize, blog_id: i64) -> Result<Vec<Tag>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => most_used_sqlite(sqlite_pool(&self.pool)?, limit, blog_id).await,
            DatabaseDriver::Mysql => most_used_mysql(mysql_pool(&self.pool)?, limit, blog_id).await,
        }
        .with_context(|| format!("Failed to list tags of blog {}", blog_id))
    }

    async fn get_by_title(&self, blog_id: i64, title: &str) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_title_sqlite(sqlite_pool(&self.pool)?, blog_id, title).await,
            DatabaseDriver::Mysql => get_by_title_mysql(mysql_pool(&self.pool)?, blog_id, title).await,
        }
        .with_context(|| format!("Failed to look up tag '{}' of blog {}", title, blog_id))
    }
}

const MOST_USED_SQL: &str = r#"
    SELECT t.id, t.blog_id, t.title, COUNT(at.article_id) AS article_count
    FROM tags t
    LEFT JOIN article_tags at ON t.id = at.tag_id
    WHERE t.blog_id = ?
    GROUP BY t.id, t.blog_id, t.title
    ORDER BY article_count DESC, t.id ASC
    LIMIT ?
"#;

const GET_BY_TITLE_SQL: &str = r#"
    SELECT t.id, t.blog_id, t.title, COUNT(at.article_id) AS article_count
    FROM tags t
    LEFT JOIN article_tags at ON t.id = at.tag_id
    WHERE t.blog_id = ? AND t.title = ?
    GROUP BY t.id, t.blog_id, t.title
"#;

// SQLite implementations
async fn most_used_sqlite(pool: &SqlitePool, limit: i64, blog_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(MOST_USED_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_tag_sqlite).collect())
}

async fn get_by_title_sqlite(pool: &SqlitePool, blog_id: i64, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(GET_BY_TITLE_SQL)
        .bind(blog_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_tag_sqlite))
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        article_count: row.try_get("article_count").unwrap_or(0),
    }
}

// MySQL implementations
async fn most_used_mysql(pool: &MySqlPool, limit: i64, blog_id: i64) -> Result<Vec<Tag>> {
    let rows = sqlx::query(MOST_USED_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_tag_mysql).collect())
}

async fn get_by_title_mysql(pool: &MySqlPool, blog_id: i64, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(GET_BY_TITLE_SQL)
        .bind(blog_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_tag_mysql))
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        article_count: row.try_get("article_count").unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, ArticleSeed};

    #[tokio::test]
    async fn test_most_used_orders_by_article_count() {
        let pool = fixtures::migrated_pool().await;
        let rust = fixtures::insert_tag(&pool, 1, "rust").await;
        let go = fixtures::insert_tag(&pool, 1, "go").await;
        fixtures::insert_tag(&pool, 1, "unused").await;
        fixtures::insert_tag(&pool, 2, "foreign").await;
        for path in ["/a", "/b"] {
            let id = fixtures::insert_article(&pool, ArticleSeed::new(1, path)).await;
            fixtures::tag_article(&pool, id, go).await;
        }
        let c = fixtures::insert_article(&pool, ArticleSeed::new(1, "/c")).await;
        fixtures::tag_article(&pool, c, rust).await;
        let repo = SqlxTagRepository::new(pool);

        let tags = repo.most_used(15, 1).await.unwrap();
        let titles: Vec<&str> = tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["go", "rust", "unused"]);
        assert_eq!(tags[0].article_count, 2);

        assert_eq!(repo.most_used(1, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_title() {
        let pool = fixtures::migrated_pool().await;
        fixtures::insert_tag(&pool, 1, "rust").await;
        let repo = SqlxTagRepository::new(pool);

        assert!(repo.get_by_title(1, "rust").await.unwrap().is_some());
        assert!(repo.get_by_title(2, "rust").await.unwrap().is_none());
    }
}
