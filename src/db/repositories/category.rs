//! Category repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Categories of a blog ordered by how many articles they hold
    async fn most_used(&self, size: usize, blog_id: i64) -> Result<Vec<Category>>;

    /// Get a category of a blog by its title
    async fn get_by_title(&self, blog_id: i64, title: &str) -> Result<Option<Category>>;
}

/// SQLx-based category repository
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn most_used(&self, size: usize, blog_id: i64) -> Result<Vec<Category>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => most_used_sqlite(sqlite_pool(&self.pool)?, limit, blog_id).await,
            DatabaseDriver::Mysql => most_used_mysql(mysql_pool(&self.pool)?, limit, blog_id).await,
        }
        .with_context(|| format!("Failed to list categories of blog {}", blog_id))
    }

    async fn get_by_title(&self, blog_id: i64, title: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_title_sqlite(sqlite_pool(&self.pool)?, blog_id, title).await,
            DatabaseDriver::Mysql => get_by_title_mysql(mysql_pool(&self.pool)?, blog_id, title).await,
        }
        .with_context(|| format!("Failed to look up category '{}' of blog {}", title, blog_id))
    }
}

const MOST_USED_SQL: &str = r#"
    SELECT c.id, c.blog_id, c.title, c.description, COUNT(a.id) AS article_count
    FROM categories c
    LEFT JOIN articles a ON a.category_id = c.id
    WHERE c.blog_id = ?
    GROUP BY c.id, c.blog_id, c.title, c.description
    ORDER BY article_count DESC, c.id ASC
    LIMIT ?
"#;

const GET_BY_TITLE_SQL: &str = r#"
    SELECT c.id, c.blog_id, c.title, c.description, COUNT(a.id) AS article_count
    FROM categories c
    LEFT JOIN articles a ON a.category_id = c.id
    WHERE c.blog_id = ? AND c.title = ?
    GROUP BY c.id, c.blog_id, c.title, c.description
"#;

// SQLite implementations
async fn most_used_sqlite(pool: &SqlitePool, limit: i64, blog_id: i64) -> Result<Vec<Category>> {
    let rows = sqlx::query(MOST_USED_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn get_by_title_sqlite(pool: &SqlitePool, blog_id: i64, title: &str) -> Result<Option<Category>> {
    let row = sqlx::query(GET_BY_TITLE_SQL)
        .bind(blog_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_category_sqlite))
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        description: row.get("description"),
        article_count: row.try_get("article_count").unwrap_or(0),
    }
}

// MySQL implementations
async fn most_used_mysql(pool: &MySqlPool, limit: i64, blog_id: i64) -> Result<Vec<Category>> {
    let rows = sqlx::query(MOST_USED_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_category_mysql).collect())
}

async fn get_by_title_mysql(pool: &MySqlPool, blog_id: i64, title: &str) -> Result<Option<Category>> {
    let row = sqlx::query(GET_BY_TITLE_SQL)
        .bind(blog_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(row_to_category_mysql))
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        description: row.get("description"),
        article_count: row.try_get("article_count").unwrap_or(0),
    }
}
