//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Comment;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Latest comments of a blog, newest first
    async fn recent(&self, size: usize, blog_id: i64) -> Result<Vec<Comment>>;
}

/// SQLx-based comment repository
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn recent(&self, size: usize, blog_id: i64) -> Result<Vec<Comment>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => recent_sqlite(sqlite_pool(&self.pool)?, limit, blog_id).await,
            DatabaseDriver::Mysql => recent_mysql(mysql_pool(&self.pool)?, limit, blog_id).await,
        }
        .with_context(|| format!("Failed to list recent comments of blog {}", blog_id))
    }
}

const RECENT_SQL: &str = r#"
    SELECT id, blog_id, article_id, author_id, content, created_at
    FROM comments
    WHERE blog_id = ?
    ORDER BY created_at DESC, id DESC
    LIMIT ?
"#;

async fn recent_sqlite(pool: &SqlitePool, limit: i64, blog_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(RECENT_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| Comment {
            id: row.get("id"),
            blog_id: row.get("blog_id"),
            article_id: row.get("article_id"),
            author_id: row.get("author_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn recent_mysql(pool: &MySqlPool, limit: i64, blog_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(RECENT_SQL)
        .bind(blog_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| Comment {
            id: row.get("id"),
            blog_id: row.get("blog_id"),
            article_id: row.get("article_id"),
            author_id: row.get("author_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
        })
        .collect())
}
