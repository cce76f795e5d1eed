//! User repository
//!
//! Tenant lookup by name, author lookup by id and the paged listing of a
//! blog's members.

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Page size of the blog member listing
pub const BLOG_USER_PAGE_SIZE: i64 = 15;

/// One page of blog members plus the total member count
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get user by unique name
    async fn get_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// List the members of a blog (1-indexed page of `BLOG_USER_PAGE_SIZE`)
    async fn list_blog_users(&self, page: i64, blog_id: i64) -> Result<UserPage>;
}

/// SQLx-based user repository
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_name_sqlite(sqlite_pool(&self.pool)?, name).await,
            DatabaseDriver::Mysql => get_by_name_mysql(mysql_pool(&self.pool)?, name).await,
        }
        .with_context(|| format!("Failed to look up user '{}'", name))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(mysql_pool(&self.pool)?, id).await,
        }
        .with_context(|| format!("Failed to look up user {}", id))
    }

    async fn list_blog_users(&self, page: i64, blog_id: i64) -> Result<UserPage> {
        let offset = (page.max(1) - 1) * BLOG_USER_PAGE_SIZE;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_blog_users_sqlite(sqlite_pool(&self.pool)?, blog_id, offset).await
            }
            DatabaseDriver::Mysql => {
                list_blog_users_mysql(mysql_pool(&self.pool)?, blog_id, offset).await
            }
        }
        .with_context(|| format!("Failed to list users of blog {}", blog_id))
    }
}

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.avatar_url, u.blog_id, u.created_at";

// SQLite implementations
async fn get_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users u WHERE u.name = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(name).fetch_optional(pool).await?;
    Ok(row.as_ref().map(row_to_user_sqlite))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(row_to_user_sqlite))
}

async fn list_blog_users_sqlite(pool: &SqlitePool, blog_id: i64, offset: i64) -> Result<UserPage> {
    let sql = format!(
        "SELECT {} FROM users u JOIN user_blogs ub ON ub.user_id = u.id
         WHERE ub.blog_id = ? ORDER BY u.id LIMIT ? OFFSET ?",
        USER_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(blog_id)
        .bind(BLOG_USER_PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM user_blogs WHERE blog_id = ?")
        .bind(blog_id)
        .fetch_one(pool)
        .await?
        .get("total");

    Ok(UserPage {
        users: rows.iter().map(row_to_user_sqlite).collect(),
        total,
    })
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
        blog_id: row.get("blog_id"),
        created_at: row.get("created_at"),
    }
}

// MySQL implementations
async fn get_by_name_mysql(pool: &MySqlPool, name: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users u WHERE u.name = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(name).fetch_optional(pool).await?;
    Ok(row.as_ref().map(row_to_user_mysql))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(row_to_user_mysql))
}

async fn list_blog_users_mysql(pool: &MySqlPool, blog_id: i64, offset: i64) -> Result<UserPage> {
    let sql = format!(
        "SELECT {} FROM users u JOIN user_blogs ub ON ub.user_id = u.id
         WHERE ub.blog_id = ? ORDER BY u.id LIMIT ? OFFSET ?",
        USER_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(blog_id)
        .bind(BLOG_USER_PAGE_SIZE)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM user_blogs WHERE blog_id = ?")
        .bind(blog_id)
        .fetch_one(pool)
        .await?
        .get("total");

    Ok(UserPage {
        users: rows.iter().map(row_to_user_mysql).collect(),
        total,
    })
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
        blog_id: row.get("blog_id"),
        created_at: row.get("created_at"),
    }
}
