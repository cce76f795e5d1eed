//! Navigation repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Navigation;

/// Navigation repository trait
#[async_trait]
pub trait NavigationRepository: Send + Sync {
    /// List a blog's navigation entries in display order
    async fn list(&self, blog_id: i64) -> Result<Vec<Navigation>>;
}

/// SQLx-based navigation repository
pub struct SqlxNavigationRepository {
    pool: DynDatabasePool,
}

impl SqlxNavigationRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NavigationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NavigationRepository for SqlxNavigationRepository {
    async fn list(&self, blog_id: i64) -> Result<Vec<Navigation>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(sqlite_pool(&self.pool)?, blog_id).await,
            DatabaseDriver::Mysql => list_mysql(mysql_pool(&self.pool)?, blog_id).await,
        }
        .with_context(|| format!("Failed to list navigations of blog {}", blog_id))
    }
}

const LIST_SQL: &str = "SELECT id, blog_id, title, url, icon_url, open_method, display_order
     FROM navigations WHERE blog_id = ? ORDER BY display_order, id";

async fn list_sqlite(pool: &SqlitePool, blog_id: i64) -> Result<Vec<Navigation>> {
    let rows = sqlx::query(LIST_SQL).bind(blog_id).fetch_all(pool).await?;
    rows.iter().map(row_to_navigation_sqlite).collect()
}

fn row_to_navigation_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Navigation> {
    let open_method: String = row.get("open_method");
    Ok(Navigation {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        url: row.get("url"),
        icon_url: row.get("icon_url"),
        open_method: open_method.parse()?,
        display_order: row.get("display_order"),
    })
}

async fn list_mysql(pool: &MySqlPool, blog_id: i64) -> Result<Vec<Navigation>> {
    let rows = sqlx::query(LIST_SQL).bind(blog_id).fetch_all(pool).await?;
    rows.iter().map(row_to_navigation_mysql).collect()
}

fn row_to_navigation_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Navigation> {
    let open_method: String = row.get("open_method");
    Ok(Navigation {
        id: row.get("id"),
        blog_id: row.get("blog_id"),
        title: row.get("title"),
        url: row.get("url"),
        icon_url: row.get("icon_url"),
        open_method: open_method.parse()?,
        display_order: row.get("display_order"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::models::OpenMethod;

    #[tokio::test]
    async fn test_list_orders_by_display_order() {
        let pool = fixtures::migrated_pool().await;
        fixtures::insert_navigation(&pool, 1, "About", "/about", "_blank", 2).await;
        fixtures::insert_navigation(&pool, 1, "Home", "/", "_self", 1).await;
        fixtures::insert_navigation(&pool, 2, "Elsewhere", "/x", "_self", 0).await;
        let repo = SqlxNavigationRepository::new(pool);

        let navs = repo.list(1).await.unwrap();
        let titles: Vec<&str> = navs.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Home", "About"]);
        assert_eq!(navs[1].open_method, OpenMethod::NewWindow);
    }
}
