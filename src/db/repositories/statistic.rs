//! Statistic repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::Statistic;

#[async_trait]
pub trait StatisticRepository: Send + Sync {
    /// Get all raw statistics of a blog
    async fn get_all(&self, blog_id: i64) -> Result<Vec<Statistic>>;
}

/// SQLx-based statistic repository
pub struct SqlxStatisticRepository {
    pool: DynDatabasePool,
}

impl SqlxStatisticRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StatisticRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StatisticRepository for SqlxStatisticRepository {
    async fn get_all(&self, blog_id: i64) -> Result<Vec<Statistic>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_all_sqlite(sqlite_pool(&self.pool)?, blog_id).await,
            DatabaseDriver::Mysql => get_all_mysql(mysql_pool(&self.pool)?, blog_id).await,
        }
        .with_context(|| format!("Failed to load statistics of blog {}", blog_id))
    }
}

async fn get_all_sqlite(pool: &SqlitePool, blog_id: i64) -> Result<Vec<Statistic>> {
    let rows = sqlx::query("SELECT id, name, value, blog_id FROM statistics WHERE blog_id = ? ORDER BY id")
        .bind(blog_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| Statistic {
            id: r.get("id"),
            name: r.get("name"),
            value: r.get("value"),
            blog_id: r.get("blog_id"),
        })
        .collect())
}

async fn get_all_mysql(pool: &MySqlPool, blog_id: i64) -> Result<Vec<Statistic>> {
    let rows = sqlx::query("SELECT id, name, value, blog_id FROM statistics WHERE blog_id = ? ORDER BY id")
        .bind(blog_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| Statistic {
            id: r.get("id"),
            name: r.get("name"),
            value: r.get("value"),
            blog_id: r.get("blog_id"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::models::statistic::names;

    #[tokio::test]
    async fn test_get_all_keeps_raw_values() {
        let pool = fixtures::migrated_pool().await;
        fixtures::insert_statistic(&pool, 1, names::ARTICLE_COUNT, "12").await;
        fixtures::insert_statistic(&pool, 1, names::VIEW_COUNT, "abc").await;
        fixtures::insert_statistic(&pool, 2, names::ARTICLE_COUNT, "3").await;
        let repo = SqlxStatisticRepository::new(pool);

        let stats = repo.get_all(1).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].value, "12");
        assert_eq!(stats[1].value, "abc");
    }
}
