//! Settings repository
//!
//! Blog-scoped settings lookups.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::{mysql_pool, sqlite_pool, DynDatabasePool};
use crate::models::{Setting, SettingCategory};

/// Repository trait for settings operations
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get a single setting of a blog by category and name
    async fn get(&self, category: SettingCategory, name: &str, blog_id: i64) -> Result<Option<Setting>>;

    /// Get all settings of a blog
    async fn get_all(&self, blog_id: i64) -> Result<Vec<Setting>>;
}

/// SQLx-based settings repository
pub struct SqlxSettingsRepository {
    pool: DynDatabasePool,
}

impl SqlxSettingsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SettingsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    async fn get(&self, category: SettingCategory, name: &str, blog_id: i64) -> Result<Option<Setting>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(sqlite_pool(&self.pool)?, category, name, blog_id).await,
            DatabaseDriver::Mysql => get_mysql(mysql_pool(&self.pool)?, category, name, blog_id).await,
        }
        .with_context(|| format!("Failed to load setting {}.{} of blog {}", category, name, blog_id))
    }

    async fn get_all(&self, blog_id: i64) -> Result<Vec<Setting>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_all_sqlite(sqlite_pool(&self.pool)?, blog_id).await,
            DatabaseDriver::Mysql => get_all_mysql(mysql_pool(&self.pool)?, blog_id).await,
        }
        .with_context(|| format!("Failed to load settings of blog {}", blog_id))
    }
}

// SQLite implementations
async fn get_sqlite(
    pool: &SqlitePool,
    category: SettingCategory,
    name: &str,
    blog_id: i64,
) -> Result<Option<Setting>> {
    let row = sqlx::query(
        "SELECT id, category, name, value, blog_id FROM settings
         WHERE category = ? AND name = ? AND blog_id = ?",
    )
    .bind(category.as_str())
    .bind(name)
    .bind(blog_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_setting_sqlite).transpose()
}

async fn get_all_sqlite(pool: &SqlitePool, blog_id: i64) -> Result<Vec<Setting>> {
    let rows = sqlx::query("SELECT id, category, name, value, blog_id FROM settings WHERE blog_id = ? ORDER BY id")
        .bind(blog_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_setting_sqlite).collect()
}

fn row_to_setting_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Setting> {
    let category: String = row.get("category");
    Ok(Setting {
        id: row.get("id"),
        category: category.parse()?,
        name: row.get("name"),
        value: row.get("value"),
        blog_id: row.get("blog_id"),
    })
}

// MySQL implementations
async fn get_mysql(
    pool: &MySqlPool,
    category: SettingCategory,
    name: &str,
    blog_id: i64,
) -> Result<Option<Setting>> {
    let row = sqlx::query(
        "SELECT id, category, name, value, blog_id FROM settings
         WHERE category = ? AND name = ? AND blog_id = ?",
    )
    .bind(category.as_str())
    .bind(name)
    .bind(blog_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_setting_mysql).transpose()
}

async fn get_all_mysql(pool: &MySqlPool, blog_id: i64) -> Result<Vec<Setting>> {
    let rows = sqlx::query("SELECT id, category, name, value, blog_id FROM settings WHERE blog_id = ? ORDER BY id")
        .bind(blog_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_setting_mysql).collect()
}

fn row_to_setting_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Setting> {
    let category: String = row.get("category");
    Ok(Setting {
        id: row.get("id"),
        category: category.parse()?,
        name: row.get("name"),
        value: row.get("value"),
        blog_id: row.get("blog_id"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::models::setting::names;

    #[tokio::test]
    async fn test_get_is_scoped_to_blog_and_category() {
        let pool = fixtures::migrated_pool().await;
        fixtures::insert_setting(&pool, 1, SettingCategory::I18n, names::I18N_LOCALE, "zh_CN").await;
        fixtures::insert_setting(&pool, 2, SettingCategory::I18n, names::I18N_LOCALE, "en_US").await;
        let repo = SqlxSettingsRepository::new(pool);

        let locale = repo.get(SettingCategory::I18n, names::I18N_LOCALE, 1).await.unwrap().unwrap();
        assert_eq!(locale.value, "zh_CN");
        assert_eq!(locale.category, SettingCategory::I18n);

        let wrong_category = repo.get(SettingCategory::Basic, names::I18N_LOCALE, 1).await.unwrap();
        assert!(wrong_category.is_none());
        assert!(repo.get(SettingCategory::I18n, names::I18N_LOCALE, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all() {
        let pool = fixtures::migrated_pool().await;
        fixtures::insert_setting(&pool, 1, SettingCategory::Basic, names::BASIC_BLOG_TITLE, "Alice").await;
        fixtures::insert_setting(&pool, 1, SettingCategory::Theme, names::THEME_NAME, "default").await;
        fixtures::insert_setting(&pool, 2, SettingCategory::Basic, names::BASIC_BLOG_TITLE, "Bob").await;
        let repo = SqlxSettingsRepository::new(pool);

        let all = repo.get_all(1).await.unwrap();
        let loaded: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(loaded, vec![names::BASIC_BLOG_TITLE, names::THEME_NAME]);
    }

    #[tokio::test]
    async fn test_unknown_category_is_an_error() {
        let pool = fixtures::migrated_pool().await;
        pool.execute("INSERT INTO settings (category, name, value, blog_id) VALUES ('bogus', 'x', 'y', 1)")
            .await
            .unwrap();
        let repo = SqlxSettingsRepository::new(pool);

        assert!(repo.get_all(1).await.is_err());
    }
}
