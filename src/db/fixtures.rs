//! Test data seeding over an in-memory SQLite database

use chrono::{DateTime, Utc};

use super::{create_test_pool, migrations::run_migrations, sqlite_pool, DynDatabasePool};
use crate::models::setting::{names, SETTING_DEFS};
use crate::models::SettingCategory;

pub async fn migrated_pool() -> DynDatabasePool {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

fn sqlite(pool: &DynDatabasePool) -> &sqlx::SqlitePool {
    sqlite_pool(pool).expect("Test pool is SQLite")
}

pub async fn insert_user(pool: &DynDatabasePool, name: &str, blog_id: Option<i64>) -> i64 {
    sqlx::query("INSERT INTO users (name, email, blog_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(name)
        .bind(format!("{}@example.com", name))
        .bind(blog_id)
        .bind(Utc::now())
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert user")
        .last_insert_rowid()
}

/// Insert a user that owns `blog_id` and is counted among its members
pub async fn insert_blog_owner(pool: &DynDatabasePool, name: &str, blog_id: i64) -> i64 {
    let id = insert_user(pool, name, Some(blog_id)).await;
    add_blog_member(pool, id, blog_id).await;
    id
}

pub async fn add_blog_member(pool: &DynDatabasePool, user_id: i64, blog_id: i64) {
    sqlx::query("INSERT INTO user_blogs (user_id, blog_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(blog_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert blog member");
}

pub async fn insert_setting(pool: &DynDatabasePool, blog_id: i64, category: SettingCategory, name: &str, value: &str) {
    sqlx::query("INSERT INTO settings (category, name, value, blog_id) VALUES (?, ?, ?, ?)")
        .bind(category.as_str())
        .bind(name)
        .bind(value)
        .bind(blog_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert setting");
}

/// Insert every known setting for `blog_id` with a well-formed value,
/// skipping the names in `except`
pub async fn seed_settings(pool: &DynDatabasePool, blog_id: i64, blog_url: &str, except: &[&str]) {
    for def in SETTING_DEFS.iter().filter(|d| !except.contains(&d.name)) {
        let value = match def.name {
            names::BASIC_BLOG_URL => blog_url.to_string(),
            names::BASIC_BLOG_TITLE => "Test Blog".to_string(),
            names::I18N_LOCALE => "en_US".to_string(),
            names::THEME_NAME => "default".to_string(),
            names::PREFERENCE_ARTICLE_LIST_PAGE_SIZE => "20".to_string(),
            names::PREFERENCE_RECENT_COMMENT_LIST_SIZE => "10".to_string(),
            n if n.starts_with("preference") => "15".to_string(),
            n => format!("{} value", n),
        };
        insert_setting(pool, blog_id, def.category, def.name, &value).await;
    }
}

pub async fn insert_statistic(pool: &DynDatabasePool, blog_id: i64, name: &str, value: &str) {
    sqlx::query("INSERT INTO statistics (name, value, blog_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(value)
        .bind(blog_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert statistic");
}

pub async fn insert_navigation(
    pool: &DynDatabasePool,
    blog_id: i64,
    title: &str,
    url: &str,
    open_method: &str,
    display_order: i32,
) {
    sqlx::query(
        "INSERT INTO navigations (blog_id, title, url, open_method, display_order) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(blog_id)
    .bind(title)
    .bind(url)
    .bind(open_method)
    .bind(display_order)
    .execute(sqlite(pool))
    .await
    .expect("Failed to insert navigation");
}

pub async fn insert_category(pool: &DynDatabasePool, blog_id: i64, title: &str) -> i64 {
    sqlx::query("INSERT INTO categories (title, description, blog_id) VALUES (?, '', ?)")
        .bind(title)
        .bind(blog_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert category")
        .last_insert_rowid()
}

pub async fn insert_tag(pool: &DynDatabasePool, blog_id: i64, title: &str) -> i64 {
    sqlx::query("INSERT INTO tags (title, blog_id) VALUES (?, ?)")
        .bind(title)
        .bind(blog_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert tag")
        .last_insert_rowid()
}

pub async fn tag_article(pool: &DynDatabasePool, article_id: i64, tag_id: i64) {
    sqlx::query("INSERT INTO article_tags (article_id, tag_id) VALUES (?, ?)")
        .bind(article_id)
        .bind(tag_id)
        .execute(sqlite(pool))
        .await
        .expect("Failed to tag article");
}

/// Builder for a seeded article
pub struct ArticleSeed {
    blog_id: i64,
    path: String,
    title: String,
    content: String,
    author_id: i64,
    category_id: Option<i64>,
    views: i64,
    comments: i64,
    created_at: DateTime<Utc>,
}

impl ArticleSeed {
    pub fn new(blog_id: i64, path: &str) -> Self {
        Self {
            blog_id,
            path: path.to_string(),
            title: path.trim_start_matches('/').to_string(),
            content: String::new(),
            author_id: 1,
            category_id: None,
            views: 0,
            comments: 0,
            created_at: Utc::now(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn author(mut self, author_id: i64) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn views(mut self, views: i64) -> Self {
        self.views = views;
        self
    }

    pub fn comments(mut self, comments: i64) -> Self {
        self.comments = comments;
        self
    }
}

pub async fn insert_article(pool: &DynDatabasePool, seed: ArticleSeed) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO articles (blog_id, author_id, title, content, path, category_id,
                              view_count, comment_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(seed.blog_id)
    .bind(seed.author_id)
    .bind(&seed.title)
    .bind(&seed.content)
    .bind(&seed.path)
    .bind(seed.category_id)
    .bind(seed.views)
    .bind(seed.comments)
    .bind(seed.created_at)
    .bind(seed.created_at)
    .execute(sqlite(pool))
    .await
    .expect("Failed to insert article")
    .last_insert_rowid()
}

pub async fn insert_comment(
    pool: &DynDatabasePool,
    blog_id: i64,
    article_id: i64,
    author_id: i64,
    content: &str,
    created_at: DateTime<Utc>,
) -> i64 {
    sqlx::query("INSERT INTO comments (blog_id, article_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(blog_id)
        .bind(article_id)
        .bind(author_id)
        .bind(content)
        .bind(created_at)
        .execute(sqlite(pool))
        .await
        .expect("Failed to insert comment")
        .last_insert_rowid()
}
