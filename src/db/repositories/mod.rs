//! Database repositories
//!
//! Read-side repositories for the entities a blog page is assembled from.
//! Every query is scoped to a blog.

pub mod article;
pub mod category;
pub mod comment;
pub mod navigation;
pub mod settings;
pub mod statistic;
pub mod tag;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use navigation::{NavigationRepository, SqlxNavigationRepository};
pub use settings::{SettingsRepository, SqlxSettingsRepository};
pub use statistic::{SqlxStatisticRepository, StatisticRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserPage, UserRepository, BLOG_USER_PAGE_SIZE};

use std::sync::Arc;

use crate::db::DynDatabasePool;

/// Every repository a blog page reads from, behind their traits
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub statistics: Arc<dyn StatisticRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub navigations: Arc<dyn NavigationRepository>,
}

impl Repositories {
    /// SQLx-backed repositories sharing one pool
    pub fn sqlx(pool: DynDatabasePool) -> Self {
        Self {
            users: SqlxUserRepository::boxed(pool.clone()),
            settings: SqlxSettingsRepository::boxed(pool.clone()),
            statistics: SqlxStatisticRepository::boxed(pool.clone()),
            articles: SqlxArticleRepository::boxed(pool.clone()),
            categories: SqlxCategoryRepository::boxed(pool.clone()),
            tags: SqlxTagRepository::boxed(pool.clone()),
            comments: SqlxCommentRepository::boxed(pool.clone()),
            navigations: SqlxNavigationRepository::boxed(pool),
        }
    }
}
