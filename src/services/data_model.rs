//! View-model assembly
//!
//! [`DataModelService::fill_common`] fills every fixed key of a
//! [`DataModel`] for one blog. Each step stands alone: a step that fails logs
//! and leaves empty values for its own keys, so a page always renders.

use chrono::{Datelike, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::db::repositories::Repositories;
use crate::models::setting::{defaults, names, setting_kind};
use crate::models::{Navigation, SettingCategory, User};
use crate::services::i18n::I18nService;
use crate::services::markdown::MarkdownRenderer;
use crate::services::widgets::Widgets;
use crate::theme::{DataModel, DualCaseMap, SettingValue, ThemeConf};

/// Failure of a single assembly step
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Required setting missing: {0}")]
    MissingSetting(&'static str),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Fills the blog-wide part of the view-model
pub struct DataModelService {
    repos: Repositories,
    i18n: Arc<I18nService>,
    markdown: Arc<MarkdownRenderer>,
    conf: ThemeConf,
}

impl DataModelService {
    pub fn new(repos: Repositories, i18n: Arc<I18nService>, markdown: Arc<MarkdownRenderer>, conf: ThemeConf) -> Self {
        Self {
            repos,
            i18n,
            markdown,
            conf,
        }
    }

    /// Populate the fixed keys of `model` for `blog_admin`'s blog.
    ///
    /// Every key is overwritten; calling this twice leaves the second result.
    pub async fn fill_common(&self, blog_admin: &User, blog_id: i64, model: &mut DataModel) {
        tracing::debug!(blog_id, blog_admin = %blog_admin.name, "Assembling view-model");

        model.i18n = match self.locale(blog_id).await {
            Ok(locale) => {
                let messages = self.i18n.messages(&locale).await;
                messages.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            Err(e) => {
                tracing::error!(blog_id, error = %e, "Failed to resolve blog locale");
                DualCaseMap::new()
            }
        };

        model.setting = self.settings(blog_id).await.unwrap_or_else(|e| {
            tracing::error!(blog_id, error = %e, "Failed to load blog settings");
            DualCaseMap::new()
        });

        model.statistic = self.statistics(blog_id).await.unwrap_or_else(|e| {
            tracing::error!(blog_id, error = %e, "Failed to load blog statistics");
            DualCaseMap::new()
        });

        model.favicon_url = scalar(&model.setting, names::BASIC_FAVICON_URL);
        model.logo_url = scalar(&model.setting, names::BASIC_LOGO_URL);
        model.blog_url = scalar(&model.setting, names::BASIC_BLOG_URL);
        model.title = scalar(&model.setting, names::BASIC_BLOG_TITLE);
        model.meta_keywords = scalar(&model.setting, names::BASIC_META_KEYWORDS);
        model.meta_description = scalar(&model.setting, names::BASIC_META_DESCRIPTION);
        model.conf = self.conf.clone();
        model.year = Utc::now().year();

        model.user_count = self.user_count(blog_id).await.unwrap_or_else(|e| {
            tracing::error!(blog_id, error = %e, "Failed to count blog users");
            0
        });

        model.navigations = self.navigations(blog_id).await.unwrap_or_else(|e| {
            tracing::error!(blog_id, error = %e, "Failed to load navigations");
            Vec::new()
        });

        let widgets = Widgets::for_model(&self.repos, &self.markdown, blog_id, model);
        let (categories, tags, most_viewed, comments, most_commented) = tokio::join!(
            widgets.most_use_categories(),
            widgets.most_use_tags(),
            widgets.most_view_articles(),
            widgets.recent_comments(),
            widgets.most_comment_articles(),
        );

        model.most_use_categories = or_empty(categories, blog_id, "MostUseCategories");
        model.most_use_tags = or_empty(tags, blog_id, "MostUseTags");
        model.most_view_articles = or_empty(most_viewed, blog_id, "MostViewArticles");
        model.recent_comments = or_empty(comments, blog_id, "RecentComments");
        model.most_comment_articles = or_empty(most_commented, blog_id, "MostCommentArticles");
    }

    async fn locale(&self, blog_id: i64) -> Result<String, AssembleError> {
        let setting = self
            .repos
            .settings
            .get(SettingCategory::I18n, names::I18N_LOCALE, blog_id)
            .await?;

        match setting {
            Some(s) if !s.value.trim().is_empty() => Ok(s.value.trim().to_string()),
            _ => {
                tracing::warn!(blog_id, setting = names::I18N_LOCALE, "Locale not set, using {}", defaults::I18N_LOCALE);
                Ok(defaults::I18N_LOCALE.to_string())
            }
        }
    }

    async fn settings(&self, blog_id: i64) -> Result<DualCaseMap<SettingValue>, AssembleError> {
        let settings = self.repos.settings.get_all(blog_id).await?;
        Ok(settings
            .into_iter()
            .map(|s| {
                let kind = setting_kind(&s.name);
                (s.name, SettingValue::new(s.value, kind))
            })
            .collect())
    }

    async fn statistics(&self, blog_id: i64) -> Result<DualCaseMap<i64>, AssembleError> {
        let statistics = self.repos.statistics.get_all(blog_id).await?;
        Ok(statistics
            .into_iter()
            .filter_map(|s| match s.value.trim().parse::<i64>() {
                Ok(value) => Some((s.name, value)),
                Err(e) => {
                    tracing::error!(blog_id, statistic = %s.name, value = %s.value, error = %e, "Malformed statistic, omitted");
                    None
                }
            })
            .collect())
    }

    async fn user_count(&self, blog_id: i64) -> Result<i64, AssembleError> {
        Ok(self.repos.users.list_blog_users(1, blog_id).await?.total)
    }

    async fn navigations(&self, blog_id: i64) -> Result<Vec<Navigation>, AssembleError> {
        Ok(self.repos.navigations.list(blog_id).await?)
    }
}

/// A required basic setting, checked
pub fn required_setting<'a>(
    settings: &'a DualCaseMap<SettingValue>,
    name: &'static str,
) -> Result<&'a SettingValue, AssembleError> {
    settings.get(name).ok_or(AssembleError::MissingSetting(name))
}

fn scalar(settings: &DualCaseMap<SettingValue>, name: &'static str) -> String {
    match required_setting(settings, name) {
        Ok(setting) => setting.value.clone(),
        Err(e) => {
            tracing::warn!(setting = name, "{}, using empty value", e);
            String::new()
        }
    }
}

fn or_empty<T>(result: anyhow::Result<Vec<T>>, blog_id: i64, key: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(blog_id, widget = key, error = %e, "Widget failed, left empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeMode;
    use crate::db::fixtures::*;
    use crate::models::statistic;
    use crate::services::log_counter::LevelCounter;
    use crate::theme::REQUIRED_KEYS;

    const BLOG_URL: &str = "https://alice.example";

    fn service(pool: &crate::db::DynDatabasePool) -> DataModelService {
        DataModelService::new(
            Repositories::sqlx(pool.clone()),
            Arc::new(I18nService::new(RuntimeMode::Prod)),
            Arc::new(MarkdownRenderer::new()),
            ThemeConf {
                runtime_mode: RuntimeMode::Prod,
                server: "127.0.0.1:5879".to_string(),
            },
        )
    }

    async fn alice(pool: &crate::db::DynDatabasePool) -> User {
        insert_blog_owner(pool, "alice", 1).await;
        Repositories::sqlx(pool.clone())
            .users
            .get_by_name("alice")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fill_common_populates_every_key() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;
        seed_settings(&pool, 1, BLOG_URL, &[]).await;
        insert_statistic(&pool, 1, statistic::names::VIEW_COUNT, "42").await;
        insert_navigation(&pool, 1, "About", "https://alice.example/about", "_self", 1).await;
        let go = insert_category(&pool, 1, "Go").await;
        insert_article(&pool, ArticleSeed::new(1, "/hello").category(go).views(3)).await;

        let counter = LevelCounter::new();
        let _guard = tracing::subscriber::set_default(counter.subscriber());

        let mut model = DataModel::new();
        service(&pool).fill_common(&admin, 1, &mut model).await;

        assert_eq!(counter.warnings(), 0);
        assert_eq!(counter.errors(), 0);
        assert_eq!(model.blog_url, BLOG_URL);
        assert_eq!(model.title, "Test Blog");
        assert_eq!(model.year, Utc::now().year());
        assert_eq!(model.user_count, 1);
        assert_eq!(model.navigations.len(), 1);
        assert_eq!(model.statistic.get("StatisticViewCount"), Some(&42));
        assert_eq!(model.i18n.get("Home").map(String::as_str), Some("Home"));
        assert_eq!(model.most_use_categories[0].url, "https://alice.example/Go");
        assert_eq!(model.most_view_articles.len(), 1);
        assert!(model.setting.get(names::BASIC_FOOTER).unwrap().is_trusted_html());

        let value = serde_json::to_value(&model).unwrap();
        for key in REQUIRED_KEYS {
            assert!(value.get(*key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["Setting"]["basicBlogURL"], value["Setting"]["BasicBlogURL"]);
    }

    #[tokio::test]
    async fn test_empty_blog_still_has_every_key() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;

        let mut model = DataModel::new();
        service(&pool).fill_common(&admin, 1, &mut model).await;

        assert_eq!(model.blog_url, "");
        assert!(model.most_use_tags.is_empty());
        assert!(model.recent_comments.is_empty());
        // Locale falls back to en_US
        assert_eq!(model.i18n.get("home").map(String::as_str), Some("Home"));

        let value = serde_json::to_value(&model).unwrap();
        for key in REQUIRED_KEYS {
            assert!(value.get(*key).is_some(), "missing key {}", key);
        }
    }

    #[tokio::test]
    async fn test_malformed_statistic_is_omitted_with_one_error() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;
        seed_settings(&pool, 1, BLOG_URL, &[]).await;
        insert_statistic(&pool, 1, statistic::names::ARTICLE_COUNT, "abc").await;
        insert_statistic(&pool, 1, statistic::names::COMMENT_COUNT, "5").await;

        let counter = LevelCounter::new();
        let _guard = tracing::subscriber::set_default(counter.subscriber());

        let mut model = DataModel::new();
        service(&pool).fill_common(&admin, 1, &mut model).await;

        assert_eq!(counter.errors(), 1);
        assert!(model.statistic.get(statistic::names::ARTICLE_COUNT).is_none());
        assert_eq!(model.statistic.get(statistic::names::COMMENT_COUNT), Some(&5));
    }

    #[tokio::test]
    async fn test_malformed_size_warns_exactly_once() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;
        seed_settings(&pool, 1, BLOG_URL, &[names::PREFERENCE_MOST_USE_TAG_LIST_SIZE]).await;
        insert_setting(&pool, 1, SettingCategory::Preference, names::PREFERENCE_MOST_USE_TAG_LIST_SIZE, "many").await;
        for i in 0..20 {
            insert_tag(&pool, 1, &format!("tag{}", i)).await;
        }

        let counter = LevelCounter::new();
        let _guard = tracing::subscriber::set_default(counter.subscriber());

        let mut model = DataModel::new();
        service(&pool).fill_common(&admin, 1, &mut model).await;

        assert_eq!(counter.warnings(), 1);
        assert_eq!(counter.errors(), 0);
        assert_eq!(model.most_use_tags.len(), defaults::PREFERENCE_MOST_USE_TAG_LIST_SIZE);
    }

    #[tokio::test]
    async fn test_locale_setting_selects_messages() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;
        seed_settings(&pool, 1, BLOG_URL, &[names::I18N_LOCALE]).await;
        insert_setting(&pool, 1, SettingCategory::I18n, names::I18N_LOCALE, "zh_CN").await;

        let mut model = DataModel::new();
        service(&pool).fill_common(&admin, 1, &mut model).await;

        assert_eq!(model.i18n.get("Home").map(String::as_str), Some("首页"));
    }

    #[tokio::test]
    async fn test_fill_common_twice_overwrites() {
        let pool = migrated_pool().await;
        let admin = alice(&pool).await;
        seed_settings(&pool, 1, BLOG_URL, &[]).await;
        let service = service(&pool);

        let mut model = DataModel::new();
        service.fill_common(&admin, 1, &mut model).await;
        insert_tag(&pool, 1, "late").await;
        service.fill_common(&admin, 1, &mut model).await;

        assert_eq!(model.most_use_tags.len(), 1);
        assert_eq!(model.most_use_tags[0].title, "late");
    }

    #[test]
    fn test_required_setting() {
        let settings: DualCaseMap<SettingValue> = DualCaseMap::new();
        let err = required_setting(&settings, names::BASIC_BLOG_URL).unwrap_err();
        assert!(matches!(err, AssembleError::MissingSetting(names::BASIC_BLOG_URL)));
    }
}
