//! Sidebar widgets
//!
//! Each widget reads its list size from the blog's settings, asks a
//! repository for that many ranked items, truncates to the size (repositories
//! are not trusted with the limit) and projects the items into the shapes
//! themes consume.

use anyhow::Result;
use std::collections::HashMap;

use crate::db::repositories::Repositories;
use crate::models::setting::{defaults, names};
use crate::models::{Article, Comment};
use crate::services::humanize::humanize_time;
use crate::services::markdown::MarkdownRenderer;
use crate::theme::{
    DataModel, DualCaseMap, SettingValue, ThemeArticle, ThemeAuthor, ThemeCategory, ThemeComment, ThemeTag,
};

/// Parse the named size setting, or use `default`.
///
/// A missing or malformed value logs one warning.
pub fn size_setting_or_default(settings: &DualCaseMap<SettingValue>, name: &str, default: usize) -> usize {
    let Some(setting) = settings.get(name) else {
        tracing::warn!(setting = name, default, "Size setting missing, using default");
        return default;
    };

    match setting.value.trim().parse::<usize>() {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(
                setting = name,
                value = %setting.value,
                default,
                error = %e,
                "Malformed size setting, using default"
            );
            default
        }
    }
}

/// Widget builder bound to one blog
pub struct Widgets<'a> {
    repos: &'a Repositories,
    markdown: &'a MarkdownRenderer,
    blog_id: i64,
    blog_url: &'a str,
    settings: &'a DualCaseMap<SettingValue>,
}

impl<'a> Widgets<'a> {
    pub fn new(
        repos: &'a Repositories,
        markdown: &'a MarkdownRenderer,
        blog_id: i64,
        blog_url: &'a str,
        settings: &'a DualCaseMap<SettingValue>,
    ) -> Self {
        Self {
            repos,
            markdown,
            blog_id,
            blog_url,
            settings,
        }
    }

    /// Widgets of the blog whose settings `model` already carries
    pub fn for_model(repos: &'a Repositories, markdown: &'a MarkdownRenderer, blog_id: i64, model: &'a DataModel) -> Self {
        Self::new(repos, markdown, blog_id, &model.blog_url, &model.setting)
    }

    pub async fn most_use_categories(&self) -> Result<Vec<ThemeCategory>> {
        let size = defaults::MOST_USE_CATEGORY_LIST_SIZE;
        let mut categories = self.repos.categories.most_used(size, self.blog_id).await?;
        categories.truncate(size);

        Ok(categories
            .into_iter()
            .map(|c| ThemeCategory {
                url: format!("{}/{}", self.blog_url, c.title),
                title: c.title,
                description: c.description,
                article_count: c.article_count,
            })
            .collect())
    }

    pub async fn most_use_tags(&self) -> Result<Vec<ThemeTag>> {
        let size = self.size(names::PREFERENCE_MOST_USE_TAG_LIST_SIZE, defaults::PREFERENCE_MOST_USE_TAG_LIST_SIZE);
        let mut tags = self.repos.tags.most_used(size, self.blog_id).await?;
        tags.truncate(size);

        Ok(tags
            .into_iter()
            .map(|t| ThemeTag {
                url: format!("{}/tags/{}", self.blog_url, t.title),
                title: t.title,
                article_count: t.article_count,
            })
            .collect())
    }

    pub async fn most_view_articles(&self) -> Result<Vec<ThemeArticle>> {
        let size = self.size(
            names::PREFERENCE_MOST_VIEW_ARTICLE_LIST_SIZE,
            defaults::PREFERENCE_MOST_VIEW_ARTICLE_LIST_SIZE,
        );
        let mut articles = self.repos.articles.most_viewed(size, self.blog_id).await?;
        articles.truncate(size);
        self.project_articles(&articles).await
    }

    pub async fn most_comment_articles(&self) -> Result<Vec<ThemeArticle>> {
        let size = self.size(
            names::PREFERENCE_MOST_COMMENT_ARTICLE_LIST_SIZE,
            defaults::PREFERENCE_MOST_COMMENT_ARTICLE_LIST_SIZE,
        );
        let mut articles = self.repos.articles.most_commented(size, self.blog_id).await?;
        articles.truncate(size);
        self.project_articles(&articles).await
    }

    /// Latest comments; the rendered Markdown goes in `Title`.
    pub async fn recent_comments(&self) -> Result<Vec<ThemeComment>> {
        let size = self.size(
            names::PREFERENCE_RECENT_COMMENT_LIST_SIZE,
            defaults::PREFERENCE_RECENT_COMMENT_LIST_SIZE,
        );
        let mut comments = self.repos.comments.recent(size, self.blog_id).await?;
        comments.truncate(size);

        let mut authors = AuthorCache::default();
        let mut out = Vec::with_capacity(comments.len());
        for Comment { content, created_at, author_id, .. } in comments {
            out.push(ThemeComment {
                title: self.markdown.render_untrusted(&content),
                content: String::new(),
                url: None,
                created_at: humanize_time(created_at),
                author: authors.get(self, author_id).await?,
            });
        }
        Ok(out)
    }

    /// Project articles for listings; `Content` is left unset.
    pub async fn project_articles(&self, articles: &[Article]) -> Result<Vec<ThemeArticle>> {
        let mut authors = AuthorCache::default();
        let mut out = Vec::with_capacity(articles.len());
        for article in articles {
            let author = authors.get(self, article.author_id).await?;
            out.push(self.project(article, author));
        }
        Ok(out)
    }

    /// Project a single article with its Markdown body rendered.
    pub async fn project_article_page(&self, article: &Article) -> Result<ThemeArticle> {
        let author = self.author(article.author_id).await?;
        let mut projected = self.project(article, author);
        projected.content = Some(self.markdown.render(&article.content));
        Ok(projected)
    }

    fn project(&self, article: &Article, author: Option<ThemeAuthor>) -> ThemeArticle {
        ThemeArticle {
            id: article.id,
            title: article.title.clone(),
            url: article.url(self.blog_url),
            created_at: humanize_time(article.created_at),
            author,
            view_count: article.view_count,
            comment_count: article.comment_count,
            content: None,
        }
    }

    /// Attribution for `user_id`; `None` once the user is gone.
    pub async fn author(&self, user_id: i64) -> Result<Option<ThemeAuthor>> {
        let user = self.repos.users.get_by_id(user_id).await?;
        Ok(user.map(|u| ThemeAuthor {
            url: format!("{}/authors/{}", self.blog_url, u.name),
            avatar_url: u.display_avatar_url(),
            name: u.name,
        }))
    }

    fn size(&self, name: &str, default: usize) -> usize {
        size_setting_or_default(self.settings, name, default)
    }
}

/// Per-widget memo of author lookups
#[derive(Default)]
struct AuthorCache {
    seen: HashMap<i64, Option<ThemeAuthor>>,
}

impl AuthorCache {
    async fn get(&mut self, widgets: &Widgets<'_>, user_id: i64) -> Result<Option<ThemeAuthor>> {
        if let Some(author) = self.seen.get(&user_id) {
            return Ok(author.clone());
        }
        let author = widgets.author(user_id).await?;
        self.seen.insert(user_id, author.clone());
        Ok(author)
    }
}
