//! Blog listing pages
//!
//! These handlers only run when [`resolve_blog`](super::middleware::resolve_blog)
//! found no article for the request path.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use super::middleware::{AppState, BlogContext, PageError};
use crate::models::setting::{defaults, names};
use crate::services::size_setting_or_default;
use crate::theme::{ThemeCategory, ThemeTag};

/// `GET /{username}`: latest articles
pub async fn index(State(state): State<AppState>, mut ctx: BlogContext) -> Result<Response, PageError> {
    let size = page_size(&ctx);
    let mut articles = state.repos.articles.list_recent(size, ctx.blog_id()).await?;
    articles.truncate(size);

    let articles = state.widgets(&ctx).project_articles(&articles).await?;
    ctx.data_model_mut().set("Articles", articles)?;
    state.render(&ctx, "index.html", StatusCode::OK)
}

/// `GET /{username}/tags/{tag}`
pub async fn tag(
    State(state): State<AppState>,
    Path((_, title)): Path<(String, String)>,
    mut ctx: BlogContext,
) -> Result<Response, PageError> {
    let Some(tag) = state.repos.tags.get_by_title(ctx.blog_id(), title.trim()).await? else {
        return not_found(&state, ctx);
    };

    let size = page_size(&ctx);
    let mut articles = state.repos.articles.list_by_tag(tag.id, size, ctx.blog_id()).await?;
    articles.truncate(size);
    let articles = state.widgets(&ctx).project_articles(&articles).await?;

    let theme_tag = ThemeTag {
        url: format!("{}/tags/{}", ctx.blog_url(), tag.title),
        title: tag.title,
        article_count: tag.article_count,
    };
    let model = ctx.data_model_mut();
    model.set("Tag", theme_tag)?;
    model.set("Articles", articles)?;
    state.render(&ctx, "tag.html", StatusCode::OK)
}

/// `GET /{username}/{*path}`: a category page when the path names one,
/// otherwise the theme's not-found page.
pub async fn category_or_not_found(State(state): State<AppState>, mut ctx: BlogContext) -> Result<Response, PageError> {
    let title = ctx.remainder_path().trim_matches('/').to_string();
    if title.is_empty() || title.contains('/') {
        return not_found(&state, ctx);
    }

    let Some(category) = state.repos.categories.get_by_title(ctx.blog_id(), &title).await? else {
        return not_found(&state, ctx);
    };

    let size = page_size(&ctx);
    let mut articles = state
        .repos
        .articles
        .list_by_category(category.id, size, ctx.blog_id())
        .await?;
    articles.truncate(size);
    let articles = state.widgets(&ctx).project_articles(&articles).await?;

    let theme_category = ThemeCategory {
        url: format!("{}/{}", ctx.blog_url(), category.title),
        title: category.title,
        description: category.description,
        article_count: category.article_count,
    };
    let model = ctx.data_model_mut();
    model.set("Category", theme_category)?;
    model.set("Articles", articles)?;
    state.render(&ctx, "category.html", StatusCode::OK)
}

fn not_found(state: &AppState, mut ctx: BlogContext) -> Result<Response, PageError> {
    let path = ctx.remainder_path().to_string();
    ctx.data_model_mut().set("Path", path)?;
    state.render(&ctx, "not_found.html", StatusCode::NOT_FOUND)
}

fn page_size(ctx: &BlogContext) -> usize {
    size_setting_or_default(
        &ctx.data_model().setting,
        names::PREFERENCE_ARTICLE_LIST_PAGE_SIZE,
        defaults::PREFERENCE_ARTICLE_LIST_PAGE_SIZE,
    )
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
