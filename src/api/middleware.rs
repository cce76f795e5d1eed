//! Blog resolution middleware
//!
//! Every blog route runs behind [`resolve_blog`]: it finds the tenant named by
//! the first path segment, assembles the view-model, and either renders the
//! article the rest of the path points at or hands a [`BlogContext`] to the
//! listing handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::db::repositories::Repositories;
use crate::db::DynDatabasePool;
use crate::models::setting::names;
use crate::models::{Article, User};
use crate::services::{DataModelService, I18nService, MarkdownRenderer, Widgets};
use crate::theme::{DataModel, ThemeConf, ThemeEngine, ThemeError};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub repos: Repositories,
    pub markdown: Arc<MarkdownRenderer>,
    pub data_model: Arc<DataModelService>,
    pub theme_engine: Arc<ThemeEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire repositories and services over `pool` and load the themes.
    pub fn new(config: Config, pool: DynDatabasePool) -> Result<Self, ThemeError> {
        let theme_engine = ThemeEngine::new(&config.theme.path, &config.theme.default)?;
        let repos = Repositories::sqlx(pool.clone());
        let markdown = Arc::new(MarkdownRenderer::new());
        let conf = ThemeConf {
            runtime_mode: config.runtime_mode,
            server: config.server_addr(),
        };
        let data_model = DataModelService::new(
            repos.clone(),
            Arc::new(I18nService::new(config.runtime_mode)),
            markdown.clone(),
            conf,
        );

        Ok(Self {
            pool,
            repos,
            markdown,
            data_model: Arc::new(data_model),
            theme_engine: Arc::new(theme_engine),
            config: Arc::new(config),
        })
    }

    /// Widget builder for the blog in `ctx`
    pub fn widgets<'a>(&'a self, ctx: &'a BlogContext) -> Widgets<'a> {
        Widgets::for_model(&self.repos, &self.markdown, ctx.blog_id(), ctx.data_model())
    }

    /// Render `template` with the blog's theme and view-model.
    pub fn render(&self, ctx: &BlogContext, template: &str, status: StatusCode) -> Result<Response, PageError> {
        let context = ctx.data_model().to_context()?;
        let html = self.theme_engine.render(ctx.theme(), template, &context)?;
        Ok((status, Html(html)).into_response())
    }
}

/// Error of a themed page
#[derive(Debug, Error)]
pub enum PageError {
    /// Unknown blog; answered with an empty 404
    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),

    #[error("Render error: {0}")]
    Render(#[from] ThemeError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND.into_response(),
            PageError::Internal(e) => {
                tracing::error!(error = %format!("{:#}", e), "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            PageError::Render(e) => {
                tracing::error!(error = %e, "Page render failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// The resolved blog of the current request
#[derive(Debug, Clone)]
pub struct BlogContext {
    blog_admin: User,
    blog_id: i64,
    theme: String,
    data_model: DataModel,
    remainder_path: String,
}

impl BlogContext {
    pub fn new(blog_admin: User, blog_id: i64, data_model: DataModel, remainder_path: String, default_theme: &str) -> Self {
        let theme = data_model
            .setting
            .get(names::THEME_NAME)
            .map(|s| s.value.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(default_theme)
            .to_string();

        Self {
            blog_admin,
            blog_id,
            theme,
            data_model,
            remainder_path,
        }
    }

    pub fn blog_url(&self) -> &str {
        &self.data_model.blog_url
    }

    /// The user owning this blog
    pub fn blog_admin(&self) -> &User {
        &self.blog_admin
    }

    pub fn blog_id(&self) -> i64 {
        self.blog_id
    }

    /// Theme named by the blog's settings, else the configured default
    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn data_model(&self) -> &DataModel {
        &self.data_model
    }

    pub fn data_model_mut(&mut self) -> &mut DataModel {
        &mut self.data_model
    }

    /// Request path below the blog, percent-decoded, e.g. `/hello-world`
    pub fn remainder_path(&self) -> &str {
        &self.remainder_path
    }
}

impl<S> FromRequestParts<S> for BlogContext
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<BlogContext>()
            .ok_or_else(|| PageError::Internal(anyhow::anyhow!("Blog context missing; route is not behind resolve_blog")))
    }
}

/// Resolve the blog and content of a `/{username}/...` request.
///
/// Unknown blogs end the chain with an empty 404. A remainder path naming an
/// article renders the article page and ends the chain; anything else runs
/// the next handler with a [`BlogContext`] in the request extensions.
pub async fn resolve_blog(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, PageError> {
    let (name, rest) = split_blog_path(request.uri().path());
    if name.is_empty() {
        return Err(PageError::NotFound);
    }

    let blog_admin = state.repos.users.get_by_name(&name).await?.ok_or(PageError::NotFound)?;
    let Some(blog_id) = blog_admin.blog_id else {
        tracing::debug!(user = %name, "User owns no blog");
        return Err(PageError::NotFound);
    };

    let mut data_model = DataModel::new();
    state.data_model.fill_common(&blog_admin, blog_id, &mut data_model).await;

    let remainder = remainder_path(&rest);
    let article = if remainder.is_empty() {
        None
    } else {
        state.repos.articles.get_by_path(blog_id, &remainder).await?
    };

    let ctx = BlogContext::new(blog_admin, blog_id, data_model, remainder, &state.config.theme.default);
    match article {
        Some(article) => render_article(&state, ctx, &article).await,
        None => {
            request.extensions_mut().insert(ctx);
            Ok(next.run(request).await)
        }
    }
}

async fn render_article(state: &AppState, mut ctx: BlogContext, article: &Article) -> Result<Response, PageError> {
    let projected = state.widgets(&ctx).project_article_page(article).await?;
    ctx.data_model_mut().set("Article", projected)?;
    state.render(&ctx, "article.html", StatusCode::OK)
}

/// Split `/alice/hello-world` into the decoded blog name and the raw rest.
fn split_blog_path(path: &str) -> (String, String) {
    let path = path.strip_prefix('/').unwrap_or(path);
    let (name, rest) = match path.find('/') {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    };
    (decode(name).trim().to_string(), rest.to_string())
}

fn remainder_path(rest: &str) -> String {
    decode(rest).trim().to_string()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map(|s| s.into_owned()).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_blog_path() {
        assert_eq!(split_blog_path("/alice/hello-world"), ("alice".to_string(), "/hello-world".to_string()));
        assert_eq!(split_blog_path("/alice"), ("alice".to_string(), String::new()));
        assert_eq!(split_blog_path("/"), (String::new(), String::new()));
        assert_eq!(split_blog_path("/al%20ice/x/y"), ("al ice".to_string(), "/x/y".to_string()));
    }

    #[test]
    fn test_remainder_path_decodes_and_trims() {
        assert_eq!(remainder_path("/hello%20world"), "/hello world");
        assert_eq!(remainder_path("/%E4%BD%A0%E5%A5%BD"), "/你好");
        assert_eq!(remainder_path("  "), "");
        assert_eq!(remainder_path("/bad%FF"), "/bad%FF");
    }
}
