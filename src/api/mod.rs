//! HTTP layer
//!
//! Blog pages are served under `/{username}`; every such route passes through
//! [`middleware::resolve_blog`] first.

pub mod blog;
pub mod middleware;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use middleware::{resolve_blog, AppState, BlogContext, PageError};

/// Routes of one blog, all behind the resolver
pub fn blog_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{username}", get(blog::index))
        .route("/{username}/", get(blog::index))
        .route("/{username}/tags/{tag}", get(blog::tag))
        .route("/{username}/{*path}", get(blog::category_or_not_found))
        .route_layer(axum_middleware::from_fn_with_state(state, resolve_blog))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(blog::health))
        .merge(blog_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
