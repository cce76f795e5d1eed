//! multiblog - multi-tenant blog front
//!
//! Resolves `/{username}/...` requests to a blog, assembles the theme
//! view-model for it and renders articles and listing pages.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
