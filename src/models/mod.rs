//! Data models
//!
//! Storage entities of the multi-tenant blog. Presentation projections built
//! from them live in `theme::data_model`.

mod article;
mod category;
mod comment;
mod navigation;
pub mod setting;
pub mod statistic;
mod tag;
mod user;

pub use article::Article;
pub use category::Category;
pub use comment::Comment;
pub use navigation::{Navigation, OpenMethod};
pub use setting::{Setting, SettingCategory, SettingKind};
pub use statistic::Statistic;
pub use tag::Tag;
pub use user::{gravatar_url, User};
