//! Statistic model
//!
//! Per-blog counters, stored as strings.

use serde::{Deserialize, Serialize};

/// Statistic entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistic {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub blog_id: i64,
}

/// Known statistic names
pub mod names {
    pub const ARTICLE_COUNT: &str = "statisticArticleCount";
    pub const COMMENT_COUNT: &str = "statisticCommentCount";
    pub const VIEW_COUNT: &str = "statisticViewCount";
}
