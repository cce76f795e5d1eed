//! Category model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// A category's display URL is `{BlogURL}/{title}` and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Owning blog
    pub blog_id: i64,
    /// Category title (unique within a blog)
    pub title: String,
    /// Category description
    pub description: String,
    /// Number of articles filed under this category
    #[serde(default)]
    pub article_count: i64,
}
