//! Article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
///
/// `path` is unique within a blog and stored with its leading `/`, so an
/// article's absolute URL is the blog URL followed by the path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Owning blog
    pub blog_id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Article title
    pub title: String,
    /// Markdown content
    pub content: String,
    /// Canonical path within the blog, e.g. `/hello-world`
    pub path: String,
    /// Category ID
    pub category_id: Option<i64>,
    /// View count
    #[serde(default)]
    pub view_count: i64,
    /// Comment count
    #[serde(default)]
    pub comment_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Absolute URL of this article under the given blog URL
    pub fn url(&self, blog_url: &str) -> String {
        format!("{}{}", blog_url, self.path)
    }
}
