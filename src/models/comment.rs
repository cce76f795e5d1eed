//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub blog_id: i64,
    pub article_id: i64,
    pub author_id: i64,
    /// Markdown source
    pub content: String,
    pub created_at: DateTime<Utc>,
}
