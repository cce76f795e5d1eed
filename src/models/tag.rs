//! Tag model

use serde::{Deserialize, Serialize};

/// Tag entity
///
/// Tags are linked to articles through `article_tags`; a tag's display URL is
/// `{BlogURL}/tags/{title}` and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Owning blog
    pub blog_id: i64,
    /// Tag title
    pub title: String,
    /// Number of articles carrying this tag
    #[serde(default)]
    pub article_count: i64,
}
