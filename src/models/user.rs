//! User model
//!
//! A user owning a blog is that blog's tenant ("blog admin"); its unique name
//! is the URL identifier under which the blog is served.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique name, used as the blog's URL identifier
    pub name: String,
    /// Email address
    pub email: String,
    /// Avatar image URL, if the user uploaded one
    pub avatar_url: Option<String>,
    /// The blog this user owns, if any
    pub blog_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Avatar to show for this user: the stored one, else a Gravatar derived from the email.
    pub fn display_avatar_url(&self) -> String {
        match self.avatar_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => gravatar_url(&self.email),
        }
    }
}

/// Generate Gravatar URL from email
pub fn gravatar_url(email: &str) -> String {
    let email = email.trim();
    if email.is_empty() {
        return "https://www.gravatar.com/avatar/?d=mp&s=80".to_string();
    }
    let hash = format!("{:x}", md5::compute(email.to_lowercase()));
    format!("https://www.gravatar.com/avatar/{}?d=mp&s=80", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(avatar_url: Option<&str>) -> User {
        User {
            id: 1,
            name: "alice".to_string(),
            email: " Alice@Example.com ".to_string(),
            avatar_url: avatar_url.map(str::to_string),
            blog_id: Some(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_avatar_prefers_stored_url() {
        let u = user(Some("https://img.example/alice.png"));
        assert_eq!(u.display_avatar_url(), "https://img.example/alice.png");
    }

    #[test]
    fn test_display_avatar_falls_back_to_gravatar() {
        let u = user(Some("  "));
        let url = u.display_avatar_url();
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        // Email is trimmed and lowercased before hashing
        assert_eq!(url, gravatar_url("alice@example.com"));
    }

    #[test]
    fn test_gravatar_empty_email() {
        assert_eq!(gravatar_url(""), "https://www.gravatar.com/avatar/?d=mp&s=80");
    }
}
