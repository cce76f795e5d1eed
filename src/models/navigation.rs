//! Navigation model

use serde::{Deserialize, Serialize};

/// How a navigation link opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OpenMethod {
    #[default]
    #[serde(rename = "_self")]
    SameWindow,
    #[serde(rename = "_blank")]
    NewWindow,
}

impl std::str::FromStr for OpenMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "_self" | "" => Ok(Self::SameWindow),
            "_blank" => Ok(Self::NewWindow),
            _ => Err(anyhow::anyhow!("Invalid navigation open method: {}", s)),
        }
    }
}

/// Navigation entry shown in a blog's header
///
/// Serialized with the field names themes use (`Title`, `URL`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Navigation {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(skip)]
    pub blog_id: i64,
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "IconURL")]
    pub icon_url: String,
    pub open_method: OpenMethod,
    pub display_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_serializes_theme_field_names() {
        let nav = Navigation {
            id: 3,
            blog_id: 1,
            title: "About".to_string(),
            url: "https://alice.example/about".to_string(),
            icon_url: String::new(),
            open_method: OpenMethod::NewWindow,
            display_order: 2,
        };

        let value = serde_json::to_value(&nav).unwrap();
        assert_eq!(value["Title"], "About");
        assert_eq!(value["URL"], "https://alice.example/about");
        assert_eq!(value["OpenMethod"], "_blank");
        assert!(value.get("BlogId").is_none());
    }

    #[test]
    fn test_open_method_parse() {
        assert_eq!("".parse::<OpenMethod>().unwrap(), OpenMethod::SameWindow);
        assert_eq!("_blank".parse::<OpenMethod>().unwrap(), OpenMethod::NewWindow);
        assert!("popup".parse::<OpenMethod>().is_err());
    }
}
