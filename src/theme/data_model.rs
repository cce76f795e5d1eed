//! Template view-model
//!
//! [`DataModel`] is the per-request structure handed to the theme. Its fixed
//! keys are typed fields; handlers downstream of the blog resolver add their
//! own keys (`Article`, `Articles`, ...) through [`DataModel::set`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tera::Context as TeraContext;

use super::ThemeError;
use crate::config::RuntimeMode;
use crate::models::{Navigation, SettingKind};

/// Keys every assembled model carries, whatever the tenant's data.
pub const REQUIRED_KEYS: &[&str] = &[
    "I18n",
    "Setting",
    "Statistic",
    "FaviconURL",
    "LogoURL",
    "BlogURL",
    "Title",
    "MetaKeywords",
    "MetaDescription",
    "Conf",
    "Year",
    "UserCount",
    "Navigations",
    "MostUseCategories",
    "MostUseTags",
    "MostViewArticles",
    "RecentComments",
    "MostCommentArticles",
];

/// Upper-case the first character: `basicBlogTitle` -> `BasicBlogTitle`.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// String-keyed map exposed to templates under both the stored key and its
/// capitalized form.
///
/// Entries are stored once. The capitalized aliases only exist in the
/// serialized output; a stored key always wins over an alias derived from
/// another key.
#[derive(Debug, Clone, PartialEq)]
pub struct DualCaseMap<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for DualCaseMap<V> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<V> DualCaseMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// Look up by stored key or by capitalized alias.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).or_else(|| {
            self.entries
                .iter()
                .find(|(stored, _)| capitalize(stored) == key)
                .map(|(_, value)| value)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    fn expanded(&self) -> BTreeMap<String, &V> {
        let mut out = BTreeMap::new();
        for (key, value) in &self.entries {
            out.insert(capitalize(key), value);
        }
        for (key, value) in &self.entries {
            out.insert(key.clone(), value);
        }
        out
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for DualCaseMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V: Serialize> Serialize for DualCaseMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let expanded = self.expanded();
        let mut map = serializer.serialize_map(Some(expanded.len()))?;
        for (key, value) in expanded {
            map.serialize_entry(&key, value)?;
        }
        map.end()
    }
}

/// A setting value tagged with how a theme may emit it
///
/// [`SettingKind::TrustedHtml`] values serialize as markup and reach the
/// template raw; plain values are escaped by [`DataModel::to_context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingValue {
    pub value: String,
    pub kind: SettingKind,
}

impl SettingValue {
    pub fn new(value: impl Into<String>, kind: SettingKind) -> Self {
        Self { value: value.into(), kind }
    }

    pub fn is_trusted_html(&self) -> bool {
        self.kind == SettingKind::TrustedHtml
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_trusted_html() {
            Markup(&self.value).serialize(serializer)
        } else {
            serializer.serialize_str(&self.value)
        }
    }
}

/// Object key that tags a serialized string as markup
const MARKUP_TOKEN: &str = "$multiblog::markup";

/// HTML that must reach the template unescaped
struct Markup<'a>(&'a str);

impl Serialize for Markup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(MARKUP_TOKEN, self.0)?;
        map.end()
    }
}

fn markup<S: Serializer>(html: &str, serializer: S) -> Result<S::Ok, S::Error> {
    Markup(html).serialize(serializer)
}

fn optional_markup<S: Serializer>(html: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match html {
        Some(html) => serializer.serialize_some(&Markup(html)),
        None => serializer.serialize_none(),
    }
}

/// HTML-escape every string of a serialized view-model and unwrap markup.
fn escape_view(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(tera::escape_html(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_view).collect()),
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(html)) = map.get(MARKUP_TOKEN) {
                    return Value::String(html.clone());
                }
            }
            Value::Object(map.into_iter().map(|(key, value)| (key, escape_view(value))).collect())
        }
        other => other,
    }
}

/// Author attribution of an article or comment
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeAuthor {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "AvatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeCategory {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "ArticleCount")]
    pub article_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeTag {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "ArticleCount")]
    pub article_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeArticle {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    /// Human-relative creation time
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "Author")]
    pub author: Option<ThemeAuthor>,
    #[serde(rename = "ViewCount")]
    pub view_count: i64,
    #[serde(rename = "CommentCount")]
    pub comment_count: i64,
    /// Rendered body; only set on the article page
    #[serde(rename = "Content", skip_serializing_if = "Option::is_none", serialize_with = "optional_markup")]
    pub content: Option<String>,
}

/// A comment as shown in the recent comments widget
///
/// The rendered Markdown goes in `Title` and `Content` stays empty; themes
/// rely on that layout.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeComment {
    #[serde(rename = "Title", serialize_with = "markup")]
    pub title: String,
    #[serde(rename = "Content")]
    pub content: String,
    /// Link target of the comment; not resolved yet
    #[serde(rename = "URL")]
    pub url: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "Author")]
    pub author: Option<ThemeAuthor>,
}

/// Public runtime configuration visible to themes
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ThemeConf {
    #[serde(rename = "RuntimeMode")]
    pub runtime_mode: RuntimeMode,
    #[serde(rename = "Server")]
    pub server: String,
}

/// Render-ready view-model for one request
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DataModel {
    #[serde(rename = "I18n")]
    pub i18n: DualCaseMap<String>,
    #[serde(rename = "Setting")]
    pub setting: DualCaseMap<SettingValue>,
    #[serde(rename = "Statistic")]
    pub statistic: DualCaseMap<i64>,
    #[serde(rename = "FaviconURL")]
    pub favicon_url: String,
    #[serde(rename = "LogoURL")]
    pub logo_url: String,
    #[serde(rename = "BlogURL")]
    pub blog_url: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "MetaKeywords")]
    pub meta_keywords: String,
    #[serde(rename = "MetaDescription")]
    pub meta_description: String,
    #[serde(rename = "Conf")]
    pub conf: ThemeConf,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "UserCount")]
    pub user_count: i64,
    #[serde(rename = "Navigations")]
    pub navigations: Vec<Navigation>,
    #[serde(rename = "MostUseCategories")]
    pub most_use_categories: Vec<ThemeCategory>,
    #[serde(rename = "MostUseTags")]
    pub most_use_tags: Vec<ThemeTag>,
    #[serde(rename = "MostViewArticles")]
    pub most_view_articles: Vec<ThemeArticle>,
    #[serde(rename = "RecentComments")]
    pub recent_comments: Vec<ThemeComment>,
    #[serde(rename = "MostCommentArticles")]
    pub most_comment_articles: Vec<ThemeArticle>,
    /// Keys added by page handlers
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a handler-provided key. Fixed keys cannot be replaced this way.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<(), ThemeError> {
        if REQUIRED_KEYS.contains(&key) {
            return Err(ThemeError::TemplateError(format!("'{}' is a reserved view-model key", key)));
        }
        let value = serde_json::to_value(value)
            .map_err(|e| ThemeError::TemplateError(format!("Failed to serialize '{}': {}", key, e)))?;
        self.extra.insert(key.to_string(), value);
        Ok(())
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Convert into a template context.
    ///
    /// Themes render without autoescape: every string is HTML-escaped here,
    /// except trusted settings and rendered Markdown, which pass through raw.
    pub fn to_context(&self) -> Result<TeraContext, ThemeError> {
        let value = serde_json::to_value(self)
            .map_err(|e| ThemeError::TemplateError(format!("Failed to build template context: {}", e)))?;
        TeraContext::from_value(escape_view(value))
            .map_err(|e| ThemeError::TemplateError(format!("Failed to build template context: {}", e)))
    }
}
