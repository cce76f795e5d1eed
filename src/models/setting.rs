//! Setting model and schema
//!
//! Settings are string-valued, scoped to a blog and grouped by category. Every
//! setting name the theme layer knows about has a static [`SettingDef`] that
//! records its category and whether its value is trusted HTML.

use serde::{Deserialize, Serialize};

/// Setting category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Basic,
    I18n,
    Preference,
    Theme,
    Article,
}

impl SettingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::I18n => "i18n",
            Self::Preference => "preference",
            Self::Theme => "theme",
            Self::Article => "article",
        }
    }
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "i18n" => Ok(Self::I18n),
            "preference" => Ok(Self::Preference),
            "theme" => Ok(Self::Theme),
            "article" => Ok(Self::Article),
            _ => Err(anyhow::anyhow!("Invalid setting category: {}", s)),
        }
    }
}

/// Setting entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub id: i64,
    pub category: SettingCategory,
    pub name: String,
    pub value: String,
    pub blog_id: i64,
}

/// How a setting value may be emitted into a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKind {
    /// Escaped on output
    PlainText,
    /// Authored markup, emitted verbatim
    TrustedHtml,
}

/// Static definition of a known setting
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub name: &'static str,
    pub category: SettingCategory,
    pub kind: SettingKind,
}

/// Known setting names
pub mod names {
    pub const BASIC_BLOG_TITLE: &str = "basicBlogTitle";
    pub const BASIC_BLOG_SUBTITLE: &str = "basicBlogSubtitle";
    pub const BASIC_BLOG_URL: &str = "basicBlogURL";
    pub const BASIC_FAVICON_URL: &str = "basicFaviconURL";
    pub const BASIC_LOGO_URL: &str = "basicLogoURL";
    pub const BASIC_META_KEYWORDS: &str = "basicMetaKeywords";
    pub const BASIC_META_DESCRIPTION: &str = "basicMetaDescription";
    pub const BASIC_HEADER: &str = "basicHeader";
    pub const BASIC_FOOTER: &str = "basicFooter";
    pub const BASIC_NOTICE_BOARD: &str = "basicNoticeBoard";

    pub const I18N_LOCALE: &str = "i18nLocale";

    pub const PREFERENCE_ARTICLE_LIST_PAGE_SIZE: &str = "preferenceArticleListPageSize";
    pub const PREFERENCE_MOST_USE_TAG_LIST_SIZE: &str = "preferenceMostUseTagListSize";
    pub const PREFERENCE_MOST_VIEW_ARTICLE_LIST_SIZE: &str = "preferenceMostViewArticleListSize";
    pub const PREFERENCE_MOST_COMMENT_ARTICLE_LIST_SIZE: &str = "preferenceMostCommentArticleListSize";
    pub const PREFERENCE_RECENT_COMMENT_LIST_SIZE: &str = "preferenceRecentCommentListSize";

    pub const THEME_NAME: &str = "themeName";

    pub const ARTICLE_SIGN: &str = "articleSign";
}

/// Defaults used when a sized setting is absent or malformed
pub mod defaults {
    pub const I18N_LOCALE: &str = "en_US";
    pub const PREFERENCE_ARTICLE_LIST_PAGE_SIZE: usize = 20;
    pub const PREFERENCE_MOST_USE_TAG_LIST_SIZE: usize = 15;
    pub const PREFERENCE_MOST_VIEW_ARTICLE_LIST_SIZE: usize = 15;
    pub const PREFERENCE_MOST_COMMENT_ARTICLE_LIST_SIZE: usize = 15;
    pub const PREFERENCE_RECENT_COMMENT_LIST_SIZE: usize = 10;
    /// Categories are not tenant-sized; this cap stands in for "all of them".
    pub const MOST_USE_CATEGORY_LIST_SIZE: usize = i8::MAX as usize;
}

const fn def(name: &'static str, category: SettingCategory, kind: SettingKind) -> SettingDef {
    SettingDef { name, category, kind }
}

/// Schema of every setting the theme layer consumes
pub const SETTING_DEFS: &[SettingDef] = &[
    def(names::BASIC_BLOG_TITLE, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_BLOG_SUBTITLE, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_BLOG_URL, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_FAVICON_URL, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_LOGO_URL, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_META_KEYWORDS, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_META_DESCRIPTION, SettingCategory::Basic, SettingKind::PlainText),
    def(names::BASIC_HEADER, SettingCategory::Basic, SettingKind::TrustedHtml),
    def(names::BASIC_FOOTER, SettingCategory::Basic, SettingKind::TrustedHtml),
    def(names::BASIC_NOTICE_BOARD, SettingCategory::Basic, SettingKind::TrustedHtml),
    def(names::I18N_LOCALE, SettingCategory::I18n, SettingKind::PlainText),
    def(names::PREFERENCE_ARTICLE_LIST_PAGE_SIZE, SettingCategory::Preference, SettingKind::PlainText),
    def(names::PREFERENCE_MOST_USE_TAG_LIST_SIZE, SettingCategory::Preference, SettingKind::PlainText),
    def(names::PREFERENCE_MOST_VIEW_ARTICLE_LIST_SIZE, SettingCategory::Preference, SettingKind::PlainText),
    def(names::PREFERENCE_MOST_COMMENT_ARTICLE_LIST_SIZE, SettingCategory::Preference, SettingKind::PlainText),
    def(names::PREFERENCE_RECENT_COMMENT_LIST_SIZE, SettingCategory::Preference, SettingKind::PlainText),
    def(names::THEME_NAME, SettingCategory::Theme, SettingKind::PlainText),
    def(names::ARTICLE_SIGN, SettingCategory::Article, SettingKind::TrustedHtml),
];

/// Look up the definition of a known setting
pub fn setting_def(name: &str) -> Option<&'static SettingDef> {
    SETTING_DEFS.iter().find(|d| d.name == name)
}

/// Kind of a setting; names outside the schema are plain text.
pub fn setting_kind(name: &str) -> SettingKind {
    setting_def(name).map_or(SettingKind::PlainText, |d| d.kind)
}
