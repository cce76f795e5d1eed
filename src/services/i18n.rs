//! Localized message tables
//!
//! Each locale is a flat JSON object under `i18n/{locale}.json`, embedded into
//! the binary. Parsed tables are cached per locale; in `dev` runtime mode the
//! cache is bypassed so edits show up on the next request.

use anyhow::{anyhow, Context, Result};
use moka::future::Cache;
use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::RuntimeMode;
use crate::models::setting::defaults;

#[derive(RustEmbed)]
#[folder = "i18n/"]
#[include = "*.json"]
struct LocaleAssets;

/// Message key to localized text
pub type Messages = Arc<BTreeMap<String, String>>;

/// Locale message lookup
pub struct I18nService {
    cache: Cache<String, Messages>,
    runtime_mode: RuntimeMode,
}

impl std::fmt::Debug for I18nService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nService")
            .field("cached_locales", &self.cache.entry_count())
            .field("runtime_mode", &self.runtime_mode)
            .finish()
    }
}

impl I18nService {
    pub fn new(runtime_mode: RuntimeMode) -> Self {
        Self {
            cache: Cache::new(32),
            runtime_mode,
        }
    }

    /// Locales with a bundled message table, sorted
    pub fn available_locales() -> Vec<String> {
        let mut locales: Vec<String> = LocaleAssets::iter()
            .filter_map(|file| file.strip_suffix(".json").map(str::to_string))
            .collect();
        locales.sort();
        locales
    }

    /// Messages of `locale`, falling back to `en_US` when the locale has no
    /// table. Never fails: if even the fallback is unusable the table is empty.
    pub async fn messages(&self, locale: &str) -> Messages {
        if self.runtime_mode.is_dev() {
            return Arc::new(load_with_fallback(locale));
        }

        self.cache
            .get_with(locale.to_string(), async { Arc::new(load_with_fallback(locale)) })
            .await
    }
}

fn load_with_fallback(locale: &str) -> BTreeMap<String, String> {
    match load(locale) {
        Ok(messages) => messages,
        Err(e) if locale != defaults::I18N_LOCALE => {
            tracing::warn!(locale, error = %e, "Locale unavailable, falling back to {}", defaults::I18N_LOCALE);
            load_with_fallback(defaults::I18N_LOCALE)
        }
        Err(e) => {
            tracing::error!(locale, error = %e, "Default locale unavailable");
            BTreeMap::new()
        }
    }
}

fn load(locale: &str) -> Result<BTreeMap<String, String>> {
    if locale.is_empty() || !locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(anyhow!("Invalid locale name: {:?}", locale));
    }

    let file = LocaleAssets::get(&format!("{}.json", locale))
        .ok_or_else(|| anyhow!("No message table for locale {}", locale))?;
    serde_json::from_slice(&file.data).with_context(|| format!("Malformed message table for locale {}", locale))
}
