//! Theme engine
//!
//! Each directory under the themes path is a theme: a set of Tera templates
//! (`base.html`, `index.html`, `article.html`, ...). All themes are compiled
//! at startup; a blog picks one through its `themeName` setting and rendering
//! falls back to the default theme when the named one is not installed or
//! lacks the template.
//!
//! Templates are compiled without autoescape; escaping happens once, when
//! [`DataModel::to_context`] builds the template context.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

mod data_model;
mod error;

pub use data_model::{
    capitalize, DataModel, DualCaseMap, SettingValue, ThemeArticle, ThemeAuthor, ThemeCategory, ThemeComment,
    ThemeConf, ThemeTag, REQUIRED_KEYS,
};
pub use error::ThemeError;

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Path to themes directory
    themes_path: PathBuf,
    /// Theme used when a blog's theme is unavailable
    default_theme: String,
    /// Compiled templates per theme name
    themes: HashMap<String, Tera>,
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("themes_path", &self.themes_path)
            .field("default_theme", &self.default_theme)
            .field("themes", &self.list_themes())
            .finish()
    }
}

impl ThemeEngine {
    /// Load every theme under `themes_path`.
    ///
    /// A theme that fails to compile is skipped with a warning, except the
    /// default theme, which must load.
    pub fn new(themes_path: &Path, default_theme: &str) -> Result<Self, ThemeError> {
        let default_path = themes_path.join(default_theme);
        if !default_path.is_dir() {
            return Err(ThemeError::NotFound(default_theme.to_string()));
        }

        let mut themes = HashMap::new();
        for entry in fs::read_dir(themes_path)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if !path.is_dir() {
                continue;
            }

            match load_theme(&path) {
                Ok(tera) => {
                    tracing::debug!(theme = %name, templates = tera.get_template_names().count(), "Loaded theme");
                    themes.insert(name, tera);
                }
                Err(e) if name == default_theme => return Err(e),
                Err(e) => tracing::warn!(theme = %name, error = %e, "Skipping theme that failed to load"),
            }
        }

        Ok(Self {
            themes_path: themes_path.to_path_buf(),
            default_theme: default_theme.to_string(),
            themes,
        })
    }

    /// Render `template` of `theme`, using the default theme when `theme` is
    /// not installed or does not provide that template.
    pub fn render(&self, theme: &str, template: &str, context: &TeraContext) -> Result<String, ThemeError> {
        let tera = self.resolve(theme, template)?;
        tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ThemeError::TemplateError(error_msg)
        })
    }

    fn resolve(&self, theme: &str, template: &str) -> Result<&Tera, ThemeError> {
        let provides = |tera: &Tera| tera.get_template_names().any(|name| name == template);

        if let Some(tera) = self.themes.get(theme).filter(|t| provides(t)) {
            return Ok(tera);
        }
        if theme != self.default_theme {
            tracing::warn!(theme, template, "Theme unavailable, using {}", self.default_theme);
        }
        self.themes
            .get(&self.default_theme)
            .filter(|t| provides(t))
            .ok_or_else(|| ThemeError::TemplateError(format!("Template '{}' not found in any theme", template)))
    }

    /// Name of the fallback theme
    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    /// Installed theme names, sorted
    pub fn list_themes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Compile all `.html` files of one theme directory.
fn load_theme(theme_path: &Path) -> Result<Tera, ThemeError> {
    let mut templates: Vec<(String, String)> = Vec::new();
    collect_templates_from_dir(theme_path, theme_path, &mut templates)?;
    if templates.is_empty() {
        return Err(ThemeError::TemplateError(format!("No templates in {:?}", theme_path)));
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates)
        .map_err(|e| ThemeError::TemplateError(format!("Failed to compile templates in {:?}: {}", theme_path, e)))?;
    Ok(tera)
}

fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), ThemeError> {
    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;
            let template_name = relative_path.to_string_lossy().replace('\\', "/");
            templates.push((template_name, fs::read_to_string(&path)?));
        }
    }

    Ok(())
}
