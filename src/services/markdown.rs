//! Markdown rendering service
//!
//! Markdown to HTML with syntect highlighting for fenced code blocks. Two
//! entry points: [`MarkdownRenderer::render`] for content authored by the
//! blog's writers, where embedded HTML passes through, and
//! [`MarkdownRenderer::render_untrusted`] for visitor input such as comments,
//! where embedded HTML is escaped.
//!
//! ```
//! use multiblog::services::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Hello\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::Arc;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const DEFAULT_HIGHLIGHT_THEME: &str = "base16-ocean.dark";

/// URL schemes kept in visitor links and images
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// A thread-safe Markdown renderer with syntax highlighting support.
///
/// Tables, strikethrough, task lists and smart punctuation are enabled.
#[derive(Clone)]
pub struct MarkdownRenderer {
    syntax_set: Arc<SyntaxSet>,
    theme_set: Arc<ThemeSet>,
    theme_name: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownRenderer")
            .field("theme_name", &self.theme_name)
            .finish()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_HIGHLIGHT_THEME)
    }

    /// Creates a renderer using the named syntect theme, falling back to
    /// `base16-ocean.dark` if the theme is unknown.
    pub fn with_theme(theme_name: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme_name = if theme_set.themes.contains_key(theme_name) {
            theme_name.to_string()
        } else {
            DEFAULT_HIGHLIGHT_THEME.to_string()
        };

        Self {
            syntax_set: Arc::new(SyntaxSet::load_defaults_newlines()),
            theme_set: Arc::new(theme_set),
            theme_name,
        }
    }

    /// Render Markdown written by the blog's authors.
    pub fn render(&self, markdown: &str) -> String {
        self.render_events(markdown, false)
    }

    /// Render Markdown from visitors. Raw HTML in the source is shown as text
    /// and link or image targets with any other scheme than http, https or
    /// mailto are replaced by `#`.
    pub fn render_untrusted(&self, markdown: &str) -> String {
        self.render_events(markdown, true)
    }

    fn render_events(&self, markdown: &str, escape_html: bool) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) if escape_html => Event::Text(raw),
            Event::Start(Tag::Link { link_type, dest_url, title, id }) if escape_html && !is_safe_url(&dest_url) => {
                Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
            }
            Event::Start(Tag::Image { link_type, dest_url, title, id }) if escape_html && !is_safe_url(&dest_url) => {
                Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
            }
            other => other,
        });

        let mut html_output = String::new();
        html::push_html(&mut html_output, self.highlight_code_blocks(parser).into_iter());
        html_output
    }

    /// Replace each code block with pre-rendered (highlighted) HTML.
    fn highlight_code_blocks<'a>(&self, events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buffer)) = code.take() {
                        let block = match lang {
                            Some(lang) => self.highlight(&buffer, &lang),
                            None => format!("<pre><code>{}</code></pre>", html_escape(&buffer)),
                        };
                        out.push(Event::Html(CowStr::from(block)));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                other => out.push(other),
            }
        }

        out
    }

    fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang));
        let theme = self.theme_set.themes.get(&self.theme_name);

        match (syntax, theme) {
            (Some(syntax), Some(theme)) => highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .unwrap_or_else(|_| format!("<pre><code>{}</code></pre>", html_escape(code))),
            _ => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

/// Relative references and the [`SAFE_SCHEMES`].
fn is_safe_url(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            SAFE_SCHEMES.iter().any(|safe| scheme.eq_ignore_ascii_case(safe))
        }
        _ => true,
    }
}

/// Escapes HTML special characters in a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
