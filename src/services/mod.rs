//! Services layer
//!
//! View-model assembly and the helpers it leans on: sidebar widgets, Markdown
//! rendering, relative times and locale message tables.

pub mod data_model;
pub mod humanize;
pub mod i18n;
pub mod markdown;
pub mod widgets;

#[cfg(test)]
pub(crate) mod log_counter;

pub use data_model::{AssembleError, DataModelService};
pub use humanize::humanize_time;
pub use i18n::I18nService;
pub use markdown::MarkdownRenderer;
pub use widgets::{size_setting_or_default, Widgets};
