//! # Templates
//!
//! Template records, the caching store that loads them, and the validator
//! the agent runs before rendering.

pub mod model;
pub mod store;
pub mod validator;

pub use model::{
    Background, BackgroundKind, ColorScheme, FontConfig, HexColor, Layout, LayoutKind,
    Placeholder, PlaceholderKind, Template, ThemeConfig, DEFAULT_TEMPLATE_ID,
};
pub use store::{TemplateStore, TemplateSummary};
pub use validator::TemplateValidator;
