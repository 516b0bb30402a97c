//! # Template Model
//!
//! Declarative visual templates: a theme (palette, fonts, spacing) plus a
//! set of named layouts whose placeholders are positioned in fractions of
//! the slide canvas.
//!
//! Templates are checked when they are deserialized, so a `Template` value
//! always satisfies its structural invariants.

use crate::error::{DeckError, DeckResult};
use crate::render::{classify, RendererKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// Identifier used when an outline does not name a usable template
pub const DEFAULT_TEMPLATE_ID: &str = "business_001";

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("hex color pattern compiles")
    })
}

fn template_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("template id pattern compiles"))
}

/// True if `id` is a well-formed template identifier
pub fn is_valid_template_id(id: &str) -> bool {
    template_id_pattern().is_match(id)
}

// ============================================================================
// Colors and fonts
// ============================================================================

/// A `#RRGGBB` or `#RRGGBBAA` color, stored upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> DeckResult<Self> {
        let value = value.trim();
        if !hex_color_pattern().is_match(value) {
            return Err(DeckError::validation(format!(
                "invalid hex color '{}': expected #RRGGBB or #RRGGBBAA",
                value
            )));
        }
        Ok(Self(value.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The six RGB hex digits, without the leading `#`
    pub fn rgb(&self) -> &str {
        &self.0[1..7]
    }

    /// Alpha channel when the color carries one
    pub fn alpha(&self) -> Option<u8> {
        if self.0.len() == 9 {
            u8::from_str_radix(&self.0[7..9], 16).ok()
        } else {
            None
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = DeckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Font settings for a text role or a single placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font family name
    pub name: String,
    /// Size in points (8-96)
    pub size: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
}

impl FontConfig {
    pub const MIN_SIZE: u32 = 8;
    pub const MAX_SIZE: u32 = 96;

    pub fn new(name: impl Into<String>, size: u32) -> DeckResult<Self> {
        let font = Self {
            name: name.into(),
            size,
            bold: false,
            italic: false,
            color: None,
        };
        font.validate()?;
        Ok(font)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_color(mut self, color: HexColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn validate(&self) -> DeckResult<()> {
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&self.size) {
            return Err(DeckError::validation(format!(
                "font size {} for '{}' is outside {}-{}",
                self.size,
                self.name,
                Self::MIN_SIZE,
                Self::MAX_SIZE
            )));
        }
        Ok(())
    }
}

/// The six palette colors every template declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub primary: HexColor,
    pub secondary: HexColor,
    pub accent: HexColor,
    pub text_dark: HexColor,
    pub text_light: HexColor,
    pub background: HexColor,
}

impl ColorScheme {
    /// Palette entries paired with their field names
    pub fn entries(&self) -> [(&'static str, &HexColor); 6] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("text_dark", &self.text_dark),
            ("text_light", &self.text_light),
            ("background", &self.background),
        ]
    }
}

// ============================================================================
// Backgrounds and placeholders
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Image,
}

/// Slide background declared by a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
    /// End color for gradients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_end: Option<HexColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Background {
    pub fn solid(color: HexColor) -> Self {
        Self {
            kind: BackgroundKind::Solid,
            color: Some(color),
            color_end: None,
            image_path: None,
            opacity: 1.0,
        }
    }

    pub fn validate(&self) -> DeckResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(DeckError::validation(format!(
                "background opacity {} is outside 0-1",
                self.opacity
            )));
        }
        Ok(())
    }
}

/// What a placeholder is meant to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Text,
    Title,
    Subtitle,
    Body,
    List,
    Image,
    Chart,
}

impl PlaceholderKind {
    /// Image and chart slots may be left empty without a warning
    pub fn is_optional(&self) -> bool {
        matches!(self, PlaceholderKind::Image | PlaceholderKind::Chart)
    }
}

/// A rectangle on the slide, in fractions of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Content key this placeholder renders
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Overrides the theme font for this placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontConfig>,
    #[serde(default = "default_alignment")]
    pub alignment: String,
}

fn default_alignment() -> String {
    "left".to_string()
}

impl Placeholder {
    pub fn new(
        id: impl Into<String>,
        kind: PlaceholderKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> DeckResult<Self> {
        let placeholder = Self {
            id: id.into(),
            kind,
            x,
            y,
            width,
            height,
            font: None,
            alignment: default_alignment(),
        };
        placeholder.validate()?;
        Ok(placeholder)
    }

    pub fn with_font(mut self, font: FontConfig) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_alignment(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = alignment.into();
        self
    }

    pub fn validate(&self) -> DeckResult<()> {
        if self.id.trim().is_empty() {
            return Err(DeckError::validation("placeholder id must not be empty"));
        }
        for (name, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DeckError::validation(format!(
                    "placeholder '{}': {} = {} is outside 0-1",
                    self.id, name, value
                )));
            }
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(DeckError::validation(format!(
                    "placeholder '{}': {} = {} must be in (0, 1]",
                    self.id, name, value
                )));
            }
        }
        if let Some(font) = &self.font {
            font.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Layouts and templates
// ============================================================================

/// Structural role of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Cover,
    #[serde(alias = "toc", alias = "contents")]
    TableOfContents,
    ContentSingle,
    ContentTwoColumn,
    ContentImage,
    Ending,
}

/// A named slide arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    /// Rendered in declaration order
    pub placeholders: Vec<Placeholder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

impl Layout {
    pub fn new(kind: LayoutKind, placeholders: Vec<Placeholder>) -> DeckResult<Self> {
        let layout = Self {
            kind,
            placeholders,
            background: None,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn placeholder(&self, id: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.id == id)
    }

    pub fn validate(&self) -> DeckResult<()> {
        if self.placeholders.is_empty() {
            return Err(DeckError::validation(
                "layout must declare at least one placeholder",
            ));
        }
        let mut seen = HashSet::new();
        for placeholder in &self.placeholders {
            placeholder.validate()?;
            if !seen.insert(placeholder.id.as_str()) {
                return Err(DeckError::validation(format!(
                    "duplicate placeholder id '{}'",
                    placeholder.id
                )));
            }
        }
        if let Some(background) = &self.background {
            background.validate()?;
        }
        Ok(())
    }
}

/// Palette, fonts and spacing shared by every layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub colors: ColorScheme,
    /// Fonts by role (`title`, `subtitle`, `heading`, `body`)
    pub fonts: BTreeMap<String, FontConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<BTreeMap<String, f64>>,
}

/// A complete visual template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplateRecord")]
pub struct Template {
    pub template_id: String,
    pub template_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub theme: ThemeConfig,
    pub layouts: BTreeMap<String, Layout>,
}

/// Unchecked wire shape of a template record
#[derive(Deserialize)]
struct TemplateRecord {
    template_id: String,
    template_name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    description: Option<String>,
    theme: ThemeConfig,
    layouts: BTreeMap<String, Layout>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl TryFrom<TemplateRecord> for Template {
    type Error = DeckError;

    fn try_from(record: TemplateRecord) -> Result<Self, Self::Error> {
        let template = Template {
            template_id: record.template_id,
            template_name: record.template_name,
            version: record.version,
            description: record.description,
            theme: record.theme,
            layouts: record.layouts,
        };
        template.check()?;
        Ok(template)
    }
}

impl Template {
    /// Build a template from parts, enforcing its invariants
    pub fn new(
        template_id: impl Into<String>,
        template_name: impl Into<String>,
        theme: ThemeConfig,
        layouts: BTreeMap<String, Layout>,
    ) -> DeckResult<Self> {
        let template = Self {
            template_id: template_id.into(),
            template_name: template_name.into(),
            version: default_version(),
            description: None,
            theme,
            layouts,
        };
        template.check()?;
        Ok(template)
    }

    pub fn layout(&self, key: &str) -> Option<&Layout> {
        self.layouts.get(key)
    }

    /// Theme font for a role (`title`, `subtitle`, `heading`, `body`)
    pub fn font(&self, role: &str) -> Option<&FontConfig> {
        self.theme.fonts.get(role)
    }

    /// True if some layout has the given structural kind
    pub fn has_layout_kind(&self, kind: LayoutKind) -> bool {
        self.layouts.values().any(|layout| layout.kind == kind)
    }

    /// Layout keys that render through the content renderer
    pub fn content_layout_keys(&self) -> impl Iterator<Item = &str> {
        self.layouts
            .keys()
            .map(String::as_str)
            .filter(|key| classify(key) == Some(RendererKind::Content))
    }

    fn check(&self) -> DeckResult<()> {
        if !is_valid_template_id(&self.template_id) {
            return Err(DeckError::validation(format!(
                "template_id '{}' must match ^[a-z0-9_]+$",
                self.template_id
            )));
        }

        for (role, font) in &self.theme.fonts {
            font.validate()
                .map_err(|e| DeckError::validation(format!("font '{}': {}", role, e)))?;
        }

        for (key, layout) in &self.layouts {
            layout
                .validate()
                .map_err(|e| DeckError::validation(format!("layout '{}': {}", key, e)))?;
        }

        let required = [
            (LayoutKind::Cover, "cover"),
            (LayoutKind::TableOfContents, "table_of_contents"),
            (LayoutKind::Ending, "ending"),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(kind, _)| !self.has_layout_kind(*kind))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(DeckError::validation(format!(
                "template '{}' is missing required layouts: {}",
                self.template_id,
                missing.join(", ")
            )));
        }

        if self.content_layout_keys().next().is_none() {
            return Err(DeckError::validation(format!(
                "template '{}' has no content_* layout",
                self.template_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{business_template, BUSINESS_TEMPLATE_JSON, SIMPLE_TEMPLATE_JSON};
    use serde_json::json;

    #[test]
    fn test_bundled_templates_parse() {
        let business: Template = serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap();
        assert_eq!(business.template_id, "business_001");
        assert_eq!(business.layouts.len(), 6);
        assert_eq!(business.layout("toc").unwrap().kind, LayoutKind::TableOfContents);

        let simple: Template = serde_json::from_str(SIMPLE_TEMPLATE_JSON).unwrap();
        assert_eq!(simple.template_id, "simple_001");
        assert!(simple.description.is_some());
    }

    #[test]
    fn test_hex_color_is_uppercased() {
        let color = HexColor::parse("#1f4788").unwrap();
        assert_eq!(color.as_str(), "#1F4788");
        assert_eq!(color.rgb(), "1F4788");
        assert_eq!(color.alpha(), None);

        let translucent = HexColor::parse("#ff000080").unwrap();
        assert_eq!(translucent.alpha(), Some(0x80));
    }

    #[test]
    fn test_hex_color_rejects_malformed() {
        assert!(HexColor::parse("1F4788").is_err());
        assert!(HexColor::parse("#12345").is_err());
        assert!(HexColor::parse("#GGGGGG").is_err());
        assert!(serde_json::from_value::<HexColor>(json!("#abc")).is_err());
    }

    #[test]
    fn test_font_size_bounds() {
        assert!(FontConfig::new("Arial", 8).is_ok());
        assert!(FontConfig::new("Arial", 96).is_ok());
        assert!(FontConfig::new("Arial", 7).is_err());
        assert!(FontConfig::new("Arial", 97).is_err());
    }

    #[test]
    fn test_placeholder_geometry_bounds() {
        assert!(Placeholder::new("title", PlaceholderKind::Title, 0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(Placeholder::new("title", PlaceholderKind::Title, 0.1, 0.1, 0.0, 0.5).is_err());
        assert!(Placeholder::new("title", PlaceholderKind::Title, 1.2, 0.1, 0.5, 0.5).is_err());
        assert!(Placeholder::new("title", PlaceholderKind::Title, 0.1, -0.1, 0.5, 0.5).is_err());
    }

    #[test]
    fn test_placeholder_defaults() {
        let placeholder: Placeholder = serde_json::from_value(json!({
            "id": "content", "type": "body", "x": 0.1, "y": 0.2, "width": 0.8, "height": 0.6
        }))
        .unwrap();
        assert_eq!(placeholder.alignment, "left");
        assert!(placeholder.font.is_none());
        assert!(!placeholder.kind.is_optional());
        assert!(PlaceholderKind::Chart.is_optional());
    }

    #[test]
    fn test_layout_requires_unique_placeholders() {
        let title = Placeholder::new("title", PlaceholderKind::Title, 0.1, 0.1, 0.8, 0.2).unwrap();
        assert!(Layout::new(LayoutKind::Cover, vec![]).is_err());
        assert!(Layout::new(LayoutKind::Cover, vec![title.clone(), title]).is_err());
    }

    #[test]
    fn test_template_requires_structural_layouts() {
        let mut value: serde_json::Value = serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap();
        value["layouts"].as_object_mut().unwrap().remove("ending");
        let err = serde_json::from_value::<Template>(value).unwrap_err();
        assert!(err.to_string().contains("ending"));
    }

    #[test]
    fn test_template_requires_content_layout() {
        let mut value: serde_json::Value = serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap();
        let layouts = value["layouts"].as_object_mut().unwrap();
        layouts.retain(|key, _| !key.starts_with("content_"));
        let err = serde_json::from_value::<Template>(value).unwrap_err();
        assert!(err.to_string().contains("content_"));
    }

    #[test]
    fn test_template_rejects_bad_id() {
        let mut value: serde_json::Value = serde_json::from_str(BUSINESS_TEMPLATE_JSON).unwrap();
        value["template_id"] = json!("Business-001");
        assert!(serde_json::from_value::<Template>(value).is_err());
        assert!(is_valid_template_id("business_001"));
        assert!(!is_valid_template_id("../etc"));
    }

    #[test]
    fn test_template_roundtrip() {
        let template = business_template();
        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back.template_id, template.template_id);
        assert_eq!(back.theme.colors, template.theme.colors);
        assert_eq!(back.theme.fonts, template.theme.fonts);
        assert!(back.layouts.keys().eq(template.layouts.keys()));
    }
}
