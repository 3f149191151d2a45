//! Symbolic-to-concrete value lookup shared by every style axis.
//!
//! Each axis follows the same order: a literal in the options wins, a
//! symbolic name is looked up in the template, an unknown name is passed
//! through verbatim, and a missing option uses the hard default.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::{FontSizes, StyleValue, Template};
use crate::options::SectionOptions;

pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";

/// A resolved length: pixels, or a raw author string handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum CssLength {
    Px(f64),
    Raw(String),
}

impl CssLength {
    pub fn px(&self) -> Option<f64> {
        match self {
            CssLength::Px(n) => Some(*n),
            CssLength::Raw(_) => None,
        }
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssLength::Px(n) => write!(f, "{}px", n),
            CssLength::Raw(s) => f.write_str(s),
        }
    }
}

impl Serialize for CssLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CssLength::Px(n) => serializer.serialize_f64(*n),
            CssLength::Raw(s) => serializer.serialize_str(s),
        }
    }
}

fn is_color_literal(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with('#')
        || lower.contains('(')
        || matches!(lower.as_str(), "transparent" | "currentcolor" | "inherit")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve a color option against the template's slots and custom colors.
pub fn resolve_color(value: Option<&str>, template: Option<&Template>, default: &str) -> String {
    match non_blank(value) {
        None => default.to_string(),
        Some(v) if is_color_literal(v) => v.to_string(),
        Some(v) => template
            .and_then(|t| t.color(v))
            .unwrap_or(v)
            .to_string(),
    }
}

/// Resolve a font size: pixels, a tier name, or a raw pass-through string.
///
/// Without a template, tier names map through the built-in tier table.
pub fn resolve_font_size(value: Option<&StyleValue>, template: Option<&Template>, default: f64) -> CssLength {
    let Some(value) = value else {
        return CssLength::Px(default);
    };
    if let Some(px) = value.as_px() {
        return CssLength::Px(px);
    }
    let Some(name) = non_blank(value.as_text()) else {
        return CssLength::Px(default);
    };
    let builtin = FontSizes::default();
    let tiers = template.map(|t| &t.font_sizes).unwrap_or(&builtin);
    match tiers.tier(name) {
        Some(px) => CssLength::Px(px),
        None => CssLength::Raw(name.to_string()),
    }
}

/// Which template font a family symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Paragraph,
}

fn template_font(template: Option<&Template>, role: FontRole) -> Option<&str> {
    let fonts = &template?.fonts;
    let family = match role {
        FontRole::Title => &fonts.title,
        FontRole::Paragraph => &fonts.paragraph,
    };
    non_blank(Some(family.as_str()))
}

pub fn resolve_font_family(value: Option<&str>, template: Option<&Template>, role: FontRole) -> String {
    let fallback = || {
        template_font(template, role)
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string()
    };
    match non_blank(value) {
        None => fallback(),
        Some("title") => template_font(template, FontRole::Title)
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string(),
        Some("paragraph") => template_font(template, FontRole::Paragraph)
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string(),
        Some(v) => v.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    pub fn css(&self) -> String {
        format!("{}px {}px {}px {}px", self.top, self.right, self.bottom, self.left)
    }
}

/// Per-side padding. The template toggles replace a whole axis pair.
pub fn resolve_padding(options: &SectionOptions, template: Option<&Template>, default: f64) -> Padding {
    let side = |v: &Option<StyleValue>| v.as_ref().and_then(StyleValue::as_px).unwrap_or(default);
    let mut padding = Padding {
        top: side(&options.padding_top),
        right: side(&options.padding_right),
        bottom: side(&options.padding_bottom),
        left: side(&options.padding_left),
    };
    if let Some(t) = template {
        if options.use_template_padding_inline.unwrap_or(false) {
            padding.left = t.padding_inline;
            padding.right = t.padding_inline;
        }
        if options.use_template_padding_block.unwrap_or(false) {
            padding.top = t.padding_block;
            padding.bottom = t.padding_block;
        }
    }
    padding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomColor, Fonts, TemplateColors};

    fn template() -> Template {
        Template {
            fonts: Fonts {
                title: "Georgia, serif".into(),
                paragraph: "Inter, sans-serif".into(),
            },
            colors: TemplateColors {
                primary: "#111111".into(),
                secondary: "#222222".into(),
                background: "#fafafa".into(),
                text: "#333333".into(),
                accent: "#ff6600".into(),
            },
            custom_colors: vec![CustomColor {
                name: "mint".into(),
                value: "#98ff98".into(),
            }],
            padding_inline: 12.0,
            padding_block: 48.0,
            ..Default::default()
        }
    }

    #[test]
    fn colors_follow_three_tiers() {
        let t = template();
        assert_eq!(resolve_color(Some("#ff0000"), Some(&t), "#000000"), "#ff0000");
        assert_eq!(resolve_color(Some("accent"), Some(&t), "#000000"), "#ff6600");
        assert_eq!(resolve_color(Some("mint"), Some(&t), "#000000"), "#98ff98");
        assert_eq!(resolve_color(Some("doesnotexist"), Some(&t), "#000000"), "doesnotexist");
        assert_eq!(resolve_color(None, Some(&t), "#000000"), "#000000");
        assert_eq!(resolve_color(Some("  "), None, "#000000"), "#000000");
        assert_eq!(resolve_color(Some("rgb(1, 2, 3)"), Some(&t), "#000000"), "rgb(1, 2, 3)");
    }

    #[test]
    fn font_sizes_resolve_tiers_and_literals() {
        let mut t = template();
        t.font_sizes.xl = 40.0;
        assert_eq!(resolve_font_size(Some(&"xl".into()), Some(&t), 16.0), CssLength::Px(40.0));
        assert_eq!(resolve_font_size(Some(&"xl".into()), None, 16.0), CssLength::Px(36.0));
        assert_eq!(resolve_font_size(Some(&22.0.into()), Some(&t), 16.0), CssLength::Px(22.0));
        assert_eq!(resolve_font_size(Some(&"2rem".into()), Some(&t), 16.0), CssLength::Raw("2rem".into()));
        assert_eq!(resolve_font_size(None, Some(&t), 16.0), CssLength::Px(16.0));
        assert_eq!(CssLength::Px(16.0).to_string(), "16px");
    }

    #[test]
    fn font_family_symbols_map_to_template_fonts() {
        let t = template();
        assert_eq!(resolve_font_family(Some("title"), Some(&t), FontRole::Paragraph), "Georgia, serif");
        assert_eq!(resolve_font_family(None, Some(&t), FontRole::Paragraph), "Inter, sans-serif");
        assert_eq!(resolve_font_family(Some("Courier"), Some(&t), FontRole::Title), "Courier");
        assert_eq!(resolve_font_family(None, None, FontRole::Title), DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn template_padding_toggle_overrides_literals() {
        let t = template();
        let options = SectionOptions {
            padding_top: Some(5.0.into()),
            padding_bottom: Some("7px".into()),
            padding_left: Some(3.0.into()),
            use_template_padding_block: Some(true),
            ..Default::default()
        };
        let p = resolve_padding(&options, Some(&t), 32.0);
        assert_eq!((p.top, p.bottom), (48.0, 48.0));
        assert_eq!((p.left, p.right), (3.0, 32.0));

        let p = resolve_padding(&options, None, 32.0);
        assert_eq!((p.top, p.bottom), (5.0, 7.0));
    }
}
