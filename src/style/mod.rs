//! Style resolution: a section's option bag plus the active template become
//! concrete, section-scoped style values.
//!
//! Resolution is pure and never fails. A missing template is allowed (for
//! example before it has loaded); every axis then falls back to the section's
//! own options and the hard defaults of its [`SectionKind`].

pub mod divider;
pub mod overlay;
pub mod tags;
pub mod values;

use serde::Serialize;

use crate::model::{Section, SectionKind, Template};
use crate::scope::{scope_css, scope_token};

pub use divider::Divider;
pub use overlay::Overlay;
pub use tags::{TagDeclaration, TagRule};
pub use values::{CssLength, FontRole, Padding};

use values::{resolve_color, resolve_font_family, resolve_font_size, resolve_padding};

/// Colors and shape of a call-to-action button.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonStyle {
    pub background: String,
    pub color: String,
    pub radius_px: f64,
}

/// Concrete style of one section for one render. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub color: String,
    pub title_color: String,
    pub background_color: Option<String>,
    pub font_family: String,
    pub title_font_family: String,
    pub font_size: CssLength,
    pub title_font_size: CssLength,
    pub text_align: String,
    pub padding: Padding,
    pub button: Option<ButtonStyle>,
    pub tag_rules: Vec<TagRule>,
    pub overlay: Overlay,
    pub divider_top: Divider,
    pub divider_bottom: Divider,
    /// Author CSS rewritten to only match inside this section
    pub scoped_css: String,
}

/// Resolve `section`'s options against `template`.
pub fn resolve(section: &Section, template: Option<&Template>) -> ResolvedStyle {
    let kind = section.kind();
    let defaults = kind.defaults();
    let options = section.options();

    let font_size = resolve_font_size(options.font_size.as_ref(), template, defaults.body_size);
    let body_px = font_size.px().unwrap_or(defaults.body_size);

    let button = (kind == SectionKind::Button).then(|| ButtonStyle {
        background: resolve_color(options.button_color.as_deref(), template, "#000000"),
        color: resolve_color(options.button_text_color.as_deref(), template, "#ffffff"),
        radius_px: options
            .button_radius
            .as_ref()
            .and_then(|r| r.as_px())
            .unwrap_or(4.0)
            .max(0.0),
    });

    let background_color = options
        .background_color
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|v| resolve_color(Some(v), template, "transparent"));

    let scoped_css = options
        .custom_css
        .as_deref()
        .filter(|css| !css.trim().is_empty())
        .map(|css| scope_css(css, &section.id))
        .unwrap_or_default();

    ResolvedStyle {
        color: resolve_color(options.color.as_deref(), template, defaults.body_color),
        title_color: resolve_color(
            options.title_color.as_deref().or(options.color.as_deref()),
            template,
            defaults.title_color,
        ),
        background_color,
        font_family: resolve_font_family(options.font_family.as_deref(), template, FontRole::Paragraph),
        title_font_family: resolve_font_family(options.title_font_family.as_deref(), template, FontRole::Title),
        title_font_size: resolve_font_size(options.title_font_size.as_ref(), template, defaults.title_size),
        font_size,
        text_align: options
            .text_align
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| defaults.text_align.to_string()),
        padding: resolve_padding(&options, template, defaults.padding),
        button,
        tag_rules: tags::resolve_tag_rules(&options, template, body_px),
        overlay: Overlay::resolve(options.overlay.as_ref()),
        divider_top: Divider::resolve(options.divider_top.as_ref()),
        divider_bottom: Divider::resolve(options.divider_bottom.as_ref()),
        scoped_css,
    }
}

impl ResolvedStyle {
    /// The section container rule.
    pub fn container_css(&self, scope: &str) -> String {
        let mut decls = format!(
            "position: relative; color: {}; font-family: {}; font-size: {}; text-align: {}; padding: {};",
            self.color,
            self.font_family,
            self.font_size,
            self.text_align,
            self.padding.css()
        );
        if let Some(bg) = &self.background_color {
            decls.push_str(&format!(" background-color: {};", bg));
        }
        format!("{} {{ {} }}", scope, decls)
    }

    /// Container, title, button, overlay, divider and per-tag rules followed
    /// by the scoped author CSS, as one stylesheet for `section_id`.
    pub fn stylesheet(&self, section_id: &str) -> String {
        let scope = scope_token(section_id);
        let mut rules = vec![
            self.container_css(&scope),
            format!(
                "{} .section-title {{ color: {}; font-family: {}; font-size: {}; }}",
                scope, self.title_color, self.title_font_family, self.title_font_size
            ),
        ];
        if let Some(button) = &self.button {
            rules.push(format!(
                "{} .section-button {{ background-color: {}; color: {}; border-radius: {}px; }}",
                scope, button.background, button.color, button.radius_px
            ));
        }
        if let Some(overlay) = self.overlay.css() {
            rules.push(format!("{} .section-overlay {{ {} }}", scope, overlay));
        }
        for (class, divider) in [("divider-top", &self.divider_top), ("divider-bottom", &self.divider_bottom)] {
            if let Some(css) = divider.image_css() {
                rules.push(format!("{} .section-{} {{ {} }}", scope, class, css));
            }
        }
        rules.extend(self.tag_rules.iter().map(|r| r.css(&scope)));
        if !self.scoped_css.is_empty() {
            rules.push(self.scoped_css.clone());
        }
        rules.join("\n")
    }
}
