use serde::Serialize;

use crate::model::{StyleValue, Tag, Template};
use crate::options::SectionOptions;
use crate::style::values::{resolve_color, resolve_font_size};

/// One declaration of a per-tag rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDeclaration {
    pub property: &'static str,
    pub value: String,
    /// Section-level values are forced so they beat ambient styles
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRule {
    pub tag: &'static str,
    pub declarations: Vec<TagDeclaration>,
}

impl TagRule {
    pub fn css(&self, scope: &str) -> String {
        let body = self
            .declarations
            .iter()
            .map(|d| {
                let bang = if d.important { " !important" } else { "" };
                format!("{}: {}{};", d.property, d.value, bang)
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {} {{ {} }}", scope, self.tag, body)
    }
}

/// A cleared editor field (`""`) counts as no value.
fn present(value: Option<&StyleValue>) -> Option<&StyleValue> {
    value.filter(|v| !matches!(v, StyleValue::Text(s) if s.trim().is_empty()))
}

fn pick<'a>(section: Option<&'a StyleValue>, template: Option<&'a StyleValue>) -> Option<(&'a StyleValue, bool)> {
    present(section)
        .map(|v| (v, true))
        .or_else(|| present(template).map(|v| (v, false)))
}

/// Per-tag font sizes and colors. Tags with neither a section nor a template
/// value get no rule and inherit the ambient style.
pub fn resolve_tag_rules(options: &SectionOptions, template: Option<&Template>, body_size: f64) -> Vec<TagRule> {
    let template_sizes = template.and_then(|t| t.tag_font_sizes.as_ref());
    let template_colors = template.and_then(|t| t.tag_colors.as_ref());

    Tag::ALL
        .iter()
        .filter_map(|&tag| {
            let mut declarations = Vec::new();

            if let Some((value, important)) = pick(
                options.tag_font_sizes.get(tag),
                template_sizes.and_then(|v| v.get(tag)),
            ) {
                declarations.push(TagDeclaration {
                    property: "font-size",
                    value: resolve_font_size(Some(value), template, body_size).to_string(),
                    important,
                });
            }

            if let Some((value, important)) = pick(
                options.tag_colors.get(tag),
                template_colors.and_then(|v| v.get(tag)),
            ) {
                let raw = match value {
                    StyleValue::Text(s) => s.clone(),
                    StyleValue::Number(n) => n.to_string(),
                };
                declarations.push(TagDeclaration {
                    property: "color",
                    value: resolve_color(Some(&raw), template, "inherit"),
                    important,
                });
            }

            (!declarations.is_empty()).then(|| TagRule {
                tag: tag.as_str(),
                declarations,
            })
        })
        .collect()
}
