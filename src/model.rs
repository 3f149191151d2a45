//! Section and template records as supplied by the editing layer.
//!
//! Both shapes deserialize from the JSON documents the persistence layer
//! stores. The pipeline only reads them; option edits go through
//! [`Section::apply`](crate::options) with typed updates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Field deserializers for author-edited option maps: a value of the wrong
/// shape reads as absent instead of failing the whole record.
pub(crate) mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// A number, or a string holding one (`"40"`).
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(n.filter(|n| n.is_finite()))
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

/// One ordered, independently styled content block of the composed email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub section_type_id: String,
    pub name: String,
    /// Literal fields (titles, body text, image URLs) plus the `options` map
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub order: u32,
}

impl Section {
    pub fn new(id: impl Into<String>, section_type_id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            section_type_id: section_type_id.into(),
            name: name.into(),
            content: Map::new(),
            order,
        }
    }

    /// The kind of section, derived from `section_type_id`.
    pub fn kind(&self) -> SectionKind {
        SectionKind::from_type_id(&self.section_type_id)
    }

    /// A literal content field as text, if present.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }
}

/// A literal-or-symbolic style value as it appears in option maps.
///
/// Authors write sizes as numbers (`18`), pixel strings (`"18px"`) or tier
/// names (`"xl"`), so both JSON shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    /// Numeric pixel value, if this is a number or a `px`/unitless string.
    pub fn as_px(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) if n.is_finite() => Some(*n),
            StyleValue::Number(_) => None,
            StyleValue::Text(s) => {
                let s = s.trim();
                let s = s.strip_suffix("px").unwrap_or(s).trim_end();
                s.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            StyleValue::Number(_) => None,
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

/// Text tags that can carry per-tag overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
}

impl Tag {
    pub const ALL: [Tag; 6] = [Tag::P, Tag::H1, Tag::H2, Tag::H3, Tag::H4, Tag::H5];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
        }
    }
}

/// Per-tag values (`p`, `h1`..`h5`), used for both sizes and colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagValues {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub p: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub h1: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub h2: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub h3: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub h4: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub h5: Option<StyleValue>,
}

impl TagValues {
    pub fn get(&self, tag: Tag) -> Option<&StyleValue> {
        self.slot(tag).as_ref()
    }

    pub fn set(&mut self, tag: Tag, value: Option<StyleValue>) {
        *self.slot_mut(tag) = value;
    }

    pub fn is_empty(&self) -> bool {
        Tag::ALL.iter().all(|t| self.get(*t).is_none())
    }

    fn slot(&self, tag: Tag) -> &Option<StyleValue> {
        match tag {
            Tag::P => &self.p,
            Tag::H1 => &self.h1,
            Tag::H2 => &self.h2,
            Tag::H3 => &self.h3,
            Tag::H4 => &self.h4,
            Tag::H5 => &self.h5,
        }
    }

    fn slot_mut(&mut self, tag: Tag) -> &mut Option<StyleValue> {
        match tag {
            Tag::P => &mut self.p,
            Tag::H1 => &mut self.h1,
            Tag::H2 => &mut self.h2,
            Tag::H3 => &mut self.h3,
            Tag::H4 => &mut self.h4,
            Tag::H5 => &mut self.h5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub title: String,
    pub paragraph: String,
}

/// The five fixed color slots of a template. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl TemplateColors {
    /// Look up a fixed slot by its symbolic name.
    pub fn slot(&self, name: &str) -> Option<&str> {
        let value = match name {
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "background" => &self.background,
            "text" => &self.text,
            "accent" => &self.accent,
            _ => return None,
        };
        (!value.is_empty()).then_some(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomColor {
    pub name: String,
    pub value: String,
}

/// Font size tiers in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub xxl: f64,
    pub xl: f64,
    pub l: f64,
    pub m: f64,
    pub s: f64,
    pub xs: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            xxl: 48.0,
            xl: 36.0,
            l: 28.0,
            m: 20.0,
            s: 16.0,
            xs: 14.0,
        }
    }
}

impl FontSizes {
    pub fn tier(&self, name: &str) -> Option<f64> {
        match name {
            "xxl" => Some(self.xxl),
            "xl" => Some(self.xl),
            "l" => Some(self.l),
            "m" => Some(self.m),
            "s" => Some(self.s),
            "xs" => Some(self.xs),
            _ => None,
        }
    }
}

/// How the shared background image fills the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    #[default]
    Cover,
    Repeat,
}

/// Shared palette, typography and spacing referenced by every section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Template {
    pub fonts: Fonts,
    pub colors: TemplateColors,
    pub custom_colors: Vec<CustomColor>,
    pub font_sizes: FontSizes,
    pub tag_font_sizes: Option<TagValues>,
    pub tag_colors: Option<TagValues>,
    pub padding_inline: f64,
    pub padding_block: f64,
    pub background_image: Option<String>,
    pub background_size: BackgroundSize,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            fonts: Fonts::default(),
            colors: TemplateColors::default(),
            custom_colors: Vec::new(),
            font_sizes: FontSizes::default(),
            tag_font_sizes: None,
            tag_colors: None,
            padding_inline: 32.0,
            padding_block: 32.0,
            background_image: None,
            background_size: BackgroundSize::Cover,
        }
    }
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("Invalid template: {}", e)))
    }

    /// Resolve a symbolic color name: fixed slots first, then custom colors.
    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.slot(name).or_else(|| {
            self.custom_colors
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.value.as_str())
        })
    }

    /// The configured background image, ignoring blank values.
    pub fn background_image_url(&self) -> Option<&str> {
        self.background_image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A project document: the ordered sections plus the active template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub sections: Vec<Section>,
    pub template: Option<Template>,
}

impl Project {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("Invalid project: {}", e)))
    }

    /// Sections sorted by ascending `order`.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Section type, derived from `sectionTypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    Text,
    Image,
    Button,
    Columns,
    Footer,
    Generic,
}

/// Hard defaults used when neither the section nor the template says otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindDefaults {
    pub title_size: f64,
    pub body_size: f64,
    pub title_color: &'static str,
    pub body_color: &'static str,
    pub text_align: &'static str,
    pub padding: f64,
}

impl SectionKind {
    pub fn from_type_id(type_id: &str) -> Self {
        let id = type_id.trim().to_ascii_lowercase();
        // Type ids are often suffixed ("hero-split", "text_block")
        let head = id.split(['-', '_']).next().unwrap_or_default();
        match head {
            "hero" | "header" | "banner" => SectionKind::Hero,
            "text" | "paragraph" | "content" => SectionKind::Text,
            "image" | "gallery" => SectionKind::Image,
            "button" | "cta" => SectionKind::Button,
            "columns" | "grid" => SectionKind::Columns,
            "footer" => SectionKind::Footer,
            _ => SectionKind::Generic,
        }
    }

    pub fn defaults(self) -> KindDefaults {
        let base = KindDefaults {
            title_size: 28.0,
            body_size: 16.0,
            title_color: "#000000",
            body_color: "#000000",
            text_align: "left",
            padding: 32.0,
        };
        match self {
            SectionKind::Hero => KindDefaults {
                title_size: 40.0,
                body_size: 18.0,
                text_align: "center",
                ..base
            },
            SectionKind::Image => KindDefaults {
                title_size: 20.0,
                body_size: 14.0,
                text_align: "center",
                ..base
            },
            SectionKind::Button => KindDefaults {
                title_size: 16.0,
                text_align: "center",
                ..base
            },
            SectionKind::Columns => KindDefaults {
                title_size: 22.0,
                ..base
            },
            SectionKind::Footer => KindDefaults {
                title_size: 14.0,
                body_size: 12.0,
                title_color: "#666666",
                body_color: "#666666",
                text_align: "center",
                ..base
            },
            SectionKind::Text | SectionKind::Generic => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_camel_case_json() {
        let t = Template::from_json(
            r##"{
                "fonts": {"title": "Georgia", "paragraph": "Inter"},
                "colors": {"primary": "#112233", "secondary": "#445566", "background": "#ffffff", "text": "#111111", "accent": "#ff8800"},
                "customColors": [{"name": "brand", "value": "#abcdef"}],
                "fontSizes": {"xxl": 50, "xl": 40, "l": 30, "m": 20, "s": 15, "xs": 10},
                "paddingInline": 24,
                "paddingBlock": 40,
                "backgroundImage": "data:image/png;base64,AAAA",
                "backgroundSize": "repeat"
            }"##,
        )
        .unwrap();
        assert_eq!(t.fonts.title, "Georgia");
        assert_eq!(t.color("brand"), Some("#abcdef"));
        assert_eq!(t.color("accent"), Some("#ff8800"));
        assert_eq!(t.font_sizes.tier("xl"), Some(40.0));
        assert_eq!(t.padding_block, 40.0);
        assert_eq!(t.background_size, BackgroundSize::Repeat);
        assert!(t.tag_colors.is_none());
    }

    #[test]
    fn fixed_slots_win_over_custom_colors() {
        let t = Template {
            colors: TemplateColors {
                primary: "#010101".into(),
                ..Default::default()
            },
            custom_colors: vec![CustomColor {
                name: "primary".into(),
                value: "#020202".into(),
            }],
            ..Default::default()
        };
        assert_eq!(t.color("primary"), Some("#010101"));
    }

    #[test]
    fn empty_slot_falls_through_to_custom_colors() {
        let t = Template {
            custom_colors: vec![CustomColor {
                name: "text".into(),
                value: "#333333".into(),
            }],
            ..Default::default()
        };
        assert_eq!(t.color("text"), Some("#333333"));
    }

    #[test]
    fn style_value_parses_pixel_strings() {
        assert_eq!(StyleValue::from("18px").as_px(), Some(18.0));
        assert_eq!(StyleValue::from(" 12 ").as_px(), Some(12.0));
        assert_eq!(StyleValue::from(20.5).as_px(), Some(20.5));
        assert_eq!(StyleValue::from("xl").as_px(), None);
    }

    #[test]
    fn section_kind_from_type_ids() {
        assert_eq!(SectionKind::from_type_id("hero"), SectionKind::Hero);
        assert_eq!(SectionKind::from_type_id("hero-split"), SectionKind::Hero);
        assert_eq!(SectionKind::from_type_id("Footer_simple"), SectionKind::Footer);
        assert_eq!(SectionKind::from_type_id("timeline"), SectionKind::Generic);
    }

    #[test]
    fn project_orders_sections() {
        let project = Project {
            sections: vec![
                Section::new("b", "text", "B", 1),
                Section::new("a", "hero", "A", 0),
            ],
            template: None,
        };
        let ids: Vec<&str> = project.ordered_sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
