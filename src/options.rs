//! Typed view over a section's `options` map, and typed edits to it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{lenient, Section, StyleValue, Tag, TagValues};

/// Style overrides stored under `content.options`.
///
/// Keys this crate does not know about are kept in `extra` so that writing
/// the options back never drops author data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionOptions {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub title_font_size: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub title_font_family: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub use_template_padding_inline: Option<bool>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub use_template_padding_block: Option<bool>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub button_text_color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub button_radius: Option<StyleValue>,
    #[serde(deserialize_with = "lenient::or_default", skip_serializing_if = "TagValues::is_empty")]
    pub tag_font_sizes: TagValues,
    #[serde(deserialize_with = "lenient::or_default", skip_serializing_if = "TagValues::is_empty")]
    pub tag_colors: TagValues,
    #[serde(rename = "customCSS", deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayOptions>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub divider_top: Option<DividerOptions>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub divider_bottom: Option<DividerOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayOptions {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "type", deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub gradient_start: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub gradient_end: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub gradient_direction: Option<String>,
    /// Percent, 0-100
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Pixels, 0-20
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividerOptions {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "type", deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(alias = "svgShape", deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub flip: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    #[default]
    Color,
    Gradient,
}

impl OverlayKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "color" => Some(OverlayKind::Color),
            "gradient" => Some(OverlayKind::Gradient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverlayKind::Color => "color",
            OverlayKind::Gradient => "gradient",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerKind {
    #[default]
    Svg,
    Image,
}

impl DividerKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(DividerKind::Svg),
            "image" => Some(DividerKind::Image),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DividerKind::Svg => "svg",
            DividerKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgShape {
    #[default]
    Wave,
    Slant,
}

impl SvgShape {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wave" => Some(SvgShape::Wave),
            "slant" => Some(SvgShape::Slant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SvgShape::Wave => "wave",
            SvgShape::Slant => "slant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayUpdate {
    Enabled(bool),
    Kind(OverlayKind),
    Color(String),
    GradientStart(String),
    GradientEnd(String),
    GradientDirection(String),
    Opacity(f64),
    Blur(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DividerUpdate {
    Enabled(bool),
    Kind(DividerKind),
    Shape(SvgShape),
    Color(String),
    ImageUrl(String),
    Height(f64),
    Flip(bool),
}

/// A single typed edit to a section's options.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionUpdate {
    Color(String),
    BackgroundColor(String),
    FontSize(StyleValue),
    FontFamily(String),
    TitleColor(String),
    TitleFontSize(StyleValue),
    TitleFontFamily(String),
    Padding(Side, f64),
    UseTemplatePaddingInline(bool),
    UseTemplatePaddingBlock(bool),
    TextAlign(String),
    ButtonColor(String),
    ButtonTextColor(String),
    ButtonRadius(f64),
    TagFontSize(Tag, Option<StyleValue>),
    TagColor(Tag, Option<String>),
    CustomCss(String),
    Overlay(OverlayUpdate),
    Divider(Edge, DividerUpdate),
}

impl OptionUpdate {
    /// Stored key this edit writes, plus the nested key for map-valued options.
    fn path(&self) -> (&'static str, Option<&'static str>) {
        match self {
            OptionUpdate::Color(_) => ("color", None),
            OptionUpdate::BackgroundColor(_) => ("backgroundColor", None),
            OptionUpdate::FontSize(_) => ("fontSize", None),
            OptionUpdate::FontFamily(_) => ("fontFamily", None),
            OptionUpdate::TitleColor(_) => ("titleColor", None),
            OptionUpdate::TitleFontSize(_) => ("titleFontSize", None),
            OptionUpdate::TitleFontFamily(_) => ("titleFontFamily", None),
            OptionUpdate::Padding(Side::Top, _) => ("paddingTop", None),
            OptionUpdate::Padding(Side::Right, _) => ("paddingRight", None),
            OptionUpdate::Padding(Side::Bottom, _) => ("paddingBottom", None),
            OptionUpdate::Padding(Side::Left, _) => ("paddingLeft", None),
            OptionUpdate::UseTemplatePaddingInline(_) => ("useTemplatePaddingInline", None),
            OptionUpdate::UseTemplatePaddingBlock(_) => ("useTemplatePaddingBlock", None),
            OptionUpdate::TextAlign(_) => ("textAlign", None),
            OptionUpdate::ButtonColor(_) => ("buttonColor", None),
            OptionUpdate::ButtonTextColor(_) => ("buttonTextColor", None),
            OptionUpdate::ButtonRadius(_) => ("buttonRadius", None),
            OptionUpdate::TagFontSize(tag, _) => ("tagFontSizes", Some(tag.as_str())),
            OptionUpdate::TagColor(tag, _) => ("tagColors", Some(tag.as_str())),
            OptionUpdate::CustomCss(_) => ("customCSS", None),
            OptionUpdate::Overlay(u) => (
                "overlay",
                Some(match u {
                    OverlayUpdate::Enabled(_) => "enabled",
                    OverlayUpdate::Kind(_) => "type",
                    OverlayUpdate::Color(_) => "color",
                    OverlayUpdate::GradientStart(_) => "gradientStart",
                    OverlayUpdate::GradientEnd(_) => "gradientEnd",
                    OverlayUpdate::GradientDirection(_) => "gradientDirection",
                    OverlayUpdate::Opacity(_) => "opacity",
                    OverlayUpdate::Blur(_) => "blur",
                }),
            ),
            OptionUpdate::Divider(edge, u) => (
                match edge {
                    Edge::Top => "dividerTop",
                    Edge::Bottom => "dividerBottom",
                },
                Some(match u {
                    DividerUpdate::Enabled(_) => "enabled",
                    DividerUpdate::Kind(_) => "type",
                    DividerUpdate::Shape(_) => "shape",
                    DividerUpdate::Color(_) => "color",
                    DividerUpdate::ImageUrl(_) => "imageUrl",
                    DividerUpdate::Height(_) => "height",
                    DividerUpdate::Flip(_) => "flip",
                }),
            ),
        }
    }
}

impl SectionOptions {
    pub fn apply(&mut self, update: OptionUpdate) {
        match update {
            OptionUpdate::Color(v) => self.color = Some(v),
            OptionUpdate::BackgroundColor(v) => self.background_color = Some(v),
            OptionUpdate::FontSize(v) => self.font_size = Some(v),
            OptionUpdate::FontFamily(v) => self.font_family = Some(v),
            OptionUpdate::TitleColor(v) => self.title_color = Some(v),
            OptionUpdate::TitleFontSize(v) => self.title_font_size = Some(v),
            OptionUpdate::TitleFontFamily(v) => self.title_font_family = Some(v),
            OptionUpdate::Padding(side, px) => {
                let slot = match side {
                    Side::Top => &mut self.padding_top,
                    Side::Right => &mut self.padding_right,
                    Side::Bottom => &mut self.padding_bottom,
                    Side::Left => &mut self.padding_left,
                };
                *slot = Some(StyleValue::Number(px));
            }
            OptionUpdate::UseTemplatePaddingInline(on) => self.use_template_padding_inline = Some(on),
            OptionUpdate::UseTemplatePaddingBlock(on) => self.use_template_padding_block = Some(on),
            OptionUpdate::TextAlign(v) => self.text_align = Some(v),
            OptionUpdate::ButtonColor(v) => self.button_color = Some(v),
            OptionUpdate::ButtonTextColor(v) => self.button_text_color = Some(v),
            OptionUpdate::ButtonRadius(px) => self.button_radius = Some(StyleValue::Number(px)),
            OptionUpdate::TagFontSize(tag, v) => self.tag_font_sizes.set(tag, v),
            OptionUpdate::TagColor(tag, v) => self.tag_colors.set(tag, v.map(StyleValue::Text)),
            OptionUpdate::CustomCss(v) => self.custom_css = Some(v),
            OptionUpdate::Overlay(u) => {
                let o = self.overlay.get_or_insert_with(OverlayOptions::default);
                match u {
                    OverlayUpdate::Enabled(v) => o.enabled = Some(v),
                    OverlayUpdate::Kind(k) => o.kind = Some(k.as_str().to_string()),
                    OverlayUpdate::Color(v) => o.color = Some(v),
                    OverlayUpdate::GradientStart(v) => o.gradient_start = Some(v),
                    OverlayUpdate::GradientEnd(v) => o.gradient_end = Some(v),
                    OverlayUpdate::GradientDirection(v) => o.gradient_direction = Some(v),
                    OverlayUpdate::Opacity(v) => o.opacity = Some(v),
                    OverlayUpdate::Blur(v) => o.blur = Some(v),
                }
            }
            OptionUpdate::Divider(edge, u) => {
                let slot = match edge {
                    Edge::Top => &mut self.divider_top,
                    Edge::Bottom => &mut self.divider_bottom,
                };
                let d = slot.get_or_insert_with(DividerOptions::default);
                match u {
                    DividerUpdate::Enabled(v) => d.enabled = Some(v),
                    DividerUpdate::Kind(k) => d.kind = Some(k.as_str().to_string()),
                    DividerUpdate::Shape(s) => d.shape = Some(s.as_str().to_string()),
                    DividerUpdate::Color(v) => d.color = Some(v),
                    DividerUpdate::ImageUrl(v) => d.image_url = Some(v),
                    DividerUpdate::Height(v) => d.height = Some(v),
                    DividerUpdate::Flip(v) => d.flip = Some(v),
                }
            }
        }
    }
}

impl Section {
    /// Typed options of this section. Each known key is read on its own: a
    /// value of the wrong shape reads as unset without affecting the rest.
    pub fn options(&self) -> SectionOptions {
        match self.content.get("options") {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed options on section {}: {}", self.id, e);
                SectionOptions::default()
            }),
            None => SectionOptions::default(),
        }
    }

    /// Replace the options map with `options`.
    pub fn set_options(&mut self, options: &SectionOptions) {
        match serde_json::to_value(options) {
            Ok(value) => {
                self.content.insert("options".to_string(), value);
            }
            Err(e) => log::warn!("Failed to store options on section {}: {}", self.id, e),
        }
    }

    /// Apply one typed option edit in place. Only the edited key is written;
    /// every other stored value, readable or not, is left as it was.
    pub fn apply(&mut self, update: OptionUpdate) {
        let (key, leaf) = update.path();
        let mut options = self.options();
        options.apply(update);

        let updated = match serde_json::to_value(&options) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to store options on section {}: {}", self.id, e);
                return;
            }
        };
        let value = updated
            .get(key)
            .and_then(|v| match leaf {
                Some(leaf) => v.get(leaf),
                None => Some(v),
            })
            .cloned();

        let stored = self
            .content
            .entry("options")
            .or_insert_with(|| Value::Object(Map::new()));
        if !stored.is_object() {
            log::warn!("Replacing non-map options on section {}", self.id);
            *stored = Value::Object(Map::new());
        }
        if let Some(map) = stored.as_object_mut() {
            write_entry(map, key, leaf, value);
        }
    }
}

fn write_entry(map: &mut Map<String, Value>, key: &str, leaf: Option<&str>, value: Option<Value>) {
    let (map, key) = match leaf {
        None => (map, key),
        Some(leaf) => {
            let nested = map
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            if !nested.is_object() {
                *nested = Value::Object(Map::new());
            }
            match nested.as_object_mut() {
                Some(nested) => {
                    // legacy spelling would collide with the canonical key
                    if leaf == "shape" {
                        nested.remove("svgShape");
                    }
                    (nested, leaf)
                }
                None => return,
            }
        }
    };
    match value {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section_with(options: Value) -> Section {
        let mut s = Section::new("s1", "text", "Body", 0);
        s.content.insert("options".into(), options);
        s
    }

    #[test]
    fn reads_options_from_content_map() {
        let s = section_with(json!({
            "color": "primary",
            "fontSize": "xl",
            "paddingTop": 10,
            "useTemplatePaddingBlock": true,
            "customCSS": "p { margin: 0 }",
            "overlay": { "enabled": true, "type": "gradient", "opacity": 40 },
            "dividerTop": { "enabled": true, "svgShape": "slant" }
        }));
        let o = s.options();
        assert_eq!(o.color.as_deref(), Some("primary"));
        assert_eq!(o.font_size, Some(StyleValue::from("xl")));
        assert_eq!(o.padding_top, Some(StyleValue::Number(10.0)));
        assert_eq!(o.use_template_padding_block, Some(true));
        assert_eq!(o.custom_css.as_deref(), Some("p { margin: 0 }"));
        assert_eq!(o.overlay.unwrap().kind.as_deref(), Some("gradient"));
        assert_eq!(o.divider_top.unwrap().shape.as_deref(), Some("slant"));
    }

    #[test]
    fn nested_update_creates_missing_maps() {
        let mut s = Section::new("s1", "hero", "Hero", 0);
        s.apply(OptionUpdate::Overlay(OverlayUpdate::Blur(6.0)));
        s.apply(OptionUpdate::Divider(Edge::Bottom, DividerUpdate::Flip(true)));
        assert_eq!(s.content["options"]["overlay"]["blur"], json!(6.0));
        assert_eq!(s.content["options"]["dividerBottom"]["flip"], json!(true));
    }

    #[test]
    fn updates_keep_unknown_keys() {
        let mut s = section_with(json!({ "legacyFlag": "keep-me", "color": "#fff" }));
        s.apply(OptionUpdate::Color("accent".into()));
        assert_eq!(s.content["options"]["legacyFlag"], json!("keep-me"));
        assert_eq!(s.content["options"]["color"], json!("accent"));
    }

    #[test]
    fn tag_updates_can_clear_values() {
        let mut s = Section::new("s1", "text", "Body", 0);
        s.apply(OptionUpdate::TagColor(Tag::H2, Some("accent".into())));
        assert_eq!(s.options().tag_colors.h2, Some(StyleValue::from("accent")));
        s.apply(OptionUpdate::TagColor(Tag::H2, None));
        assert!(s.options().tag_colors.is_empty());
    }

    #[test]
    fn mistyped_value_only_unsets_itself() {
        let s = section_with(json!({
            "color": "primary",
            "paddingTop": 8,
            "useTemplatePaddingBlock": "yes please",
            "legacyFlag": "keep",
            "tagFontSizes": { "h1": 30, "h2": [1] },
            "overlay": { "enabled": true, "opacity": "40", "blur": {} }
        }));
        let o = s.options();
        assert_eq!(o.color.as_deref(), Some("primary"));
        assert_eq!(o.padding_top, Some(StyleValue::Number(8.0)));
        assert_eq!(o.use_template_padding_block, None);
        assert_eq!(o.tag_font_sizes.h1, Some(StyleValue::Number(30.0)));
        assert_eq!(o.tag_font_sizes.h2, None);
        assert_eq!(o.extra["legacyFlag"], json!("keep"));

        let overlay = o.overlay.unwrap();
        assert_eq!(overlay.enabled, Some(true));
        assert_eq!(overlay.opacity, Some(40.0));
        assert_eq!(overlay.blur, None);
    }

    #[test]
    fn non_map_options_read_as_default() {
        assert_eq!(section_with(json!("oops")).options(), SectionOptions::default());
    }

    #[test]
    fn updates_only_touch_the_edited_key() {
        let mut s = section_with(json!({
            "color": "primary",
            "paddingTop": 8,
            "legacyFlag": "keep",
            "overlay": { "enabled": true, "opacity": "40", "vendorTint": 3 },
            "dividerTop": { "svgShape": "slant" }
        }));
        s.apply(OptionUpdate::TextAlign("right".into()));
        s.apply(OptionUpdate::Overlay(OverlayUpdate::Blur(4.0)));
        s.apply(OptionUpdate::Divider(Edge::Top, DividerUpdate::Shape(SvgShape::Wave)));

        assert_eq!(
            s.content["options"],
            json!({
                "color": "primary",
                "paddingTop": 8,
                "legacyFlag": "keep",
                "textAlign": "right",
                "overlay": { "enabled": true, "opacity": "40", "vendorTint": 3, "blur": 4.0 },
                "dividerTop": { "shape": "wave" }
            })
        );
        assert_eq!(s.options().divider_top.unwrap().shape.as_deref(), Some("wave"));
    }
}
