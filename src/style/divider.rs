use serde::Serialize;

use crate::options::{DividerKind, DividerOptions, SvgShape};

const DEFAULT_COLOR: &str = "#ffffff";
const DEFAULT_HEIGHT_PX: f64 = 50.0;

/// Shape drawn at the top or bottom edge of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Divider {
    pub enabled: bool,
    pub kind: DividerKind,
    pub shape: SvgShape,
    pub color: String,
    pub image_url: Option<String>,
    pub height_px: f64,
    pub flip: bool,
}

impl Divider {
    pub fn resolve(options: Option<&DividerOptions>) -> Self {
        let default = DividerOptions::default();
        let d = options.unwrap_or(&default);
        Self {
            enabled: d.enabled.unwrap_or(false),
            kind: d.kind.as_deref().and_then(DividerKind::parse).unwrap_or_default(),
            shape: d.shape.as_deref().and_then(SvgShape::parse).unwrap_or_default(),
            color: d
                .color
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_COLOR)
                .to_string(),
            image_url: d
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            height_px: d
                .height
                .filter(|h| h.is_finite())
                .unwrap_or(DEFAULT_HEIGHT_PX)
                .max(0.0),
            flip: d.flip.unwrap_or(false),
        }
    }

    fn is_visible(&self) -> bool {
        self.enabled && self.height_px > 0.0
    }

    /// Inline SVG for `svg` dividers. The path spans a 1200x120 box stretched
    /// to the section width.
    pub fn svg_markup(&self) -> Option<String> {
        if !self.is_visible() || self.kind != DividerKind::Svg {
            return None;
        }
        let path = match self.shape {
            SvgShape::Wave => "M0,64 C300,128 600,0 900,48 C1050,72 1150,96 1200,80 L1200,120 L0,120 Z",
            SvgShape::Slant => "M0,120 L1200,0 L1200,120 Z",
        };
        let flip = if self.flip { " transform: scaleY(-1);" } else { "" };
        Some(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1200 120\" preserveAspectRatio=\"none\" \
             style=\"display: block; width: 100%; height: {}px;{}\"><path d=\"{}\" fill=\"{}\"/></svg>",
            self.height_px, flip, path, self.color
        ))
    }

    /// Declarations for `image` dividers.
    pub fn image_css(&self) -> Option<String> {
        if !self.is_visible() || self.kind != DividerKind::Image {
            return None;
        }
        let url = self.image_url.as_deref()?;
        let flip = if self.flip { " transform: scaleY(-1);" } else { "" };
        Some(format!(
            "display: block; width: 100%; height: {}px; background-image: url(\"{}\"); \
             background-size: 100% 100%; background-repeat: no-repeat;{}",
            self.height_px, url, flip
        ))
    }
}
