use serde::Serialize;

use crate::options::{OverlayKind, OverlayOptions};

const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_GRADIENT_END: &str = "transparent";
const DEFAULT_DIRECTION: &str = "to bottom";
const DEFAULT_OPACITY_PERCENT: f64 = 50.0;
const MAX_BLUR_PX: f64 = 20.0;

/// Overlay painted between a section's background and its content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub enabled: bool,
    pub kind: OverlayKind,
    pub color: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub gradient_direction: String,
    /// Always within [0, 1]
    pub opacity: f64,
    /// `None` when no blur filter applies
    pub blur_px: Option<f64>,
}

impl Overlay {
    pub fn resolve(options: Option<&OverlayOptions>) -> Self {
        let default = OverlayOptions::default();
        let o = options.unwrap_or(&default);
        let text = |v: &Option<String>, d: &str| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(d)
                .to_string()
        };

        let percent = o
            .opacity
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_OPACITY_PERCENT)
            .clamp(0.0, 100.0);
        let blur = o
            .blur
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, MAX_BLUR_PX);

        Self {
            enabled: o.enabled.unwrap_or(false),
            kind: o
                .kind
                .as_deref()
                .and_then(OverlayKind::parse)
                .unwrap_or_default(),
            color: text(&o.color, DEFAULT_COLOR),
            gradient_start: text(&o.gradient_start, DEFAULT_COLOR),
            gradient_end: text(&o.gradient_end, DEFAULT_GRADIENT_END),
            gradient_direction: text(&o.gradient_direction, DEFAULT_DIRECTION),
            opacity: percent / 100.0,
            blur_px: (blur > 0.0).then_some(blur),
        }
    }

    /// The CSS `background` value of the overlay layer.
    pub fn fill(&self) -> String {
        match self.kind {
            OverlayKind::Color => self.color.clone(),
            OverlayKind::Gradient => format!(
                "linear-gradient({}, {}, {})",
                self.gradient_direction, self.gradient_start, self.gradient_end
            ),
        }
    }

    /// Declarations for the overlay layer, or `None` when disabled.
    pub fn css(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let mut decls = format!(
            "position: absolute; inset: 0; pointer-events: none; background: {}; opacity: {};",
            self.fill(),
            self.opacity
        );
        if let Some(blur) = self.blur_px {
            decls.push_str(&format!(" backdrop-filter: blur({}px);", blur));
        }
        Some(decls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let o = Overlay::resolve(None);
        assert!(!o.enabled);
        assert_eq!(o.kind, OverlayKind::Color);
        assert_eq!(o.opacity, 0.5);
        assert_eq!(o.blur_px, None);
        assert_eq!(o.css(), None);
    }

    #[test]
    fn opacity_is_normalized_and_blur_clamped() {
        let o = Overlay::resolve(Some(&OverlayOptions {
            enabled: Some(true),
            opacity: Some(140.0),
            blur: Some(35.0),
            ..Default::default()
        }));
        assert_eq!(o.opacity, 1.0);
        assert_eq!(o.blur_px, Some(20.0));

        let o = Overlay::resolve(Some(&OverlayOptions {
            opacity: Some(-5.0),
            ..Default::default()
        }));
        assert_eq!(o.opacity, 0.0);
    }

    #[test]
    fn zero_blur_emits_no_filter() {
        let o = Overlay::resolve(Some(&OverlayOptions {
            enabled: Some(true),
            blur: Some(0.0),
            opacity: Some(30.0),
            ..Default::default()
        }));
        let css = o.css().unwrap();
        assert!(!css.contains("blur"));
        assert!(css.contains("opacity: 0.3;"));
    }

    #[test]
    fn gradient_fill() {
        let o = Overlay::resolve(Some(&OverlayOptions {
            enabled: Some(true),
            kind: Some("gradient".into()),
            gradient_start: Some("#ff0000".into()),
            gradient_direction: Some("to right".into()),
            blur: Some(4.0),
            ..Default::default()
        }));
        assert_eq!(o.fill(), "linear-gradient(to right, #ff0000, transparent)");
        assert!(o.css().unwrap().ends_with("backdrop-filter: blur(4px);"));
    }
}
