//! Mailframe
//!
//! Style resolution and raster export for emails composed of ordered
//! sections. Each section carries content plus a bag of style options that
//! are resolved against a shared template; sections can then be exported as
//! JPEG images, alone or stacked onto one canvas with a background image that
//! stays continuous across section boundaries.
//!
//! # Pieces
//!
//! - [`style::resolve`]: section options + template to concrete style values
//! - [`scope::scope_css`]: confine author CSS to one section
//! - [`rendering::raster::SectionRasterizer`]: drive the external rasterizer
//!   for one live section view
//! - [`export::Exporter`]: single- and multi-section export
//! - [`async_api::ExportSession`]: serialized export jobs for one document
//!
//! # Example
//!
//! ```
//! use mailframe::{model::Section, options::OptionUpdate, style};
//!
//! let mut section = Section::new("s1", "hero", "Hero", 0);
//! section.apply(OptionUpdate::Color("#ff0000".into()));
//! let resolved = style::resolve(&section, None);
//! assert_eq!(resolved.color, "#ff0000");
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod model;
pub mod options;
pub mod scope;
pub mod style;

// Rasterization driving, canvas layout and painting
pub mod rendering;

pub mod export;

// Single-flight export queue
pub mod async_api;

pub use async_api::ExportSession;
pub use export::{ExportJob, Exporter};

/// How a `cover` background is sized in each section's own background
/// override while it is rasterized.
///
/// Both variants offset the image by the section's cumulative height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverOffset {
    /// CSS `cover` on the section itself
    #[default]
    Native,
    /// Size the image to the whole composite so it lines up with the
    /// stretched canvas backdrop
    Canvas,
}

/// Configuration for export jobs
///
/// # Examples
///
/// ```
/// let cfg = mailframe::ExportConfig::default();
/// assert_eq!(cfg.pixel_ratio, 2.0);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Pixel-density multiplier applied to rasters and the output canvas
    pub pixel_ratio: f64,
    /// JPEG quality in (0, 1]
    pub quality: f64,
    /// Ask the rasterizer to bypass its resource cache
    pub cache_bust: bool,
    /// Fallback wait before capture when a view gives no paint signal
    pub paint_settle_ms: u64,
    /// Upper bound on output canvas size in device pixels
    pub max_canvas_pixels: u64,
    pub cover_offset: CoverOffset,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            quality: 0.95,
            cache_bust: true,
            paint_settle_ms: 100,
            max_canvas_pixels: 16_384 * 16_384,
            cover_offset: CoverOffset::Native,
        }
    }
}

impl ExportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("Invalid export config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(Error::Config(format!("pixel ratio must be positive, got {}", self.pixel_ratio)));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(Error::Config(format!("quality must be in (0, 1], got {}", self.quality)));
        }
        if self.max_canvas_pixels == 0 {
            return Err(Error::Config("max canvas pixels must be non-zero".into()));
        }
        Ok(())
    }

    /// JPEG quality on the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.jpeg_quality(), 95);
        assert_eq!(config.cover_offset, CoverOffset::Native);
        assert!(config.cache_bust);
    }

    #[test]
    fn test_config_from_json() {
        let cfg = ExportConfig::from_json(r#"{"pixelRatio": 3, "coverOffset": "canvas"}"#).unwrap();
        assert_eq!(cfg.pixel_ratio, 3.0);
        assert_eq!(cfg.cover_offset, CoverOffset::Canvas);
        assert_eq!(cfg.paint_settle_ms, 100);
    }

    #[test]
    fn test_invalid_config() {
        let cfg = ExportConfig {
            quality: 1.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        assert!(ExportConfig::from_json(r#"{"pixelRatio": 0}"#).is_err());
    }
}
