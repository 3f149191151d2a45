//! Drives the rasterization primitive for one live section view.

use std::time::Duration;

use log::debug;

use crate::model::BackgroundSize;
use crate::rendering::{InlineStyle, RasterOptions, Rasterizer, SectionView, Size};
use crate::{CoverOffset, Error, ExportConfig, Result};

/// Per-section inputs of one rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    /// Shared background image, if the export has one
    pub background_image_url: Option<String>,
    pub background_size: BackgroundSize,
    /// Distance of this section from the top of the shared background
    pub vertical_offset_px: f64,
    /// Size of the whole composite, when the section is part of one
    pub composite_size: Option<Size>,
}

impl RasterRequest {
    pub fn plain() -> Self {
        Self {
            background_image_url: None,
            background_size: BackgroundSize::Cover,
            vertical_offset_px: 0.0,
            composite_size: None,
        }
    }
}

/// Restores a view's inline style when dropped, so the live editor node is
/// never left with the export override, including on error or cancellation.
struct RestoreGuard<'a> {
    view: &'a dyn SectionView,
    original: Option<InlineStyle>,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if let Some(style) = self.original.take() {
            self.view.set_inline_style(style);
        }
    }
}

pub struct SectionRasterizer<'a> {
    primitive: &'a dyn Rasterizer,
    config: &'a ExportConfig,
}

impl<'a> SectionRasterizer<'a> {
    pub fn new(primitive: &'a dyn Rasterizer, config: &'a ExportConfig) -> Self {
        Self { primitive, config }
    }

    /// The inline style a section carries while it is captured: the shared
    /// background tiled vertically and shifted up by the section's offset so
    /// the section shows its own window onto one continuous image.
    pub fn background_override(&self, original: &InlineStyle, request: &RasterRequest) -> Option<InlineStyle> {
        let url = request.background_image_url.as_deref()?;
        let mut style = original.clone();
        style.set("background-image", format!("url(\"{}\")", url));
        style.set("background-repeat", "repeat-y");

        let size = match (request.background_size, self.config.cover_offset, request.composite_size) {
            (BackgroundSize::Repeat, _, _) => "auto".to_string(),
            (BackgroundSize::Cover, CoverOffset::Canvas, Some(c)) => format!("{}px {}px", c.width, c.height),
            (BackgroundSize::Cover, _, _) => "cover".to_string(),
        };
        style.set("background-size", size);

        let y = if request.vertical_offset_px == 0.0 {
            0.0
        } else {
            -request.vertical_offset_px
        };
        style.set("background-position", format!("center {}px", y));
        Some(style)
    }

    /// Capture `view` as a data URL.
    pub async fn rasterize(&self, view: &dyn SectionView, request: &RasterRequest) -> Result<String> {
        let section_id = view.section_id().to_string();
        let original = view.inline_style();
        let overridden = self.background_override(&original, request);
        let guard = RestoreGuard {
            view,
            original: Some(original),
        };

        if let Some(style) = overridden {
            debug!(
                "Section {}: background offset {}px",
                section_id, request.vertical_offset_px
            );
            view.set_inline_style(style);
        }

        self.wait_for_paint(view).await;

        let options = RasterOptions {
            quality: self.config.quality,
            pixel_ratio: self.config.pixel_ratio,
            cache_bust: self.config.cache_bust,
        };
        let result = self.primitive.rasterize(view, &options).await;
        drop(guard);

        match result {
            Ok(url) if url.trim().is_empty() => Err(Error::Rasterization {
                section_id,
                message: "rasterizer returned an empty image".into(),
            }),
            Ok(url) => Ok(url),
            Err(Error::Rasterization { message, .. }) => Err(Error::Rasterization { section_id, message }),
            Err(e) => Err(Error::Rasterization {
                section_id,
                message: e.to_string(),
            }),
        }
    }

    async fn wait_for_paint(&self, view: &dyn SectionView) {
        match view.paint_complete() {
            Some(painted) => painted.await,
            None if self.config.paint_settle_ms > 0 => {
                tokio::time::sleep(Duration::from_millis(self.config.paint_settle_ms)).await
            }
            None => tokio::task::yield_now().await,
        }
    }
}
