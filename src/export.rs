//! Single- and multi-section export.
//!
//! A multi-section export stacks sections top to bottom on one canvas. The
//! shared background is painted across the whole canvas first; each section
//! is then rasterized with its own background shifted by its cumulative
//! offset, so overlays and dividers layered over the background are captured
//! as the user sees them. Sections are processed strictly in order because
//! every offset depends on the heights of the sections before it.

use std::io::Cursor;
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, info, warn};

use crate::model::{BackgroundSize, Section, Template};
use crate::rendering::raster::{RasterRequest, SectionRasterizer};
use crate::rendering::{data_url, paint, CanvasLayout, Downloader, ExportedImage, ImageDecoder, Rasterizer, SectionView, Size};
use crate::{Error, ExportConfig, Result};

pub const DEFAULT_FILE_NAME: &str = "email-export.jpg";

/// Download name for a single section: slugged name plus 1-based position.
///
/// ```
/// assert_eq!(mailframe::export::section_file_name("Hero Section", 0), "hero-section-section-1.jpg");
/// ```
pub fn section_file_name(name: &str, order: u32) -> String {
    let slug = slug::slugify(name);
    let slug = if slug.is_empty() { "section".to_string() } else { slug };
    format!("{}-section-{}.jpg", slug, order as u64 + 1)
}

/// One multi-section export request. Exists only for the duration of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    /// Section ids in ascending `order`
    pub section_ids: Vec<String>,
    pub background_image_url: Option<String>,
    pub background_size: BackgroundSize,
    pub output_file_name: String,
}

impl ExportJob {
    /// Build a job over `sections`, sorted by `order`, with the template's
    /// shared background.
    pub fn new(sections: &[Section], template: Option<&Template>, file_name: impl Into<String>) -> Self {
        let mut ordered: Vec<&Section> = sections.iter().collect();
        ordered.sort_by_key(|s| s.order);
        let file_name = file_name.into();
        Self {
            section_ids: ordered.iter().map(|s| s.id.clone()).collect(),
            background_image_url: template.and_then(|t| t.background_image_url()).map(str::to_string),
            background_size: template.map(|t| t.background_size).unwrap_or_default(),
            output_file_name: if file_name.trim().is_empty() {
                DEFAULT_FILE_NAME.to_string()
            } else {
                file_name
            },
        }
    }
}

/// Export pipeline over the external rasterizer, decoder and downloader.
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    decoder: Arc<dyn ImageDecoder>,
    downloader: Arc<dyn Downloader>,
    config: ExportConfig,
}

impl Exporter {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        decoder: Arc<dyn ImageDecoder>,
        downloader: Arc<dyn Downloader>,
        config: ExportConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rasterizer,
            decoder,
            downloader,
            config,
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export one section as its own image. The raster is downloaded as-is.
    pub async fn export_one(
        &self,
        section: &Section,
        view: &dyn SectionView,
        template: Option<&Template>,
    ) -> Result<ExportedImage> {
        let request = RasterRequest {
            background_image_url: template.and_then(|t| t.background_image_url()).map(str::to_string),
            background_size: template.map(|t| t.background_size).unwrap_or_default(),
            vertical_offset_px: view.background_host_offset().unwrap_or(0.0),
            composite_size: None,
        };

        let rasterizer = SectionRasterizer::new(self.rasterizer.as_ref(), &self.config);
        let url = rasterizer.rasterize(view, &request).await?;
        let data = data_url::decode(&url)?.data;
        let (width, height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()?;

        let file_name = section_file_name(&section.name, section.order);
        self.downloader.download(&file_name, &data)?;
        info!("Exported section {} as {} ({}x{})", section.id, file_name, width, height);

        Ok(ExportedImage {
            file_name,
            width,
            height,
            data,
        })
    }

    /// Export every section of `job` onto one canvas. Any failure aborts the
    /// whole job; nothing is downloaded in that case.
    pub async fn export_all(&self, job: &ExportJob, views: &[Arc<dyn SectionView>]) -> Result<ExportedImage> {
        let views = job
            .section_ids
            .iter()
            .map(|id| {
                views
                    .iter()
                    .find(|v| v.section_id() == id)
                    .map(|v| &**v)
                    .ok_or_else(|| Error::MissingView(id.clone()))
            })
            .collect::<Result<Vec<&dyn SectionView>>>()?;

        let sizes: Vec<Size> = views.iter().map(|v| v.size()).collect();
        let layout = CanvasLayout::new(&sizes, self.config.pixel_ratio);
        let mut canvas = self.acquire_canvas(&layout)?;

        if let Some(url) = &job.background_image_url {
            match self.decoder.decode(url).await {
                Ok(background) => {
                    paint::paint_backdrop(&mut canvas, &background, job.background_size, self.config.pixel_ratio)
                }
                Err(e) => warn!("Background image could not be loaded, exporting without backdrop: {}", e),
            }
        }

        let rasterizer = SectionRasterizer::new(self.rasterizer.as_ref(), &self.config);
        let composite = Size::new(layout.width, layout.total_height);
        let mut current_y = 0.0;

        for (index, view) in views.iter().enumerate() {
            debug!(
                "Rasterizing section {} ({}/{}) at y={}",
                view.section_id(),
                index + 1,
                views.len(),
                current_y
            );
            let request = RasterRequest {
                background_image_url: job.background_image_url.clone(),
                background_size: job.background_size,
                vertical_offset_px: current_y,
                composite_size: Some(composite),
            };
            let url = rasterizer.rasterize(*view, &request).await?;
            let raster = self.decoder.decode(&url).await.map_err(|e| Error::Composition {
                section_id: Some(view.section_id().to_string()),
                message: format!("section {} raster could not be decoded: {}", view.section_id(), e),
            })?;
            paint::draw_section(&mut canvas, &raster, layout.section_rect(index));
            current_y += sizes[index].height;
        }
        debug_assert_eq!(current_y, layout.total_height);

        let data = paint::encode_jpeg(&canvas, self.config.jpeg_quality())?;
        self.downloader.download(&job.output_file_name, &data)?;
        info!(
            "Exported {} sections as {} ({}x{})",
            views.len(),
            job.output_file_name,
            canvas.width(),
            canvas.height()
        );

        Ok(ExportedImage {
            file_name: job.output_file_name.clone(),
            width: canvas.width(),
            height: canvas.height(),
            data,
        })
    }

    fn acquire_canvas(&self, layout: &CanvasLayout) -> Result<RgbaImage> {
        if layout.is_empty() {
            return Err(Error::composition("export job has no sections"));
        }
        if layout.device_width() == 0 || layout.device_height() == 0 {
            return Err(Error::composition(format!(
                "canvas has no area ({}x{})",
                layout.width, layout.total_height
            )));
        }
        if layout.pixel_count() > self.config.max_canvas_pixels {
            return Err(Error::composition(format!(
                "canvas {}x{} exceeds the {} pixel limit",
                layout.device_width(),
                layout.device_height(),
                self.config.max_canvas_pixels
            )));
        }
        Ok(paint::blank_canvas(layout.device_width(), layout.device_height()))
    }
}
