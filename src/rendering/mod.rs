//! Rendering seams: the live section views, the external rasterization
//! primitive, image decoding and file download.
//!
//! The presentation layer owns the rendered nodes and the primitive that
//! turns a node into a raster image. This module defines how they are
//! driven; [`raster`], [`layout`] and [`paint`] do the driving.

pub mod data_url;
pub mod layout;
pub mod paint;
pub mod raster;

use std::path::PathBuf;

use futures::future::BoxFuture;
use image::DynamicImage;
use sha2::{Digest, Sha256};

use crate::Result;

pub use data_url::DataUrlDecoder;
pub use layout::{CanvasLayout, Rect, Size};

/// Ordered inline style declarations of a rendered node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse `prop: value; prop: value` text. Malformed declarations are skipped.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::default();
        for decl in css_text.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim();
                if !prop.is_empty() {
                    style.set(prop, value.trim());
                }
            }
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let idx = self.declarations.iter().position(|(p, _)| p == property)?;
        Some(self.declarations.remove(idx).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A rendered, live section node. Implementations use interior mutability;
/// the same node stays attached to the interactive editor.
pub trait SectionView: Send + Sync {
    fn section_id(&self) -> &str;

    /// Rendered size in CSS pixels
    fn size(&self) -> Size;

    fn inline_style(&self) -> InlineStyle;

    fn set_inline_style(&self, style: InlineStyle);

    /// Distance from the top of the nearest ancestor carrying the shared
    /// background, or `None` when there is no such ancestor.
    fn background_host_offset(&self) -> Option<f64> {
        None
    }

    /// Resolves once the currently applied background has been decoded and
    /// painted. `None` means the view cannot signal this.
    fn paint_complete(&self) -> Option<BoxFuture<'_, ()>> {
        None
    }
}

/// Options handed to the rasterization primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub quality: f64,
    pub pixel_ratio: f64,
    pub cache_bust: bool,
}

/// The external "node to compressed image" primitive. Returns a data URL.
pub trait Rasterizer: Send + Sync {
    fn rasterize<'a>(&'a self, view: &'a dyn SectionView, options: &'a RasterOptions) -> BoxFuture<'a, Result<String>>;
}

/// Decodes an image URL or data URL into a drawable image.
pub trait ImageDecoder: Send + Sync {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DynamicImage>>;
}

/// Delivers a finished export to the user.
pub trait Downloader: Send + Sync {
    fn download(&self, file_name: &str, data: &[u8]) -> Result<()>;
}

/// Writes exports into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Downloader for DirectoryDownloader {
    fn download(&self, file_name: &str, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(file_name), data)?;
        Ok(())
    }
}

/// A finished export
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub file_name: String,
    /// Device pixels
    pub width: u32,
    pub height: u32,
    /// Compressed image bytes as downloaded
    pub data: Vec<u8>,
}

impl ExportedImage {
    /// Hex SHA-256 of the image bytes.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_style_round_trip() {
        let mut s = InlineStyle::parse("color: red; background-image: url(a.png);; bogus");
        assert_eq!(s.get("color"), Some("red"));
        assert_eq!(s.get("background-image"), Some("url(a.png)"));
        s.set("color", "blue");
        s.set("padding", "4px");
        assert_eq!(s.to_css_text(), "color: blue; background-image: url(a.png); padding: 4px;");
        assert_eq!(s.remove("color").as_deref(), Some("blue"));
        assert_eq!(s.get("color"), None);
    }

    #[test]
    fn downloader_writes_into_directory() {
        let dir = std::env::temp_dir().join(format!("mailframe-dl-{}", std::process::id()));
        let dl = DirectoryDownloader::new(&dir);
        dl.download("a.jpg", b"jpeg").unwrap();
        assert_eq!(std::fs::read(dir.join("a.jpg")).unwrap(), b"jpeg");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn fingerprint_is_stable() {
        let img = ExportedImage {
            file_name: "x.jpg".into(),
            width: 1,
            height: 1,
            data: b"abc".to_vec(),
        };
        assert_eq!(
            img.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
