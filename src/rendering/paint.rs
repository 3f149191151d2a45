/// Canvas painting for multi-section exports

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::model::BackgroundSize;
use crate::rendering::Rect;
use crate::Result;

/// Opaque base the canvas starts from, so JPEG output never shows black
/// where nothing was painted.
pub const CANVAS_BASE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn blank_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, CANVAS_BASE)
}

/// Paint the shared background across the whole canvas.
///
/// `Cover` stretches the image to exactly fill the canvas. `Repeat` tiles it
/// at its natural size scaled by `pixel_ratio`.
pub fn paint_backdrop(canvas: &mut RgbaImage, background: &DynamicImage, size: BackgroundSize, pixel_ratio: f64) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 || background.width() == 0 || background.height() == 0 {
        return;
    }
    match size {
        BackgroundSize::Cover => {
            imageops::overlay(canvas, &fit(background, width, height), 0, 0);
        }
        BackgroundSize::Repeat => {
            let tile_w = ((background.width() as f64 * pixel_ratio).round() as u32).max(1);
            let tile_h = ((background.height() as f64 * pixel_ratio).round() as u32).max(1);
            let tile = fit(background, tile_w, tile_h);
            for y in (0..height).step_by(tile_h as usize) {
                for x in (0..width).step_by(tile_w as usize) {
                    imageops::overlay(canvas, &tile, x as i64, y as i64);
                }
            }
        }
    }
}

fn fit(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        image.resize_exact(width, height, FilterType::Triangle).to_rgba8()
    }
}

/// Draw a section raster into its target region, resizing it when the raster
/// does not match the region exactly.
pub fn draw_section(canvas: &mut RgbaImage, raster: &DynamicImage, rect: Rect) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let pixels = fit(raster, rect.width, rect.height);
    imageops::overlay(canvas, &pixels, rect.x as i64, rect.y as i64);
}

/// Flatten and encode the canvas as JPEG.
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    #[test]
    fn cover_fills_the_whole_canvas() {
        let mut canvas = blank_canvas(40, 90);
        paint_backdrop(&mut canvas, &solid(3, 3, [255, 0, 255, 255]), BackgroundSize::Cover, 2.0);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(39, 89), &Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn repeat_tiles_at_device_scale() {
        let mut tile = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        tile.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut canvas = blank_canvas(8, 8);
        paint_backdrop(&mut canvas, &DynamicImage::ImageRgba8(tile), BackgroundSize::Repeat, 1.0);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(2, 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(6, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn sections_land_in_their_rects() {
        let mut canvas = blank_canvas(4, 6);
        draw_section(&mut canvas, &solid(2, 1, [0, 255, 0, 255]), Rect { x: 0, y: 2, width: 4, height: 2 });
        assert_eq!(canvas.get_pixel(3, 1), &CANVAS_BASE);
        assert_eq!(canvas.get_pixel(3, 2), &Rgba([0, 255, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 3), &Rgba([0, 255, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 4), &CANVAS_BASE);
    }

    #[test]
    fn encodes_jpeg() {
        let bytes = encode_jpeg(&blank_canvas(16, 8), 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
