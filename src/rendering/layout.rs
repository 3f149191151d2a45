//! Vertical stacking of sections onto one export canvas

/// Rendered size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A region of the output canvas in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Cumulative top offset of each section when stacked in order.
pub fn stack_offsets(heights: &[f64]) -> Vec<f64> {
    let mut y = 0.0;
    heights
        .iter()
        .map(|h| {
            let top = y;
            y += h;
            top
        })
        .collect()
}

/// Geometry of a multi-section export. The canvas width comes from the first
/// section; sections are full-bleed.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLayout {
    pub width: f64,
    pub total_height: f64,
    pub pixel_ratio: f64,
    sizes: Vec<Size>,
    offsets: Vec<f64>,
}

impl CanvasLayout {
    pub fn new(sizes: &[Size], pixel_ratio: f64) -> Self {
        let heights: Vec<f64> = sizes.iter().map(|s| s.height).collect();
        Self {
            width: sizes.first().map(|s| s.width).unwrap_or(0.0),
            total_height: heights.iter().sum(),
            pixel_ratio,
            sizes: sizes.to_vec(),
            offsets: stack_offsets(&heights),
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Top of section `index` in CSS pixels
    pub fn offset(&self, index: usize) -> f64 {
        self.offsets[index]
    }

    fn device(&self, css_px: f64) -> u32 {
        (css_px * self.pixel_ratio).round().max(0.0) as u32
    }

    pub fn device_width(&self) -> u32 {
        self.device(self.width)
    }

    pub fn device_height(&self) -> u32 {
        self.device(self.total_height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.device_width() as u64 * self.device_height() as u64
    }

    /// Target region of section `index`. Edges are rounded from cumulative
    /// offsets so consecutive regions tile the canvas without gaps.
    pub fn section_rect(&self, index: usize) -> Rect {
        let top = self.offsets[index];
        let size = self.sizes[index];
        let y = self.device(top);
        let bottom = self.device(top + size.height);
        Rect {
            x: 0,
            y,
            width: self.device(size.width),
            height: bottom.saturating_sub(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> CanvasLayout {
        CanvasLayout::new(
            &[Size::new(600.0, 100.0), Size::new(600.0, 150.0), Size::new(600.0, 80.0)],
            2.0,
        )
    }

    #[test]
    fn canvas_is_scaled_sum_of_heights() {
        let layout = three();
        assert_eq!(layout.device_width(), 1200);
        assert_eq!(layout.device_height(), 660);
        assert_eq!(layout.offset(1), 100.0);
        assert_eq!(layout.offset(2), 250.0);
    }

    #[test]
    fn section_rects_tile_the_canvas() {
        let layout = CanvasLayout::new(
            &[Size::new(375.0, 100.3), Size::new(375.0, 33.3), Size::new(375.0, 71.9)],
            1.5,
        );
        let mut y = 0;
        for i in 0..layout.len() {
            let r = layout.section_rect(i);
            assert_eq!(r.y, y);
            y += r.height;
        }
        assert_eq!(y, layout.device_height());
    }

    #[test]
    fn empty_layout() {
        let layout = CanvasLayout::new(&[], 2.0);
        assert!(layout.is_empty());
        assert_eq!(layout.pixel_count(), 0);
    }
}
