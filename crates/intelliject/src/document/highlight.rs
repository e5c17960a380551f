//! Highlight rectangles on rendered page images

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::{Error, Result};

/// Axis-aligned rectangle in PDF points (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl HighlightRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Pixel bounds `(x0, y0, x1, y1)` at `scale`, clamped to `width` x `height`
    fn pixel_bounds(&self, scale: f32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamp = |v: f32, max: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as u32).min(max)
            }
        };

        let x0 = clamp((self.x0 * scale).floor(), width);
        let y0 = clamp((self.y0 * scale).floor(), height);
        let x1 = clamp((self.x1 * scale).ceil(), width);
        let y1 = clamp((self.y1 * scale).ceil(), height);

        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }
}

/// Multiply-blend `color` over every rectangle
///
/// Dark text stays legible while the background takes the highlight color.
/// Overlapping rectangles are blended once per rectangle.
pub fn blend_highlights(
    image: &mut RgbaImage,
    rects: &[HighlightRect],
    scale: f32,
    color: [u8; 3],
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    let (width, height) = image.dimensions();

    for rect in rects {
        let Some((x0, y0, x1, y1)) = rect.pixel_bounds(scale, width, height) else {
            continue;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = image.get_pixel_mut(x, y);
                for (channel, tint) in pixel.0.iter_mut().take(3).zip(color) {
                    let original = *channel as f32;
                    let multiplied = original * tint as f32 / 255.0;
                    *channel = (original + (multiplied - original) * opacity).round() as u8;
                }
            }
        }
    }
}

/// Encode an RGBA image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| Error::render(format!("PNG encoding failed: {}", e)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HIGHLIGHT_YELLOW;
    use image::Rgba;

    fn white(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_yellow_on_white() {
        let mut img = white(10, 10);
        blend_highlights(&mut img, &[HighlightRect::new(2.0, 2.0, 4.0, 4.0)], 1.0, HIGHLIGHT_YELLOW, 1.0);

        assert_eq!(img.get_pixel(2, 2), &Rgba([255, 255, 0, 255]));
        assert_eq!(img.get_pixel(3, 3), &Rgba([255, 255, 0, 255]));
        assert_eq!(img.get_pixel(4, 4), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(1, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_black_text_stays_black() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        blend_highlights(&mut img, &[HighlightRect::new(0.0, 0.0, 4.0, 4.0)], 1.0, HIGHLIGHT_YELLOW, 1.0);
        assert_eq!(img.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_scale_and_clamp() {
        let mut img = white(10, 10);
        // 3..20 points at 2x covers x 6..10 after clamping
        blend_highlights(&mut img, &[HighlightRect::new(3.0, 0.0, 20.0, 1.0)], 2.0, HIGHLIGHT_YELLOW, 1.0);

        assert_eq!(img.get_pixel(5, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(6, 0), &Rgba([255, 255, 0, 255]));
        assert_eq!(img.get_pixel(9, 1), &Rgba([255, 255, 0, 255]));
        assert_eq!(img.get_pixel(9, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_partial_opacity() {
        let mut img = white(2, 2);
        blend_highlights(&mut img, &[HighlightRect::new(0.0, 0.0, 2.0, 2.0)], 1.0, HIGHLIGHT_YELLOW, 0.5);
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 128, 255]));
    }

    #[test]
    fn test_out_of_bounds_rect_ignored() {
        let mut img = white(4, 4);
        blend_highlights(&mut img, &[HighlightRect::new(50.0, 50.0, 60.0, 60.0)], 1.0, HIGHLIGHT_YELLOW, 1.0);
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_rect_normalises_corners() {
        let rect = HighlightRect::new(5.0, 8.0, 1.0, 2.0);
        assert_eq!(rect, HighlightRect { x0: 1.0, y0: 2.0, x1: 5.0, y1: 8.0 });
    }

    #[test]
    fn test_encode_png() {
        let png = encode_png(&white(3, 2)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }
}
