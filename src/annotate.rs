//! Overlay instructions for annotated frames.
//!
//! Building the overlay is pure and always available. Rasterising it onto an
//! image needs the `annotate` feature (`image` + `imageproc`); captions are drawn
//! when a TrueType font is supplied (`ab_glyph`).

use serde::Serialize;

use crate::detect::{BoundingBox, Detection};

pub type Rgb = [u8; 3];

pub const DEFAULT_COLOR: Rgb = [255, 255, 255];

const CATEGORY_COLORS: &[(&str, Rgb)] = &[
    ("0", [255, 165, 0]),
    ("c", [255, 215, 0]),
    ("garbage", [255, 0, 0]),
    ("garbage_bag", [255, 0, 255]),
    ("waste", [0, 255, 0]),
    ("trash", [255, 140, 0]),
];

/// Captions never sit above this y coordinate so they stay on-frame.
const CAPTION_MIN_Y: u32 = 25;
const CAPTION_OFFSET: u32 = 10;

/// Fixed colour for a category; white for labels outside the table.
pub fn category_color(label: &str) -> Rgb {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayInstruction {
    pub bbox: BoundingBox,
    pub color: Rgb,
    pub caption: String,
    pub caption_anchor: (u32, u32),
}

pub fn overlay_for(detection: &Detection) -> OverlayInstruction {
    let bbox = detection.bounding_box();
    OverlayInstruction {
        bbox,
        color: category_color(detection.label()),
        caption: format!(
            "{} {:.0}%",
            detection.label(),
            detection.confidence() * 100.0
        ),
        caption_anchor: (
            bbox.x1(),
            bbox.y1().saturating_sub(CAPTION_OFFSET).max(CAPTION_MIN_Y),
        ),
    }
}

pub fn build_overlays(detections: &[Detection]) -> Vec<OverlayInstruction> {
    detections.iter().map(overlay_for).collect()
}

#[cfg(feature = "annotate")]
mod raster {
    use ab_glyph::{FontVec, PxScale};
    use anyhow::{anyhow, Context, Result};
    use image::{Rgb as Pixel, RgbImage};
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
    use imageproc::rect::Rect;
    use std::path::Path;

    use super::OverlayInstruction;
    use crate::detect::ImageDimensions;

    /// Outline thickness in pixels.
    pub const STROKE: u32 = 2;
    /// Caption height in pixels.
    pub const CAPTION_SCALE: f32 = 16.0;
    const CAPTION_TEXT: Pixel<u8> = Pixel([0, 0, 0]);

    pub fn load_font(path: &Path) -> Result<FontVec> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()))?;
        FontVec::try_from_vec(bytes).map_err(|e| anyhow!("invalid font {}: {}", path.display(), e))
    }

    /// Band behind a caption of `text_width` x `text_height`: left edge on the
    /// box, bottom edge on the caption anchor.
    pub fn caption_band(overlay: &OverlayInstruction, text_width: u32, text_height: u32) -> Option<Rect> {
        if text_width == 0 || text_height == 0 {
            return None;
        }
        let (x, baseline) = overlay.caption_anchor;
        let top = baseline.saturating_sub(text_height);
        Some(Rect::at(x as i32, top as i32).of_size(text_width, text_height))
    }

    fn draw_box(canvas: &mut RgbImage, overlay: &OverlayInstruction) {
        let b = overlay.bbox;
        for inset in 0..STROKE {
            let w = b.width().saturating_sub(2 * inset);
            let h = b.height().saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((b.x1() + inset) as i32, (b.y1() + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(canvas, rect, Pixel(overlay.color));
        }
    }

    fn draw_caption(canvas: &mut RgbImage, overlay: &OverlayInstruction, font: &FontVec) {
        let scale = PxScale::from(CAPTION_SCALE);
        let (w, h) = text_size(scale, font, &overlay.caption);
        if let Some(band) = caption_band(overlay, w, h) {
            draw_filled_rect_mut(canvas, band, Pixel(overlay.color));
            draw_text_mut(canvas, CAPTION_TEXT, band.left(), band.top(), scale, font, &overlay.caption);
        }
    }

    /// Draw each overlay rectangle, and its caption on a filled band when a
    /// font is available.
    pub fn render_overlays(canvas: &mut RgbImage, overlays: &[OverlayInstruction], font: Option<&FontVec>) {
        for overlay in overlays {
            draw_box(canvas, overlay);
            if let Some(font) = font {
                draw_caption(canvas, overlay, font);
            }
        }
    }

    pub fn image_dimensions(path: &Path) -> Result<ImageDimensions> {
        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("failed to read image header {}", path.display()))?;
        Ok(ImageDimensions::new(height, width))
    }

    /// Load `input`, draw the overlays and write the result to `output`.
    /// Captions are drawn only when `font` is given.
    pub fn annotate_file(
        input: &Path,
        output: &Path,
        overlays: &[OverlayInstruction],
        font: Option<&FontVec>,
    ) -> Result<()> {
        let mut canvas = image::open(input)
            .with_context(|| format!("failed to decode image {}", input.display()))?
            .to_rgb8();
        if font.is_none() {
            log::debug!("no caption font; drawing boxes only");
        }
        render_overlays(&mut canvas, overlays, font);
        canvas
            .save(output)
            .with_context(|| format!("failed to write annotated image {}", output.display()))?;
        log::info!(
            "annotated {} detections into {}",
            overlays.len(),
            output.display()
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::annotate::overlay_for;
        use crate::detect::{BoundingBox, Detection};

        fn overlay(label: &str, x1: i64, y1: i64, x2: i64, y2: i64) -> OverlayInstruction {
            let det = Detection::new(label, 0.9, BoundingBox::new(x1, y1, x2, y2).unwrap()).unwrap();
            overlay_for(&det)
        }

        #[test]
        fn draws_outline_in_category_color() {
            let mut canvas = RgbImage::new(40, 40);
            render_overlays(&mut canvas, &[overlay("garbage", 5, 5, 25, 25)], None);
            assert_eq!(canvas.get_pixel(5, 5).0, [255, 0, 0]);
            assert_eq!(canvas.get_pixel(6, 6).0, [255, 0, 0]);
            assert_eq!(canvas.get_pixel(15, 15).0, [0, 0, 0]);
        }

        #[test]
        fn caption_band_sits_on_the_anchor() {
            let low = overlay("waste", 10, 60, 40, 90);
            assert_eq!(low.caption_anchor, (10, 50));
            let band = caption_band(&low, 30, 12).unwrap();
            assert_eq!((band.left(), band.top()), (10, 38));
            assert_eq!((band.width(), band.height()), (30, 12));
            assert_eq!(band.bottom(), 49);

            let high = overlay("waste", 0, 0, 10, 10);
            let band = caption_band(&high, 20, 30).unwrap();
            assert_eq!(band.top(), 0);
            assert!(caption_band(&high, 0, 12).is_none());
        }

        #[test]
        fn missing_font_file_is_an_error() {
            let err = load_font(Path::new("/nonexistent/caption.ttf")).unwrap_err();
            assert!(err.to_string().contains("failed to read font"));
        }
    }
}

#[cfg(feature = "annotate")]
pub use raster::{
    annotate_file, caption_band, image_dimensions, load_font, render_overlays, CAPTION_SCALE,
};
