//! Export parameter derivation.
//!
//! The rasterizer renders the whole source artwork, but the clip crops it
//! down; requesting dpi scaled by the crop ratio keeps the pixel density of
//! the final embedded bitmap at the user's chosen target.

use crate::geom::BoundingBox;

/// Ratio between the clip region's width and the artwork's width, both
/// measured in the same frame. `None` when the artwork has no width to
/// divide by.
pub fn derive_scale(image_box: &BoundingBox, clip_box: &BoundingBox) -> Option<f64> {
    let width = image_box.width();
    (width > 0.0).then(|| clip_box.width() / width)
}

/// Resolution to request from the rasterizer.
pub fn derive_export_dpi(target_dpi: f64, scale: f64) -> f64 {
    target_dpi * scale
}

/// Translation that puts a duplicate entirely outside the canvas, with a
/// full canvas-size margin on top.
pub fn safe_offset(canvas: &BoundingBox) -> (f64, f64) {
    let margin = 2.0 * canvas.width().max(canvas.height());
    (margin, margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_widths_scale_to_one() {
        let image = BoundingBox::from_xywh(0.0, 0.0, 80.0, 40.0);
        let clip = BoundingBox::from_xywh(10.0, 0.0, 80.0, 20.0);
        assert_eq!(derive_scale(&image, &clip), Some(1.0));
    }

    #[test]
    fn test_halving_image_width_doubles_scale() {
        let clip = BoundingBox::from_xywh(0.0, 0.0, 50.0, 50.0);
        let wide = BoundingBox::from_xywh(0.0, 0.0, 200.0, 50.0);
        let narrow = BoundingBox::from_xywh(0.0, 0.0, 100.0, 50.0);
        let s1 = derive_scale(&wide, &clip).unwrap();
        let s2 = derive_scale(&narrow, &clip).unwrap();
        assert_eq!(s2, 2.0 * s1);
    }

    #[test]
    fn test_zero_width_image_is_degenerate() {
        let image = BoundingBox::from_xywh(0.0, 0.0, 0.0, 50.0);
        let clip = BoundingBox::from_xywh(0.0, 0.0, 50.0, 50.0);
        assert_eq!(derive_scale(&image, &clip), None);
        assert_eq!(derive_scale(&BoundingBox::EMPTY, &clip), None);
    }

    #[test]
    fn test_export_dpi_follows_crop_ratio() {
        assert_eq!(derive_export_dpi(96.0, 0.5), 48.0);
        assert_eq!(derive_export_dpi(72.0, 1.0), 72.0);
        assert_eq!(derive_export_dpi(50.0, 2.0), 100.0);
    }

    #[test]
    fn test_safe_offset_clears_the_canvas_diagonal() {
        for (w, h) in [(100.0, 100.0), (10.0, 400.0), (1920.0, 1080.0), (0.5, 0.1)] {
            let canvas = BoundingBox::from_xywh(-5.0, 3.0, w, h);
            let (dx, dy) = safe_offset(&canvas);
            let diagonal = (w * w + h * h).sqrt();
            assert!(dx > diagonal, "dx {dx} does not clear diagonal {diagonal}");
            assert_eq!(dx, dy);
        }
    }
}
