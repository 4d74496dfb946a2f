//! Texture generation for the detector frame image.

use egui::ColorImage;
use ndarray::Array2;

use crate::scene::region_overlay::PixelClass;
use crate::scene::zoom::Rect;
use crate::util::i64_to_f32;
use crate::viewer::Colormap;

/// Integer pixel window of the visible rectangle, clamped to the frame.
///
/// Returns (first column, first row, width, height).
#[must_use]
pub fn visible_window(visible: &Rect, n_rows: usize, n_cols: usize) -> (usize, usize, usize, usize) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let c0 = (visible.left.floor().max(0.0) as usize).min(n_cols);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r0 = (visible.top.floor().max(0.0) as usize).min(n_rows);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let c1 = (visible.right.ceil().max(0.0) as usize).min(n_cols);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r1 = (visible.bottom.ceil().max(0.0) as usize).min(n_rows);
    (c0, r0, c1.saturating_sub(c0), r1.saturating_sub(r0))
}

/// Display color of one integration-region class, or `None` for
/// transparent pixels.
fn region_color(class: PixelClass) -> Option<[u8; 4]> {
    match class {
        PixelClass::None => None,
        PixelClass::Peak => Some([255, 230, 0, 255]),
        PixelClass::Background => Some([0, 200, 80, 255]),
        PixelClass::Excluded => Some([220, 40, 40, 255]),
    }
}

/// Generate a color image of the visible part of a frame.
///
/// Counts are clipped to the intensity ceiling and normalized, linearly
/// or on a log scale. When an integration-region raster is given its
/// classes are blended over the image.
#[must_use]
pub fn render_frame_image(
    counts: &Array2<i64>,
    visible: &Rect,
    max_intensity: i64,
    log_scale: bool,
    colormap: Colormap,
    regions: Option<&Array2<PixelClass>>,
) -> ColorImage {
    let (n_rows, n_cols) = counts.dim();
    let (c0, r0, width, height) = visible_window(visible, n_rows, n_cols);

    let ceiling = i64_to_f32(max_intensity.max(1));
    let max_log = (ceiling + 1.0).ln();

    let mut pixels = vec![0u8; width * height * 4];
    for y in 0..height {
        for x in 0..width {
            let count = counts[(r0 + y, c0 + x)].max(0).min(max_intensity.max(1));
            let val = if log_scale {
                ((i64_to_f32(count) + 1.0).ln() / max_log).clamp(0.0, 1.0)
            } else {
                (i64_to_f32(count) / ceiling).clamp(0.0, 1.0)
            };
            let mut rgba = colormap.apply(val);
            if let Some(tint) = regions
                .and_then(|r| r.get((r0 + y, c0 + x)).copied())
                .and_then(region_color)
            {
                for ch in 0..3 {
                    rgba[ch] = rgba[ch] / 2 + tint[ch] / 2;
                }
            }
            let offset = (y * width + x) * 4;
            pixels[offset..offset + 4].copy_from_slice(&rgba);
        }
    }
    ColorImage::from_rgba_unmultiplied([width, height], &pixels)
}
