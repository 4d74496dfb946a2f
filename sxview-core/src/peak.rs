//! Diffraction peaks and their display geometry.

use crate::error::Result;
use crate::geometry::Ellipsoid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle into a dataset's peak arena.
///
/// Handles carry the slot index only; after the peak is removed the
/// handle resolves to `None` rather than dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeakId(pub(crate) usize);

impl PeakId {
    /// Raw slot index, for diagnostics.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A diffraction peak in (col, row, frame) space.
///
/// The shape ellipsoid is the one-sigma region; the three scale factors
/// delimit the nested integration regions: up to `peak_end` is signal,
/// `bkg_begin..=bkg_end` is background, the gap between `peak_end` and
/// `bkg_begin` is a guard buffer used by neither.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Peak {
    shape: Ellipsoid,
    /// Scale factor delimiting the signal region.
    pub peak_end: f64,
    /// Scale factor where the background annulus begins.
    pub bkg_begin: f64,
    /// Scale factor where the background annulus ends.
    pub bkg_end: f64,
    /// Whether the peak is selected (participates in integration display).
    pub selected: bool,
    /// Whether the peak is covered by a detector mask.
    pub masked: bool,
}

/// 2-D ellipse obtained by slicing a peak shape at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEllipse {
    /// Ellipse center as (col, row).
    pub center: (f64, f64),
    /// Semi-axes along (col, row).
    pub semi_axes: (f64, f64),
}

impl Peak {
    /// Default scale factor for the signal region boundary.
    pub const DEFAULT_PEAK_END: f64 = 3.0;
    /// Default scale factor for the background annulus start.
    pub const DEFAULT_BKG_BEGIN: f64 = 3.0;
    /// Default scale factor for the background annulus end.
    pub const DEFAULT_BKG_END: f64 = 6.0;

    /// Creates a peak with the default integration scale factors.
    #[must_use]
    pub fn new(shape: Ellipsoid) -> Self {
        Self {
            shape,
            peak_end: Self::DEFAULT_PEAK_END,
            bkg_begin: Self::DEFAULT_BKG_BEGIN,
            bkg_end: Self::DEFAULT_BKG_END,
            selected: true,
            masked: false,
        }
    }

    /// One-sigma shape ellipsoid.
    #[inline]
    #[must_use]
    pub fn shape(&self) -> Ellipsoid {
        self.shape
    }

    /// Peak center as (col, row, frame).
    #[inline]
    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        self.shape.center()
    }

    /// Frame-axis bounding interval of the signal region.
    ///
    /// # Errors
    /// Propagates a degenerate-shape error from the bounding box.
    pub fn frame_interval(&self) -> Result<(f64, f64)> {
        Ok(self.shape.scaled(self.peak_end).aabb()?.frame_interval())
    }

    /// Whether the signal region overlaps the given frame index.
    /// Degenerate shapes are never visible.
    #[must_use]
    pub fn visible_on_frame(&self, frame: usize) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let f = frame as f64;
        self.frame_interval()
            .map(|(lo, hi)| f >= lo && f <= hi)
            .unwrap_or(false)
    }

    /// Cross-section of the signal region at one frame, for drawing and
    /// hit testing. `None` if the frame is outside the signal region or
    /// the shape is degenerate.
    #[must_use]
    pub fn slice_at_frame(&self, frame: usize) -> Option<FrameEllipse> {
        #[allow(clippy::cast_precision_loss)]
        let f = frame as f64;
        let scaled = self.shape.scaled(self.peak_end);
        let bb = scaled.aabb().ok()?;
        let [cx, cy, cz] = scaled.center();
        let ez = 0.5 * (bb.upper()[2] - bb.lower()[2]);
        if ez <= 0.0 {
            return None;
        }
        let t = (f - cz) / ez;
        if t.abs() > 1.0 {
            return None;
        }
        // Shrink the equatorial cross-section toward the poles.
        let shrink = (1.0 - t * t).sqrt();
        let ex = 0.5 * (bb.upper()[0] - bb.lower()[0]);
        let ey = 0.5 * (bb.upper()[1] - bb.lower()[1]);
        Some(FrameEllipse {
            center: (cx, cy),
            semi_axes: (ex * shrink, ey * shrink),
        })
    }
}

impl FrameEllipse {
    /// Whether a (col, row) point lies inside the ellipse.
    #[must_use]
    pub fn contains(&self, col: f64, row: f64) -> bool {
        let (a, b) = self.semi_axes;
        if a <= 0.0 || b <= 0.0 {
            return false;
        }
        let dx = (col - self.center.0) / a;
        let dy = (row - self.center.1) / b;
        dx * dx + dy * dy <= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn peak_at(center: [f64; 3]) -> Peak {
        // One-sigma radii of 1 px / 1 px / 0.5 frames; peak_end = 3
        // puts the signal region at +-3 px and +-1.5 frames.
        Peak::new(Ellipsoid::from_radii(center, [1.0, 1.0, 0.5]))
    }

    #[test]
    fn test_frame_interval_scales_with_peak_end() {
        let p = peak_at([50.0, 50.0, 4.5]);
        let (lo, hi) = p.frame_interval().unwrap();
        assert_relative_eq!(lo, 3.0);
        assert_relative_eq!(hi, 6.0);
    }

    #[test]
    fn test_visibility_window() {
        let p = peak_at([50.0, 50.0, 4.5]);
        assert!(!p.visible_on_frame(2));
        assert!(p.visible_on_frame(3));
        assert!(p.visible_on_frame(4));
        assert!(p.visible_on_frame(6));
        assert!(!p.visible_on_frame(7));
    }

    #[test]
    fn test_slice_shrinks_off_center() {
        let p = peak_at([50.0, 50.0, 5.0]);
        let mid = p.slice_at_frame(5).unwrap();
        assert_relative_eq!(mid.semi_axes.0, 3.0, epsilon = 1e-10);
        let edge = p.slice_at_frame(6).unwrap();
        assert!(edge.semi_axes.0 < mid.semi_axes.0);
        assert!(p.slice_at_frame(8).is_none());
    }

    #[test]
    fn test_frame_ellipse_contains() {
        let e = FrameEllipse {
            center: (10.0, 10.0),
            semi_axes: (2.0, 1.0),
        };
        assert!(e.contains(11.9, 10.0));
        assert!(!e.contains(10.0, 11.1));
    }
}
