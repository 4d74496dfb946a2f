//! Overlay items drawn on top of the detector image.
//!
//! Overlays are a closed set of tagged variants (peak, mask, cutter,
//! zoom rectangle) dispatched by pattern matching. Peak and mask
//! overlays are graphical proxies bound to dataset-owned domain objects
//! through `PeakId` / `MaskId` handles; destroying an overlay never
//! destroys the domain object.
//!
//! Capabilities per variant:
//! - peak: selectable, hoverable, plottable, deletable
//! - mask: selectable, movable, deletable
//! - cutter: selectable, movable, plottable, wheel-adjustable
//! - zoom rect: none (transient drag feedback only)

use ndarray::Array2;
use sxview_core::mask::MaskShape;
use sxview_core::{Aabb, FrameEllipse, Mask, MaskId, PeakId};

use crate::scene::zoom::Rect;

/// Minimum pick radius in pixels so small items stay clickable.
const PICK_RADIUS: f64 = 3.0;

/// Graphical proxy for one peak on the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakOverlay {
    /// Handle of the underlying peak.
    pub peak: PeakId,
    /// Cross-section of the signal region at the displayed frame.
    pub ellipse: FrameEllipse,
    /// Whether the overlay is selected in the view. Distinct from the
    /// domain peak's enabled flag.
    pub selected: bool,
    /// Mirror of the domain peak's masked flag.
    pub masked: bool,
}

impl PeakOverlay {
    /// Hit test against the frame-slice ellipse, padded to a minimum
    /// pick radius.
    #[must_use]
    pub fn hit(&self, col: f64, row: f64) -> bool {
        let padded = FrameEllipse {
            center: self.ellipse.center,
            semi_axes: (
                self.ellipse.semi_axes.0.max(PICK_RADIUS),
                self.ellipse.semi_axes.1.max(PICK_RADIUS),
            ),
        };
        padded.contains(col, row)
    }
}

/// Graphical proxy for one mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskOverlay {
    /// Handle of the underlying mask.
    pub mask: MaskId,
    /// Shape of the masked area.
    pub shape: MaskShape,
    /// Detector-plane footprint.
    pub rect: Rect,
    /// Whether the overlay is selected.
    pub selected: bool,
}

impl MaskOverlay {
    /// Builds the proxy for a domain mask.
    #[must_use]
    pub fn from_mask(id: MaskId, mask: &Mask) -> Self {
        let lo = mask.bounds.lower();
        let hi = mask.bounds.upper();
        Self {
            mask: id,
            shape: mask.shape,
            rect: Rect::from_corners((lo[0], lo[1]), (hi[0], hi[1])),
            selected: false,
        }
    }

    /// Hit test against the detector-plane footprint.
    #[must_use]
    pub fn hit(&self, col: f64, row: f64) -> bool {
        match self.shape {
            MaskShape::Box => self.rect.contains(col, row),
            MaskShape::Ellipse => {
                let rx = 0.5 * self.rect.width();
                let ry = 0.5 * self.rect.height();
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let cx = 0.5 * (self.rect.left + self.rect.right);
                let cy = 0.5 * (self.rect.top + self.rect.bottom);
                let dx = (col - cx) / rx;
                let dy = (row - cy) / ry;
                dx * dx + dy * dy <= 1.0
            }
        }
    }
}

/// A mask being drawn; not yet committed to the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskDraft {
    /// Shape the committed mask will have.
    pub shape: MaskShape,
    /// Anchor corner (the press point).
    pub from: (f64, f64),
    /// Far corner (follows the pointer).
    pub to: (f64, f64),
}

impl MaskDraft {
    /// Converts the draft into a domain mask spanning the whole frame
    /// interval of the dataset.
    #[must_use]
    pub fn to_mask(&self, n_frames: usize) -> Mask {
        #[allow(clippy::cast_precision_loss)]
        let last = n_frames.saturating_sub(1) as f64;
        Mask::new(
            self.shape,
            Aabb::from_corners(
                [self.from.0, self.from.1, 0.0],
                [self.to.0, self.to.1, last],
            ),
        )
    }

    /// Detector-plane footprint of the draft.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.from, self.to)
    }
}

/// Kind of 1-D cut through the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutterKind {
    /// Free line between two points; intensities sampled along it.
    Line,
    /// Horizontal band; rows summed per column.
    HorizontalSlice,
    /// Vertical band; columns summed per row.
    VerticalSlice,
}

/// Transient cut region used to request a 1-D projection plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Cutter {
    /// Cut geometry kind.
    pub kind: CutterKind,
    /// Anchor point (the press point).
    pub from: (f64, f64),
    /// Far point (follows the pointer).
    pub to: (f64, f64),
    /// Band thickness in pixels for slice cuts; wheel-adjustable.
    pub thickness: usize,
    /// Whether the cutter is selected.
    pub selected: bool,
}

impl Cutter {
    /// Creates a cutter anchored at the press point.
    #[must_use]
    pub fn new(kind: CutterKind, at: (f64, f64)) -> Self {
        Self {
            kind,
            from: at,
            to: at,
            thickness: 1,
            selected: false,
        }
    }

    /// Adjusts the band thickness by wheel steps; never below 1 pixel.
    pub fn adjust_thickness(&mut self, steps: i32) {
        let current = i64::try_from(self.thickness).unwrap_or(i64::MAX);
        let next = current + i64::from(steps);
        self.thickness = usize::try_from(next.max(1)).unwrap_or(1);
    }

    /// Band footprint of the cut on the detector plane.
    #[must_use]
    pub fn rect(&self) -> Rect {
        #[allow(clippy::cast_precision_loss)]
        let half = self.thickness as f64 / 2.0;
        let base = Rect::from_corners(self.from, self.to);
        match self.kind {
            CutterKind::Line => base,
            CutterKind::HorizontalSlice => Rect {
                left: base.left,
                right: base.right,
                top: base.top.min(base.bottom) - half,
                bottom: base.top.max(base.bottom) + half,
            },
            CutterKind::VerticalSlice => Rect {
                left: base.left.min(base.right) - half,
                right: base.left.max(base.right) + half,
                top: base.top,
                bottom: base.bottom,
            },
        }
    }

    /// Hit test against the band footprint, padded for thin cuts.
    #[must_use]
    pub fn hit(&self, col: f64, row: f64) -> bool {
        let r = self.rect();
        let padded = Rect {
            left: r.left - PICK_RADIUS,
            top: r.top - PICK_RADIUS,
            right: r.right + PICK_RADIUS,
            bottom: r.bottom + PICK_RADIUS,
        };
        padded.contains(col, row)
    }

    /// Projects the current frame through the cut into a 1-D profile.
    ///
    /// Horizontal slices sum rows per column, vertical slices sum
    /// columns per row, line cuts sample nearest-pixel intensities at
    /// unit steps along the segment.
    #[must_use]
    pub fn profile(&self, frame: &Array2<i64>) -> Vec<f64> {
        let (n_rows, n_cols) = frame.dim();
        let r = self.rect();
        match self.kind {
            CutterKind::HorizontalSlice => {
                let cols = clamp_range(r.left, r.right, n_cols);
                let rows = clamp_range(r.top, r.bottom, n_rows);
                cols.map(|c| rows.clone().map(|w| frame[(w, c)]).sum::<i64>())
                    .map(to_f64)
                    .collect()
            }
            CutterKind::VerticalSlice => {
                let cols = clamp_range(r.left, r.right, n_cols);
                let rows = clamp_range(r.top, r.bottom, n_rows);
                rows.map(|w| cols.clone().map(|c| frame[(w, c)]).sum::<i64>())
                    .map(to_f64)
                    .collect()
            }
            CutterKind::Line => {
                let dx = self.to.0 - self.from.0;
                let dy = self.to.1 - self.from.1;
                let length = dx.hypot(dy);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let steps = length.ceil().max(1.0) as usize;
                #[allow(clippy::cast_precision_loss)]
                (0..=steps)
                    .filter_map(|i| {
                        let t = i as f64 / steps as f64;
                        let col = self.from.0 + t * dx;
                        let row = self.from.1 + t * dy;
                        sample_nearest(frame, col, row)
                    })
                    .collect()
            }
        }
    }
}

fn to_f64(v: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let f = v as f64;
    f
}

/// Integer index range `[lo, hi]` clamped to `0..n`.
fn clamp_range(lo: f64, hi: f64, n: usize) -> std::ops::Range<usize> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let start = lo.floor().max(0.0) as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let end = (hi.ceil().max(0.0) as usize + 1).min(n);
    start.min(n)..end
}

fn sample_nearest(frame: &Array2<i64>, col: f64, row: f64) -> Option<f64> {
    let (n_rows, n_cols) = frame.dim();
    if col < -0.5 || row < -0.5 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let c = col.round().max(0.0) as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r = row.round().max(0.0) as usize;
    if c >= n_cols || r >= n_rows {
        return None;
    }
    Some(to_f64(frame[(r, c)]))
}

/// Reference to the overlay item under the cursor or being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRef {
    /// Index into the scene's peak overlay list.
    Peak(usize),
    /// Index into the scene's mask overlay list.
    Mask(usize),
    /// The single tracked cutter.
    Cutter,
    /// The mask draft being drawn.
    MaskDraft,
}
