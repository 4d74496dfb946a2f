//! Detector masks: regions excluded from integration.

use crate::geometry::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle into a dataset's mask arena. Stale handles resolve to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaskId(pub(crate) usize);

impl MaskId {
    /// Raw slot index, for diagnostics.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Mask shape within its bounding region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaskShape {
    /// The full bounding box is masked.
    Box,
    /// The ellipse inscribed in the bounding box is masked.
    Ellipse,
}

/// A detector mask over an axis-aligned region in (col, row, frame) space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mask {
    /// Shape of the masked area inside `bounds`.
    pub shape: MaskShape,
    /// Bounding region.
    pub bounds: Aabb,
}

impl Mask {
    /// Creates a mask of the given shape over a bounding region.
    #[must_use]
    pub fn new(shape: MaskShape, bounds: Aabb) -> Self {
        Self { shape, bounds }
    }

    /// Whether a point is masked.
    ///
    /// An ellipse mask tests the inscribed ellipse in the detector plane
    /// and the full frame interval along the frame axis.
    #[must_use]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        match self.shape {
            MaskShape::Box => self.bounds.contains(p),
            MaskShape::Ellipse => {
                if !self.bounds.contains_frame(p[2]) {
                    return false;
                }
                let c = self.bounds.center();
                let rx = 0.5 * (self.bounds.upper()[0] - self.bounds.lower()[0]);
                let ry = 0.5 * (self.bounds.upper()[1] - self.bounds.lower()[1]);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let dx = (p[0] - c[0]) / rx;
                let dy = (p[1] - c[1]) / ry;
                dx * dx + dy * dy <= 1.0
            }
        }
    }

    /// Whether the mask's frame interval overlaps the given frame index.
    #[must_use]
    pub fn overlaps_frame(&self, frame: usize) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let f = frame as f64;
        self.bounds.contains_frame(f)
    }
}
