//! Per-peak integration-region classification.
//!
//! An `IntegrationRegion` classifies detector pixels against the nested
//! scaled shells of one peak: signal up to `peak_end` sigma, a guard
//! buffer up to `bkg_begin`, background up to `bkg_end`, outside beyond.

use crate::error::Result;
use crate::geometry::{Aabb, Ellipsoid};
use crate::peak::Peak;

/// Classification of one pixel against a single peak's regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Inside the signal region.
    Peak,
    /// Between signal and background; used by neither.
    Buffer,
    /// Inside the background annulus.
    Background,
    /// Beyond the background annulus.
    Outside,
}

/// Classifier for one peak's integration regions.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationRegion {
    shape: Ellipsoid,
    peak_end: f64,
    bkg_begin: f64,
    bkg_end: f64,
    bounds: Aabb,
}

impl IntegrationRegion {
    /// Builds the classifier for a peak.
    ///
    /// # Errors
    /// `Error::DegenerateShape` when the bounding box of the outermost
    /// shell cannot be computed; callers demote such peaks instead of
    /// aborting the whole rasterization.
    pub fn new(peak: &Peak) -> Result<Self> {
        let bounds = peak.shape().scaled(peak.bkg_end).aabb()?;
        Ok(Self {
            shape: peak.shape(),
            peak_end: peak.peak_end,
            bkg_begin: peak.bkg_begin,
            bkg_end: peak.bkg_end,
            bounds,
        })
    }

    /// Bounding box of the outermost (background-end) shell.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Classifies a point in (col, row, frame) space.
    #[must_use]
    pub fn classify(&self, col: f64, row: f64, frame: f64) -> RegionKind {
        let rr = self.shape.metric_distance2([col, row, frame]);
        if rr <= self.peak_end * self.peak_end {
            RegionKind::Peak
        } else if rr > self.bkg_end * self.bkg_end {
            RegionKind::Outside
        } else if rr >= self.bkg_begin * self.bkg_begin {
            RegionKind::Background
        } else {
            RegionKind::Buffer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> IntegrationRegion {
        // Unit sphere shape; shells at 3 / 4 / 6 sigma.
        let mut peak = Peak::new(Ellipsoid::from_radii([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]));
        peak.bkg_begin = 4.0;
        IntegrationRegion::new(&peak).unwrap()
    }

    #[test]
    fn test_shell_classification() {
        let r = region();
        assert_eq!(r.classify(0.0, 0.0, 0.0), RegionKind::Peak);
        assert_eq!(r.classify(2.9, 0.0, 0.0), RegionKind::Peak);
        assert_eq!(r.classify(3.5, 0.0, 0.0), RegionKind::Buffer);
        assert_eq!(r.classify(5.0, 0.0, 0.0), RegionKind::Background);
        assert_eq!(r.classify(6.1, 0.0, 0.0), RegionKind::Outside);
    }

    #[test]
    fn test_bounds_cover_outer_shell() {
        let r = region();
        assert!(r.bounds().contains([6.0, 0.0, 0.0]));
        assert!(!r.bounds().contains([6.1, 0.0, 0.0]));
    }

    #[test]
    fn test_degenerate_peak_is_error() {
        let peak = Peak::new(Ellipsoid::new([0.0; 3], [[0.0; 3]; 3]));
        assert!(IntegrationRegion::new(&peak).is_err());
    }
}
