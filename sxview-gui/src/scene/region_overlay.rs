//! Integration-region raster: per-pixel peak/background classification.
//!
//! The raster classifies every pixel of the current frame against the
//! integration regions of all selected peaks, in two passes. Pass one
//! stamps an exclusion mask wherever the background (or guard-buffer)
//! shells of two peaks collide; pass two colors pixels, giving a peak's
//! own signal region strict priority over background coloring and
//! demoting collided background pixels to `Excluded`. The result is
//! cached until the frame, the peak set, or the enable toggle changes.

use log::warn;
use ndarray::Array2;
use sxview_core::{DataSet, IntegrationRegion, PeakId, RegionKind};

/// Display classification of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelClass {
    /// Not covered by any integration region (transparent).
    #[default]
    None,
    /// Signal region of some peak.
    Peak,
    /// Usable background of some peak.
    Background,
    /// Background removed because another peak's region claims it.
    Excluded,
}

/// Cached integration-region raster with its enable toggle.
#[derive(Debug, Default)]
pub struct RegionOverlay {
    enabled: bool,
    cache: Option<Array2<PixelClass>>,
}

impl RegionOverlay {
    /// Whether the overlay is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the overlay; disabling drops the cache.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.cache = None;
        }
    }

    /// Drops the cached raster (frame or peak set changed).
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Returns the raster for the given frame, recomputing it if the
    /// cache is empty. Returns `None` while disabled.
    ///
    /// Peaks whose region construction fails are demoted to unselected
    /// rather than aborting the rasterization, which is why the dataset
    /// is taken mutably.
    pub fn raster(&mut self, data: &mut DataSet, frame: usize) -> Option<&Array2<PixelClass>> {
        if !self.enabled {
            return None;
        }
        if self.cache.is_none() {
            self.cache = Some(compute_raster(data, frame));
        }
        self.cache.as_ref()
    }
}

/// Builds region classifiers for every selected, unmasked peak active on
/// the frame; demotes peaks with degenerate geometry.
fn active_regions(data: &mut DataSet, frame: f64) -> Vec<IntegrationRegion> {
    let mut regions = Vec::new();
    let mut demoted: Vec<PeakId> = Vec::new();
    for (id, peak) in data.peaks() {
        if !peak.selected || peak.masked {
            continue;
        }
        match IntegrationRegion::new(peak) {
            Ok(region) => {
                if region.bounds().contains_frame(frame) {
                    regions.push(region);
                }
            }
            Err(err) => {
                warn!("demoting peak {}: {err}", id.index());
                demoted.push(id);
            }
        }
    }
    for id in demoted {
        if let Some(peak) = data.peak_mut(id) {
            peak.selected = false;
        }
    }
    regions
}

fn compute_raster(data: &mut DataSet, frame: usize) -> Array2<PixelClass> {
    let n_rows = data.n_rows();
    let n_cols = data.n_cols();
    #[allow(clippy::cast_precision_loss)]
    let z = frame as f64;

    let regions = active_regions(data, z);

    // Pass one: count background/buffer claims per pixel; two or more
    // distinct regions claiming the same pixel exclude it as background.
    let mut claims: Array2<u8> = Array2::zeros((n_rows, n_cols));
    for region in &regions {
        for_each_covered_pixel(region, z, n_rows, n_cols, |r, c, kind| {
            if matches!(kind, RegionKind::Background | RegionKind::Buffer) {
                claims[(r, c)] = claims[(r, c)].saturating_add(1);
            }
        });
    }

    // Pass two: color pixels. Signal regions always win; background
    // never overwrites a signal pixel and collided background shows as
    // excluded.
    let mut classes: Array2<PixelClass> = Array2::default((n_rows, n_cols));
    for region in &regions {
        for_each_covered_pixel(region, z, n_rows, n_cols, |r, c, kind| match kind {
            RegionKind::Peak => classes[(r, c)] = PixelClass::Peak,
            RegionKind::Background => {
                if classes[(r, c)] != PixelClass::Peak {
                    classes[(r, c)] = if claims[(r, c)] >= 2 {
                        PixelClass::Excluded
                    } else {
                        PixelClass::Background
                    };
                }
            }
            RegionKind::Buffer | RegionKind::Outside => {}
        });
    }
    classes
}

/// Visits every pixel of the frame covered by the region's bounding box.
fn for_each_covered_pixel<F>(
    region: &IntegrationRegion,
    z: f64,
    n_rows: usize,
    n_cols: usize,
    mut visit: F,
) where
    F: FnMut(usize, usize, RegionKind),
{
    let lower = region.bounds().lower();
    let upper = region.bounds().upper();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let c_min = lower[0].floor().max(0.0) as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r_min = lower[1].floor().max(0.0) as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let c_max = ((upper[0].ceil().max(0.0) as usize) + 1).min(n_cols);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let r_max = ((upper[1].ceil().max(0.0) as usize) + 1).min(n_rows);

    #[allow(clippy::cast_precision_loss)]
    for r in r_min..r_max {
        for c in c_min..c_max {
            visit(r, c, region.classify(c as f64, r as f64, z));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sxview_core::{Detector, Diffractometer, Ellipsoid, Peak};

    fn dataset_with_peaks(centers: &[[f64; 3]]) -> DataSet {
        let diff = Diffractometer {
            detector: Detector {
                n_rows: 64,
                n_cols: 64,
                pixel_width: 1.0,
                pixel_height: 1.0,
                distance: 500.0,
                beam_center_col: 32.0,
                beam_center_row: 32.0,
            },
            wavelength: 1.0,
            omega_start: 0.0,
            omega_step: 0.1,
        };
        let frames = (0..10).map(|_| Array2::zeros((64, 64))).collect();
        let mut data = DataSet::new("raster", frames, diff).unwrap();
        for &center in centers {
            // Unit-sigma shape: signal to 3 px, background 3..6 px.
            data.add_peak(Peak::new(Ellipsoid::from_radii(center, [1.0, 1.0, 1.0])));
        }
        data
    }

    #[test]
    fn test_single_peak_classification() {
        let mut data = dataset_with_peaks(&[[32.0, 32.0, 5.0]]);
        let mut overlay = RegionOverlay::default();
        overlay.set_enabled(true);
        let raster = overlay.raster(&mut data, 5).unwrap();
        assert_eq!(raster[(32, 32)], PixelClass::Peak);
        assert_eq!(raster[(32, 37)], PixelClass::Background);
        assert_eq!(raster[(32, 45)], PixelClass::None);
    }

    #[test]
    fn test_background_collision_is_excluded() {
        // Two peaks 8 px apart: background shells (3..6 sigma) overlap
        // between them, signal regions do not.
        let mut data = dataset_with_peaks(&[[24.0, 32.0, 5.0], [32.0, 32.0, 5.0]]);
        let mut overlay = RegionOverlay::default();
        overlay.set_enabled(true);
        let raster = overlay.raster(&mut data, 5).unwrap();
        assert_eq!(raster[(32, 28)], PixelClass::Excluded);
        assert_eq!(raster[(32, 24)], PixelClass::Peak);
        assert_eq!(raster[(32, 32)], PixelClass::Peak);
    }

    #[test]
    fn test_peak_region_beats_background() {
        // Peaks 5 px apart: each signal region reaches into the other's
        // background shell; signal coloring must win.
        let mut data = dataset_with_peaks(&[[27.0, 32.0, 5.0], [32.0, 32.0, 5.0]]);
        let mut overlay = RegionOverlay::default();
        overlay.set_enabled(true);
        let raster = overlay.raster(&mut data, 5).unwrap();
        assert_eq!(raster[(32, 27)], PixelClass::Peak);
        assert_eq!(raster[(32, 32)], PixelClass::Peak);
    }

    #[test]
    fn test_degenerate_peak_demoted_not_fatal() {
        let mut data = dataset_with_peaks(&[[32.0, 32.0, 5.0]]);
        let bad = data.add_peak(Peak::new(Ellipsoid::new([10.0, 10.0, 5.0], [[0.0; 3]; 3])));
        let mut overlay = RegionOverlay::default();
        overlay.set_enabled(true);
        let raster = overlay.raster(&mut data, 5).unwrap();
        assert_eq!(raster[(32, 32)], PixelClass::Peak);
        assert!(!data.peak(bad).unwrap().selected);
    }

    #[test]
    fn test_disabled_returns_none() {
        let mut data = dataset_with_peaks(&[[32.0, 32.0, 5.0]]);
        let mut overlay = RegionOverlay::default();
        assert!(overlay.raster(&mut data, 5).is_none());
    }

    #[test]
    fn test_off_frame_peak_not_rastered() {
        let mut data = dataset_with_peaks(&[[32.0, 32.0, 1.0]]);
        let mut overlay = RegionOverlay::default();
        overlay.set_enabled(true);
        let raster = overlay.raster(&mut data, 9).unwrap();
        assert_eq!(raster[(32, 32)], PixelClass::None);
    }
}
