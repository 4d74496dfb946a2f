//! Datasets: frame stacks plus the peaks and masks attached to them.
//!
//! Peaks and masks live in slot arenas owned by the dataset. Collaborators
//! (the viewer's overlays in particular) refer to them through `PeakId` /
//! `MaskId` handles; removing a domain object vacates its slot, so a stale
//! handle resolves to `None` instead of dangling.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::instrument::{Detector, Diffractometer, InstrumentState};
use crate::mask::{Mask, MaskId};
use crate::peak::{Peak, PeakId};

/// Slot arena with stable indices and vacancy on removal.
#[derive(Debug, Clone)]
struct SlotVec<T> {
    slots: Vec<Option<T>>,
}

// Derived `Default` would require `T: Default`, which the stored
// domain types do not implement.
impl<T> Default for SlotVec<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> SlotVec<T> {
    fn insert(&mut self, value: T) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    fn remove(&mut self, idx: usize) -> Option<T> {
        self.slots.get_mut(idx).and_then(Option::take)
    }

    fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (i, v)))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|v| (i, v)))
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// One dataset: an ordered stack of detector frames with attached peaks
/// and masks.
#[derive(Debug, Clone)]
pub struct DataSet {
    name: String,
    frames: Vec<Array2<i64>>,
    diffractometer: Diffractometer,
    opened: bool,
    peaks: SlotVec<Peak>,
    masks: SlotVec<Mask>,
}

impl DataSet {
    /// Creates a dataset from its frames and instrument description.
    ///
    /// # Errors
    /// `EmptyDataSet` if no frames are given; `DetectorShapeMismatch`
    /// if the detector panel and the frames disagree on dimensions;
    /// `FrameShapeMismatch` if the frames disagree among themselves.
    pub fn new(
        name: impl Into<String>,
        frames: Vec<Array2<i64>>,
        diffractometer: Diffractometer,
    ) -> Result<Self> {
        let name = name.into();
        let Some(first) = frames.first() else {
            return Err(Error::EmptyDataSet(name));
        };
        let (rows, cols) = first.dim();
        let det = &diffractometer.detector;
        // Pixel lookups trust detector bounds, so the panel and the
        // frames must agree on dimensions up front.
        if (det.n_rows, det.n_cols) != (rows, cols) {
            return Err(Error::DetectorShapeMismatch {
                det_rows: det.n_rows,
                det_cols: det.n_cols,
                rows,
                cols,
            });
        }
        for (index, frame) in frames.iter().enumerate() {
            let (r, c) = frame.dim();
            if (r, c) != (rows, cols) {
                return Err(Error::FrameShapeMismatch {
                    index,
                    rows: r,
                    cols: c,
                    expected_rows: rows,
                    expected_cols: cols,
                });
            }
        }
        Ok(Self {
            name,
            frames,
            diffractometer,
            opened: false,
            peaks: SlotVec::default(),
            masks: SlotVec::default(),
        })
    }

    /// Dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marks the dataset as opened for reading.
    pub fn open(&mut self) {
        self.opened = true;
    }

    /// Whether the dataset has been opened.
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of pixel rows per frame.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.frames[0].nrows()
    }

    /// Number of pixel columns per frame.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.frames[0].ncols()
    }

    /// Per-pixel counts of one frame.
    ///
    /// # Errors
    /// `FrameOutOfRange` for an invalid index. Callers that want the
    /// UI-tolerance clamping policy clamp before calling.
    pub fn frame(&self, index: usize) -> Result<&Array2<i64>> {
        self.frames.get(index).ok_or(Error::FrameOutOfRange {
            index,
            n_frames: self.frames.len(),
        })
    }

    /// Instrument description.
    #[must_use]
    pub fn diffractometer(&self) -> &Diffractometer {
        &self.diffractometer
    }

    /// Detector geometry.
    #[must_use]
    pub fn detector(&self) -> &Detector {
        &self.diffractometer.detector
    }

    /// Instrument state interpolated at a (fractional) frame coordinate.
    #[must_use]
    pub fn interpolated_state(&self, frame: f64) -> InstrumentState {
        self.diffractometer.interpolated_state(frame)
    }

    /// Adds a peak, returning its handle.
    pub fn add_peak(&mut self, peak: Peak) -> PeakId {
        PeakId(self.peaks.insert(peak))
    }

    /// Removes a peak.
    ///
    /// # Errors
    /// `StalePeak` if the handle no longer resolves.
    pub fn remove_peak(&mut self, id: PeakId) -> Result<Peak> {
        self.peaks.remove(id.0).ok_or(Error::StalePeak(id.0))
    }

    /// Resolves a peak handle.
    #[must_use]
    pub fn peak(&self, id: PeakId) -> Option<&Peak> {
        self.peaks.get(id.0)
    }

    /// Resolves a peak handle mutably.
    pub fn peak_mut(&mut self, id: PeakId) -> Option<&mut Peak> {
        self.peaks.get_mut(id.0)
    }

    /// Iterates over live peaks.
    pub fn peaks(&self) -> impl Iterator<Item = (PeakId, &Peak)> {
        self.peaks.iter().map(|(i, p)| (PeakId(i), p))
    }

    /// Number of live peaks.
    #[must_use]
    pub fn n_peaks(&self) -> usize {
        self.peaks.len()
    }

    /// Adds a mask, returning its handle.
    pub fn add_mask(&mut self, mask: Mask) -> MaskId {
        MaskId(self.masks.insert(mask))
    }

    /// Removes a mask.
    ///
    /// # Errors
    /// `StaleMask` if the handle no longer resolves.
    pub fn remove_mask(&mut self, id: MaskId) -> Result<Mask> {
        self.masks.remove(id.0).ok_or(Error::StaleMask(id.0))
    }

    /// Resolves a mask handle.
    #[must_use]
    pub fn mask(&self, id: MaskId) -> Option<&Mask> {
        self.masks.get(id.0)
    }

    /// Resolves a mask handle mutably.
    pub fn mask_mut(&mut self, id: MaskId) -> Option<&mut Mask> {
        self.masks.get_mut(id.0)
    }

    /// Iterates over live masks.
    pub fn masks(&self) -> impl Iterator<Item = (MaskId, &Mask)> {
        self.masks.iter().map(|(i, m)| (MaskId(i), m))
    }

    /// Number of live masks.
    #[must_use]
    pub fn n_masks(&self) -> usize {
        self.masks.len()
    }

    /// Re-evaluates the masked flag of every peak against the current
    /// mask set. A peak is masked when the bounding box of its signal
    /// region intersects a mask's bounds; degenerate shapes fall back to
    /// a center-containment test.
    pub fn mask_peaks(&mut self) {
        let masks: Vec<Mask> = self.masks.iter().map(|(_, m)| *m).collect();
        for (_, peak) in self.peaks.iter_mut() {
            let signal_bb = peak.shape().scaled(peak.peak_end).aabb();
            peak.masked = masks.iter().any(|mask| match &signal_bb {
                Ok(bb) => mask.bounds.intersects(bb),
                Err(_) => mask.contains(peak.center()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, Ellipsoid};
    use crate::mask::MaskShape;

    fn diffractometer(rows: usize, cols: usize) -> Diffractometer {
        #[allow(clippy::cast_precision_loss)]
        Diffractometer {
            detector: Detector {
                n_rows: rows,
                n_cols: cols,
                pixel_width: 1.0,
                pixel_height: 1.0,
                distance: 500.0,
                beam_center_col: cols as f64 / 2.0,
                beam_center_row: rows as f64 / 2.0,
            },
            wavelength: 1.0,
            omega_start: 0.0,
            omega_step: 0.1,
        }
    }

    fn dataset(n_frames: usize) -> DataSet {
        let frames = (0..n_frames).map(|_| Array2::zeros((64, 64))).collect();
        DataSet::new("test", frames, diffractometer(64, 64)).unwrap()
    }

    #[test]
    fn test_new_dataset_has_empty_arenas() {
        let data = dataset(3);
        assert_eq!(data.n_peaks(), 0);
        assert_eq!(data.n_masks(), 0);
        assert!(data.peaks().next().is_none());
        assert!(data.masks().next().is_none());
    }

    #[test]
    fn test_empty_dataset_is_error() {
        assert!(DataSet::new("empty", Vec::new(), diffractometer(64, 64)).is_err());
    }

    #[test]
    fn test_mismatched_frames_are_error() {
        let frames = vec![Array2::zeros((64, 64)), Array2::zeros((32, 64))];
        assert!(DataSet::new("bad", frames, diffractometer(64, 64)).is_err());
    }

    #[test]
    fn test_detector_frame_shape_mismatch_is_error() {
        // A 100x100 panel over 64x64 frames would let bounds checks
        // pass pixels that the frame arrays cannot index.
        let frames = vec![Array2::zeros((64, 64))];
        let result = DataSet::new("bad", frames, diffractometer(100, 100));
        assert!(matches!(
            result,
            Err(Error::DetectorShapeMismatch {
                det_rows: 100,
                det_cols: 100,
                rows: 64,
                cols: 64,
            })
        ));
    }

    #[test]
    fn test_frame_out_of_range() {
        let data = dataset(3);
        assert!(data.frame(2).is_ok());
        assert!(data.frame(3).is_err());
    }

    #[test]
    fn test_peak_handles_do_not_dangle() {
        let mut data = dataset(3);
        let shape = Ellipsoid::from_radii([32.0, 32.0, 1.0], [1.0, 1.0, 0.5]);
        let id = data.add_peak(Peak::new(shape));
        assert!(data.peak(id).is_some());
        data.remove_peak(id).unwrap();
        assert!(data.peak(id).is_none());
        assert!(data.remove_peak(id).is_err());
    }

    #[test]
    fn test_slot_reuse_after_removal() {
        let mut data = dataset(3);
        let shape = Ellipsoid::from_radii([32.0, 32.0, 1.0], [1.0, 1.0, 0.5]);
        let a = data.add_peak(Peak::new(shape));
        data.remove_peak(a).unwrap();
        let b = data.add_peak(Peak::new(shape));
        assert_eq!(a.index(), b.index());
        assert_eq!(data.n_peaks(), 1);
    }

    #[test]
    fn test_mask_peaks_flags_covered_peak() {
        let mut data = dataset(10);
        let inside = data.add_peak(Peak::new(Ellipsoid::from_radii(
            [20.0, 20.0, 5.0],
            [1.0, 1.0, 0.5],
        )));
        let outside = data.add_peak(Peak::new(Ellipsoid::from_radii(
            [50.0, 50.0, 5.0],
            [1.0, 1.0, 0.5],
        )));
        let mask = Mask::new(
            MaskShape::Box,
            Aabb::from_corners([10.0, 10.0, 0.0], [30.0, 30.0, 9.0]),
        );
        data.add_mask(mask);
        data.mask_peaks();
        assert!(data.peak(inside).unwrap().masked);
        assert!(!data.peak(outside).unwrap().masked);

        // Removing the mask clears the flag on re-evaluation.
        let id = data.masks().next().unwrap().0;
        data.remove_mask(id).unwrap();
        data.mask_peaks();
        assert!(!data.peak(inside).unwrap().masked);
    }
}
