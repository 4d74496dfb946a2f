//! Detector frame viewer/annotator core.
//!
//! `DetectorScene` owns the currently displayed frame of a dataset, a
//! navigable zoom history, and the overlay items (peaks, masks, cut
//! regions) drawn over the image. All pointer/keyboard interaction is
//! mediated by a small mode state machine; changes are reported through
//! a queued event stream drained once per UI tick.
//!
//! The scene is single-threaded and GUI-independent: the egui layer
//! translates raw input into the `on_*` calls below and renders from the
//! scene's accessors.

pub mod event;
pub mod overlay;
pub mod region_overlay;
pub mod tooltip;
pub mod zoom;

use std::collections::VecDeque;

use log::{debug, warn};
use ndarray::Array2;
use sxview_core::mask::MaskShape;
use sxview_core::{Aabb, DataSet, PeakId};

use event::{PlotSource, SceneEvent};
use overlay::{Cutter, CutterKind, MaskDraft, MaskOverlay, OverlayRef, PeakOverlay};
use region_overlay::{PixelClass, RegionOverlay};
use tooltip::CursorMode;
use zoom::{Rect, ZoomStack};

/// Mutually exclusive interaction modes.
///
/// A mode change takes effect on the next press; it never interrupts an
/// in-progress gesture mid-drag (gestures are abandoned wholesale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Drag a rectangle to zoom into it.
    #[default]
    Zoom,
    /// Click overlays to select/deselect them.
    Select,
    /// Drag a free line cut.
    Line,
    /// Drag a horizontal slice cut.
    HorizontalSlice,
    /// Drag a vertical slice cut.
    VerticalSlice,
    /// Drag a box-shaped detector mask.
    BoxMask,
    /// Drag an ellipse-shaped detector mask.
    EllipseMask,
    /// Reserved for interactive indexing; currently a no-op.
    Indexing,
}

/// Pointer buttons the scene distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Draws/drags/selects.
    Primary,
    /// Zooms out one level.
    Secondary,
}

/// Master scene holding the detector image state and its overlays.
#[derive(Debug, Default)]
pub struct DetectorScene {
    data: Option<DataSet>,
    frame_index: usize,
    max_intensity: i64,
    logarithmic: bool,
    mode: InteractionMode,
    cursor_mode: CursorMode,
    zoom: ZoomStack,
    zoom_draft: Option<((f64, f64), (f64, f64))>,
    peak_overlays: Vec<PeakOverlay>,
    mask_overlays: Vec<MaskOverlay>,
    mask_draft: Option<MaskDraft>,
    cutter: Option<Cutter>,
    active: Option<OverlayRef>,
    drag_last: Option<(f64, f64)>,
    hovered_peak: Option<PeakId>,
    hovered_cutter: bool,
    region_overlay: RegionOverlay,
    events: VecDeque<SceneEvent>,
}

impl DetectorScene {
    /// Default display ceiling for per-pixel counts.
    pub const DEFAULT_MAX_INTENSITY: i64 = 10;

    /// Creates an empty scene with no dataset bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_intensity: Self::DEFAULT_MAX_INTENSITY,
            ..Self::default()
        }
    }

    // ---- dataset binding -------------------------------------------------

    /// Binds a dataset and shows the given frame (clamped to range).
    ///
    /// Resets the zoom history to the new full-frame extent, rebuilds
    /// overlays (restoring mask overlays from the dataset's persisted
    /// masks), and abandons any in-progress gesture.
    pub fn set_data(&mut self, mut data: DataSet, frame: usize) {
        data.open();
        #[allow(clippy::cast_precision_loss)]
        let full = Rect::from_corners((0.0, 0.0), (data.n_cols() as f64, data.n_rows() as f64));
        self.zoom.reset(full);
        self.abandon_gestures();
        self.frame_index = frame.min(data.n_frames() - 1);
        self.data = Some(data);
        self.rebuild_overlays();
        self.region_overlay.invalidate();
        self.events.push_back(SceneEvent::FrameChanged(self.frame_index));
        self.events.push_back(SceneEvent::DataChanged);
    }

    /// Unbinds the dataset and clears every overlay and the zoom history.
    pub fn reset_scene(&mut self) {
        self.data = None;
        self.frame_index = 0;
        self.zoom = ZoomStack::default();
        self.peak_overlays.clear();
        self.mask_overlays.clear();
        self.abandon_gestures();
        self.region_overlay.invalidate();
        self.events.clear();
    }

    /// The bound dataset, if any.
    #[must_use]
    pub fn data(&self) -> Option<&DataSet> {
        self.data.as_ref()
    }

    /// Mutable access to the bound dataset for external collaborators
    /// (e.g. after a peak search). Call [`Self::peaks_changed`] afterwards
    /// so overlays re-synchronize.
    pub fn data_mut(&mut self) -> Option<&mut DataSet> {
        self.data.as_mut()
    }

    // ---- frame navigation ------------------------------------------------

    /// Currently displayed frame index.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Switches the displayed frame, rebuilding all frame-dependent
    /// overlays. Out-of-range indices are clamped; re-selecting the
    /// current frame is a no-op. Silently ignored with no dataset.
    pub fn change_frame(&mut self, index: usize) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        if !data.is_opened() {
            data.open();
        }
        let clamped = index.min(data.n_frames() - 1);
        if clamped == self.frame_index {
            return;
        }
        self.frame_index = clamped;
        self.rebuild_overlays();
        self.region_overlay.invalidate();
        self.events.push_back(SceneEvent::FrameChanged(clamped));
        self.events.push_back(SceneEvent::DataChanged);
    }

    /// Re-synchronizes peak overlays after an external peak-set change,
    /// without changing the displayed frame.
    pub fn peaks_changed(&mut self) {
        if self.data.is_none() {
            return;
        }
        self.rebuild_peak_overlays();
        self.region_overlay.invalidate();
        self.events.push_back(SceneEvent::DataChanged);
    }

    // ---- configuration surface -------------------------------------------

    /// Display ceiling for per-pixel counts.
    #[must_use]
    pub fn max_intensity(&self) -> i64 {
        self.max_intensity
    }

    /// Sets the intensity ceiling; setting the current value is a no-op.
    pub fn set_max_intensity(&mut self, intensity: i64) {
        if self.max_intensity == intensity {
            return;
        }
        self.max_intensity = intensity;
        if self.data.is_some() {
            self.events.push_back(SceneEvent::DataChanged);
        }
    }

    /// Whether the image uses a logarithmic intensity scale.
    #[must_use]
    pub fn logarithmic(&self) -> bool {
        self.logarithmic
    }

    /// Toggles logarithmic display.
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        if self.logarithmic == logarithmic {
            return;
        }
        self.logarithmic = logarithmic;
        if self.data.is_some() {
            self.events.push_back(SceneEvent::DataChanged);
        }
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches the interaction mode, abandoning in-progress gestures.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.abandon_gestures();
    }

    /// Current cursor/measurement mode.
    #[must_use]
    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    /// Switches the cursor mode.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        if mode == CursorMode::MillerIndices && self.cursor_mode != mode {
            warn!("Miller-index cursor mode is not supported");
        }
        self.cursor_mode = mode;
    }

    /// Whether the integration-region overlay is enabled.
    #[must_use]
    pub fn integration_enabled(&self) -> bool {
        self.region_overlay.is_enabled()
    }

    /// Toggles the integration-region overlay.
    pub fn set_integration_enabled(&mut self, enabled: bool) {
        if self.integration_enabled() == enabled {
            return;
        }
        self.region_overlay.set_enabled(enabled);
        if self.data.is_some() {
            self.events.push_back(SceneEvent::DataChanged);
        }
    }

    // ---- accessors for rendering -----------------------------------------

    /// Per-pixel counts of the displayed frame.
    #[must_use]
    pub fn frame_counts(&self) -> Option<&Array2<i64>> {
        let data = self.data.as_ref()?;
        data.frame(self.frame_index).ok()
    }

    /// Currently visible sub-rectangle of the frame.
    #[must_use]
    pub fn visible_rect(&self) -> Option<&Rect> {
        self.zoom.current()
    }

    /// Integration-region raster for the displayed frame, recomputed on
    /// demand. `None` while disabled or with no dataset.
    pub fn integration_raster(&mut self) -> Option<&Array2<PixelClass>> {
        let data = self.data.as_mut()?;
        self.region_overlay.raster(data, self.frame_index)
    }

    /// Peak overlays visible on the displayed frame.
    #[must_use]
    pub fn peak_overlays(&self) -> &[PeakOverlay] {
        &self.peak_overlays
    }

    /// Mask overlays whose frame interval overlaps the displayed frame.
    #[must_use]
    pub fn mask_overlays(&self) -> &[MaskOverlay] {
        &self.mask_overlays
    }

    /// The mask currently being drawn, if any.
    #[must_use]
    pub fn mask_draft(&self) -> Option<&MaskDraft> {
        self.mask_draft.as_ref()
    }

    /// The tracked cut region, if any.
    #[must_use]
    pub fn cutter(&self) -> Option<&Cutter> {
        self.cutter.as_ref()
    }

    /// The zoom rectangle of an in-progress zoom drag.
    #[must_use]
    pub fn zoom_draft_rect(&self) -> Option<Rect> {
        self.zoom_draft.map(|(a, b)| Rect::from_corners(a, b))
    }

    /// Tooltip text for the cursor position, per the cursor mode.
    #[must_use]
    pub fn tooltip(&self, col: f64, row: f64) -> Option<String> {
        let data = self.data.as_ref()?;
        let counts = data.frame(self.frame_index).ok()?;
        tooltip::tooltip_text(data, counts, self.frame_index, col, row, self.cursor_mode)
    }

    /// Drains the queued scene events in emission order.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain(..).collect()
    }

    // ---- pointer/keyboard interaction ------------------------------------

    /// Handles a pointer press at frame coordinates (col, row).
    pub fn on_press(&mut self, pos: (f64, f64), button: MouseButton) {
        if self.data.is_none() {
            return;
        }
        if button == MouseButton::Secondary {
            if self.zoom.pop() {
                self.events.push_back(SceneEvent::DataChanged);
            }
            return;
        }

        // A selected item under the cursor becomes the active item and
        // swallows the press, so it can be dragged without re-selection.
        if let Some(hit) = self.hit_test(pos) {
            if self.is_selected(hit) {
                self.active = Some(hit);
                self.drag_last = Some(pos);
                return;
            }
        }

        // Starting a new gesture discards a leftover cut region.
        if self
            .cutter
            .as_ref()
            .is_some_and(|c| !c.selected || self.mode != InteractionMode::Select)
        {
            self.cutter = None;
        }

        match self.mode {
            InteractionMode::Zoom => {
                self.zoom_draft = Some((pos, pos));
            }
            InteractionMode::Select => {}
            InteractionMode::Line => self.start_cutter(CutterKind::Line, pos),
            InteractionMode::HorizontalSlice => {
                self.start_cutter(CutterKind::HorizontalSlice, pos);
            }
            InteractionMode::VerticalSlice => self.start_cutter(CutterKind::VerticalSlice, pos),
            InteractionMode::BoxMask => self.start_mask_draft(MaskShape::Box, pos),
            InteractionMode::EllipseMask => self.start_mask_draft(MaskShape::Ellipse, pos),
            InteractionMode::Indexing => {
                debug!("indexing interaction mode is reserved; press ignored");
            }
        }
    }

    /// Handles a pointer move; `primary_down` reports the held button.
    pub fn on_move(&mut self, pos: (f64, f64), primary_down: bool) {
        if self.data.is_none() {
            return;
        }
        if primary_down {
            if let Some((_, far)) = self.zoom_draft.as_mut() {
                *far = pos;
                return;
            }
            match self.active {
                Some(OverlayRef::Cutter) => {
                    if let Some(cutter) = self.cutter.as_mut() {
                        cutter.to = pos;
                    }
                    self.emit_cutter_plot();
                }
                Some(OverlayRef::MaskDraft) => {
                    if let Some(draft) = self.mask_draft.as_mut() {
                        draft.to = pos;
                    }
                }
                Some(OverlayRef::Mask(idx)) => self.drag_mask(idx, pos),
                Some(OverlayRef::Peak(_)) | None => {}
            }
            self.drag_last = Some(pos);
        } else {
            // Hover: offer the plottable overlay under the cursor for
            // live plotting without selecting it. Each overlay emits
            // once on entry, not per move event.
            match self.hit_test(pos) {
                Some(OverlayRef::Peak(idx)) => {
                    self.hovered_cutter = false;
                    let hovered = self.peak_overlays.get(idx).map(|p| p.peak);
                    if hovered != self.hovered_peak {
                        self.hovered_peak = hovered;
                        if let Some(id) = hovered {
                            self.events
                                .push_back(SceneEvent::PlotRequest(PlotSource::Peak(id)));
                        }
                    }
                }
                Some(OverlayRef::Cutter) => {
                    self.hovered_peak = None;
                    if !self.hovered_cutter {
                        self.hovered_cutter = true;
                        self.emit_cutter_plot();
                    }
                }
                _ => {
                    self.hovered_peak = None;
                    self.hovered_cutter = false;
                }
            }
        }
    }

    /// Handles a pointer release.
    pub fn on_release(&mut self, pos: (f64, f64), button: MouseButton) {
        if self.data.is_none() || button != MouseButton::Primary {
            return;
        }
        if let Some((anchor, _)) = self.zoom_draft.take() {
            let rect = Rect::from_corners(anchor, pos);
            if !rect.is_degenerate() && self.zoom.push(rect) {
                self.events.push_back(SceneEvent::DataChanged);
            }
            return;
        }
        match self.active.take() {
            Some(OverlayRef::Cutter) => {
                if let Some(cutter) = self.cutter.as_mut() {
                    cutter.to = pos;
                    cutter.selected = true;
                }
                self.emit_cutter_plot();
            }
            Some(OverlayRef::MaskDraft) => self.commit_mask_draft(pos),
            Some(OverlayRef::Mask(_)) => {
                // A committed mask finished moving: re-evaluate masking.
                if let Some(data) = self.data.as_mut() {
                    data.mask_peaks();
                }
                self.region_overlay.invalidate();
                self.events.push_back(SceneEvent::MaskChanged);
                self.events.push_back(SceneEvent::DataChanged);
            }
            Some(OverlayRef::Peak(_)) | None => {
                if self.mode == InteractionMode::Select {
                    self.toggle_selection_at(pos);
                }
            }
        }
        self.drag_last = None;
    }

    /// Handles a wheel event; adjusts the thickness of a selected cut
    /// region under the cursor, otherwise ignored.
    pub fn on_wheel(&mut self, pos: (f64, f64), steps: i32) {
        if self.data.is_none() {
            return;
        }
        let hit_cutter = self
            .cutter
            .as_ref()
            .is_some_and(|c| c.selected && c.hit(pos.0, pos.1));
        if hit_cutter {
            if let Some(cutter) = self.cutter.as_mut() {
                cutter.adjust_thickness(steps);
            }
            self.emit_cutter_plot();
        }
    }

    /// Handles the Delete key: removes every selected, deletable overlay
    /// together with its domain object.
    pub fn on_delete_key(&mut self) {
        if self.data.is_none() {
            return;
        }

        let selected_peaks: Vec<PeakId> = self
            .peak_overlays
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.peak)
            .collect();
        let selected_masks: Vec<usize> = self
            .mask_overlays
            .iter()
            .enumerate()
            .filter(|(_, o)| o.selected)
            .map(|(i, _)| i)
            .collect();
        let cutter_selected = self.cutter.as_ref().is_some_and(|c| c.selected);

        if selected_peaks.is_empty() && selected_masks.is_empty() && !cutter_selected {
            return;
        }

        let mut peaks_removed = false;
        let mut masks_removed = false;
        if let Some(data) = self.data.as_mut() {
            for id in selected_peaks {
                match data.remove_peak(id) {
                    Ok(_) => peaks_removed = true,
                    // Rejected removals leave the overlay untouched.
                    Err(err) => warn!("peak removal rejected: {err}"),
                }
            }
            for idx in selected_masks.into_iter().rev() {
                let id = self.mask_overlays[idx].mask;
                match data.remove_mask(id) {
                    Ok(_) => {
                        self.mask_overlays.remove(idx);
                        masks_removed = true;
                    }
                    Err(err) => warn!("mask removal rejected: {err}"),
                }
            }
            if masks_removed {
                data.mask_peaks();
            }
        }
        if cutter_selected {
            self.cutter = None;
        }

        if peaks_removed {
            self.rebuild_peak_overlays();
        }
        if peaks_removed || masks_removed || cutter_selected {
            self.active = None;
            if peaks_removed || masks_removed {
                self.region_overlay.invalidate();
            }
            if masks_removed {
                self.events.push_back(SceneEvent::MaskChanged);
            }
            self.events.push_back(SceneEvent::DataChanged);
        }
    }

    // ---- internals -------------------------------------------------------

    fn start_cutter(&mut self, kind: CutterKind, pos: (f64, f64)) {
        self.cutter = Some(Cutter::new(kind, pos));
        self.active = Some(OverlayRef::Cutter);
        self.drag_last = Some(pos);
    }

    fn start_mask_draft(&mut self, shape: MaskShape, pos: (f64, f64)) {
        self.mask_draft = Some(MaskDraft {
            shape,
            from: pos,
            to: pos,
        });
        self.active = Some(OverlayRef::MaskDraft);
        self.drag_last = Some(pos);
    }

    fn commit_mask_draft(&mut self, pos: (f64, f64)) {
        let Some(mut draft) = self.mask_draft.take() else {
            return;
        };
        draft.to = pos;
        let Some(data) = self.data.as_mut() else {
            return;
        };
        let mask = draft.to_mask(data.n_frames());
        let id = data.add_mask(mask);
        self.mask_overlays.push(MaskOverlay::from_mask(id, &mask));
        data.mask_peaks();
        self.region_overlay.invalidate();
        self.events.push_back(SceneEvent::MaskChanged);
        self.events.push_back(SceneEvent::DataChanged);
    }

    fn drag_mask(&mut self, idx: usize, pos: (f64, f64)) {
        let Some(last) = self.drag_last else {
            return;
        };
        let (dx, dy) = (pos.0 - last.0, pos.1 - last.1);
        let Some(overlay) = self.mask_overlays.get_mut(idx) else {
            return;
        };
        overlay.rect = Rect {
            left: overlay.rect.left + dx,
            top: overlay.rect.top + dy,
            right: overlay.rect.right + dx,
            bottom: overlay.rect.bottom + dy,
        };
        let mask_id = overlay.mask;
        // Mutating through the handle keeps it stable for other overlays.
        if let Some(mask) = self.data.as_mut().and_then(|d| d.mask_mut(mask_id)) {
            let lo = mask.bounds.lower();
            let hi = mask.bounds.upper();
            mask.bounds = Aabb::from_corners(
                [lo[0] + dx, lo[1] + dy, lo[2]],
                [hi[0] + dx, hi[1] + dy, hi[2]],
            );
        }
    }

    fn emit_cutter_plot(&mut self) {
        let Some(cutter) = self.cutter.as_ref() else {
            return;
        };
        let Some(counts) = self
            .data
            .as_ref()
            .and_then(|d| d.frame(self.frame_index).ok())
        else {
            return;
        };
        let profile = cutter.profile(counts);
        self.events
            .push_back(SceneEvent::PlotRequest(PlotSource::Cutter {
                kind: cutter.kind,
                profile,
            }));
    }

    fn toggle_selection_at(&mut self, pos: (f64, f64)) {
        match self.hit_test(pos) {
            Some(OverlayRef::Peak(idx)) => {
                if let Some(overlay) = self.peak_overlays.get_mut(idx) {
                    overlay.selected = !overlay.selected;
                    let id = overlay.peak;
                    // The domain flag follows: it decides whether the
                    // peak participates in the integration raster.
                    if let Some(peak) = self.data.as_mut().and_then(|d| d.peak_mut(id)) {
                        peak.selected = !peak.selected;
                    }
                    self.region_overlay.invalidate();
                    self.events.push_back(SceneEvent::PeakSelected(id));
                }
            }
            Some(OverlayRef::Mask(idx)) => {
                if let Some(overlay) = self.mask_overlays.get_mut(idx) {
                    overlay.selected = !overlay.selected;
                }
            }
            Some(OverlayRef::Cutter) => {
                if let Some(cutter) = self.cutter.as_mut() {
                    cutter.selected = !cutter.selected;
                }
            }
            Some(OverlayRef::MaskDraft) | None => {}
        }
    }

    /// Topmost overlay under the cursor: cutter, then peaks, then masks.
    fn hit_test(&self, pos: (f64, f64)) -> Option<OverlayRef> {
        if self.cutter.as_ref().is_some_and(|c| c.hit(pos.0, pos.1)) {
            return Some(OverlayRef::Cutter);
        }
        if let Some(idx) = self
            .peak_overlays
            .iter()
            .position(|o| o.hit(pos.0, pos.1))
        {
            return Some(OverlayRef::Peak(idx));
        }
        if let Some(idx) = self
            .mask_overlays
            .iter()
            .position(|o| o.hit(pos.0, pos.1))
        {
            return Some(OverlayRef::Mask(idx));
        }
        None
    }

    fn is_selected(&self, item: OverlayRef) -> bool {
        match item {
            OverlayRef::Peak(idx) => self.peak_overlays.get(idx).is_some_and(|o| o.selected),
            OverlayRef::Mask(idx) => self.mask_overlays.get(idx).is_some_and(|o| o.selected),
            OverlayRef::Cutter => self.cutter.as_ref().is_some_and(|c| c.selected),
            OverlayRef::MaskDraft => false,
        }
    }

    fn abandon_gestures(&mut self) {
        self.zoom_draft = None;
        self.mask_draft = None;
        self.cutter = None;
        self.active = None;
        self.drag_last = None;
        self.hovered_peak = None;
        self.hovered_cutter = false;
    }

    /// Rebuilds peak overlays for the displayed frame: one overlay per
    /// peak whose frame-axis signal interval contains the frame index.
    fn rebuild_peak_overlays(&mut self) {
        self.peak_overlays.clear();
        let Some(data) = self.data.as_ref() else {
            return;
        };
        for (id, peak) in data.peaks() {
            if !peak.visible_on_frame(self.frame_index) {
                continue;
            }
            let Some(ellipse) = peak.slice_at_frame(self.frame_index) else {
                continue;
            };
            self.peak_overlays.push(PeakOverlay {
                peak: id,
                ellipse,
                selected: false,
                masked: peak.masked,
            });
        }
    }

    /// Rebuilds mask overlays: one per mask whose frame interval
    /// overlaps the displayed frame.
    fn rebuild_mask_overlays(&mut self) {
        self.mask_overlays.clear();
        let Some(data) = self.data.as_ref() else {
            return;
        };
        for (id, mask) in data.masks() {
            if mask.overlaps_frame(self.frame_index) {
                self.mask_overlays.push(MaskOverlay::from_mask(id, mask));
            }
        }
    }

    fn rebuild_overlays(&mut self) {
        self.rebuild_peak_overlays();
        self.rebuild_mask_overlays();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use sxview_core::{Detector, Diffractometer, Ellipsoid, Peak};

    fn dataset() -> DataSet {
        let diff = Diffractometer {
            detector: Detector {
                n_rows: 100,
                n_cols: 100,
                pixel_width: 1.0,
                pixel_height: 1.0,
                distance: 500.0,
                beam_center_col: 50.0,
                beam_center_row: 50.0,
            },
            wavelength: 1.0,
            omega_start: 0.0,
            omega_step: 0.1,
        };
        let frames = (0..10).map(|_| Array2::zeros((100, 100))).collect();
        let mut data = DataSet::new("scene", frames, diff).unwrap();
        // Signal region spans frames 3..6 and +-3 px around (50, 50).
        data.add_peak(Peak::new(Ellipsoid::from_radii(
            [50.0, 50.0, 4.5],
            [1.0, 1.0, 0.5],
        )));
        data
    }

    fn scene_at(frame: usize) -> DetectorScene {
        let mut scene = DetectorScene::new();
        scene.set_data(dataset(), frame);
        scene.drain_events();
        scene
    }

    fn drag(scene: &mut DetectorScene, from: (f64, f64), to: (f64, f64)) {
        scene.on_press(from, MouseButton::Primary);
        scene.on_move(to, true);
        scene.on_release(to, MouseButton::Primary);
    }

    #[test]
    fn test_handlers_without_dataset_are_silent() {
        let mut scene = DetectorScene::new();
        scene.on_press((10.0, 10.0), MouseButton::Primary);
        scene.on_move((20.0, 20.0), true);
        scene.on_release((20.0, 20.0), MouseButton::Primary);
        scene.on_wheel((20.0, 20.0), 1);
        scene.on_delete_key();
        scene.change_frame(3);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_set_data_emits_frame_then_data_changed() {
        let mut scene = DetectorScene::new();
        scene.set_data(dataset(), 4);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::FrameChanged(4), SceneEvent::DataChanged]
        );
        assert!(scene.data().unwrap().is_opened());
    }

    #[test]
    fn test_change_frame_clamps_out_of_range() {
        let mut scene = scene_at(0);
        scene.change_frame(99);
        assert_eq!(scene.frame_index(), 9);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::FrameChanged(9), SceneEvent::DataChanged]
        );
        // Re-selecting the current frame is a no-op.
        scene.change_frame(9);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_peak_overlay_follows_frame_window() {
        let mut scene = scene_at(2);
        assert!(scene.peak_overlays().is_empty());
        scene.change_frame(4);
        assert_eq!(scene.peak_overlays().len(), 1);
        scene.change_frame(7);
        assert!(scene.peak_overlays().is_empty());
    }

    #[test]
    fn test_zoom_drag_pushes_and_secondary_pops() {
        let mut scene = scene_at(0);
        drag(&mut scene, (10.0, 20.0), (40.0, 60.0));
        assert_eq!(scene.drain_events(), vec![SceneEvent::DataChanged]);
        let rect = *scene.visible_rect().unwrap();
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (10.0, 20.0, 40.0, 60.0));

        scene.on_press((0.0, 0.0), MouseButton::Secondary);
        assert_eq!(scene.drain_events(), vec![SceneEvent::DataChanged]);
        assert_eq!(scene.visible_rect().unwrap().right, 100.0);

        // Popping at the base view does nothing.
        scene.on_press((0.0, 0.0), MouseButton::Secondary);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_degenerate_zoom_rect_is_discarded() {
        let mut scene = scene_at(0);
        drag(&mut scene, (10.0, 10.0), (10.0, 10.0));
        assert!(scene.drain_events().is_empty());
        assert_eq!(scene.visible_rect().unwrap().right, 100.0);
    }

    #[test]
    fn test_zoom_rect_clamped_to_frame_bounds() {
        let mut scene = scene_at(0);
        drag(&mut scene, (-20.0, -20.0), (150.0, 150.0));
        let rect = *scene.visible_rect().unwrap();
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_mask_drag_commits_and_masks_peaks() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::BoxMask);
        drag(&mut scene, (40.0, 40.0), (60.0, 60.0));
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::MaskChanged, SceneEvent::DataChanged]
        );
        assert_eq!(scene.mask_overlays().len(), 1);
        let data = scene.data().unwrap();
        assert_eq!(data.n_masks(), 1);
        // The peak at (50, 50) falls inside the new mask.
        let (_, peak) = data.peaks().next().unwrap();
        assert!(peak.masked);
    }

    #[test]
    fn test_select_toggles_peak_and_reports_it() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::Select);
        let id = scene.peak_overlays()[0].peak;
        drag(&mut scene, (50.0, 50.0), (50.0, 50.0));
        assert!(scene.peak_overlays()[0].selected);
        // The domain flag flips with it: the peak drops out of the
        // integration raster while toggled off.
        assert!(!scene.data().unwrap().peak(id).unwrap().selected);
        assert_eq!(scene.drain_events(), vec![SceneEvent::PeakSelected(id)]);
        drag(&mut scene, (50.0, 50.0), (50.0, 50.0));
        assert!(!scene.peak_overlays()[0].selected);
        assert!(scene.data().unwrap().peak(id).unwrap().selected);
    }

    #[test]
    fn test_delete_removes_selected_peak_from_dataset() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::Select);
        drag(&mut scene, (50.0, 50.0), (50.0, 50.0));
        scene.drain_events();
        scene.on_delete_key();
        assert_eq!(scene.data().unwrap().n_peaks(), 0);
        assert!(scene.peak_overlays().is_empty());
        assert_eq!(scene.drain_events(), vec![SceneEvent::DataChanged]);
    }

    #[test]
    fn test_rejected_peak_removal_keeps_overlay() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::Select);
        drag(&mut scene, (50.0, 50.0), (50.0, 50.0));
        // Remove the peak behind the scene's back; the handle goes stale.
        let id = scene.peak_overlays()[0].peak;
        scene.data_mut().unwrap().remove_peak(id).unwrap();
        scene.drain_events();
        scene.on_delete_key();
        assert_eq!(scene.peak_overlays().len(), 1);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_mask_select_and_delete() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::BoxMask);
        drag(&mut scene, (40.0, 40.0), (60.0, 60.0));
        scene.set_mode(InteractionMode::Select);
        // Inside the mask footprint but clear of the peak overlay, which
        // sits above masks in hit-test order.
        drag(&mut scene, (42.0, 58.0), (42.0, 58.0));
        scene.drain_events();
        scene.on_delete_key();
        let data = scene.data().unwrap();
        assert_eq!(data.n_masks(), 0);
        assert!(scene.mask_overlays().is_empty());
        // Removing the mask re-evaluates the peak's masked flag.
        let (_, peak) = data.peaks().next().unwrap();
        assert!(!peak.masked);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::MaskChanged, SceneEvent::DataChanged]
        );
    }

    #[test]
    fn test_cutter_plots_live_and_stays_selected() {
        let mut scene = scene_at(0);
        scene.set_mode(InteractionMode::HorizontalSlice);
        scene.on_press((10.0, 20.0), MouseButton::Primary);
        scene.on_move((40.0, 20.0), true);
        scene.on_release((40.0, 20.0), MouseButton::Primary);
        let events = scene.drain_events();
        // One preview during the drag, one final on release.
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, SceneEvent::PlotRequest(PlotSource::Cutter { .. }))));
        assert!(scene.cutter().unwrap().selected);
    }

    #[test]
    fn test_wheel_thickens_selected_cutter() {
        let mut scene = scene_at(0);
        scene.set_mode(InteractionMode::HorizontalSlice);
        drag(&mut scene, (10.0, 20.0), (40.0, 20.0));
        scene.drain_events();
        scene.on_wheel((25.0, 20.0), 2);
        assert_eq!(scene.cutter().unwrap().thickness, 3);
        assert_eq!(scene.drain_events().len(), 1);
        // Wheel away from the cutter is ignored.
        scene.on_wheel((90.0, 90.0), 2);
        assert_eq!(scene.cutter().unwrap().thickness, 3);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_mode_switch_abandons_gesture() {
        let mut scene = scene_at(0);
        scene.on_press((10.0, 10.0), MouseButton::Primary);
        scene.on_move((30.0, 30.0), true);
        assert!(scene.zoom_draft_rect().is_some());
        scene.set_mode(InteractionMode::Select);
        assert!(scene.zoom_draft_rect().is_none());
        scene.on_release((30.0, 30.0), MouseButton::Primary);
        assert_eq!(scene.visible_rect().unwrap().right, 100.0);
    }

    #[test]
    fn test_hover_offers_peak_plot_once() {
        let mut scene = scene_at(4);
        let id = scene.peak_overlays()[0].peak;
        scene.on_move((50.0, 50.0), false);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::PlotRequest(PlotSource::Peak(id))]
        );
        // Still over the same peak: no duplicate request.
        scene.on_move((51.0, 50.0), false);
        assert!(scene.drain_events().is_empty());
        scene.on_move((90.0, 90.0), false);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_hover_offers_cutter_plot_once() {
        let mut scene = scene_at(0);
        scene.set_mode(InteractionMode::HorizontalSlice);
        drag(&mut scene, (10.0, 20.0), (40.0, 20.0));
        scene.drain_events();
        scene.on_move((25.0, 20.0), false);
        let events = scene.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SceneEvent::PlotRequest(PlotSource::Cutter { .. })
        ));
        // Still over the cut region: no duplicate request.
        scene.on_move((26.0, 20.0), false);
        assert!(scene.drain_events().is_empty());
        // Leaving and re-entering offers it again.
        scene.on_move((90.0, 90.0), false);
        assert!(scene.drain_events().is_empty());
        scene.on_move((25.0, 20.0), false);
        assert_eq!(scene.drain_events().len(), 1);
    }

    #[test]
    fn test_indexing_mode_press_is_ignored() {
        let mut scene = scene_at(0);
        scene.set_mode(InteractionMode::Indexing);
        drag(&mut scene, (10.0, 10.0), (30.0, 30.0));
        assert!(scene.drain_events().is_empty());
        assert!(scene.cutter().is_none());
        assert!(scene.mask_draft().is_none());
    }

    #[test]
    fn test_intensity_and_log_setters_dedupe() {
        let mut scene = scene_at(0);
        scene.set_max_intensity(DetectorScene::DEFAULT_MAX_INTENSITY);
        assert!(scene.drain_events().is_empty());
        scene.set_max_intensity(500);
        scene.set_logarithmic(true);
        assert_eq!(scene.drain_events().len(), 2);
    }

    #[test]
    fn test_reset_scene_clears_everything() {
        let mut scene = scene_at(4);
        scene.set_mode(InteractionMode::HorizontalSlice);
        drag(&mut scene, (10.0, 20.0), (40.0, 20.0));
        scene.reset_scene();
        assert!(scene.data().is_none());
        assert!(scene.peak_overlays().is_empty());
        assert!(scene.cutter().is_none());
        assert!(scene.visible_rect().is_none());
        assert!(scene.drain_events().is_empty());
    }
}
