//! Scene change notifications.
//!
//! The scene queues events instead of calling observers directly; the
//! application (or a test) drains the queue once per tick, which keeps
//! ordering deterministic without a GUI event loop.

use sxview_core::PeakId;

use crate::scene::overlay::CutterKind;

/// Source of a 1-D plot request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotSource {
    /// A cut region over the current frame, with its projected profile.
    Cutter {
        /// Which cut produced the profile.
        kind: CutterKind,
        /// Projected intensities along the cut.
        profile: Vec<f64>,
    },
    /// A peak overlay offered for plotting on hover.
    Peak(PeakId),
}

/// Events emitted by the detector scene, drained once per UI tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// The displayed image changed: frame, zoom, intensity, or overlay
    /// membership.
    DataChanged,
    /// The displayed frame index changed.
    FrameChanged(usize),
    /// The mask set attached to the dataset changed.
    MaskChanged,
    /// A peak was selected or deselected interactively.
    PeakSelected(PeakId),
    /// A plottable item requests (or refreshes) its 1-D plot.
    PlotRequest(PlotSource),
}
