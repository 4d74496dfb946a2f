//! Per-view display options.
//!
//! Each view carries its own copy; two windows showing the same dataset
//! can differ in colormap or label visibility.

use crate::viewer::Colormap;

/// Display options for one detector view.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    /// Draw peak index labels next to peak overlays.
    pub show_peak_labels: bool,
    /// Draw the peak signal-region outlines.
    pub show_peak_areas: bool,
    /// Draw committed mask footprints.
    pub show_masks: bool,
    /// Colormap for the frame image.
    pub colormap: Colormap,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_peak_labels: false,
            show_peak_areas: true,
            show_masks: true,
            colormap: Colormap::default(),
        }
    }
}
