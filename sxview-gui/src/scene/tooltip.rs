//! Cursor tooltip: pixel coordinates to physical quantities.

use ndarray::Array2;
use sxview_core::DataSet;

/// What the cursor tooltip reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Raw pixel coordinates and intensity.
    #[default]
    Pixel,
    /// Detector scattering angles gamma and nu.
    GammaNu,
    /// Scalar scattering angle two-theta.
    TwoTheta,
    /// Bragg d-spacing from two-theta and the incident wavelength.
    DSpacing,
    /// Miller indices. Recognized but unsupported: needs a unit cell
    /// the viewer does not own.
    MillerIndices,
}

/// Formats the tooltip for a cursor position on the current frame.
///
/// Returns `None` when the position is outside the detector, which
/// suppresses the tooltip instead of erroring.
#[must_use]
pub fn tooltip_text(
    data: &DataSet,
    counts: &Array2<i64>,
    frame_index: usize,
    col: f64,
    row: f64,
    mode: CursorMode,
) -> Option<String> {
    #[allow(clippy::cast_possible_truncation)]
    let (c, r) = (col.floor() as i64, row.floor() as i64);
    let det = data.detector();
    if !det.covers(c, r) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let intensity = counts[(r as usize, c as usize)];

    #[allow(clippy::cast_precision_loss)]
    let state = data.interpolated_state(frame_index as f64);
    #[allow(clippy::cast_precision_loss)]
    let pos = det.pixel_position(c as f64, r as f64);

    let text = match mode {
        CursorMode::Pixel => format!("({c},{r}) I: {intensity}"),
        CursorMode::GammaNu => {
            let gamma = state.gamma(pos).to_degrees();
            let nu = state.nu(pos).to_degrees();
            format!("({gamma:.3},{nu:.3}) I: {intensity}")
        }
        CursorMode::TwoTheta => {
            let th2 = state.two_theta(pos).to_degrees();
            format!("({th2:.3}) I: {intensity}")
        }
        CursorMode::DSpacing => {
            let th2 = state.two_theta(pos);
            match state.d_spacing(th2) {
                Some(d) => format!("({d:.3}) I: {intensity}"),
                None => format!("(undefined) I: {intensity}"),
            }
        }
        CursorMode::MillerIndices => "Miller indices: unsupported".to_string(),
    };
    Some(text)
}
