//! Synthetic demo dataset: a frame stack with Gaussian reflections.
//!
//! Stands in for an instrument file so the viewer can be exercised
//! without experiment data.

use ndarray::Array2;
use sxview_core::{DataSet, Detector, Diffractometer, Ellipsoid, Peak, Result};

const N_ROWS: usize = 256;
const N_COLS: usize = 256;
const N_FRAMES: usize = 30;

/// Reflections baked into the demo stack: center (col, row, frame) and
/// one-sigma radii (px, px, frames).
const REFLECTIONS: &[([f64; 3], [f64; 3])] = &[
    ([60.0, 80.0, 6.0], [1.5, 1.2, 1.0]),
    ([180.0, 70.0, 12.0], [2.0, 2.0, 1.5]),
    ([120.0, 160.0, 15.0], [1.2, 1.8, 0.8]),
    ([200.0, 200.0, 20.0], [1.6, 1.6, 1.2]),
    ([70.0, 210.0, 24.0], [1.4, 1.4, 1.0]),
    // Close pair: their background shells collide on shared frames.
    ([140.0, 60.0, 10.0], [1.5, 1.5, 1.0]),
    ([148.0, 60.0, 10.0], [1.5, 1.5, 1.0]),
];

fn demo_diffractometer() -> Diffractometer {
    #[allow(clippy::cast_precision_loss)]
    Diffractometer {
        detector: Detector {
            n_rows: N_ROWS,
            n_cols: N_COLS,
            pixel_width: 0.8,
            pixel_height: 0.8,
            distance: 450.0,
            beam_center_col: N_COLS as f64 / 2.0,
            beam_center_row: N_ROWS as f64 / 2.0,
        },
        wavelength: 1.46,
        omega_start: 0.0,
        omega_step: 0.3,
    }
}

/// Builds the demo dataset with its reflections registered as peaks.
///
/// # Errors
/// Propagates dataset construction errors.
pub fn demo_dataset() -> Result<DataSet> {
    let mut frames = Vec::with_capacity(N_FRAMES);
    for f in 0..N_FRAMES {
        let mut frame: Array2<i64> = Array2::zeros((N_ROWS, N_COLS));
        #[allow(clippy::cast_precision_loss)]
        let z = f as f64;
        for ((r, c), v) in frame.indexed_iter_mut() {
            *v = background(r, c);
            #[allow(clippy::cast_precision_loss)]
            let (col, row) = (c as f64, r as f64);
            for &(center, sigma) in REFLECTIONS {
                *v += gaussian(col, row, z, center, sigma);
            }
        }
        frames.push(frame);
    }

    let mut data = DataSet::new("demo", frames, demo_diffractometer())?;
    for &(center, sigma) in REFLECTIONS {
        data.add_peak(Peak::new(Ellipsoid::from_radii(center, sigma)));
    }
    Ok(data)
}

/// Low deterministic background so the image is not pure black.
fn background(row: usize, col: usize) -> i64 {
    i64::try_from((row * 31 + col * 17) % 3).unwrap_or(0)
}

/// Rounded Gaussian contribution of one reflection at a voxel.
fn gaussian(col: f64, row: f64, frame: f64, center: [f64; 3], sigma: [f64; 3]) -> i64 {
    let dx = (col - center[0]) / sigma[0];
    let dy = (row - center[1]) / sigma[1];
    let dz = (frame - center[2]) / sigma[2];
    let rr = dx * dx + dy * dy + dz * dz;
    if rr > 25.0 {
        return 0;
    }
    let amplitude = 900.0;
    #[allow(clippy::cast_possible_truncation)]
    let counts = (amplitude * (-0.5 * rr).exp()).round() as i64;
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_dataset_shape() {
        let data = demo_dataset().unwrap();
        assert_eq!(data.n_frames(), N_FRAMES);
        assert_eq!(data.n_rows(), N_ROWS);
        assert_eq!(data.n_peaks(), REFLECTIONS.len());
    }

    #[test]
    fn test_reflection_is_bright_at_its_center() {
        let data = demo_dataset().unwrap();
        let frame = data.frame(6).unwrap();
        assert!(frame[(80, 60)] > 500);
    }
}
