//! Instrument geometry: flat-panel detector and per-frame state.
//!
//! The detector is modeled as a flat panel perpendicular to the incident
//! beam (lab frame: x to the right seen from the source, y along the
//! beam, z up). Pixel positions map to scattering angles gamma/nu and
//! two-theta; together with the incident wavelength this gives the
//! Bragg d-spacing shown in cursor tooltips.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Flat-panel detector geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Detector {
    /// Number of pixel rows.
    pub n_rows: usize,
    /// Number of pixel columns.
    pub n_cols: usize,
    /// Pixel width in mm.
    pub pixel_width: f64,
    /// Pixel height in mm.
    pub pixel_height: f64,
    /// Sample-to-detector distance in mm.
    pub distance: f64,
    /// Beam center column in pixels.
    pub beam_center_col: f64,
    /// Beam center row in pixels.
    pub beam_center_row: f64,
}

impl Detector {
    /// Lab-frame position of a pixel center in mm.
    ///
    /// Row index grows downward on the image, so it maps to negative z.
    #[must_use]
    pub fn pixel_position(&self, col: f64, row: f64) -> [f64; 3] {
        [
            (col - self.beam_center_col) * self.pixel_width,
            self.distance,
            (self.beam_center_row - row) * self.pixel_height,
        ]
    }

    /// Whether integer pixel coordinates lie on the panel.
    #[must_use]
    pub fn covers(&self, col: i64, row: i64) -> bool {
        usize::try_from(col).is_ok_and(|c| c < self.n_cols)
            && usize::try_from(row).is_ok_and(|r| r < self.n_rows)
    }
}

/// Instrument state interpolated at one frame coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstrumentState {
    /// Incident wavelength in angstroms.
    pub wavelength: f64,
    /// Sample rotation angle in degrees at this frame.
    pub omega: f64,
}

impl InstrumentState {
    /// In-plane scattering angle gamma (radians) of a lab position.
    #[must_use]
    pub fn gamma(&self, pos: [f64; 3]) -> f64 {
        pos[0].atan2(pos[1])
    }

    /// Out-of-plane scattering angle nu (radians) of a lab position.
    #[must_use]
    pub fn nu(&self, pos: [f64; 3]) -> f64 {
        pos[2].atan2(pos[0].hypot(pos[1]))
    }

    /// Scattering angle two-theta (radians): angle between the incident
    /// beam direction and the scattered ray.
    #[must_use]
    pub fn two_theta(&self, pos: [f64; 3]) -> f64 {
        let norm = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();
        if norm == 0.0 {
            return 0.0;
        }
        (pos[1] / norm).clamp(-1.0, 1.0).acos()
    }

    /// Bragg d-spacing from two-theta: `d = lambda / (2 sin(theta))`.
    ///
    /// Returns `None` when `sin(theta)` vanishes (forward beam), where
    /// the expression blows up.
    #[must_use]
    pub fn d_spacing(&self, two_theta: f64) -> Option<f64> {
        let s = (0.5 * two_theta).sin();
        if s.abs() < 1e-10 {
            return None;
        }
        Some(self.wavelength / (2.0 * s))
    }
}

/// Diffractometer: detector plus the frame-to-rotation mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diffractometer {
    /// Detector geometry.
    pub detector: Detector,
    /// Incident wavelength in angstroms.
    pub wavelength: f64,
    /// Sample rotation at frame 0 in degrees.
    pub omega_start: f64,
    /// Sample rotation increment per frame in degrees.
    pub omega_step: f64,
}

impl Diffractometer {
    /// Instrument state linearly interpolated at a (fractional) frame.
    #[must_use]
    pub fn interpolated_state(&self, frame: f64) -> InstrumentState {
        InstrumentState {
            wavelength: self.wavelength,
            omega: self.omega_start + self.omega_step * frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn detector() -> Detector {
        Detector {
            n_rows: 100,
            n_cols: 100,
            pixel_width: 1.0,
            pixel_height: 1.0,
            distance: 100.0,
            beam_center_col: 50.0,
            beam_center_row: 50.0,
        }
    }

    #[test]
    fn test_beam_center_has_zero_angles() {
        let state = InstrumentState {
            wavelength: 1.0,
            omega: 0.0,
        };
        let pos = detector().pixel_position(50.0, 50.0);
        assert_relative_eq!(state.gamma(pos), 0.0);
        assert_relative_eq!(state.nu(pos), 0.0);
        assert_relative_eq!(state.two_theta(pos), 0.0);
    }

    #[test]
    fn test_gamma_45_degrees() {
        let state = InstrumentState {
            wavelength: 1.0,
            omega: 0.0,
        };
        // 100 mm to the side at 100 mm distance, in the horizontal plane.
        let pos = detector().pixel_position(150.0, 50.0);
        assert_relative_eq!(state.gamma(pos), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(state.two_theta(pos), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_d_spacing_known_value() {
        let state = InstrumentState {
            wavelength: 1.0,
            omega: 0.0,
        };
        // two-theta = 30 degrees -> d = 1 / (2 sin 15deg) ~ 1.932
        let d = state.d_spacing(30.0_f64.to_radians()).unwrap();
        assert_relative_eq!(d, 1.9319, epsilon = 1e-4);
    }

    #[test]
    fn test_d_spacing_forward_beam_is_none() {
        let state = InstrumentState {
            wavelength: 1.0,
            omega: 0.0,
        };
        assert!(state.d_spacing(0.0).is_none());
    }

    #[test]
    fn test_interpolated_state() {
        let diff = Diffractometer {
            detector: detector(),
            wavelength: 1.5,
            omega_start: 10.0,
            omega_step: 0.5,
        };
        let state = diff.interpolated_state(4.0);
        assert_relative_eq!(state.omega, 12.0);
        assert_relative_eq!(state.wavelength, 1.5);
    }
}
