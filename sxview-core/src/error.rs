//! Error types for sxview-core.

use thiserror::Error;

/// Result type alias for sxview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for sxview operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Ellipsoid metric is singular or not positive definite.
    #[error("degenerate ellipsoid metric (determinant {0})")]
    DegenerateShape(f64),

    /// Frame index outside the dataset's frame range.
    #[error("frame index {index} out of range (dataset has {n_frames} frames)")]
    FrameOutOfRange { index: usize, n_frames: usize },

    /// Dataset constructed without any frames.
    #[error("dataset '{0}' has no frames")]
    EmptyDataSet(String),

    /// Frames of one dataset must all share the same dimensions.
    #[error("frame {index} has shape {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    FrameShapeMismatch {
        index: usize,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    /// Detector panel dimensions must match the frame dimensions.
    #[error("detector is {det_rows}x{det_cols} pixels but frames are {rows}x{cols}")]
    DetectorShapeMismatch {
        det_rows: usize,
        det_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Peak handle does not resolve to a live peak.
    #[error("stale peak handle (slot {0})")]
    StalePeak(usize),

    /// Mask handle does not resolve to a live mask.
    #[error("stale mask handle (slot {0})")]
    StaleMask(usize),
}
