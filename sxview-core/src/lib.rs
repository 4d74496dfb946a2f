//! sxview-core: Domain model for single-crystal diffraction frame viewing.
//!
//! This crate provides the dataset, peak, mask, and instrument-geometry
//! abstractions consumed by the detector frame viewer.

pub mod dataset;
pub mod error;
pub mod geometry;
pub mod instrument;
pub mod mask;
pub mod peak;
pub mod region;

pub use dataset::DataSet;
pub use error::{Error, Result};
pub use geometry::{Aabb, Ellipsoid};
pub use instrument::{Detector, Diffractometer, InstrumentState};
pub use mask::{Mask, MaskId, MaskShape};
pub use peak::{FrameEllipse, Peak, PeakId};
pub use region::{IntegrationRegion, RegionKind};
