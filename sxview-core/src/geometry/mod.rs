//! Geometric primitives in detector space.
//!
//! All geometry lives in the 3-D space (column, row, frame): two spatial
//! detector axes plus the frame index along the rotation axis.

mod aabb;
mod ellipsoid;

pub use aabb::Aabb;
pub use ellipsoid::Ellipsoid;
