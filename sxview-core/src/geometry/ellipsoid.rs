//! Ellipsoids represented by a center and a metric tensor.
//!
//! A point `p` is inside the ellipsoid when `(p - c)^T M (p - c) <= 1`,
//! where `M` is the metric tensor. Scaling by a factor `s` divides the
//! metric by `s^2`, so the same representation covers the nested
//! peak-end / background-begin / background-end regions around a peak.

use crate::error::{Error, Result};
use crate::geometry::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Determinants below this magnitude are treated as singular.
const DEGENERACY_THRESHOLD: f64 = 1e-12;

/// An ellipsoid in (col, row, frame) space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ellipsoid {
    center: [f64; 3],
    metric: [[f64; 3]; 3],
}

impl Ellipsoid {
    /// Creates an ellipsoid from its center and metric tensor.
    #[must_use]
    pub fn new(center: [f64; 3], metric: [[f64; 3]; 3]) -> Self {
        Self { center, metric }
    }

    /// Creates an axis-aligned ellipsoid from per-axis radii.
    #[must_use]
    pub fn from_radii(center: [f64; 3], radii: [f64; 3]) -> Self {
        let mut metric = [[0.0; 3]; 3];
        for i in 0..3 {
            metric[i][i] = 1.0 / (radii[i] * radii[i]);
        }
        Self { center, metric }
    }

    /// Ellipsoid center.
    #[inline]
    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    /// Metric tensor.
    #[inline]
    #[must_use]
    pub fn metric(&self) -> [[f64; 3]; 3] {
        self.metric
    }

    /// Returns a copy scaled by `factor` about its center.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let f2 = factor * factor;
        let mut metric = self.metric;
        for row in &mut metric {
            for v in row.iter_mut() {
                *v /= f2;
            }
        }
        Self {
            center: self.center,
            metric,
        }
    }

    /// Squared metric distance of a point from the center:
    /// `(p - c)^T M (p - c)`. Inside the ellipsoid iff `<= 1`.
    #[must_use]
    pub fn metric_distance2(&self, p: [f64; 3]) -> f64 {
        let u = [
            p[0] - self.center[0],
            p[1] - self.center[1],
            p[2] - self.center[2],
        ];
        let mut mu = [0.0; 3];
        for i in 0..3 {
            for j in 0..3 {
                mu[i] += self.metric[i][j] * u[j];
            }
        }
        u[0] * mu[0] + u[1] * mu[1] + u[2] * mu[2]
    }

    /// Whether a point lies inside the ellipsoid.
    #[must_use]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        self.metric_distance2(p) <= 1.0
    }

    /// Inverse of the metric tensor via the adjugate.
    ///
    /// # Errors
    /// `Error::DegenerateShape` if the metric is singular.
    pub fn inverse_metric(&self) -> Result<[[f64; 3]; 3]> {
        let m = &self.metric;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        if det.abs() < DEGENERACY_THRESHOLD || !det.is_finite() {
            return Err(Error::DegenerateShape(det));
        }
        let cof = |r1: usize, r2: usize, c1: usize, c2: usize| {
            m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
        };
        let inv = [
            [
                cof(1, 2, 1, 2) / det,
                -cof(0, 2, 1, 2) / det,
                cof(0, 1, 1, 2) / det,
            ],
            [
                -cof(1, 2, 0, 2) / det,
                cof(0, 2, 0, 2) / det,
                -cof(0, 1, 0, 2) / det,
            ],
            [
                cof(1, 2, 0, 1) / det,
                -cof(0, 2, 0, 1) / det,
                cof(0, 1, 0, 1) / det,
            ],
        ];
        Ok(inv)
    }

    /// Bounding box of the ellipsoid. The extent along axis `i` is
    /// `sqrt(inv_metric[i][i])` about the center.
    ///
    /// # Errors
    /// `Error::DegenerateShape` if the metric is singular or not
    /// positive definite.
    pub fn aabb(&self) -> Result<Aabb> {
        let inv = self.inverse_metric()?;
        let mut lower = [0.0; 3];
        let mut upper = [0.0; 3];
        for i in 0..3 {
            if inv[i][i] <= 0.0 || !inv[i][i].is_finite() {
                return Err(Error::DegenerateShape(inv[i][i]));
            }
            let extent = inv[i][i].sqrt();
            lower[i] = self.center[i] - extent;
            upper[i] = self.center[i] + extent;
        }
        Ok(Aabb::from_corners(lower, upper))
    }
}
