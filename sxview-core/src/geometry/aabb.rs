//! Axis-aligned bounding boxes over (column, row, frame) space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in (col, row, frame) space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    lower: [f64; 3],
    upper: [f64; 3],
}

impl Aabb {
    /// Creates a bounding box from two opposite corners, reordering each
    /// axis so that `lower <= upper`.
    #[must_use]
    pub fn from_corners(a: [f64; 3], b: [f64; 3]) -> Self {
        let mut lower = [0.0; 3];
        let mut upper = [0.0; 3];
        for i in 0..3 {
            lower[i] = a[i].min(b[i]);
            upper[i] = a[i].max(b[i]);
        }
        Self { lower, upper }
    }

    /// Lower corner.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> [f64; 3] {
        self.lower
    }

    /// Upper corner.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> [f64; 3] {
        self.upper
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.lower[0] + self.upper[0]),
            0.5 * (self.lower[1] + self.upper[1]),
            0.5 * (self.lower[2] + self.upper[2]),
        ]
    }

    /// Whether a point lies inside the box (inclusive bounds).
    #[must_use]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.lower[i] && p[i] <= self.upper[i])
    }

    /// Whether two boxes overlap (inclusive bounds).
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.lower[i] <= other.upper[i] && other.lower[i] <= self.upper[i])
    }

    /// The box extent along the frame axis as `(lower, upper)`.
    #[inline]
    #[must_use]
    pub fn frame_interval(&self) -> (f64, f64) {
        (self.lower[2], self.upper[2])
    }

    /// Whether the given frame coordinate lies within the frame interval.
    #[must_use]
    pub fn contains_frame(&self, frame: f64) -> bool {
        frame >= self.lower[2] && frame <= self.upper[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_reorders() {
        let b = Aabb::from_corners([5.0, 1.0, 9.0], [2.0, 4.0, 3.0]);
        assert_eq!(b.lower(), [2.0, 1.0, 3.0]);
        assert_eq!(b.upper(), [5.0, 4.0, 9.0]);
    }

    #[test]
    fn test_contains_inclusive() {
        let b = Aabb::from_corners([0.0, 0.0, 0.0], [10.0, 10.0, 5.0]);
        assert!(b.contains([0.0, 10.0, 5.0]));
        assert!(b.contains([5.0, 5.0, 2.5]));
        assert!(!b.contains([10.1, 5.0, 2.5]));
    }

    #[test]
    fn test_frame_interval() {
        let b = Aabb::from_corners([0.0, 0.0, 3.0], [10.0, 10.0, 6.0]);
        assert_eq!(b.frame_interval(), (3.0, 6.0));
        assert!(b.contains_frame(3.0));
        assert!(b.contains_frame(6.0));
        assert!(!b.contains_frame(2.0));
        assert!(!b.contains_frame(7.0));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::from_corners([0.0, 0.0, 0.0], [5.0, 5.0, 5.0]);
        let b = Aabb::from_corners([4.0, 4.0, 4.0], [9.0, 9.0, 9.0]);
        let c = Aabb::from_corners([6.0, 6.0, 6.0], [9.0, 9.0, 9.0]);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
