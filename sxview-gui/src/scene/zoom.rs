//! Zoom region stack: navigable history of visible sub-rectangles.

/// Width or height below this is a degenerate drag, not a zoom.
pub const DEGENERATE_EXTENT: f64 = 1e-10;

/// Axis-aligned rectangle in detector pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge (column).
    pub left: f64,
    /// Top edge (row).
    pub top: f64,
    /// Right edge (column).
    pub right: f64,
    /// Bottom edge (row).
    pub bottom: f64,
}

impl Rect {
    /// Creates a rectangle from two opposite corners, reordering so that
    /// `left <= right` and `top <= bottom`.
    #[must_use]
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    /// Rectangle width.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Rectangle height.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether the drag that produced this rectangle has near-zero
    /// extent along either axis.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width().abs() < DEGENERATE_EXTENT || self.height().abs() < DEGENERATE_EXTENT
    }

    /// This rectangle clamped to lie within `bounds`.
    #[must_use]
    pub fn clamped_to(&self, bounds: &Rect) -> Self {
        Self {
            left: self.left.max(bounds.left),
            top: self.top.max(bounds.top),
            right: self.right.min(bounds.right),
            bottom: self.bottom.min(bounds.bottom),
        }
    }

    /// Whether `other` lies fully within this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Whether a (col, row) point lies inside (inclusive).
    #[must_use]
    pub fn contains(&self, col: f64, row: f64) -> bool {
        col >= self.left && col <= self.right && row >= self.top && row <= self.bottom
    }
}

/// Navigable stack of zoom rectangles.
///
/// The bottom entry is always the full frame extent; the top entry is
/// the currently visible rectangle. Entries are clamped to the base on
/// push, so `current()` is always contained in the base.
#[derive(Debug, Clone, Default)]
pub struct ZoomStack {
    stack: Vec<Rect>,
}

impl ZoomStack {
    /// Clears the stack down to a single base entry.
    pub fn reset(&mut self, full_extent: Rect) {
        self.stack.clear();
        self.stack.push(full_extent);
    }

    /// Whether a base entry exists (a dataset is bound).
    #[must_use]
    pub fn is_bound(&self) -> bool {
        !self.stack.is_empty()
    }

    /// The base (full-frame) rectangle.
    #[must_use]
    pub fn base(&self) -> Option<&Rect> {
        self.stack.first()
    }

    /// The currently visible rectangle.
    #[must_use]
    pub fn current(&self) -> Option<&Rect> {
        self.stack.last()
    }

    /// Number of stacked rectangles including the base.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pushes a zoom rectangle, clamped to the base entry. Returns false
    /// (and pushes nothing) when no base exists or the clamped rectangle
    /// is degenerate.
    pub fn push(&mut self, rect: Rect) -> bool {
        let Some(base) = self.base() else {
            return false;
        };
        let clamped = rect.clamped_to(base);
        if clamped.is_degenerate() || clamped.width() < 0.0 || clamped.height() < 0.0 {
            return false;
        }
        self.stack.push(clamped);
        true
    }

    /// Pops the top entry unless only the base remains. Returns whether
    /// the visible rectangle changed.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}
