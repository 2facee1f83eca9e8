//! Axis-aligned bounding boxes in document user units.
//!
//! Coordinates follow the SVG convention (y grows downward); a box is the
//! component-wise min/max fold over the points it was built from.

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// An empty (inverted) bounding box, the identity for [`union`](Self::union).
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Build a box from an origin and non-negative extents.
    #[must_use]
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// Check if this bounding box is valid (non-empty).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Width.
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    /// Height.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    /// Expand to include a point.
    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Expand to include another bounding box.
    pub fn union(&mut self, other: &Self) {
        if other.is_valid() {
            self.min_x = self.min_x.min(other.min_x);
            self.min_y = self.min_y.min(other.min_y);
            self.max_x = self.max_x.max(other.max_x);
            self.max_y = self.max_y.max(other.max_y);
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_is_invalid() {
        let bb = BoundingBox::EMPTY;
        assert!(!bb.is_valid());
        assert_eq!(bb.width(), 0.0);
        assert_eq!(bb.height(), 0.0);
    }

    #[test]
    fn test_include_point() {
        let mut bb = BoundingBox::EMPTY;
        bb.include_point(1.0, 2.0);
        bb.include_point(5.0, 8.0);
        assert!(bb.is_valid());
        assert!((bb.min_x - 1.0).abs() < EPS);
        assert!((bb.min_y - 2.0).abs() < EPS);
        assert!((bb.max_x - 5.0).abs() < EPS);
        assert!((bb.max_y - 8.0).abs() < EPS);
    }

    #[test]
    fn test_from_xywh() {
        let bb = BoundingBox::from_xywh(10.0, 20.0, 30.0, 40.0);
        assert!((bb.width() - 30.0).abs() < EPS);
        assert!((bb.height() - 40.0).abs() < EPS);
        assert!((bb.max_y - 60.0).abs() < EPS);
    }

    #[test]
    fn test_union() {
        let mut bb1 = BoundingBox::from_xywh(0.0, 0.0, 5.0, 5.0);
        let bb2 = BoundingBox::from_xywh(3.0, 3.0, 7.0, 7.0);
        bb1.union(&bb2);
        assert!(bb1.min_x.abs() < EPS);
        assert!((bb1.max_x - 10.0).abs() < EPS);
    }

    #[test]
    fn test_union_with_empty_is_noop() {
        let mut bb = BoundingBox::from_xywh(1.0, 1.0, 2.0, 2.0);
        let before = bb;
        bb.union(&BoundingBox::EMPTY);
        assert_eq!(bb, before);
    }
}
