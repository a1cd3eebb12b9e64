//! Pixel-space geometry for dirty tracking and paint clipping.
//!
//! Coordinates are `f32` pixels in the host's content space. The dirty
//! accumulator relies on [`Rect::EMPTY`], an "inside-out" rectangle that is
//! the identity element of [`Rect::union`].

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Default for Rect {
    fn default() -> Self {
        Rect::EMPTY
    }
}

impl Rect {
    /// The inside-out rectangle: unioning anything with it yields the other
    /// operand unchanged, which makes it the dirty-accumulator identity.
    pub const EMPTY: Rect = Rect {
        x: f32::MAX,
        y: f32::MAX,
        w: -f32::MAX,
        h: -f32::MAX,
    };

    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns true if this rect covers no area.
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        if p.x < self.x || p.x >= self.right() {
            false
        } else {
            !(p.y < self.y || p.y >= self.bottom())
        }
    }

    /// The smallest rectangle covering both operands.
    ///
    /// A degenerate operand acts as the identity element.
    pub fn union(&self, other: Rect) -> Rect {
        if self.is_degenerate() {
            return other;
        }
        if other.is_degenerate() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// The overlapping region of both operands, degenerate if they are
    /// disjoint.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Rect {
            x,
            y,
            w: self.right().min(other.right()) - x,
            h: self.bottom().min(other.bottom()) - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Union: identity ====================

    #[test]
    fn union_empty_with_rect() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Rect::EMPTY.union(r), r);
        assert_eq!(r.union(Rect::EMPTY), r);
    }

    #[test]
    fn union_empty_with_empty_is_degenerate() {
        assert!(Rect::EMPTY.union(Rect::EMPTY).is_degenerate());
    }

    // ==================== Union: coverage ====================

    #[test]
    fn union_covers_both_operands() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let u = a.union(b);
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 15.0));
    }

    #[test]
    fn union_nested_is_outer() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert_eq!(outer.union(inner), outer);
    }

    // ==================== Intersect ====================

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(b), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn intersect_disjoint_is_degenerate() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert!(a.intersect(b).is_degenerate());
    }

    // ==================== Containment ====================

    #[test]
    fn contains_point_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Point::new(0.0, 0.0)));
        assert!(r.contains_point(Point::new(9.9, 9.9)));
        assert!(!r.contains_point(Point::new(10.0, 5.0)));
        assert!(!r.contains_point(Point::new(5.0, 10.0)));
        assert!(!r.contains_point(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn degenerate_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 5.0, 0.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }
}
