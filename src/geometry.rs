//! Screen geometry primitives.
//!
//! [`Rectangle`] is the single rectangle type used everywhere in winsnap:
//! monitor bounds, work areas, grid cells and window frames.  Coordinates are
//! in virtual-desktop pixels with Y growing downward, as window managers
//! report them.

use std::fmt;

/// Errors produced by geometry accessors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// [`Rectangle::edge`] was called with an index outside `0..=3`.
    #[error("{0} is not in allowed range of 0-3")]
    EdgeIndex(usize),
}

/// An immutable axis-aligned rectangle.
///
/// Construction normalises the bounds so that `left <= right` and
/// `top <= bottom` always hold; inverted input is swapped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Rectangle {
    /// Build a rectangle from its four edges, in `left, right, top, bottom`
    /// order.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        let (left, right) = if left > right { (right, left) } else { (left, right) };
        let (top, bottom) = if top > bottom { (bottom, top) } else { (top, bottom) };
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Edge by position: `0` left, `1` right, `2` top, `3` bottom.
    pub fn edge(&self, index: usize) -> Result<f64, GeometryError> {
        match index {
            0 => Ok(self.left),
            1 => Ok(self.right),
            2 => Ok(self.top),
            3 => Ok(self.bottom),
            other => Err(GeometryError::EdgeIndex(other)),
        }
    }

    /// Area shared with `other`; `0.0` when they only touch or are disjoint.
    pub fn intersection_area(&self, other: &Rectangle) -> f64 {
        let w = self.right.min(other.right) - self.left.max(other.left);
        let h = self.bottom.min(other.bottom) - self.top.max(other.top);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Truncate to integer pixels as `(x, y, width, height)`.
    ///
    /// Each component is truncated independently, matching how the window
    /// placement calls consume them.
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (
            self.left as i32,
            self.top as i32,
            self.width() as i32,
            self.height() as i32,
        )
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// A physical display as reported by the window manager.
///
/// Produced once per display per session; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    /// Full monitor bounds.
    pub area: Rectangle,
    /// Usable area, excluding the taskbar and other reserved regions.
    pub work: Rectangle,
    pub is_primary: bool,
    /// Display name (e.g. `"DISPLAY1"`).
    pub name: String,
    /// Stable hardware identity used to key saved layouts.
    pub id: String,
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Monitor({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_are_swapped() {
        let r = Rectangle::new(300.0, 100.0, 400.0, 200.0);
        assert_eq!(r.left(), 100.0);
        assert_eq!(r.right(), 300.0);
        assert_eq!(r.top(), 200.0);
        assert_eq!(r.bottom(), 400.0);
        assert_eq!(r, Rectangle::new(100.0, 300.0, 200.0, 400.0));
    }

    #[test]
    fn width_and_height() {
        let r = Rectangle::new(10.0, 110.0, 20.0, 70.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
        assert_eq!(r.area(), 5000.0);
        assert_eq!(r.center(), (60.0, 45.0));
    }

    #[test]
    fn edge_index_maps_to_bounds() {
        let r = Rectangle::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.edge(0), Ok(1.0));
        assert_eq!(r.edge(1), Ok(2.0));
        assert_eq!(r.edge(2), Ok(3.0));
        assert_eq!(r.edge(3), Ok(4.0));
        assert_eq!(r.edge(4), Err(GeometryError::EdgeIndex(4)));
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let a = Rectangle::new(0.0, 960.0, 0.0, 540.0);
        let b = Rectangle::new(960.0, 1920.0, 0.0, 540.0);
        assert_eq!(a.intersection_area(&b), 0.0);

        let c = Rectangle::new(900.0, 1000.0, 500.0, 600.0);
        assert_eq!(a.intersection_area(&c), 60.0 * 40.0);
    }

    #[test]
    fn to_pixels_truncates() {
        let r = Rectangle::new(0.9, 100.7, 10.2, 50.9);
        assert_eq!(r.to_pixels(), (0, 10, 99, 40));
    }
}
