//! Pixel-space geometry shared by every stage
//!
//! Persisted records store points as `[x, y]` and boxes as `[x, y, w, h]`,
//! so both types serialize through tuples.

use serde::{Deserialize, Serialize};

/// A point in pixel space with sub-pixel precision (box centers can fall on .5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Axis-aligned bounding box `(x, y, w, h)` in integer pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32, i32, i32)", into = "(i32, i32, i32, i32)")]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BBox {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest box containing every point, with inclusive pixel extents
    ///
    /// Width and height count pixels, so a single point yields a 1x1 box.
    #[must_use]
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (min_x, min_y, max_x, max_y) =
            iter.fold((x0, y0, x0, y0), |(min_x, min_y, max_x, max_y), (x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            });
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.w) / 2.0,
            f64::from(self.y) + f64::from(self.h) / 2.0,
        )
    }

    /// Width over height; `None` for a zero-height box
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.h != 0).then(|| f64::from(self.w) / f64::from(self.h))
    }

    /// Corner points clockwise from top-left
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let (x, y) = (f64::from(self.x), f64::from(self.y));
        let (r, b) = (f64::from(self.right()), f64::from(self.bottom()));
        [
            Point::new(x, y),
            Point::new(r, y),
            Point::new(r, b),
            Point::new(x, b),
        ]
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

impl From<(i32, i32, i32, i32)> for BBox {
    fn from((x, y, w, h): (i32, i32, i32, i32)) -> Self {
        Self { x, y, w, h }
    }
}

impl From<BBox> for (i32, i32, i32, i32) {
    fn from(b: BBox) -> Self {
        (b.x, b.y, b.w, b.h)
    }
}
