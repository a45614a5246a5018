//! Geometry math: points, rectangles, and the pure functions the rest of the
//! core builds on.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or vector in 2D space.
///
/// Which space (screen, canvas, overlay-local or item geometry) is implied by
/// the function producing it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Length of this point treated as a vector from the origin.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Rotate this vector by `degrees` (positive is clockwise in a y-down
    /// space) using the standard rotation matrix.
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Component-wise product.
    #[must_use]
    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle.
///
/// Used both for unscaled geometry bounds (see [`GeometryBounds`]) and for
/// displayed, post-transform boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Unscaled bounding box of an item in its local geometry space.
pub type GeometryBounds = Rect;

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Smallest rectangle containing every point, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    /// A rectangle is usable for hit-testing and handle placement only when
    /// it is finite with strictly positive extent.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height as a vector.
    #[must_use]
    pub const fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Flip negative extents so width and height are non-negative while
    /// covering the same region.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::from_corners(
            self.origin(),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }

    /// Point at fractional position `(fx, fy)` within the rectangle.
    #[must_use]
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }
}

/// Normalized-distance ellipse test: `((x-cx)/rx)^2 + ((y-cy)/ry)^2 <= 1`.
///
/// Degenerate radii never contain anything.
#[must_use]
pub fn point_in_ellipse(p: Point, center: Point, radius_x: f64, radius_y: f64) -> bool {
    if radius_x <= 0.0 || radius_y <= 0.0 {
        return false;
    }
    let nx = (p.x - center.x) / radius_x;
    let ny = (p.y - center.y) / radius_y;
    nx * nx + ny * ny <= 1.0
}

/// New scale factor for a resize-handle drag along one axis.
///
/// `delta` is pointer travel in the overlay's unrotated local frame.
/// Dragging the min (left/top) edge grows the shape for negative deltas,
/// dragging the max edge grows it for positive ones. The displayed size is
/// floored at `min_displayed`; a zero-size geometry keeps its scale.
#[must_use]
pub fn scale_for_resize(
    current_scale: f64,
    geometry_size: f64,
    delta: f64,
    from_min_edge: bool,
    min_displayed: f64,
) -> f64 {
    if geometry_size <= 0.0 || !geometry_size.is_finite() {
        return current_scale;
    }
    let displayed = geometry_size * current_scale;
    let resized = if from_min_edge {
        displayed - delta
    } else {
        displayed + delta
    };
    resized.max(min_displayed) / geometry_size
}

/// Clamp `value` into `[min, max]`, mapping NaN to `min`.
#[must_use]
pub fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
