//! Non-destructive item transforms.
//!
//! A [`Transform`] is applied on top of an item's raw geometry without
//! modifying it. The composition order is fixed:
//!
//! ```text
//! 1. translate
//! 2. scale about the origin-fraction anchor of the geometry bounds
//! 3. rotate about the resulting pivot
//! ```
//!
//! For a geometry point `p` with anchor `A = bounds.xy + bounds.size * origin`,
//! the canvas position is `A + translate + R(S(p - A))`.

use serde::{Deserialize, Serialize};

use crate::geometry::{clamp_or_min, GeometryBounds, Point};

/// Translate / rotate / scale with a fractional origin.
///
/// Absent properties deserialize to the identity defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transform {
    /// Horizontal translation (canvas units).
    pub translate_x: f64,
    /// Vertical translation (canvas units).
    pub translate_y: f64,
    /// Rotation in degrees.
    pub rotate: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Horizontal anchor as a fraction of the geometry width, in `[0, 1]`.
    pub origin_x: f64,
    /// Vertical anchor as a fraction of the geometry height, in `[0, 1]`.
    pub origin_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        rotate: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        origin_x: 0.0,
        origin_y: 0.0,
    };

    /// Identity transform (alias of [`Transform::IDENTITY`]).
    #[must_use]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Whether this transform leaves geometry unchanged. The origin is
    /// irrelevant when nothing scales or rotates.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        self.translate_x == 0.0
            && self.translate_y == 0.0
            && self.rotate == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
    }

    /// Translation as a vector.
    #[must_use]
    pub const fn translation(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    /// Origin fraction as a point.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    /// Geometry-space point the origin fraction refers to.
    #[must_use]
    pub fn anchor(&self, bounds: &GeometryBounds) -> Point {
        bounds.at_fraction(self.origin_x, self.origin_y)
    }

    /// Canvas-space pivot: the anchor after translation. Scale and rotation
    /// both leave it fixed.
    #[must_use]
    pub fn pivot(&self, bounds: &GeometryBounds) -> Point {
        self.anchor(bounds) + self.translation()
    }

    /// Apply scale then rotation to a vector.
    #[must_use]
    pub fn map_vector(&self, v: Point) -> Point {
        v.scaled(self.scale_x, self.scale_y).rotated(self.rotate)
    }

    /// Inverse of [`Transform::map_vector`], or `None` when a scale is zero.
    #[must_use]
    pub fn unmap_vector(&self, v: Point) -> Option<Point> {
        if !self.is_invertible() {
            return None;
        }
        Some(
            v.rotated(-self.rotate)
                .scaled(1.0 / self.scale_x, 1.0 / self.scale_y),
        )
    }

    /// Map a geometry-space point to canvas space.
    #[must_use]
    pub fn map_point(&self, bounds: &GeometryBounds, p: Point) -> Point {
        let anchor = self.anchor(bounds);
        anchor + self.translation() + self.map_vector(p - anchor)
    }

    /// Map a canvas-space point back into geometry space.
    #[must_use]
    pub fn unmap_point(&self, bounds: &GeometryBounds, p: Point) -> Option<Point> {
        let anchor = self.anchor(bounds);
        self.unmap_vector(p - anchor - self.translation())
            .map(|local| anchor + local)
    }

    /// Whether the transform can be inverted.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.scale_x != 0.0
            && self.scale_y != 0.0
            && self.scale_x.is_finite()
            && self.scale_y.is_finite()
    }

    /// The same visual transform expressed with a different origin fraction.
    ///
    /// Moving the anchor from `A` to `A'` changes where scale and rotation
    /// are applied; the translate is compensated by `(I - RS)(A - A')` so
    /// every geometry point still lands at the same canvas position.
    #[must_use]
    pub fn with_origin_preserved(&self, bounds: &GeometryBounds, new_origin: Point) -> Self {
        let new_origin = Point::new(
            clamp_or_min(new_origin.x, 0.0, 1.0),
            clamp_or_min(new_origin.y, 0.0, 1.0),
        );
        let translate = translate_for_origin_change(bounds, self, new_origin);
        Self {
            translate_x: translate.x,
            translate_y: translate.y,
            origin_x: new_origin.x,
            origin_y: new_origin.y,
            ..*self
        }
    }

    /// Clamp every property into its documented range.
    ///
    /// Rotation is folded into `(-360, 360)`, origin into `[0, 1]`, and each
    /// scale is floored so the displayed size of `bounds` stays at least
    /// `min_displayed`. Non-finite values fall back to identity.
    #[must_use]
    pub fn clamped(&self, bounds: &GeometryBounds, min_displayed: f64) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let floor_scale = |scale: f64, size: f64| {
            let scale = finite_or(scale, 1.0);
            if size > 0.0 && (scale * size).abs() < min_displayed {
                scale.signum() * min_displayed / size
            } else {
                scale
            }
        };
        Self {
            translate_x: finite_or(self.translate_x, 0.0),
            translate_y: finite_or(self.translate_y, 0.0),
            rotate: finite_or(self.rotate, 0.0) % 360.0,
            scale_x: floor_scale(self.scale_x, bounds.width),
            scale_y: floor_scale(self.scale_y, bounds.height),
            origin_x: clamp_or_min(self.origin_x, 0.0, 1.0),
            origin_y: clamp_or_min(self.origin_y, 0.0, 1.0),
        }
    }
}

/// Translate that keeps every rendered point of `transform` in place once
/// its origin fraction becomes `new_origin`.
#[must_use]
pub fn translate_for_origin_change(
    bounds: &GeometryBounds,
    transform: &Transform,
    new_origin: Point,
) -> Point {
    let shift = transform.anchor(bounds) - bounds.at_fraction(new_origin.x, new_origin.y);
    transform.translation() + shift - transform.map_vector(shift)
}

/// A single transform property, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKey {
    /// `translateX`
    TranslateX,
    /// `translateY`
    TranslateY,
    /// `rotate`
    Rotate,
    /// `scaleX`
    ScaleX,
    /// `scaleY`
    ScaleY,
    /// `originX`
    OriginX,
    /// `originY`
    OriginY,
}

impl TransformKey {
    /// Read this property.
    #[must_use]
    pub const fn get(self, t: &Transform) -> f64 {
        match self {
            Self::TranslateX => t.translate_x,
            Self::TranslateY => t.translate_y,
            Self::Rotate => t.rotate,
            Self::ScaleX => t.scale_x,
            Self::ScaleY => t.scale_y,
            Self::OriginX => t.origin_x,
            Self::OriginY => t.origin_y,
        }
    }

    /// Write this property.
    pub fn set(self, t: &mut Transform, value: f64) {
        match self {
            Self::TranslateX => t.translate_x = value,
            Self::TranslateY => t.translate_y = value,
            Self::Rotate => t.rotate = value,
            Self::ScaleX => t.scale_x = value,
            Self::ScaleY => t.scale_y = value,
            Self::OriginX => t.origin_x = value,
            Self::OriginY => t.origin_y = value,
        }
    }
}
