//! Canvas items - the shapes users place and edit.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bounds::compute_overlay_bounds;
use crate::geometry::{clamp_or_min, GeometryBounds, Point, Rect};
use crate::transform::Transform;

/// Stroke widths are clamped into `[0, MAX_STROKE_WIDTH]`.
pub const MAX_STROKE_WIDTH: f64 = 100.0;

/// Stroke width assumed when an item carries no stroke appearance.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// Stable identifier for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse given by center and radii.
    Ellipse,
    /// Open or closed bezier path.
    Path,
    /// Text box.
    Text,
    /// Container of other items.
    Group,
    /// Top-level container.
    Layer,
}

impl ItemKind {
    /// Containers are only selectable through the layer list, never on canvas.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Group | Self::Layer)
    }
}

/// A path anchor with optional cubic bezier control points.
///
/// Handles are absolute positions in the item's geometry space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Incoming control point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Point>,
    /// Outgoing control point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Point>,
}

impl PathPoint {
    /// A corner point without handles.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            handle_in: None,
            handle_out: None,
        }
    }

    /// Attach both handles.
    #[must_use]
    pub const fn with_handles(mut self, handle_in: Point, handle_out: Point) -> Self {
        self.handle_in = Some(handle_in);
        self.handle_out = Some(handle_out);
        self
    }

    /// The anchor position.
    #[must_use]
    pub const fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the anchor and any handles by the same delta.
    pub fn translate(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
        if let Some(h) = self.handle_in.as_mut() {
            *h = *h + delta;
        }
        if let Some(h) = self.handle_out.as_mut() {
            *h = *h + delta;
        }
    }

    /// Apply `f` to the anchor and each handle.
    #[must_use]
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        let anchor = f(self.anchor());
        Self {
            x: anchor.x,
            y: anchor.y,
            handle_in: self.handle_in.map(&f),
            handle_out: self.handle_out.map(&f),
        }
    }
}

/// Type-specific geometry of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    /// Rectangle and text geometry.
    #[serde(rename_all = "camelCase")]
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Ellipse geometry.
    #[serde(rename_all = "camelCase")]
    Ellipse {
        /// Center x.
        center_x: f64,
        /// Center y.
        center_y: f64,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Path geometry.
    #[serde(rename_all = "camelCase")]
    Path {
        /// Ordered anchors.
        points: Vec<PathPoint>,
        /// Whether the last point connects back to the first.
        #[serde(default)]
        closed: bool,
    },
    /// Groups and layers carry no geometry of their own.
    Empty {},
}

impl Default for Geometry {
    fn default() -> Self {
        Self::Empty {}
    }
}

impl Geometry {
    /// Unscaled bounding box in geometry space.
    ///
    /// Paths use their control polygon (anchors plus handles), which always
    /// encloses the curve. Containers have no bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<GeometryBounds> {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => Some(Rect::new(*x, *y, *width, *height)),
            Self::Ellipse {
                center_x,
                center_y,
                radius_x,
                radius_y,
            } => Some(Rect::new(
                center_x - radius_x,
                center_y - radius_y,
                radius_x * 2.0,
                radius_y * 2.0,
            )),
            Self::Path { points, .. } => Rect::from_points(points.iter().flat_map(|p| {
                std::iter::once(p.anchor())
                    .chain(p.handle_in)
                    .chain(p.handle_out)
            })),
            Self::Empty {} => None,
        }
    }

    /// Path points, if this is a path.
    #[must_use]
    pub fn path_points(&self) -> Option<&[PathPoint]> {
        match self {
            Self::Path { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Whether this is a closed path.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Path { closed: true, .. })
    }
}

/// A stroke or fill descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Appearance {
    /// Interior fill.
    Fill {
        /// CSS color string.
        color: String,
        /// Opacity in `[0, 1]`.
        #[serde(default = "default_opacity")]
        opacity: f64,
        /// Whether the fill is drawn.
        #[serde(default = "default_true")]
        visible: bool,
    },
    /// Outline stroke.
    Stroke {
        /// CSS color string.
        color: String,
        /// Width in canvas units, in `[0, 100]`.
        #[serde(default = "default_stroke_width")]
        width: f64,
        /// Opacity in `[0, 1]`.
        #[serde(default = "default_opacity")]
        opacity: f64,
        /// Whether the stroke is drawn.
        #[serde(default = "default_true")]
        visible: bool,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

const fn default_opacity() -> f64 {
    1.0
}

impl Appearance {
    /// Clamp numeric fields into their documented ranges.
    #[must_use]
    pub fn clamped(&self) -> Self {
        match self {
            Self::Fill {
                color,
                opacity,
                visible,
            } => Self::Fill {
                color: color.clone(),
                opacity: clamp_or_min(*opacity, 0.0, 1.0),
                visible: *visible,
            },
            Self::Stroke {
                color,
                width,
                opacity,
                visible,
            } => Self::Stroke {
                color: color.clone(),
                width: clamp_or_min(*width, 0.0, MAX_STROKE_WIDTH),
                opacity: clamp_or_min(*opacity, 0.0, 1.0),
                visible: *visible,
            },
        }
    }

    /// The default appearance stack: transparent fill, 1px white stroke.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Fill {
                color: "#ffffff".to_string(),
                opacity: 0.0,
                visible: true,
            },
            Self::Stroke {
                color: "#ffffff".to_string(),
                width: DEFAULT_STROKE_WIDTH,
                opacity: 1.0,
                visible: true,
            },
        ]
    }
}

/// A canvas item as held by the item store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Item type.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Type-specific geometry.
    #[serde(default)]
    pub geometry: Geometry,
    /// Non-destructive transform.
    #[serde(default)]
    pub transform: Transform,
    /// Ordered stroke/fill descriptors.
    #[serde(default = "Appearance::defaults")]
    pub appearances: Vec<Appearance>,
    /// Owning group or layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    /// Hidden items are not drawn or hit-tested.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Locked items cannot be picked on canvas.
    #[serde(default)]
    pub locked: bool,
}

impl Item {
    fn with_geometry(kind: ItemKind, geometry: Geometry) -> Self {
        Self {
            id: ItemId::new(),
            kind,
            name: String::new(),
            geometry,
            transform: Transform::identity(),
            appearances: Appearance::defaults(),
            parent_id: None,
            visible: true,
            locked: false,
        }
    }

    /// A rectangle. Negative sizes are clamped to zero.
    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_geometry(
            ItemKind::Rectangle,
            Geometry::Rect {
                x,
                y,
                width: width.max(0.0),
                height: height.max(0.0),
            },
        )
    }

    /// An ellipse. Negative radii are clamped to zero.
    #[must_use]
    pub fn ellipse(center_x: f64, center_y: f64, radius_x: f64, radius_y: f64) -> Self {
        Self::with_geometry(
            ItemKind::Ellipse,
            Geometry::Ellipse {
                center_x,
                center_y,
                radius_x: radius_x.max(0.0),
                radius_y: radius_y.max(0.0),
            },
        )
    }

    /// A path through `points`.
    #[must_use]
    pub fn path(points: Vec<PathPoint>, closed: bool) -> Self {
        Self::with_geometry(ItemKind::Path, Geometry::Path { points, closed })
    }

    /// A text box. Width is floored at 1.
    #[must_use]
    pub fn text(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_geometry(
            ItemKind::Text,
            Geometry::Rect {
                x,
                y,
                width: width.max(1.0),
                height: height.max(0.0),
            },
        )
    }

    /// A group container.
    #[must_use]
    pub fn group() -> Self {
        Self::with_geometry(ItemKind::Group, Geometry::Empty {})
    }

    /// A layer container.
    #[must_use]
    pub fn layer() -> Self {
        Self::with_geometry(ItemKind::Layer, Geometry::Empty {})
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Replace the appearance stack.
    #[must_use]
    pub fn with_appearances(mut self, appearances: Vec<Appearance>) -> Self {
        self.appearances = appearances;
        self
    }

    /// Width of the first stroke appearance, or 1 when there is none.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.appearances
            .iter()
            .find_map(|a| match a {
                Appearance::Stroke { width, .. } => Some(*width),
                Appearance::Fill { .. } => None,
            })
            .unwrap_or(DEFAULT_STROKE_WIDTH)
    }

    /// Unscaled geometry bounds.
    #[must_use]
    pub fn geometry_bounds(&self) -> Option<GeometryBounds> {
        self.geometry.bounds()
    }

    /// Clamp geometry sizes, transform and appearances into range.
    #[must_use]
    pub fn validated(mut self, min_displayed: f64) -> Self {
        match &mut self.geometry {
            Geometry::Rect { width, height, .. } => {
                let min_width = if self.kind == ItemKind::Text { 1.0 } else { 0.0 };
                *width = width.max(min_width);
                *height = height.max(0.0);
            }
            Geometry::Ellipse {
                radius_x, radius_y, ..
            } => {
                *radius_x = radius_x.max(0.0);
                *radius_y = radius_y.max(0.0);
            }
            Geometry::Path { .. } | Geometry::Empty {} => {}
        }
        if let Some(bounds) = self.geometry.bounds() {
            self.transform = self.transform.clamped(&bounds, min_displayed);
        }
        self.appearances = self.appearances.iter().map(Appearance::clamped).collect();
        self
    }

    /// Fold the transform into the geometry. See [`bake_item`].
    #[must_use]
    pub fn baked(&self) -> Self {
        bake_item(self)
    }
}

/// Fold an item's transform into its geometry.
///
/// Paths absorb the full transform and return to identity. Rectangles,
/// ellipses and text are axis-aligned, so they absorb translate and scale
/// and keep only the rotation; the origin is re-expressed against the new
/// bounds so the pivot stays put and the rendered result is unchanged.
///
/// A rotated rectangle, ellipse or text box therefore does not reach the
/// identity transform after baking; it keeps `rotate` and its origin. Without
/// rotation every kind bakes to identity.
#[must_use]
pub fn bake_item(item: &Item) -> Item {
    let Some(bounds) = item.geometry.bounds() else {
        return item.clone();
    };
    let transform = item.transform;
    let mut baked = item.clone();
    match &item.geometry {
        Geometry::Path { points, closed } => {
            baked.geometry = Geometry::Path {
                points: points
                    .iter()
                    .map(|p| p.map(|q| transform.map_point(&bounds, q)))
                    .collect(),
                closed: *closed,
            };
            baked.transform = Transform::identity();
        }
        Geometry::Rect { .. } | Geometry::Ellipse { .. } => {
            let Some(overlay) = compute_overlay_bounds(&bounds, &transform) else {
                return baked;
            };
            let displayed = overlay.displayed_rect();
            let pivot = overlay.pivot();
            baked.geometry = match item.geometry {
                Geometry::Ellipse { .. } => Geometry::Ellipse {
                    center_x: displayed.center().x,
                    center_y: displayed.center().y,
                    radius_x: displayed.width / 2.0,
                    radius_y: displayed.height / 2.0,
                },
                _ => Geometry::Rect {
                    x: displayed.x,
                    y: displayed.y,
                    width: displayed.width,
                    height: displayed.height,
                },
            };
            if transform.rotate == 0.0 {
                baked.transform = Transform::identity();
                return baked;
            }
            baked.transform = Transform {
                rotate: transform.rotate,
                origin_x: (pivot.x - displayed.x) / displayed.width,
                origin_y: (pivot.y - displayed.y) / displayed.height,
                ..Transform::identity()
            };
        }
        Geometry::Empty {} => {}
    }
    baked
}
