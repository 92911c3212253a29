//! Screen-space points, rectangles and region lookup.
//!
//! Hit testing never reads layout directly: the renderer (a browser page, or a
//! test) implements [`GeometryProvider`] and reports the current rectangle of
//! each named [`Region`].

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Same size, moved so its top-left corner is at `origin`.
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }

    /// Whether the point lies inside or on the edge.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Whether the rectangles overlap. Touching edges count as overlapping.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.left
            || self.left > other.right()
            || self.bottom() < other.top
            || self.top > other.bottom())
    }
}

/// Named layout regions the core needs to know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    /// The draggable plate panel
    Plate,
    /// The primary drop zone
    DropZone,
}

/// Reports the current rectangle of a layout region.
pub trait GeometryProvider {
    /// Current bounding rectangle, or `None` if the region is not laid out.
    fn rect(&self, region: Region) -> Option<Rect>;
}

/// Geometry reported explicitly by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedGeometry {
    /// Plate rectangle
    pub plate: Option<Rect>,
    /// Drop zone rectangle
    pub drop_zone: Option<Rect>,
}

impl ReportedGeometry {
    /// Create geometry with both regions laid out.
    pub fn new(plate: Rect, drop_zone: Rect) -> Self {
        Self {
            plate: Some(plate),
            drop_zone: Some(drop_zone),
        }
    }

    /// Update one region.
    pub fn set(&mut self, region: Region, rect: Option<Rect>) {
        match region {
            Region::Plate => self.plate = rect,
            Region::DropZone => self.drop_zone = rect,
        }
    }
}

impl GeometryProvider for ReportedGeometry {
    fn rect(&self, region: Region) -> Option<Rect> {
        match region {
            Region::Plate => self.plate,
            Region::DropZone => self.drop_zone,
        }
    }
}
