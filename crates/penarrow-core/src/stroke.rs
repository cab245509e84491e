//! Stroke point buffers.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = Uuid;

/// Default stroke width in canvas units.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.41;

/// Ordered point storage that shaping code writes into.
///
/// Index 0 is the anchor. Everything behind it is derived geometry that gets
/// rewritten on each pointer event.
pub trait StrokeBuffer {
    /// Number of points in the buffer.
    fn point_count(&self) -> usize;

    /// Point at `index`, if any.
    fn point(&self, index: usize) -> Option<Point>;

    /// Append a point.
    fn add_point(&mut self, point: Point);

    /// Remove the point at `index`. Out-of-range indices are ignored.
    fn delete_point(&mut self, index: usize);

    /// Overwrite the anchor. Does nothing on an empty buffer.
    fn set_first_point(&mut self, point: Point);

    /// Drop every point behind the anchor.
    fn truncate_to_anchor(&mut self) {
        while self.point_count() > 1 {
            let last = self.point_count() - 1;
            self.delete_point(last);
        }
    }
}

/// A stroke being drawn, owned by the active gesture until it is handed off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: StrokeId,
    /// Points of the stroke, anchor first.
    pub points: Vec<Point>,
    /// Line width.
    pub width: f64,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            width: DEFAULT_STROKE_WIDTH,
        }
    }

    /// Create a stroke holding only its anchor.
    pub fn with_anchor(anchor: Point) -> Self {
        let mut stroke = Self::new();
        stroke.points.push(anchor);
        stroke
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The first point of the stroke.
    pub fn anchor(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Points behind the anchor.
    pub fn tail(&self) -> &[Point] {
        self.points.get(1..).unwrap_or(&[])
    }

    /// Axis-aligned bounds of all points.
    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// The stroke as a single polyline.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }

        path
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeBuffer for Stroke {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    fn delete_point(&mut self, index: usize) {
        if index < self.points.len() {
            self.points.remove(index);
        }
    }

    fn set_first_point(&mut self, point: Point) {
        if let Some(first) = self.points.first_mut() {
            *first = point;
        }
    }

    fn truncate_to_anchor(&mut self) {
        self.points.truncate(1);
    }
}
