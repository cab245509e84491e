//! Grid snapping for stroke anchor points.

use crate::settings::SnapSettings;
use kurbo::Point;

/// Grid pitch in canvas units (matches the ruled background).
pub const GRID_SIZE: f64 = 14.17;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point (unchanged unless both axes qualified).
    pub point: Point,
    /// Whether the X coordinate was within tolerance of a grid line.
    pub snapped_x: bool,
    /// Whether the Y coordinate was within tolerance of a grid line.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if the point was moved onto a grid intersection.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x && self.snapped_y
    }
}

/// Snaps points to grid intersections.
///
/// A point only moves when both coordinates lie within `tolerance` of a grid
/// line. A partial match leaves the point untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnapper {
    grid_size: f64,
    tolerance: f64,
}

impl Default for GridSnapper {
    fn default() -> Self {
        Self::new(GRID_SIZE)
    }
}

impl GridSnapper {
    /// Create a snapper for the given pitch. Tolerance is half the pitch.
    pub fn new(grid_size: f64) -> Self {
        Self {
            grid_size,
            tolerance: grid_size / 2.0,
        }
    }

    /// Override the per-axis tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Snap a single coordinate, returning `None` when it is not near a grid line.
    fn snap_axis(&self, value: f64) -> Option<f64> {
        let rem = value.rem_euclid(self.grid_size);
        if rem < self.tolerance {
            Some(value - rem)
        } else if rem > self.grid_size - self.tolerance {
            Some(value + (self.grid_size - rem))
        } else {
            None
        }
    }

    /// Snap a point to the nearest grid intersection.
    pub fn snap(&self, point: Point) -> SnapResult {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return SnapResult::none(point);
        }

        let x = self.snap_axis(point.x);
        let y = self.snap_axis(point.y);

        match (x, y) {
            (Some(x), Some(y)) => SnapResult {
                point: Point::new(x, y),
                snapped_x: true,
                snapped_y: true,
            },
            _ => SnapResult {
                point,
                snapped_x: x.is_some(),
                snapped_y: y.is_some(),
            },
        }
    }
}

/// Snap a point to the grid if grid snapping is enabled in `settings`.
pub fn snap_to_grid(point: Point, settings: &SnapSettings) -> Point {
    if !settings.snap_to_grid {
        return point;
    }
    GridSnapper::new(settings.grid_size).snap(point).point
}
