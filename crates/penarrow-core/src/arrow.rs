//! Arrow shaping.
//!
//! Turns a drag from an anchor to the pointer into a straight shaft with a
//! two-barb head. The head is emitted as four points (`tip, barb, tip, barb`)
//! so a plain polyline renderer draws the barbs as separate segments.

use crate::settings::{AnchorSnap, SnapSettings};
use crate::snap::snap_to_grid;
use crate::stroke::StrokeBuffer;
use kurbo::{Point, Vec2};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

/// Barb length as a fraction of the shaft length (barb = shaft / ratio).
pub const ARROW_HEAD_RATIO: f64 = 8.0;

/// Half-angle between the two barbs.
pub const BARB_SPREAD: f64 = PI / 6.0;

/// How close (in radians) the shaft must be to a canonical direction to snap.
pub const ANGLE_SNAP_EPSILON: f64 = 0.2;

/// The eight canonical shaft directions, in canvas space (+y points down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    NorthEast,
    NorthWest,
    West,
    South,
    North,
}

impl Direction {
    /// Angle of the direction in radians, as returned by `atan2`.
    pub fn angle(self) -> f64 {
        match self {
            Direction::East => 0.0,
            Direction::SouthEast => FRAC_PI_4,
            Direction::SouthWest => 3.0 * FRAC_PI_4,
            Direction::NorthEast => -FRAC_PI_4,
            Direction::NorthWest => -3.0 * FRAC_PI_4,
            Direction::West => PI,
            Direction::South => FRAC_PI_2,
            Direction::North => -FRAC_PI_2,
        }
    }
}

/// Where a snapped tip is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TipRule {
    /// Keep the pointer's x, use the anchor's y.
    AnchorRow,
    /// Keep the anchor's x, use the pointer's y.
    AnchorColumn,
    /// Anchor plus the shaft length along a diagonal with the given signs.
    Diagonal { sx: f64, sy: f64 },
}

/// One entry of the rotation snap table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBucket {
    pub direction: Direction,
    /// Compare against `|angle|` instead of `angle` (for the ±π seam).
    symmetric: bool,
    /// Angle the barbs are computed from.
    head_angle: f64,
    /// Barb y-offsets are added instead of subtracted.
    flip_y: bool,
    tip: TipRule,
}

/// Rotation snap table, in match priority order. First match wins.
///
/// The two upper diagonals reuse the positive head angle of their lower
/// counterpart and flip the barb y-offset instead.
pub static ANGLE_BUCKETS: [AngleBucket; 8] = [
    AngleBucket {
        direction: Direction::East,
        symmetric: false,
        head_angle: 0.0,
        flip_y: false,
        tip: TipRule::AnchorRow,
    },
    AngleBucket {
        direction: Direction::SouthEast,
        symmetric: false,
        head_angle: FRAC_PI_4,
        flip_y: false,
        tip: TipRule::Diagonal { sx: 1.0, sy: 1.0 },
    },
    AngleBucket {
        direction: Direction::SouthWest,
        symmetric: false,
        head_angle: 3.0 * FRAC_PI_4,
        flip_y: false,
        tip: TipRule::Diagonal { sx: -1.0, sy: 1.0 },
    },
    AngleBucket {
        direction: Direction::NorthEast,
        symmetric: false,
        head_angle: FRAC_PI_4,
        flip_y: true,
        tip: TipRule::Diagonal { sx: 1.0, sy: -1.0 },
    },
    AngleBucket {
        direction: Direction::NorthWest,
        symmetric: false,
        head_angle: 3.0 * FRAC_PI_4,
        flip_y: true,
        tip: TipRule::Diagonal { sx: -1.0, sy: -1.0 },
    },
    AngleBucket {
        direction: Direction::West,
        symmetric: true,
        head_angle: -PI,
        flip_y: false,
        tip: TipRule::AnchorRow,
    },
    AngleBucket {
        direction: Direction::South,
        symmetric: false,
        head_angle: FRAC_PI_2,
        flip_y: false,
        tip: TipRule::AnchorColumn,
    },
    AngleBucket {
        direction: Direction::North,
        symmetric: false,
        head_angle: -FRAC_PI_2,
        flip_y: false,
        tip: TipRule::AnchorColumn,
    },
];

impl AngleBucket {
    /// Check if a raw shaft angle falls into this bucket.
    pub fn matches(&self, angle: f64) -> bool {
        let angle = if self.symmetric { angle.abs() } else { angle };
        (angle - self.direction.angle()).abs() < ANGLE_SNAP_EPSILON
    }

    /// Find the first bucket matching `angle`.
    pub fn find(angle: f64) -> Option<&'static AngleBucket> {
        ANGLE_BUCKETS.iter().find(|bucket| bucket.matches(angle))
    }

    fn tip(&self, shaft: &ShaftGeometry) -> Point {
        let ShaftGeometry { anchor, end, dist, .. } = *shaft;
        match self.tip {
            TipRule::AnchorRow => Point::new(end.x, anchor.y),
            TipRule::AnchorColumn => Point::new(anchor.x, end.y),
            TipRule::Diagonal { sx, sy } => {
                let offset = dist * FRAC_1_SQRT_2;
                anchor + Vec2::new(sx * offset, sy * offset)
            }
        }
    }
}

/// Shaft measurements for one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftGeometry {
    pub anchor: Point,
    pub end: Point,
    /// Shaft length.
    pub dist: f64,
    /// Shaft direction in radians, in (-π, π]. Zero for a zero-length shaft.
    pub angle: f64,
    /// Barb length.
    pub arrow_dist: f64,
}

impl ShaftGeometry {
    pub fn between(anchor: Point, end: Point) -> Self {
        let v = end - anchor;
        let dist = v.hypot();
        let angle = if dist > 0.0 { v.atan2() } else { 0.0 };
        Self {
            anchor,
            end,
            dist,
            angle,
            arrow_dist: dist / ARROW_HEAD_RATIO,
        }
    }
}

/// The generated head of an arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub barbs: [Point; 2],
    /// Angle the barbs were computed from.
    pub angle: f64,
    /// The canonical direction the shaft snapped to, if any.
    pub bucket: Option<Direction>,
}

impl ArrowHead {
    fn emit(tip: Point, angle: f64, arrow_dist: f64, flip_y: bool, bucket: Option<Direction>) -> Self {
        let y_sign = if flip_y { -1.0 } else { 1.0 };
        let barb = |theta: f64| {
            Point::new(
                tip.x - arrow_dist * theta.cos(),
                tip.y - y_sign * arrow_dist * theta.sin(),
            )
        };
        Self {
            tip,
            barbs: [barb(angle + BARB_SPREAD), barb(angle - BARB_SPREAD)],
            angle,
            bucket,
        }
    }

    /// Points in stroke order: tip, first barb, tip, second barb.
    pub fn points(&self) -> [Point; 4] {
        [self.tip, self.barbs[0], self.tip, self.barbs[1]]
    }
}

/// Compute the arrow head for a shaft from `anchor` to `end`.
///
/// With rotation snapping on and shift released, a shaft within
/// [`ANGLE_SNAP_EPSILON`] of a canonical direction is forced onto it and the
/// tip is rebuilt from the anchor. Otherwise the head sits on `end` at the raw angle.
pub fn shape_arrow(anchor: Point, end: Point, shift_down: bool, settings: &SnapSettings) -> ArrowHead {
    let shaft = ShaftGeometry::between(anchor, end);

    if settings.effective(shift_down).snap_rotation {
        if let Some(bucket) = AngleBucket::find(shaft.angle) {
            log::trace!("Arrow snapped to {:?} (raw angle {:.3})", bucket.direction, shaft.angle);
            return ArrowHead::emit(
                bucket.tip(&shaft),
                bucket.head_angle,
                shaft.arrow_dist,
                bucket.flip_y,
                Some(bucket.direction),
            );
        }
    }

    ArrowHead::emit(end, shaft.angle, shaft.arrow_dist, false, None)
}

/// Reshapes a stroke buffer into an arrow on every pointer move.
///
/// One shaper is used per gesture. It only remembers whether the anchor has
/// been through its first shaping event, which drives [`AnchorSnap::Once`].
#[derive(Debug, Clone, Default)]
pub struct ArrowShaper {
    anchor_seen: bool,
}

impl ArrowShaper {
    /// Create a new shaper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current gesture.
    pub fn reset(&mut self) {
        self.anchor_seen = false;
    }

    /// Rebuild the arrow in `buffer` for the pointer at `end`.
    ///
    /// An empty buffer just receives `end` as its anchor. Otherwise the anchor
    /// is optionally grid-snapped, everything behind it is dropped, and the four
    /// head points are appended. Returns the generated head.
    pub fn draw_shape<B>(
        &mut self,
        buffer: &mut B,
        end: Point,
        shift_down: bool,
        settings: &SnapSettings,
    ) -> Option<ArrowHead>
    where
        B: StrokeBuffer + ?Sized,
    {
        let Some(mut anchor) = buffer.point(0) else {
            buffer.add_point(end);
            return None;
        };

        let first_event = !self.anchor_seen;
        self.anchor_seen = true;

        let effective = settings.effective(shift_down);
        let resnap = match settings.anchor_snap {
            AnchorSnap::Once => first_event,
            AnchorSnap::EveryEvent => true,
        };
        if effective.snap_to_grid && resnap {
            let snapped = snap_to_grid(anchor, &effective);
            if snapped != anchor {
                log::debug!("Anchor snapped from {:?} to {:?}", anchor, snapped);
                buffer.set_first_point(snapped);
                anchor = snapped;
            }
        }

        if buffer.point_count() > 1 {
            buffer.truncate_to_anchor();
        }

        let head = shape_arrow(anchor, end, shift_down, settings);
        for point in head.points() {
            buffer.add_point(point);
        }
        Some(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;

    const TOL: f64 = 1e-9;

    fn rotation_settings() -> SnapSettings {
        SnapSettings {
            snap_rotation: true,
            ..SnapSettings::default()
        }
    }

    fn polar(anchor: Point, dist: f64, angle: f64) -> Point {
        anchor + Vec2::from_angle(angle) * dist
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-6, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_bootstrap_appends_single_point() {
        let mut stroke = Stroke::new();
        let mut shaper = ArrowShaper::new();
        let head = shaper.draw_shape(&mut stroke, Point::new(5.0, 7.0), false, &SnapSettings::snapping());
        assert!(head.is_none());
        assert_eq!(stroke.points(), &[Point::new(5.0, 7.0)]);
    }

    #[test]
    fn test_buffer_holds_anchor_plus_head() {
        let mut stroke = Stroke::with_anchor(Point::new(10.0, 10.0));
        let mut shaper = ArrowShaper::new();
        for i in 0..5 {
            let end = Point::new(50.0 + i as f64 * 13.0, 80.0 - i as f64 * 7.0);
            shaper.draw_shape(&mut stroke, end, false, &rotation_settings());
            assert_eq!(stroke.len(), 5);
            assert_eq!(stroke.anchor(), Some(Point::new(10.0, 10.0)));
        }
    }

    #[test]
    fn test_repeated_event_is_idempotent() {
        let mut stroke = Stroke::with_anchor(Point::new(10.0, 10.0));
        let mut shaper = ArrowShaper::new();
        let end = Point::new(80.0, 45.0);
        shaper.draw_shape(&mut stroke, end, false, &rotation_settings());
        let first = stroke.points().to_vec();
        shaper.draw_shape(&mut stroke, end, false, &rotation_settings());
        assert_eq!(stroke.points(), first.as_slice());
    }

    #[test]
    fn test_emission_order() {
        let mut stroke = Stroke::with_anchor(Point::ZERO);
        let head = ArrowShaper::new()
            .draw_shape(&mut stroke, Point::new(30.0, 70.0), false, &SnapSettings::default())
            .unwrap();
        assert_eq!(stroke.tail(), &head.points());
        assert_eq!(stroke.tail()[0], stroke.tail()[2]);
    }

    #[test]
    fn test_raw_barbs_are_symmetric() {
        let anchor = Point::new(20.0, 30.0);
        let angle = 0.3;
        let end = polar(anchor, 160.0, angle);
        let head = shape_arrow(anchor, end, false, &SnapSettings::default());

        assert!(head.bucket.is_none());
        assert_close(head.tip, end);
        for (barb, expected) in head.barbs.iter().zip([angle + BARB_SPREAD, angle - BARB_SPREAD]) {
            let back = head.tip - *barb;
            assert!((back.hypot() - 20.0).abs() < 1e-6);
            assert!((back.atan2() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bucket_boundary_inside() {
        let anchor = Point::new(5.0, 5.0);
        let end = polar(anchor, 100.0, FRAC_PI_4 - 0.19);
        let head = shape_arrow(anchor, end, false, &rotation_settings());

        assert_eq!(head.bucket, Some(Direction::SouthEast));
        assert!((head.angle - FRAC_PI_4).abs() < TOL);
        let offset = 100.0 / 2.0_f64.sqrt();
        assert_close(head.tip, Point::new(5.0 + offset, 5.0 + offset));
    }

    #[test]
    fn test_bucket_boundary_outside() {
        let anchor = Point::new(5.0, 5.0);
        let angle = FRAC_PI_4 - 0.21;
        let end = polar(anchor, 100.0, angle);
        let head = shape_arrow(anchor, end, false, &rotation_settings());

        assert!(head.bucket.is_none());
        assert!((head.angle - angle).abs() < 1e-9);
        assert_eq!(head.tip, end);
    }

    #[test]
    fn test_every_bucket_aligns_shaft() {
        let anchor = Point::new(200.0, 200.0);
        for bucket in &ANGLE_BUCKETS {
            let canonical = bucket.direction.angle();
            let end = polar(anchor, 100.0, canonical + 0.1);
            let head = shape_arrow(anchor, end, false, &rotation_settings());

            assert_eq!(head.bucket, Some(bucket.direction));

            // Tip lies exactly on the canonical ray.
            let shaft = head.tip - anchor;
            let along = Vec2::from_angle(canonical);
            assert!(shaft.cross(along).abs() < 1e-6, "{:?}", bucket.direction);
            assert!(shaft.dot(along) > 0.0);

            // Barbs trail the tip, spread evenly about the shaft.
            for barb in head.barbs {
                let back = head.tip - barb;
                assert!((back.hypot() - 12.5).abs() < 1e-6);
                let cos = back.dot(along) / back.hypot();
                assert!((cos - BARB_SPREAD.cos()).abs() < 1e-6, "{:?}", bucket.direction);
            }
            assert!((head.barbs[0] - head.barbs[1]).hypot() > 1.0);
        }
    }

    #[test]
    fn test_upper_diagonal_flips_y_offsets() {
        let anchor = Point::ZERO;
        let end = Point::new(100.0, -100.0);
        let head = shape_arrow(anchor, end, false, &rotation_settings());
        assert_eq!(head.bucket, Some(Direction::NorthEast));
        assert!((head.angle - FRAC_PI_4).abs() < TOL);

        let dist = end.to_vec2().hypot();
        let arrow_dist = dist / ARROW_HEAD_RATIO;
        let offset = dist * FRAC_1_SQRT_2;
        let tip = Point::new(offset, -offset);
        assert_close(head.tip, tip);
        assert_close(
            head.barbs[0],
            Point::new(
                tip.x - arrow_dist * (FRAC_PI_4 + BARB_SPREAD).cos(),
                tip.y + arrow_dist * (FRAC_PI_4 + BARB_SPREAD).sin(),
            ),
        );
        assert_close(
            head.barbs[1],
            Point::new(
                tip.x - arrow_dist * (FRAC_PI_4 - BARB_SPREAD).cos(),
                tip.y + arrow_dist * (FRAC_PI_4 - BARB_SPREAD).sin(),
            ),
        );
        // Both barbs sit back toward the anchor.
        for barb in head.barbs {
            assert!(barb.x < tip.x);
            assert!(barb.y > tip.y);
        }
    }

    #[test]
    fn test_west_bucket_handles_seam() {
        let anchor = Point::new(100.0, 100.0);
        for angle in [PI - 0.1, -PI + 0.1] {
            let head = shape_arrow(anchor, polar(anchor, 80.0, angle), false, &rotation_settings());
            assert_eq!(head.bucket, Some(Direction::West));
            assert!((head.angle + PI).abs() < TOL);
            assert!((head.tip.y - anchor.y).abs() < TOL);
        }
    }

    #[test]
    fn test_shift_overrides_rotation_snap() {
        let anchor = Point::new(10.0, 20.0);
        let settings = rotation_settings();

        let near = polar(anchor, 120.0, FRAC_PI_2 + 0.05);
        assert_ne!(
            shape_arrow(anchor, near, false, &settings),
            shape_arrow(anchor, near, true, &settings)
        );

        let far = polar(anchor, 120.0, 1.2);
        assert_eq!(
            shape_arrow(anchor, far, false, &settings),
            shape_arrow(anchor, far, true, &settings)
        );
    }

    #[test]
    fn test_horizontal_drag_end_to_end() {
        let mut stroke = Stroke::with_anchor(Point::ZERO);
        let mut shaper = ArrowShaper::new();
        let head = shaper
            .draw_shape(&mut stroke, Point::new(100.0, 0.0), false, &rotation_settings())
            .unwrap();

        assert_eq!(head.bucket, Some(Direction::East));
        assert_eq!(head.angle, 0.0);
        let dx = 100.0 - 12.5 * BARB_SPREAD.cos();
        let dy = 12.5 * BARB_SPREAD.sin();
        assert_close(stroke.points()[1], Point::new(100.0, 0.0));
        assert_close(stroke.points()[2], Point::new(dx, -dy));
        assert_close(stroke.points()[3], Point::new(100.0, 0.0));
        assert_close(stroke.points()[4], Point::new(dx, dy));
    }

    #[test]
    fn test_degenerate_shaft() {
        let anchor = Point::new(42.0, 42.0);
        let head = shape_arrow(anchor, anchor, false, &rotation_settings());
        assert_eq!(head.angle, 0.0);
        for point in head.points() {
            assert_eq!(point, anchor);
        }
    }

    #[test]
    fn test_anchor_snapped_on_first_event() {
        let mut stroke = Stroke::with_anchor(Point::new(3.0, 3.0));
        let mut shaper = ArrowShaper::new();
        shaper.draw_shape(&mut stroke, Point::new(60.0, 90.0), false, &SnapSettings::snapping());
        let anchor = stroke.anchor().unwrap();
        assert!(anchor.x.abs() < TOL);
        assert!(anchor.y.abs() < TOL);
    }

    #[test]
    fn test_shift_keeps_anchor() {
        let mut stroke = Stroke::with_anchor(Point::new(3.0, 3.0));
        ArrowShaper::new().draw_shape(&mut stroke, Point::new(60.0, 90.0), true, &SnapSettings::snapping());
        assert_eq!(stroke.anchor(), Some(Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_anchor_snap_once() {
        let settings = SnapSettings::snapping();
        let mut stroke = Stroke::with_anchor(Point::new(3.0, 3.0));
        let mut shaper = ArrowShaper::new();

        shaper.draw_shape(&mut stroke, Point::new(60.0, 90.0), true, &settings);
        shaper.draw_shape(&mut stroke, Point::new(61.0, 90.0), false, &settings);
        assert_eq!(stroke.anchor(), Some(Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_anchor_snap_every_event() {
        let settings = SnapSettings {
            anchor_snap: AnchorSnap::EveryEvent,
            ..SnapSettings::snapping()
        };
        let mut stroke = Stroke::with_anchor(Point::new(3.0, 3.0));
        let mut shaper = ArrowShaper::new();

        shaper.draw_shape(&mut stroke, Point::new(60.0, 90.0), true, &settings);
        assert_eq!(stroke.anchor(), Some(Point::new(3.0, 3.0)));
        shaper.draw_shape(&mut stroke, Point::new(61.0, 90.0), false, &settings);
        let anchor = stroke.anchor().unwrap();
        assert!(anchor.x.abs() < TOL);
        assert!(anchor.y.abs() < TOL);
    }

    #[test]
    fn test_head_uses_snapped_anchor() {
        let mut stroke = Stroke::with_anchor(Point::new(3.0, 3.0));
        let head = ArrowShaper::new()
            .draw_shape(&mut stroke, Point::new(100.0, 2.0), false, &SnapSettings::snapping())
            .unwrap();
        assert_eq!(head.bucket, Some(Direction::East));
        assert!(head.tip.y.abs() < TOL);
    }

    #[test]
    fn test_reset_allows_new_gesture() {
        let settings = SnapSettings::snapping();
        let mut shaper = ArrowShaper::new();

        let mut first = Stroke::with_anchor(Point::new(3.0, 3.0));
        shaper.draw_shape(&mut first, Point::new(60.0, 90.0), false, &settings);

        shaper.reset();
        let mut second = Stroke::with_anchor(Point::new(31.0, 31.0));
        shaper.draw_shape(&mut second, Point::new(90.0, 90.0), false, &settings);
        let anchor = second.anchor().unwrap();
        assert!((anchor.x - 2.0 * crate::snap::GRID_SIZE).abs() < TOL);
    }
}
