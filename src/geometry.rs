//! Geometry kernel
//!
//! Stateless helpers shared by the split strategies: infinite line
//! intersection, point distance and point-in-triangle containment.

use serde::{Deserialize, Serialize};

/// Tolerance used for "parallel" and "on the boundary" decisions.
///
/// Comparisons are scaled by the lengths of the vectors involved, so the
/// threshold behaves like the sine of an angle and does not depend on the
/// magnitude of the coordinates.
pub const EPSILON: f64 = 1e-10;

/// A 2D point in texture/image coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Z component of the cross product of two vectors
    #[inline]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Intersection of the infinite line through `p1`,`p2` with the infinite
/// line through `p3`,`p4`.
///
/// Returns `None` when the lines are parallel or when either line is
/// degenerate (both points equal). Callers treat `None` as "vanishing point
/// at infinity".
pub fn intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let d1 = p2 - p1;
    let d2 = p4 - p3;

    let det = d1.cross(d2);
    if det.abs() <= EPSILON * d1.length() * d2.length() {
        return None;
    }

    let t = (p3 - p1).cross(d2) / det;
    let point = Point::new(p1.x + d1.x * t, p1.y + d1.y * t);
    point.is_finite().then_some(point)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).length()
}

/// Whether `point` lies inside triangle `a`,`b`,`c` or on its boundary
pub fn triangle_contains(point: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = edge_side(point, a, b);
    let d2 = edge_side(point, b, c);
    let d3 = edge_side(point, c, a);

    let has_neg = d1 < 0 || d2 < 0 || d3 < 0;
    let has_pos = d1 > 0 || d2 > 0 || d3 > 0;

    !(has_neg && has_pos)
}

/// Which side of the directed edge `from`->`to` the point is on:
/// -1, 0 (on the line within tolerance) or 1
fn edge_side(point: Point, from: Point, to: Point) -> i8 {
    let edge = to - from;
    let offset = point - from;
    let cross = edge.cross(offset);

    if cross.abs() <= EPSILON * edge.length() * offset.length() {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}
