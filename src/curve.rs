//! Boundary curves
//!
//! The split strategies only ever read a curve through the [`Curve`] trait,
//! so any parametric curve can bound a region. [`CubicBezier`] is the
//! implementation used by mesh documents.

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, Point};

/// Flatness tolerance used when measuring cubic arc length
pub const ARC_LENGTH_ACCURACY: f64 = 1e-3;

/// Subdivision depth limit for arc length measurement
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// A read-only parametric curve over `t` in `[0, 1]`
pub trait Curve {
    /// Point on the curve at parameter `t`
    fn point_at(&self, t: f64) -> Point;

    /// Total length of the curve from `t = 0` to `t = 1`
    fn arc_length(&self) -> f64;

    fn start(&self) -> Point {
        self.point_at(0.0)
    }

    fn end(&self) -> Point {
        self.point_at(1.0)
    }
}

impl<C: Curve + ?Sized> Curve for &C {
    fn point_at(&self, t: f64) -> Point {
        (**self).point_at(t)
    }

    fn arc_length(&self) -> f64 {
        (**self).arc_length()
    }

    fn start(&self) -> Point {
        (**self).start()
    }

    fn end(&self) -> Point {
        (**self).end()
    }
}

/// A cubic Bézier curve defined by 4 control points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CubicBezier {
    pub points: [Point; 4],
}

impl CubicBezier {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self {
            points: [p0, p1, p2, p3],
        }
    }

    /// A straight segment with control points at the thirds, so that the
    /// curve parameter is proportional to the distance travelled
    pub fn line(from: Point, to: Point) -> Self {
        Self::new(from, from.lerp(to, 1.0 / 3.0), from.lerp(to, 2.0 / 3.0), to)
    }

    /// Split the curve at parameter `t` (de Casteljau)
    pub fn split(&self, t: f64) -> (Self, Self) {
        let [p0, p1, p2, p3] = self.points;

        let p01 = p0.lerp(p1, t);
        let p12 = p1.lerp(p2, t);
        let p23 = p2.lerp(p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);

        (Self::new(p0, p01, p012, mid), Self::new(mid, p123, p23, p3))
    }

    /// Largest distance of the inner control points from the chord
    fn flatness(&self) -> f64 {
        let [p0, p1, p2, p3] = self.points;
        let chord = p3 - p0;
        let len = chord.length();

        if len == 0.0 {
            return distance(p0, p1).max(distance(p0, p2));
        }

        let d1 = chord.cross(p1 - p0).abs() / len;
        let d2 = chord.cross(p2 - p0).abs() / len;
        d1.max(d2)
    }

    /// Arc length by adaptive subdivision until each piece is flat within
    /// `accuracy`, summing the chord lengths
    pub fn arc_length_with_accuracy(&self, accuracy: f64) -> f64 {
        self.subdivided_length(accuracy, 0)
    }

    fn subdivided_length(&self, accuracy: f64, depth: u32) -> f64 {
        if depth >= MAX_SUBDIVISION_DEPTH || self.flatness() <= accuracy {
            return distance(self.points[0], self.points[3]);
        }

        let (left, right) = self.split(0.5);
        left.subdivided_length(accuracy, depth + 1) + right.subdivided_length(accuracy, depth + 1)
    }
}

impl Curve for CubicBezier {
    fn point_at(&self, t: f64) -> Point {
        let [p0, p1, p2, p3] = self.points;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        Point::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        )
    }

    fn arc_length(&self) -> f64 {
        self.arc_length_with_accuracy(ARC_LENGTH_ACCURACY)
    }

    fn start(&self) -> Point {
        self.points[0]
    }

    fn end(&self) -> Point {
        self.points[3]
    }
}
