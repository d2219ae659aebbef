//! Planar geometry primitives.
//!
//! All coordinates are millimetres in SVG orientation (x to the right,
//! y down). A `Point` doubles as a 2D vector for directions and normals.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance used when comparing coordinates.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// True when the two points are equal within `tolerance` on both axes.
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// True for the four unit vectors `(±1, 0)` and `(0, ±1)`.
    pub fn is_axis_unit(self) -> bool {
        let horizontal = self.y.abs() <= EPSILON && (self.x.abs() - 1.0).abs() <= EPSILON;
        let vertical = self.x.abs() <= EPSILON && (self.y.abs() - 1.0).abs() <= EPSILON;
        horizontal || vertical
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
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

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Bounding box of a point set, `None` when empty or non-finite.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut iter = points.iter().filter(|p| p.x.is_finite() && p.y.is_finite());
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Shoelace signed area of an implicitly closed ring.
///
/// Positive for clockwise rings in y-down coordinates.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    0.5 * acc
}

/// Formats a millimetre value with at most three decimals and no trailing
/// zeros, as used in SVG path data.
pub fn format_mm(value: f64) -> String {
    let mut s = format!("{:.3}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Crossing point of segments `a1-a2` and `b1-b2` when they cross at a
/// single point strictly inside both.
pub fn proper_crossing(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    let straddles = |p: f64, q: f64| (p > EPSILON && q < -EPSILON) || (p < -EPSILON && q > EPSILON);
    if !(straddles(d1, d2) && straddles(d3, d4)) {
        return None;
    }
    let t = d1 / (d1 - d2);
    Some(a1 + (a2 - a1) * t)
}

fn collinear_overlap(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    if cross(a1, a2, b1).abs() > EPSILON || cross(a1, a2, b2).abs() > EPSILON {
        return false;
    }
    let dir = a2 - a1;
    let len2 = dir.dot(dir);
    if len2 <= EPSILON {
        return false;
    }
    let t0 = (b1 - a1).dot(dir) / len2;
    let t1 = (b2 - a1).dot(dir) / len2;
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    let overlap = hi.min(1.0) - lo.max(0.0);
    overlap * len2.sqrt() > EPSILON
}

/// True when no two non-adjacent edges of the implicitly closed ring cross
/// or overlap.
pub fn is_simple(points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (points[i], points[(i + 1) % n]);
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let (b1, b2) = (points[j], points[(j + 1) % n]);
            if adjacent {
                if collinear_overlap(a1, a2, b1, b2) && (a2 - a1).dot(b2 - b1) < 0.0 {
                    return false;
                }
                continue;
            }
            if proper_crossing(a1, a2, b1, b2).is_some() || collinear_overlap(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}
