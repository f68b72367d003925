// 2D geometry primitives: points and polygons over court coordinates.
//
// Everything here is plain f64 math with no I/O. Polygons are stored as a
// flat vertex ring; containment is boundary-inclusive so that a shot landing
// exactly on a region line still matches (precedence order then decides
// between neighbors sharing that line).

use serde::Serialize;
use thiserror::Error;

/// Tolerance for degenerate-geometry checks (coincident vertices, zero area,
/// point-on-segment tests).
pub const GEOM_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon vertex {index} is not finite: ({x}, {y})")]
    NonFiniteVertex { index: usize, x: f64, y: f64 },

    #[error("polygon has near-zero area")]
    ZeroArea,

    #[error("polygon edges starting at vertices {a} and {b} intersect")]
    SelfIntersecting { a: usize, b: usize },
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position on the court, in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// A simple polygon given by its vertex ring (implicitly closed).
///
/// `Polygon::new` is the validating constructor used for the fixed court
/// regions: it rejects non-finite vertices, collapses consecutive duplicates,
/// and fails on self-intersection or near-zero area, so any bad geometry
/// constant is caught at construction time rather than surfacing as a wrong
/// classification later.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validate-and-repair constructor.
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        for (index, v) in vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(GeometryError::NonFiniteVertex {
                    index,
                    x: v.x,
                    y: v.y,
                });
            }
        }

        let vertices = dedup_ring(vertices);
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }

        let poly = Polygon { vertices };
        if poly.area() < GEOM_EPSILON {
            return Err(GeometryError::ZeroArea);
        }
        poly.check_simple()?;
        Ok(poly)
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (ya, yb) = (y0.min(y1), y0.max(y1));
        Polygon {
            vertices: vec![
                Point::new(xa, ya),
                Point::new(xb, ya),
                Point::new(xb, yb),
                Point::new(xa, yb),
            ],
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Unsigned polygon area (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        let mut twice = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        twice.abs() / 2.0
    }

    /// Boundary-inclusive point containment (even-odd ray cast with an
    /// explicit on-edge check first).
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        for i in 0..n {
            if point_on_segment(p, self.vertices[i], self.vertices[(i + 1) % n]) {
                return true;
            }
        }

        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (b.x - a.x) * (p.y - a.y) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Clip against the half-plane `n · p <= c`, returning `None` when the
    /// result is empty or degenerate. Convexity is preserved, which is all
    /// the Voronoi construction needs.
    pub fn clip_halfplane(&self, normal: (f64, f64), c: f64) -> Option<Polygon> {
        let n = self.vertices.len();
        let side = |p: Point| normal.0 * p.x + normal.1 * p.y - c;

        let mut out: Vec<Point> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let cur = self.vertices[i];
            let next = self.vertices[(i + 1) % n];
            let s_cur = side(cur);
            let s_next = side(next);

            if s_cur <= GEOM_EPSILON {
                out.push(cur);
            }
            // Edge crosses the boundary: emit the intersection point.
            if (s_cur > GEOM_EPSILON) != (s_next > GEOM_EPSILON) {
                let denom = s_cur - s_next;
                if denom.abs() > GEOM_EPSILON {
                    let t = s_cur / denom;
                    out.push(Point::new(
                        cur.x + (next.x - cur.x) * t,
                        cur.y + (next.y - cur.y) * t,
                    ));
                }
            }
        }

        let out = dedup_ring(out);
        if out.len() < 3 {
            return None;
        }
        let poly = Polygon { vertices: out };
        if poly.area() < GEOM_EPSILON {
            return None;
        }
        Some(poly)
    }

    /// Reject rings whose non-adjacent edges cross.
    fn check_simple(&self) -> Result<(), GeometryError> {
        let n = self.vertices.len();
        for i in 0..n {
            let (a1, a2) = (self.vertices[i], self.vertices[(i + 1) % n]);
            for j in (i + 1)..n {
                // Skip edges sharing a vertex with edge i.
                if j == i || (j + 1) % n == i || (i + 1) % n == j {
                    continue;
                }
                let (b1, b2) = (self.vertices[j], self.vertices[(j + 1) % n]);
                if segments_cross(a1, a2, b1, b2) {
                    return Err(GeometryError::SelfIntersecting { a: i, b: j });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Segment helpers
// ---------------------------------------------------------------------------

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// True when `p` lies on the closed segment `ab` (within tolerance).
fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    let len = a.distance(b);
    if len < GEOM_EPSILON {
        return p.distance(a) < GEOM_EPSILON;
    }
    // Perpendicular distance scaled by segment length.
    if cross(a, b, p).abs() / len > GEOM_EPSILON.max(1e-9 * len) {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    dot >= -GEOM_EPSILON && dot <= len * len + GEOM_EPSILON
}

/// Proper crossing test for open segments; touching at endpoints does not
/// count (adjacent polygon edges always touch).
fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    ((d1 > GEOM_EPSILON && d2 < -GEOM_EPSILON) || (d1 < -GEOM_EPSILON && d2 > GEOM_EPSILON))
        && ((d3 > GEOM_EPSILON && d4 < -GEOM_EPSILON) || (d3 < -GEOM_EPSILON && d4 > GEOM_EPSILON))
}

/// Drop consecutive (near-)duplicate vertices, including a duplicated
/// closing vertex. Arc discretization routinely produces these.
fn dedup_ring(vertices: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if let Some(last) = out.last() {
            if last.distance_sq(v) < GEOM_EPSILON * GEOM_EPSILON {
                continue;
            }
        }
        out.push(v);
    }
    while out.len() > 1 {
        let first = out[0];
        let last = *out.last().unwrap();
        if first.distance_sq(last) < GEOM_EPSILON * GEOM_EPSILON {
            out.pop();
        } else {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
