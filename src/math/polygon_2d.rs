use geo::{BooleanOps, Intersects};

use super::{Point2, Point3, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// A polygon in a face's local 2D coordinate system.
///
/// Stored as an open loop: the closing vertex is never repeated.
/// Inputs are assumed to lie exactly in the plane; coplanarity filtering is
/// done before points reach this type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon2 {
    points: Vec<Point2>,
}

impl Polygon2 {
    /// Creates a polygon from an open vertex loop.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a polygon from local 3D coordinates, dropping the third
    /// (out-of-plane) coordinate.
    #[must_use]
    pub fn from_local(points: &[Point3]) -> Self {
        Self::new(points.iter().map(|p| Point2::new(p.x, p.y)).collect())
    }

    /// Returns the vertices of the polygon.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area (shoelace formula). Positive for counter-clockwise loops.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points)
    }

    /// Unsigned area. Zero for points, segments and empty polygons.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty polygon.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.points.first()?;
        Some(self.points.iter().skip(1).fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Returns `true` if the axis-aligned bounds of both polygons overlap
    /// (touching included).
    #[must_use]
    pub fn bounds_overlap(&self, other: &Self) -> bool {
        let (Some((lo_a, hi_a)), Some((lo_b, hi_b))) = (self.bounds(), other.bounds()) else {
            return false;
        };
        lo_a.x <= hi_b.x && lo_b.x <= hi_a.x && lo_a.y <= hi_b.y && lo_b.y <= hi_a.y
    }

    /// Returns `true` if the two polygons share at least one point.
    ///
    /// Touching along an edge or at a vertex counts as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.len() < 3 || other.len() < 3 || !self.bounds_overlap(other) {
            return false;
        }
        self.to_geo().intersects(&other.to_geo())
    }

    /// Computes the overlapping region of two simple polygons.
    ///
    /// Either operand may be non-convex and either orientation is accepted.
    /// The result is counter-clockwise, cleaned of repeated and collinear
    /// vertices, and starts at its leftmost-bottom vertex. Overlaps without
    /// area (shared edges or vertices) give an empty polygon.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::MalformedIntersection` if the overlap is not a
    /// single region without holes.
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        if self.len() < 3 || other.len() < 3 || !self.bounds_overlap(other) {
            return Ok(Self::default());
        }

        let overlap = self.to_geo().intersection(&other.to_geo());
        let region = match overlap.0.as_slice() {
            [] => return Ok(Self::default()),
            [region] => region,
            regions => {
                return Err(GeometryError::MalformedIntersection(format!(
                    "overlap splits into {} regions",
                    regions.len()
                ))
                .into())
            }
        };
        if !region.interiors().is_empty() {
            return Err(GeometryError::MalformedIntersection(format!(
                "overlap has {} holes",
                region.interiors().len()
            ))
            .into());
        }

        let mut points: Vec<Point2> = region
            .exterior()
            .coords()
            .map(|c| Point2::new(c.x, c.y))
            .collect();
        points = remove_redundant_vertices(points);
        if points.len() < 3 {
            return Ok(Self::default());
        }
        if signed_area_2d(&points) < 0.0 {
            points.reverse();
        }
        Ok(Self::new(rotate_to_canonical_start(&points)))
    }

    fn to_geo(&self) -> geo::Polygon<f64> {
        let ring: Vec<(f64, f64)> = self.points.iter().map(|p| (p.x, p.y)).collect();
        geo::Polygon::new(geo::LineString::from(ring), Vec::new())
    }
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Rotates a closed polygon so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Drops repeated vertices (including a repeated closing vertex) and
/// vertices lying on the line through their neighbours.
fn remove_redundant_vertices(mut points: Vec<Point2>) -> Vec<Point2> {
    points.dedup_by(|a, b| (*a - *b).norm() < TOLERANCE);
    while points.len() > 1 && (points[0] - points[points.len() - 1]).norm() < TOLERANCE {
        points.pop();
    }

    let mut changed = true;
    while changed && points.len() >= 3 {
        changed = false;
        let n = points.len();
        for i in 0..n {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            if cross_2d(&(cur - prev), &(next - cur)).abs() < TOLERANCE {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }
    points
}

#[inline]
fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
