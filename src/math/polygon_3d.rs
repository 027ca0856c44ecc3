use super::{Point3, Vector3};

/// Arithmetic mean of a set of points. Returns the origin for an empty set.
#[must_use]
pub fn centroid_3d(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / n)
}

/// Newell's method normal of a polygon loop.
///
/// Not normalized: the length equals twice the polygon area, so a zero
/// vector signals a degenerate loop. Direction follows the right-hand rule
/// over the vertex order.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    if n < 3 {
        return normal;
    }
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}
