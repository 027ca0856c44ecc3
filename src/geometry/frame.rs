use crate::error::{GeometryError, RbeError, Result};
use crate::math::polygon_3d::{centroid_3d, newell_normal};
use crate::math::{Matrix3, Point3, Vector3, TOLERANCE};

/// A local coordinate frame attached to a planar face.
///
/// Defined by an origin and three orthonormal axes `u`, `v`, `w`, where
/// `u` and `v` span the face plane and `w = u × v` is the face normal.
///
/// Local coordinates `(r, s, t)` map to `origin + r * u + s * v + t * w`,
/// so `t` is the signed distance from the face plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Frame {
    /// Creates a new frame from an origin and two in-plane directions.
    ///
    /// `u_dir` is normalized; `v_dir` is re-orthogonalized against it.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::Degenerate("frame directions are parallel".into()).into());
        }
        let normal = normal / normal_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a frame from stored axes, as found in exchanged interface data.
    ///
    /// The axes are taken as given; only singularity is checked.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::SingularFrame` if the axes are linearly dependent.
    pub fn from_uvw(origin: Point3, uvw: [Vector3; 3]) -> Result<Self> {
        let [u_dir, v_dir, normal] = uvw;
        if Matrix3::from_columns(&uvw).determinant().abs() < TOLERANCE {
            return Err(GeometryError::SingularFrame.into());
        }
        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Computes the frame of a planar polygon loop.
    ///
    /// The origin is the vertex centroid, `w` is the unit Newell normal
    /// (right-hand rule over the loop order, i.e. outward for a
    /// counter-clockwise face seen from outside), and `u` follows the first
    /// non-degenerate edge.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` for loops with fewer than three
    /// vertices or zero area.
    pub fn from_polygon(points: &[Point3]) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "face has {} vertices, expected at least 3",
                points.len()
            ))
            .into());
        }
        let normal = newell_normal(points);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::Degenerate("zero-area face".into()).into());
        }
        let normal = normal / normal_len;
        let origin = centroid_3d(points);

        let n = points.len();
        let u_dir = (0..n)
            .map(|i| {
                let edge = points[(i + 1) % n] - points[i];
                edge - normal * edge.dot(&normal)
            })
            .find(|edge| edge.norm() >= TOLERANCE)
            .ok_or_else(|| GeometryError::Degenerate("face edges have zero length".into()))?;

        Self::new(origin, u_dir, normal.cross(&u_dir))
    }

    /// Returns the origin point of the frame.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal (W) vector.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the three axes `[u, v, w]`.
    #[must_use]
    pub fn uvw(&self) -> [Vector3; 3] {
        [self.u_dir, self.v_dir, self.normal]
    }

    /// Returns the basis matrix with the axes as columns.
    #[must_use]
    pub fn basis(&self) -> Matrix3 {
        Matrix3::from_columns(&self.uvw())
    }

    /// Maps a world point into local `(r, s, t)` coordinates.
    ///
    /// Solves `basis * local = point - origin` rather than projecting with
    /// dot products, so non-normalized axes from exchanged data still map
    /// correctly.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::SingularFrame` if the basis cannot be solved.
    pub fn to_local(&self, point: &Point3) -> Result<Point3> {
        let local = self
            .basis()
            .lu()
            .solve(&(point - self.origin))
            .ok_or(GeometryError::SingularFrame)?;
        Ok(Point3::from(local))
    }

    /// Maps many world points into local coordinates with one factorization.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::SingularFrame` if the basis cannot be solved.
    pub fn to_local_all(&self, points: &[Point3]) -> Result<Vec<Point3>> {
        let lu = self.basis().lu();
        points
            .iter()
            .map(|p| {
                lu.solve(&(p - self.origin))
                    .map(Point3::from)
                    .ok_or_else(|| RbeError::from(GeometryError::SingularFrame))
            })
            .collect()
    }

    /// Maps local `(r, s, t)` coordinates back to world space.
    #[must_use]
    pub fn to_global(&self, local: &Point3) -> Point3 {
        self.origin + self.basis() * local.coords
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn top_face() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn frame_of_square_face() {
        let frame = Frame::from_polygon(&top_face()).unwrap();
        assert_eq!(*frame.origin(), p(0.5, 0.5, 1.0));
        assert_eq!(*frame.u_dir(), v(1.0, 0.0, 0.0));
        assert_eq!(*frame.v_dir(), v(0.0, 1.0, 0.0));
        assert_eq!(*frame.normal(), v(0.0, 0.0, 1.0));
    }

    #[test]
    fn frame_is_orthonormal() {
        let face = vec![p(0.0, 0.0, 0.0), p(2.0, 1.0, 0.5), p(1.0, 3.0, 2.0)];
        let frame = Frame::from_polygon(&face).unwrap();
        let basis = frame.basis();
        assert_abs_diff_eq!(basis.transpose() * basis, Matrix3::identity(), epsilon = 1e-12);
        assert_abs_diff_eq!(basis.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn face_vertices_have_zero_height() {
        let frame = Frame::from_polygon(&top_face()).unwrap();
        for local in frame.to_local_all(&top_face()).unwrap() {
            assert_abs_diff_eq!(local.z, 0.0);
        }
        let above = frame.to_local(&p(0.2, 0.3, 1.25)).unwrap();
        assert_abs_diff_eq!(above, p(-0.3, -0.2, 0.25), epsilon = 1e-12);
    }

    #[test]
    fn projection_round_trip() {
        let face = vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)];
        let frame = Frame::from_polygon(&face).unwrap();
        let pts = vec![p(0.25, 0.25, 0.5), p(0.5, 0.5, 0.0), p(1.0, 0.0, 0.0)];
        let local = frame.to_local_all(&pts).unwrap();
        for (world, loc) in pts.iter().zip(&local) {
            assert_abs_diff_eq!(loc.z, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(frame.to_global(loc), *world, epsilon = 1e-12);
        }
    }

    #[test]
    fn non_normalized_axes_solve_exactly() {
        let frame =
            Frame::from_uvw(p(1.0, 1.0, 1.0), [v(2.0, 0.0, 0.0), v(0.0, 2.0, 0.0), v(0.0, 0.0, 1.0)])
                .unwrap();
        let local = frame.to_local(&p(3.0, 2.0, 1.0)).unwrap();
        assert_abs_diff_eq!(local, p(1.0, 0.5, 0.0));
        assert_abs_diff_eq!(frame.to_global(&local), p(3.0, 2.0, 1.0));
    }

    #[test]
    fn zero_area_face_is_degenerate() {
        let collinear = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(matches!(
            Frame::from_polygon(&collinear),
            Err(crate::RbeError::Geometry(GeometryError::Degenerate(_)))
        ));
        assert!(Frame::from_polygon(&top_face()[..2]).is_err());
    }

    #[test]
    fn singular_axes_rejected() {
        let result =
            Frame::from_uvw(Point3::origin(), [v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0), v(0.0, 0.0, 1.0)]);
        assert!(matches!(
            result,
            Err(crate::RbeError::Geometry(GeometryError::SingularFrame))
        ));
        assert!(Frame::new(Point3::origin(), Vector3::zeros(), Vector3::y()).is_err());
        assert!(Frame::new(Point3::origin(), Vector3::x(), Vector3::x()).is_err());
    }
}
