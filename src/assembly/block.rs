use crate::error::{GeometryError, Result};
use crate::geometry::Frame;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::polygon_3d::{centroid_3d, newell_normal};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// A rigid block: a closed polyhedral mesh with planar faces.
///
/// Vertices are addressed by their index in the vertex list; each face is an
/// ordered loop of vertex indices, counter-clockwise when seen from outside.
/// Topology and geometry are fixed once the block is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    vertices: Vec<Point3>,
    faces: Vec<Vec<usize>>,
}

impl Block {
    /// Creates a block from vertex positions and face loops.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidFace` if a face has fewer than three
    /// vertices, references a missing vertex, or repeats a vertex.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Vec<usize>>) -> Result<Self> {
        for (f, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(GeometryError::InvalidFace(format!(
                    "face {f} has {} vertices, expected at least 3",
                    face.len()
                ))
                .into());
            }
            if let Some(&missing) = face.iter().find(|&&i| i >= vertices.len()) {
                return Err(GeometryError::InvalidFace(format!(
                    "face {f} references vertex {missing}, block has {}",
                    vertices.len()
                ))
                .into());
            }
            let mut sorted = face.clone();
            sorted.sort_unstable();
            if sorted.windows(2).any(|w| w[0] == w[1]) {
                return Err(
                    GeometryError::InvalidFace(format!("face {f} repeats a vertex")).into(),
                );
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Creates an axis-aligned box block between two corners.
    ///
    /// Faces are ordered bottom, top, front (-y), right (+x), back (+y), left (-x).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the box has no volume.
    pub fn from_box(min: Point3, max: Point3) -> Result<Self> {
        if max.x <= min.x || max.y <= min.y || max.z <= min.z {
            return Err(GeometryError::Degenerate(format!(
                "box corners {min} and {max} do not span a volume"
            ))
            .into());
        }
        let vertices = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        Self::new(vertices, faces)
    }

    /// Extrudes a horizontal outline from height `bottom` to height `top`.
    ///
    /// The outline may be non-convex and either orientation is accepted.
    /// Faces are ordered bottom, top, then one side face per outline edge.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the outline has fewer than three
    /// points or no area, or if `top` is not above `bottom`.
    pub fn prism(outline: &[Point2], bottom: f64, top: f64) -> Result<Self> {
        let n = outline.len();
        let area = signed_area_2d(outline);
        if n < 3 || area.abs() < TOLERANCE || top <= bottom {
            return Err(GeometryError::Degenerate(format!(
                "prism of {n} outline points between {bottom} and {top}"
            ))
            .into());
        }
        let ccw: Vec<Point2> = if area > 0.0 {
            outline.to_vec()
        } else {
            outline.iter().rev().copied().collect()
        };

        let vertices = [bottom, top]
            .iter()
            .flat_map(|&z| ccw.iter().map(move |p| Point3::new(p.x, p.y, z)))
            .collect();
        let mut faces = Vec::with_capacity(n + 2);
        faces.push((0..n).rev().collect());
        faces.push((n..2 * n).collect());
        faces.extend((0..n).map(|i| {
            let j = (i + 1) % n;
            vec![i, j, n + j, n + i]
        }));
        Self::new(vertices, faces)
    }

    /// Returns a copy of the block moved by `displacement`.
    #[must_use]
    pub fn translated(&self, displacement: &Vector3) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + displacement).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Returns all vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Returns all face loops.
    #[must_use]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the vertex loop of a face, or an empty slice if it does not exist.
    #[must_use]
    pub fn face_vertices(&self, face: usize) -> &[usize] {
        self.faces.get(face).map_or(&[], Vec::as_slice)
    }

    /// Returns the vertex positions of a face, in loop order.
    #[must_use]
    pub fn face_coordinates(&self, face: usize) -> Vec<Point3> {
        self.face_vertices(face)
            .iter()
            .map(|&i| self.vertices[i])
            .collect()
    }

    /// Centroid of the block, taken as the mean of its vertices.
    #[must_use]
    pub fn centroid(&self) -> Point3 {
        centroid_3d(&self.vertices)
    }

    /// Centroid of a face, taken as the mean of its vertices.
    #[must_use]
    pub fn face_centroid(&self, face: usize) -> Point3 {
        centroid_3d(&self.face_coordinates(face))
    }

    /// Unit normal of a face.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the face has zero area.
    pub fn face_normal(&self, face: usize) -> Result<Vector3> {
        let normal = newell_normal(&self.face_coordinates(face));
        normal
            .try_normalize(0.0)
            .ok_or_else(|| GeometryError::Degenerate(format!("face {face} has zero area")).into())
    }

    /// Area of a face.
    #[must_use]
    pub fn face_area(&self, face: usize) -> f64 {
        0.5 * newell_normal(&self.face_coordinates(face)).norm()
    }

    /// Local frame of a face: centroid origin, first-edge `u`, outward `w`.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` if the face is degenerate.
    pub fn face_frame(&self, face: usize) -> Result<Frame> {
        Frame::from_polygon(&self.face_coordinates(face))
    }

    /// Frames of all faces, in face order.
    #[must_use]
    pub fn frames(&self) -> Vec<Result<Frame>> {
        (0..self.face_count()).map(|f| self.face_frame(f)).collect()
    }
}
