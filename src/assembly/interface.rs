use serde::{Deserialize, Serialize};

use super::BlockKey;
use crate::geometry::Frame;
use crate::math::{Point3, Vector3};

slotmap::new_key_type! {
    /// Unique identifier for an interface (edge) in an assembly.
    pub struct InterfaceKey;
}

/// Classification of a contact between two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    /// Two planar faces overlapping in a region of positive area.
    FaceFace,
}

/// Geometry of a planar contact region between two blocks.
///
/// Created once by interface identification and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    /// Contact classification.
    pub interface_type: InterfaceType,
    /// Contact area.
    pub size: f64,
    /// World-space boundary of the contact polygon, without a closing point.
    pub points: Vec<Point3>,
    /// Origin of the supporting plane (taken from the base block's face).
    pub origin: Point3,
    /// Orthonormal frame of the supporting plane, `[u, v, w]`.
    pub uvw: [Vector3; 3],
}

impl Interface {
    /// Creates a face-face interface on the plane of `frame`.
    #[must_use]
    pub fn face_face(frame: &Frame, points: Vec<Point3>, size: f64) -> Self {
        Self {
            interface_type: InterfaceType::FaceFace,
            size,
            points,
            origin: *frame.origin(),
            uvw: frame.uvw(),
        }
    }

    /// Returns the unit normal of the supporting plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.uvw[2]
    }
}

/// An interface together with the blocks it connects.
///
/// `from` is the base block whose face supplied the supporting plane.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceEdge {
    /// Base block.
    pub from: BlockKey,
    /// Neighbouring block.
    pub to: BlockKey,
    /// Contact geometry.
    pub interface: Interface,
}

impl InterfaceEdge {
    /// Returns `true` if this edge connects `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: BlockKey, b: BlockKey) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Returns the block at the other end of the edge, if `key` is an endpoint.
    #[must_use]
    pub fn opposite(&self, key: BlockKey) -> Option<BlockKey> {
        if self.from == key {
            Some(self.to)
        } else if self.to == key {
            Some(self.from)
        } else {
            None
        }
    }
}
