use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::assembly::{Assembly, BlockKey, Interface, InterfaceType};
use crate::error::{IoError, RbeError, Result};
use crate::geometry::Frame;
use crate::math::{Point3, Vector3};

/// Serializable form of an assembly.
///
/// Blocks are stored in insertion order; interfaces refer to blocks by their
/// index in `blocks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyData {
    pub blocks: Vec<BlockData>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceData>,
}

/// Serializable form of a block and its node attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_support: bool,
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Vec<usize>>,
}

/// Serializable form of an interface edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceData {
    pub from: usize,
    pub to: usize,
    pub interface_type: InterfaceType,
    pub interface_size: f64,
    pub interface_points: Vec<[f64; 3]>,
    pub interface_origin: [f64; 3],
    pub interface_uvw: [[f64; 3]; 3],
}

impl Assembly {
    /// Converts the assembly into its serializable form.
    #[must_use]
    pub fn to_data(&self) -> AssemblyData {
        let mut index: SecondaryMap<BlockKey, usize> = SecondaryMap::new();
        for (i, key) in self.block_keys().enumerate() {
            index.insert(key, i);
        }

        let blocks = self
            .blocks()
            .filter_map(|(key, block)| {
                let node = self.node(key).ok()?;
                Some(BlockData {
                    name: node.name.clone(),
                    is_support: node.is_support,
                    vertices: block.vertices().iter().map(point_to_array).collect(),
                    faces: block.faces().to_vec(),
                })
            })
            .collect();

        let interfaces = self
            .interfaces()
            .filter_map(|(_, edge)| {
                let interface = &edge.interface;
                Some(InterfaceData {
                    from: *index.get(edge.from)?,
                    to: *index.get(edge.to)?,
                    interface_type: interface.interface_type,
                    interface_size: interface.size,
                    interface_points: interface.points.iter().map(point_to_array).collect(),
                    interface_origin: point_to_array(&interface.origin),
                    interface_uvw: interface.uvw.map(|axis| [axis.x, axis.y, axis.z]),
                })
            })
            .collect();

        AssemblyData { blocks, interfaces }
    }

    /// Builds an assembly from its serializable form.
    ///
    /// # Errors
    ///
    /// Returns `IoError::InvalidData` if a face references an unknown vertex,
    /// an interface references an unknown block, an interface size is
    /// negative, or its stored axes are singular. Returns a `GraphError` if
    /// two interfaces connect the same pair.
    pub fn from_data(data: &AssemblyData) -> Result<Self> {
        let mut assembly = Self::from_source(data)?;
        let keys: Vec<BlockKey> = assembly.block_keys().collect();

        for (i, edge) in data.interfaces.iter().enumerate() {
            let (Some(&from), Some(&to)) = (keys.get(edge.from), keys.get(edge.to)) else {
                return Err(invalid(format!(
                    "interface {i} references unknown block ({} -> {})",
                    edge.from, edge.to
                )));
            };
            if !edge.interface_size.is_finite() || edge.interface_size < 0.0 {
                return Err(invalid(format!(
                    "interface {i} has invalid size {}",
                    edge.interface_size
                )));
            }
            let frame = Frame::from_uvw(
                Point3::from(edge.interface_origin),
                edge.interface_uvw.map(Vector3::from),
            )
            .map_err(|e| invalid(format!("interface {i}: {e}")))?;
            let interface = Interface {
                interface_type: edge.interface_type,
                size: edge.interface_size,
                points: edge.interface_points.iter().map(|&p| Point3::from(p)).collect(),
                origin: *frame.origin(),
                uvw: frame.uvw(),
            };
            assembly.add_interface(from, to, interface)?;
        }

        Ok(assembly)
    }
}

fn point_to_array(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn invalid(message: String) -> RbeError {
    IoError::InvalidData(message).into()
}
