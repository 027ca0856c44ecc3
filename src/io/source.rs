use super::AssemblyData;
use crate::assembly::{Assembly, Block};
use crate::error::{IoError, Result};
use crate::math::Point3;

/// A block delivered by an external source, with its node attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBlock {
    pub block: Block,
    pub is_support: bool,
    pub name: Option<String>,
}

impl SourceBlock {
    /// Creates a free, unnamed source block.
    #[must_use]
    pub fn new(block: Block) -> Self {
        Self {
            block,
            is_support: false,
            name: None,
        }
    }

    /// Marks the block as a support.
    #[must_use]
    pub fn support(mut self) -> Self {
        self.is_support = true;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Anything that can supply the blocks of an assembly.
///
/// CAD adapters implement this outside the crate; the assembly itself only
/// sees the resulting blocks.
pub trait BlockSource {
    /// Returns the blocks in the order they should be added.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot produce valid blocks.
    fn blocks(&self) -> Result<Vec<SourceBlock>>;
}

impl BlockSource for AssemblyData {
    fn blocks(&self) -> Result<Vec<SourceBlock>> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, data)| -> Result<SourceBlock> {
                let vertices = data.vertices.iter().map(|&v| Point3::from(v)).collect();
                let block = Block::new(vertices, data.faces.clone())
                    .map_err(|err| IoError::InvalidData(format!("block {i}: {err}")))?;
                Ok(SourceBlock {
                    block,
                    is_support: data.is_support,
                    name: data.name.clone(),
                })
            })
            .collect()
    }
}

impl BlockSource for Vec<SourceBlock> {
    fn blocks(&self) -> Result<Vec<SourceBlock>> {
        Ok(self.clone())
    }
}

impl Assembly {
    /// Builds an assembly, without interfaces, from the blocks of a source.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the source.
    pub fn from_source<S: BlockSource + ?Sized>(source: &S) -> Result<Self> {
        let mut assembly = Self::new();
        for source_block in source.blocks()? {
            let key = if source_block.is_support {
                assembly.add_support(source_block.block)
            } else {
                assembly.add_block(source_block.block)
            };
            if let Some(name) = source_block.name {
                assembly.set_name(key, name)?;
            }
        }
        Ok(assembly)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::BlockData;
    use crate::operations::{IdentifyInterfaces, InterfaceParams};
    use crate::RbeError;

    fn cube_at(z: f64) -> Block {
        Block::from_box(Point3::new(0.0, 0.0, z), Point3::new(1.0, 1.0, z + 1.0)).unwrap()
    }

    #[test]
    fn assembly_from_source_blocks() {
        let source = vec![
            SourceBlock::new(cube_at(0.0)).support().named("ground"),
            SourceBlock::new(cube_at(1.0)).named("B1"),
        ];
        let mut assembly = Assembly::from_source(&source).unwrap();
        assert_eq!(assembly.block_count(), 2);
        assert_eq!(assembly.interface_count(), 0);

        let keys: Vec<_> = assembly.block_keys().collect();
        assert_eq!(assembly.node(keys[0]).unwrap().name.as_deref(), Some("ground"));
        assert_eq!(assembly.supports().collect::<Vec<_>>(), vec![keys[0]]);

        IdentifyInterfaces::new(InterfaceParams::default())
            .execute(&mut assembly)
            .unwrap();
        assert!(assembly.has_interface(keys[0], keys[1]));
    }

    #[test]
    fn data_is_a_source_without_interfaces() {
        let mut assembly = Assembly::from_source(&vec![
            SourceBlock::new(cube_at(0.0)),
            SourceBlock::new(cube_at(1.0)),
        ])
        .unwrap();
        IdentifyInterfaces::new(InterfaceParams::default())
            .execute(&mut assembly)
            .unwrap();
        let data = assembly.to_data();

        let reloaded = Assembly::from_source(&data).unwrap();
        assert_eq!(reloaded.block_count(), 2);
        assert_eq!(reloaded.interface_count(), 0);
    }

    #[test]
    fn source_errors_propagate() {
        let mut data = AssemblyData::default();
        data.blocks.push(BlockData {
            name: None,
            is_support: false,
            vertices: vec![[0.0; 3]; 2],
            faces: vec![vec![0, 1, 2]],
        });
        assert!(matches!(
            Assembly::from_source(&data),
            Err(RbeError::Io(IoError::InvalidData(_)))
        ));
    }
}
