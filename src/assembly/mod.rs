mod block;
mod interface;

pub use block::Block;
pub use interface::{Interface, InterfaceEdge, InterfaceKey, InterfaceType};

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use crate::error::{GraphError, Result};
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a block (node) in an assembly.
    pub struct BlockKey;
}

/// Node attributes of a block in the assembly graph.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    /// Node position: the centroid of the block when it was added.
    pub position: Point3,
    /// Whether the block is kinematically fixed.
    pub is_support: bool,
    /// Optional display name.
    pub name: Option<String>,
}

/// A discrete-element assembly: blocks as nodes, contact interfaces as edges.
///
/// The assembly owns every block and keeps the node table and the block
/// registry in sync; there is no way to add a node without a block. At most
/// one interface exists between any pair of blocks, regardless of direction.
#[derive(Debug, Default)]
pub struct Assembly {
    nodes: SlotMap<BlockKey, BlockNode>,
    blocks: SecondaryMap<BlockKey, Block>,
    order: Vec<BlockKey>,
    interfaces: SlotMap<InterfaceKey, InterfaceEdge>,
    pairs: HashMap<(BlockKey, BlockKey), InterfaceKey>,
    adjacency: SecondaryMap<BlockKey, Vec<BlockKey>>,
}

impl Assembly {
    /// Creates a new, empty assembly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Block operations ---

    /// Adds a free block and returns its key.
    ///
    /// The node is placed at the block centroid.
    pub fn add_block(&mut self, block: Block) -> BlockKey {
        self.insert_block(block, false)
    }

    /// Adds a support block (kinematically fixed) and returns its key.
    pub fn add_support(&mut self, block: Block) -> BlockKey {
        self.insert_block(block, true)
    }

    fn insert_block(&mut self, block: Block, is_support: bool) -> BlockKey {
        let key = self.nodes.insert(BlockNode {
            position: block.centroid(),
            is_support,
            name: None,
        });
        self.blocks.insert(key, block);
        self.adjacency.insert(key, Vec::new());
        self.order.push(key);
        key
    }

    /// Removes a block together with all interfaces that touch it.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::BlockNotFound` if the key is unknown.
    pub fn remove_block(&mut self, key: BlockKey) -> Result<Block> {
        if self.nodes.remove(key).is_none() {
            return Err(not_found(key));
        }
        self.order.retain(|&k| k != key);
        self.interfaces.retain(|_, edge| edge.opposite(key).is_none());
        self.pairs.retain(|&(a, b), _| a != key && b != key);
        if let Some(adjacent) = self.adjacency.remove(key) {
            for other in adjacent {
                if let Some(list) = self.adjacency.get_mut(other) {
                    list.retain(|&k| k != key);
                }
            }
        }
        self.blocks.remove(key).ok_or_else(|| not_found(key))
    }

    /// Returns the block registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::BlockNotFound` if the key is unknown.
    pub fn block(&self, key: BlockKey) -> Result<&Block> {
        self.blocks.get(key).ok_or_else(|| not_found(key))
    }

    /// Returns the node attributes of a block.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::BlockNotFound` if the key is unknown.
    pub fn node(&self, key: BlockKey) -> Result<&BlockNode> {
        self.nodes.get(key).ok_or_else(|| not_found(key))
    }

    /// Sets the display name of a block.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::BlockNotFound` if the key is unknown.
    pub fn set_name(&mut self, key: BlockKey, name: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(key).ok_or_else(|| not_found(key))?;
        node.name = Some(name.into());
        Ok(())
    }

    /// Returns `true` if `key` refers to a block of this assembly.
    #[must_use]
    pub fn contains_block(&self, key: BlockKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Block keys in insertion order.
    pub fn block_keys(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.order.iter().copied()
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockKey, &Block)> + '_ {
        self.order.iter().map(|&k| (k, &self.blocks[k]))
    }

    /// Keys of support blocks, in insertion order.
    pub fn supports(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|&k| self.nodes[k].is_support)
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.order.len()
    }

    // --- Interface operations ---

    /// Adds an interface between `from` (the base block) and `to`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::BlockNotFound` if either block is unknown,
    /// `GraphError::SelfInterface` if both keys are equal, and
    /// `GraphError::InconsistentGraph` if the pair is already connected in
    /// either direction.
    pub fn add_interface(
        &mut self,
        from: BlockKey,
        to: BlockKey,
        interface: Interface,
    ) -> Result<InterfaceKey> {
        for key in [from, to] {
            if !self.contains_block(key) {
                return Err(not_found(key));
            }
        }
        if from == to {
            return Err(GraphError::SelfInterface(format!("{from:?}")).into());
        }
        let pair = unordered(from, to);
        if self.pairs.contains_key(&pair) {
            return Err(GraphError::InconsistentGraph {
                from: format!("{from:?}"),
                to: format!("{to:?}"),
            }
            .into());
        }
        let key = self.interfaces.insert(InterfaceEdge {
            from,
            to,
            interface,
        });
        self.pairs.insert(pair, key);
        for (a, b) in [(from, to), (to, from)] {
            if let Some(list) = self.adjacency.get_mut(a) {
                list.push(b);
            }
        }
        Ok(key)
    }

    /// Returns `true` if an interface connects `a` and `b`, in either direction.
    #[must_use]
    pub fn has_interface(&self, a: BlockKey, b: BlockKey) -> bool {
        self.pairs.contains_key(&unordered(a, b))
    }

    /// Returns the interface between `a` and `b`, looked up in either direction.
    #[must_use]
    pub fn interface(&self, a: BlockKey, b: BlockKey) -> Option<&InterfaceEdge> {
        self.pairs
            .get(&unordered(a, b))
            .and_then(|&key| self.interfaces.get(key))
    }

    /// All interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = (InterfaceKey, &InterfaceEdge)> + '_ {
        self.interfaces.iter()
    }

    /// Blocks connected to `key` by an interface, in the order the
    /// interfaces were added.
    #[must_use]
    pub fn neighbors(&self, key: BlockKey) -> &[BlockKey] {
        self.adjacency.get(key).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of interfaces.
    #[must_use]
    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Removes all interfaces, keeping the blocks.
    ///
    /// The interface arena is replaced rather than cleared so that interfaces
    /// added afterwards iterate in insertion order again.
    pub fn clear_interfaces(&mut self) {
        self.interfaces = SlotMap::with_key();
        self.pairs.clear();
        for list in self.adjacency.values_mut() {
            list.clear();
        }
    }
}

fn unordered(a: BlockKey, b: BlockKey) -> (BlockKey, BlockKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn not_found(key: BlockKey) -> crate::error::RbeError {
    GraphError::BlockNotFound(format!("{key:?}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Frame;
    use crate::math::Vector3;
    use crate::RbeError;

    fn cube_at(z: f64) -> Block {
        Block::from_box(Point3::new(0.0, 0.0, z), Point3::new(1.0, 1.0, z + 1.0)).unwrap()
    }

    fn dummy_interface() -> Interface {
        let frame = Frame::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        Interface::face_face(&frame, Vec::new(), 1.0)
    }

    #[test]
    fn nodes_sit_at_centroids() {
        let mut assembly = Assembly::new();
        let a = assembly.add_support(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));

        assert_eq!(assembly.block_count(), 2);
        assert_eq!(assembly.node(a).unwrap().position, Point3::new(0.5, 0.5, 0.5));
        assert_eq!(assembly.node(b).unwrap().position, Point3::new(0.5, 0.5, 1.5));
        assert!(assembly.node(a).unwrap().is_support);
        assert!(!assembly.node(b).unwrap().is_support);
        assert_eq!(assembly.supports().collect::<Vec<_>>(), vec![a]);
        assert_eq!(assembly.block_keys().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn names() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        assert_eq!(assembly.node(a).unwrap().name, None);
        assembly.set_name(a, "B0").unwrap();
        assert_eq!(assembly.node(a).unwrap().name.as_deref(), Some("B0"));
    }

    #[test]
    fn one_interface_per_pair() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));

        assembly.add_interface(a, b, dummy_interface()).unwrap();
        assert!(assembly.has_interface(a, b));
        assert!(assembly.has_interface(b, a));
        assert_eq!(assembly.interface(b, a).unwrap().from, a);

        for (from, to) in [(a, b), (b, a)] {
            let err = assembly.add_interface(from, to, dummy_interface()).unwrap_err();
            assert!(matches!(
                err,
                RbeError::Graph(GraphError::InconsistentGraph { .. })
            ));
        }
        assert_eq!(assembly.interface_count(), 1);
        assert_eq!(assembly.neighbors(a), &[b]);
        assert_eq!(assembly.neighbors(b), &[a]);
    }

    #[test]
    fn self_and_unknown_interfaces_rejected() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));
        assembly.remove_block(b).unwrap();

        assert!(matches!(
            assembly.add_interface(a, a, dummy_interface()),
            Err(RbeError::Graph(GraphError::SelfInterface(_)))
        ));
        assert!(matches!(
            assembly.add_interface(a, b, dummy_interface()),
            Err(RbeError::Graph(GraphError::BlockNotFound(_)))
        ));
    }

    #[test]
    fn removing_block_drops_its_interfaces() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));
        let c = assembly.add_block(cube_at(2.0));
        assembly.add_interface(a, b, dummy_interface()).unwrap();
        assembly.add_interface(b, c, dummy_interface()).unwrap();

        let removed = assembly.remove_block(b).unwrap();
        assert_eq!(removed, cube_at(1.0));
        assert_eq!(assembly.interface_count(), 0);
        assert!(!assembly.has_interface(a, b));
        assert!(assembly.block(b).is_err());
        assert!(assembly.node(b).is_err());
        assert_eq!(assembly.block_keys().collect::<Vec<_>>(), vec![a, c]);
        assert!(assembly.remove_block(b).is_err());
    }

    #[test]
    fn clearing_interfaces_keeps_blocks() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));
        assembly.add_interface(a, b, dummy_interface()).unwrap();
        assembly.clear_interfaces();
        assert_eq!(assembly.interface_count(), 0);
        assert_eq!(assembly.block_count(), 2);
        assert!(assembly.neighbors(a).is_empty());
        assembly.add_interface(b, a, dummy_interface()).unwrap();
    }

    #[test]
    fn interfaces_iterate_in_insertion_order_after_clear() {
        let mut assembly = Assembly::new();
        let keys: Vec<BlockKey> = (0..4).map(|i| assembly.add_block(cube_at(f64::from(i)))).collect();
        let connect = |assembly: &mut Assembly| {
            for pair in keys.windows(2) {
                assembly.add_interface(pair[0], pair[1], dummy_interface()).unwrap();
            }
            assembly
                .interfaces()
                .map(|(_, e)| (e.from, e.to))
                .collect::<Vec<_>>()
        };

        let first = connect(&mut assembly);
        assert_eq!(first, vec![(keys[0], keys[1]), (keys[1], keys[2]), (keys[2], keys[3])]);
        assembly.clear_interfaces();
        assert_eq!(connect(&mut assembly), first);
    }

    #[test]
    fn neighbors_follow_removals() {
        let mut assembly = Assembly::new();
        let a = assembly.add_block(cube_at(0.0));
        let b = assembly.add_block(cube_at(1.0));
        let c = assembly.add_block(cube_at(2.0));
        assembly.add_interface(a, b, dummy_interface()).unwrap();
        assembly.add_interface(c, b, dummy_interface()).unwrap();
        assert_eq!(assembly.neighbors(b), &[a, c]);

        assembly.remove_block(a).unwrap();
        assert_eq!(assembly.neighbors(b), &[c]);
        assert!(assembly.neighbors(a).is_empty());
    }
}
