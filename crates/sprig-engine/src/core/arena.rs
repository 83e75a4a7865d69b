use crate::api::types::NodeId;
use crate::core::node::Node;

/// Slot storage for scene nodes, indexed by `NodeId`.
/// IDs are issued sequentially starting at 1 and never reused, so the id
/// maps directly onto a slot index and stale handles resolve to `None`.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    live: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    #[inline]
    fn index(id: NodeId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Store a node and return its new handle.
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.slots.push(Some(node));
        self.live += 1;
        NodeId(self.slots.len() as u32)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(Self::index(id)?)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(Self::index(id)?)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Remove a node, leaving a hole.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(Self::index(id)?)?;
        let node = slot.take()?;
        self.live -= 1;
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|node| (NodeId(idx as u32 + 1), node)))
    }

    /// Drop every node. Issued ids stay retired.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.live = 0;
    }
}
