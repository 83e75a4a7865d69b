use crate::api::types::NodeId;
use crate::core::node::Node;
use crate::core::scene::Scene;
use crate::input::queue::InputProbe;

/// Explicit context handed to update routines.
///
/// Gives mutable access to the whole scene, so an update routine may move
/// itself, attach or detach nodes and schedule tweens mid-traversal.
pub struct NodeContext<'a> {
    pub scene: &'a mut Scene,
    pub input: &'a dyn InputProbe,
    id: NodeId,
}

impl<'a> NodeContext<'a> {
    pub fn new(scene: &'a mut Scene, input: &'a dyn InputProbe, id: NodeId) -> Self {
        Self { scene, input, id }
    }

    /// The node being updated.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// `None` once the node has despawned itself.
    pub fn node(&self) -> Option<&Node> {
        self.scene.get(self.id)
    }

    pub fn node_mut(&mut self) -> Option<&mut Node> {
        self.scene.get_mut(self.id)
    }
}
