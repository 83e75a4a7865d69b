use log::{debug, trace, warn};

use crate::api::config::SceneConfig;
use crate::api::error::{Result, SceneError};
use crate::api::types::NodeId;
use crate::core::arena::NodeArena;
use crate::core::context::NodeContext;
use crate::core::math::Transform2D;
use crate::core::node::Node;
use crate::extensions::tween::{OnDone, Tween, TweenField, TweenId, TweenState};
use crate::input::queue::{InputProbe, NoInput};
use crate::renderer::traits::DrawBackend;
use uuid::Uuid;

/// Whether `id` is alive and its ancestor chain ends at one of `roots`.
pub(crate) fn is_reachable(nodes: &NodeArena, roots: &[NodeId], id: NodeId) -> bool {
    let mut current = id;
    // The chain can never be longer than the number of live nodes.
    for _ in 0..=nodes.len() {
        let Some(node) = nodes.get(current) else { return false };
        match node.parent() {
            Some(parent) => current = parent,
            None => return roots.contains(&current),
        }
    }
    false
}

/// Node storage, the root list and the active tweens.
///
/// Every node lives in the scene's arena from `spawn` until `despawn`.
/// Only nodes reachable from the root list take part in update, draw and
/// tweening; detached nodes are kept but inert.
pub struct Scene {
    nodes: NodeArena,
    roots: Vec<NodeId>,
    tweens: TweenState,
    config: SceneConfig,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            nodes: NodeArena::with_capacity(config.node_capacity),
            roots: Vec::new(),
            tweens: TweenState::with_capacity(config.tween_capacity),
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // -- Storage --

    /// Store a node without attaching it anywhere. Use `add_node` or
    /// `add_child` to make it part of the scene.
    pub fn spawn(&mut self, mut node: Node) -> NodeId {
        node.set_parent(None);
        node.children_mut().clear();
        self.nodes.insert(node)
    }

    /// Spawn a node using the configured default origin and size.
    pub fn spawn_default(&mut self) -> NodeId {
        let node = Node::new()
            .with_origin(self.config.default_origin)
            .with_size(self.config.default_size);
        self.spawn(node)
    }

    /// Detach a node and release it together with its whole subtree.
    /// Tweens targeting any released node are cancelled.
    pub fn despawn(&mut self, id: NodeId) -> Result<Node> {
        self.detach(id)?;
        let doomed = self.descendants(id);
        let mut removed = None;
        for node_id in &doomed {
            self.tweens.remove_node(*node_id);
            let node = self.nodes.remove(*node_id);
            if *node_id == id {
                removed = node;
            }
        }
        debug!("despawned {} ({} nodes)", id, doomed.len());
        removed.ok_or(SceneError::NodeNotFound(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Number of stored nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every node and tween.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.tweens.clear();
    }

    // -- Root list --

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Append a detached node to the root list.
    pub fn add_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if node.parent().is_some() || self.roots.contains(&id) {
            return Err(SceneError::AlreadyAttached(id));
        }
        self.roots.push(id);
        Ok(())
    }

    /// Take a node off the root list. The node and its subtree stay stored
    /// and can be added again.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let idx = self
            .roots
            .iter()
            .position(|&r| r == id)
            .ok_or(SceneError::NotARoot(id))?;
        self.roots.remove(idx);
        Ok(())
    }

    // -- Hierarchy --

    /// Append `child` to `parent`'s children.
    ///
    /// `child` must be detached: a node that already has a parent or sits in
    /// the root list is rejected with `AlreadyAttached`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent().is_some() || self.roots.contains(&child) {
            return Err(SceneError::AlreadyAttached(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.set_parent(Some(parent));
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children_mut().push(child);
        }
        Ok(())
    }

    /// Detach `child` from `parent`. Fails with `NotAChild` if `child` is not
    /// currently in `parent`'s child list.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.nodes.get_mut(parent).ok_or(SceneError::NodeNotFound(parent))?;
        let idx = parent_node
            .children()
            .iter()
            .position(|&c| c == child)
            .ok_or(SceneError::NotAChild { parent, child })?;
        parent_node.children_mut().remove(idx);

        if let Some(node) = self.nodes.get_mut(child) {
            node.set_parent(None);
        }
        Ok(())
    }

    /// Detach a node from its parent or from the root list, whichever holds
    /// it. Already-detached nodes are left as they are.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        match self.node(id)?.parent() {
            Some(parent) => self.remove_child(parent, id),
            None if self.roots.contains(&id) => self.remove_node(id),
            None => Ok(()),
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent())
    }

    pub fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id).map(|n| n.children())
    }

    /// `ancestor` is `id` itself or one of its parents.
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent_of(node_id);
        }
        false
    }

    /// Whether the node takes part in update, draw and tweening.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        is_reachable(&self.nodes, &self.roots, id)
    }

    /// `id` followed by its subtree, depth-first in child order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else { continue };
            out.push(current);
            stack.extend(node.children().iter().rev());
        }
        out
    }

    // -- Queries (root level only) --

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.find_root(|n| n.name == name)
    }

    pub fn find_all_by_name(&self, name: &str) -> Vec<NodeId> {
        self.filter_roots(|n| n.name == name)
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_root(|n| n.tag == tag)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.filter_roots(|n| n.tag == tag)
    }

    /// Look up a stored node by persistent identity, at any depth.
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.uuid() == uuid).map(|(id, _)| id)
    }

    fn find_root(&self, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.nodes.get(id).is_some_and(&pred))
    }

    fn filter_roots(&self, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.roots
            .iter()
            .copied()
            .filter(|&id| self.nodes.get(id).is_some_and(&pred))
            .collect()
    }

    // -- Frame --

    /// Run update routines, then advance tweens. No input is available to
    /// update routines.
    pub fn update(&mut self, dt: f32) {
        self.update_with_input(dt, &NoInput);
    }

    /// Run update routines over every root in list order, then advance tweens.
    ///
    /// Roots added during the pass are first updated next frame; roots
    /// removed during the pass are skipped if not yet visited.
    pub fn update_with_input(&mut self, dt: f32, input: &dyn InputProbe) {
        let roots = self.roots.clone();
        trace!("update: {} roots, {} tweens", roots.len(), self.tweens.len());
        for root in roots {
            if self.roots.contains(&root) {
                self.update_subtree(root, dt, input);
            }
        }
        self.advance_tweens(dt);
    }

    /// Update pass for one node and its subtree.
    ///
    /// A disabled node skips its whole subtree. The child list is
    /// snapshotted after the node's own routine has run; a snapshotted child
    /// is visited only while it is still parented to this node.
    pub fn update_subtree(&mut self, id: NodeId, dt: f32, input: &dyn InputProbe) {
        let Some(node) = self.nodes.get(id) else { return };
        if !node.enabled {
            return;
        }

        if let Some(func) = node.update.as_ref().map(|hook| hook.func) {
            let mut ctx = NodeContext::new(self, input, id);
            func(&mut ctx, dt);
        }

        let Some(node) = self.nodes.get(id) else { return };
        let children = node.children().to_vec();
        for child in children {
            if self.parent_of(child) == Some(id) {
                self.update_subtree(child, dt, input);
            }
        }
    }

    /// Roots sorted by order key. The sort is stable: equal keys keep
    /// insertion order.
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut order = self.roots.clone();
        order.sort_by_key(|&id| self.nodes.get(id).map_or(0, |n| n.order));
        order
    }

    /// Recompute global transforms and draw every root subtree in order.
    pub fn draw(&mut self, backend: &mut dyn DrawBackend) {
        for root in self.draw_order() {
            self.draw_subtree(root, None, backend);
        }
    }

    /// Draw pass for one node and its subtree. `parent` is the parent's
    /// global transform, `None` for a root.
    ///
    /// A disabled node skips its whole subtree. A hidden node skips only its
    /// own draw routine; children are still drawn.
    pub fn draw_subtree(&mut self, id: NodeId, parent: Option<Transform2D>, backend: &mut dyn DrawBackend) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if !node.enabled {
            return;
        }
        let global = node.refresh_global(parent.as_ref());

        let node = &*node;
        if node.visible {
            if let Some(hook) = &node.draw {
                (hook.func)(node, backend);
            }
        }

        let children = node.children().to_vec();
        for child in children {
            self.draw_subtree(child, Some(global), backend);
        }
    }

    // -- Tweens --

    /// Schedule a tween on `node`'s field named by `path` (e.g. `"size.x"`).
    ///
    /// The path is resolved here, so a bad path fails immediately with
    /// `InvalidFieldPath`. The start value is the field's current value.
    pub fn schedule_tween(
        &mut self,
        node: NodeId,
        path: &str,
        to: f32,
        duration: f32,
        on_done: Option<OnDone>,
    ) -> Result<TweenId> {
        let field: TweenField = path.parse()?;
        self.tween(node, Tween::new(field, to, duration).with_boxed_on_done(on_done))
    }

    /// Schedule a prepared tween on `node`.
    pub fn tween(&mut self, node: NodeId, tween: Tween) -> Result<TweenId> {
        let target = self.nodes.get(node).ok_or(SceneError::NodeNotFound(node))?;
        Ok(self.tweens.add(node, target, tween))
    }

    /// Cancel a tween without running its completion handler.
    pub fn cancel_tween(&mut self, id: TweenId) -> bool {
        self.tweens.remove(id)
    }

    /// Cancel every tween targeting `node`.
    pub fn cancel_tweens_for(&mut self, node: NodeId) -> usize {
        self.tweens.remove_node(node)
    }

    pub fn tweens(&self) -> &TweenState {
        &self.tweens
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Advance every active tween by `dt`.
    ///
    /// All values are written before any completion handler runs. Handlers
    /// then run in registration order with full access to the scene; instant
    /// tweens they schedule are settled within this same call, up to
    /// `max_settle_passes` extra passes.
    pub fn advance_tweens(&mut self, dt: f32) {
        let mut finished = self.tweens.step(dt, false, &mut self.nodes, &self.roots);
        let mut passes = 0;
        while !finished.is_empty() {
            for done in finished {
                if !self.is_reachable(done.node) {
                    debug!("tween {:?} finished on detached {}; handler skipped", done.id, done.node);
                    continue;
                }
                debug!("tween {:?} on {} complete", done.id, done.node);
                if let Some(on_done) = done.on_done {
                    on_done(self, done.node);
                }
            }

            if passes == self.config.max_settle_passes {
                if self.tweens.has_instant() {
                    warn!(
                        "instant tweens still pending after {} settle passes; deferring to next frame",
                        passes
                    );
                }
                break;
            }
            passes += 1;
            finished = self.tweens.step(0.0, true, &mut self.nodes, &self.roots);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
