use std::fmt;

use glam::Vec2;
use uuid::Uuid;

use crate::api::types::{Color, NodeId, TextureHandle};
use crate::core::context::NodeContext;
use crate::core::math::{heading, wrap_degrees, Transform2D};
use crate::renderer::traits::DrawBackend;

/// Draw routine. Receives a read-only view of the node after its global
/// transform has been refreshed for the current frame.
pub type DrawFn = fn(&Node, &mut dyn DrawBackend);

/// Per-frame update routine. Receives the owning scene through the context.
pub type UpdateFn = fn(&mut NodeContext<'_>, f32);

/// A draw routine together with the name it is persisted under.
#[derive(Clone)]
pub struct DrawHook {
    pub name: String,
    pub func: DrawFn,
}

impl DrawHook {
    pub fn new(name: impl Into<String>, func: DrawFn) -> Self {
        Self { name: name.into(), func }
    }
}

impl fmt::Debug for DrawHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DrawHook").field(&self.name).finish()
    }
}

/// An update routine together with the name it is persisted under.
#[derive(Clone)]
pub struct UpdateHook {
    pub name: String,
    pub func: UpdateFn,
}

impl UpdateHook {
    pub fn new(name: impl Into<String>, func: UpdateFn) -> Self {
        Self { name: name.into(), func }
    }
}

impl fmt::Debug for UpdateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UpdateHook").field(&self.name).finish()
    }
}

/// Scene graph node.
///
/// Plain data plus hooks. Hierarchy links (`parent`, `children`) and the
/// cached global transform are owned by the [`Scene`](crate::Scene) and are
/// read-only from outside the crate.
#[derive(Debug, Clone)]
pub struct Node {
    uuid: Uuid,
    pub name: String,
    pub tag: String,

    /// Position relative to the parent (or the scene root).
    pub position: Vec2,
    /// Rotation in degrees, relative to the parent.
    pub rotation: f32,
    pub scale: Vec2,
    /// Normalized pivot inside `size`; (0.5, 0.5) is the center.
    pub origin: Vec2,
    pub size: Vec2,
    pub color: Color,

    /// Line end point, used by line-style draw routines.
    pub to: Vec2,
    /// Line thickness, used by line-style draw routines.
    pub thickness: f32,
    pub texture: Option<TextureHandle>,

    pub draw: Option<DrawHook>,
    pub update: Option<UpdateHook>,

    /// Hidden nodes skip their own draw routine but still draw their children.
    pub visible: bool,
    /// Disabled nodes skip update and draw for their entire subtree.
    pub enabled: bool,
    /// Draw order among scene roots. Ignored below the root level.
    pub order: i32,

    global: Option<Transform2D>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: "New Node".to_string(),
            tag: String::new(),
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            origin: Vec2::new(0.5, 0.5),
            size: Vec2::new(100.0, 50.0),
            color: Color::WHITE,
            to: Vec2::ZERO,
            thickness: 1.0,
            texture: None,
            draw: None,
            update: None,
            visible: true,
            enabled: true,
            order: 0,
            global: None,
            parent: None,
            children: Vec::new(),
        }
    }

    // -- Builder pattern --

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_line(mut self, to: Vec2, thickness: f32) -> Self {
        self.to = to;
        self.thickness = thickness;
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_draw(mut self, hook: DrawHook) -> Self {
        self.draw = Some(hook);
        self
    }

    pub fn with_update(mut self, hook: UpdateHook) -> Self {
        self.update = Some(hook);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub(crate) fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    // -- Identity and hierarchy (read-only) --

    /// Identity that survives save/load round trips.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    // -- Transforms --

    pub fn local_transform(&self) -> Transform2D {
        Transform2D::new(self.position, self.rotation, self.scale)
    }

    /// Global transform computed by the most recent draw pass that reached
    /// this node. `None` until the node has been drawn once.
    pub fn global_transform(&self) -> Option<Transform2D> {
        self.global
    }

    /// Global position from the last draw pass. Before the first draw this
    /// is the local position, which is what a root node's global would be.
    pub fn global_position(&self) -> Vec2 {
        self.global.map_or(self.position, |g| g.position)
    }

    pub fn global_rotation(&self) -> f32 {
        self.global.map_or(self.rotation, |g| g.rotation)
    }

    pub fn global_scale(&self) -> Vec2 {
        self.global.map_or(self.scale, |g| g.scale)
    }

    /// Compute this node's global transform from its parent's global.
    /// Without a parent the local transform is returned verbatim.
    pub fn compose_global(&self, parent: Option<&Transform2D>) -> Transform2D {
        let local = self.local_transform();
        match parent {
            None => local,
            Some(parent) => parent.compose(&local, self.origin, self.size),
        }
    }

    pub(crate) fn refresh_global(&mut self, parent: Option<&Transform2D>) -> Transform2D {
        let global = self.compose_global(parent);
        self.global = Some(global);
        global
    }

    // -- Convenience mutators --

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.rotation += degrees;
    }

    pub fn scale_by(&mut self, factors: Vec2) {
        self.scale *= factors;
    }

    /// Vector from the node's global position to `target`.
    pub fn direction_to(&self, target: Vec2) -> Vec2 {
        target - self.global_position()
    }

    pub fn distance_to(&self, target: Vec2) -> f32 {
        self.direction_to(target).length()
    }

    /// Turn towards `target` by at most `max_degrees`, taking the shorter way
    /// around. Snaps onto the target angle when it is within one step.
    ///
    /// The angle is measured from the global position but applied to the
    /// local rotation.
    pub fn look_at(&mut self, target: Vec2, max_degrees: f32) {
        let direction = self.direction_to(target);
        if direction == Vec2::ZERO {
            return;
        }
        let target_angle = direction.y.atan2(direction.x).to_degrees();
        let delta = wrap_degrees(target_angle - self.rotation);
        if delta.abs() < max_degrees {
            self.rotation = target_angle;
        } else {
            self.rotation += max_degrees.copysign(delta);
        }
    }

    /// Step towards `target` by at most `max_step`, snapping onto it when the
    /// remaining distance is shorter than a step.
    ///
    /// Distance is measured from the global position; the local position is
    /// what moves.
    pub fn move_toward(&mut self, target: Vec2, max_step: f32) {
        let direction = self.direction_to(target);
        let distance = direction.length();
        if distance < max_step {
            self.position = target;
            return;
        }
        if distance <= f32::EPSILON {
            return;
        }
        self.position += direction / distance * max_step;
    }

    /// Step along the current local rotation.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += heading(self.rotation) * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn defaults() {
        let node = Node::new();
        assert_eq!(node.name, "New Node");
        assert_eq!(node.origin, Vec2::new(0.5, 0.5));
        assert_eq!(node.size, Vec2::new(100.0, 50.0));
        assert_eq!(node.scale, Vec2::ONE);
        assert!(node.visible && node.enabled);
        assert!(node.global_transform().is_none());
        assert_ne!(node.uuid(), Node::new().uuid());
    }

    #[test]
    fn root_global_is_local_verbatim() {
        let node = Node::new()
            .with_pos(Vec2::new(3.0, 4.0))
            .with_rotation(33.0)
            .with_scale(Vec2::new(2.0, 0.5));
        assert_eq!(node.compose_global(None), node.local_transform());
    }

    #[test]
    fn look_at_snaps_within_step() {
        let mut node = Node::new();
        node.look_at(Vec2::new(0.0, 10.0), 100.0);
        assert!((node.rotation - 90.0).abs() < 1e-4);
    }

    #[test]
    fn look_at_takes_short_way_round() {
        let mut node = Node::new().with_rotation(170.0);
        // Target at -170 degrees: shortest path is +20 through 180.
        let target = heading(-170.0) * 10.0;
        node.look_at(target, 5.0);
        assert!((node.rotation - 175.0).abs() < 1e-4);
    }

    #[test]
    fn look_at_ignores_own_position() {
        let mut node = Node::new().with_rotation(12.0);
        node.look_at(Vec2::ZERO, 5.0);
        assert_eq!(node.rotation, 12.0);
    }

    #[test]
    fn move_toward_steps_then_snaps() {
        let mut node = Node::new();
        let target = Vec2::new(10.0, 0.0);
        node.move_toward(target, 4.0);
        assert!(approx(node.position, Vec2::new(4.0, 0.0)));

        // Globals are only refreshed by drawing; simulate a root draw.
        node.refresh_global(None);
        node.move_toward(target, 4.0);
        node.refresh_global(None);
        node.move_toward(target, 4.0);
        assert_eq!(node.position, target);
    }

    #[test]
    fn move_toward_zero_distance_is_finite() {
        let mut node = Node::new().with_pos(Vec2::new(5.0, 5.0));
        node.move_toward(Vec2::new(5.0, 5.0), 0.0);
        assert_eq!(node.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn move_forward_follows_rotation() {
        let mut node = Node::new().with_rotation(90.0);
        node.move_forward(10.0);
        assert!(approx(node.position, Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn scale_and_rotate_accumulate() {
        let mut node = Node::new();
        node.scale_by(Vec2::new(2.0, 3.0));
        node.scale_by(Vec2::splat(0.5));
        node.rotate(30.0);
        node.rotate(-45.0);
        node.translate(Vec2::new(1.0, -1.0));
        assert_eq!(node.scale, Vec2::new(1.0, 1.5));
        assert_eq!(node.rotation, -15.0);
        assert_eq!(node.position, Vec2::new(1.0, -1.0));
    }
}
