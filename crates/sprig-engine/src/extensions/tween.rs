// extensions/tween.rs
//
// Tween system: time-driven interpolation of one numeric node field.
//
// Usage:
//   let id = scene.schedule_tween(node, "size.x", 300.0, 2.0, None)?;
//   scene.update(dt);  // node updates first, then every active tween advances
//
// Tweens address nodes by NodeId and never keep them alive. A tween whose
// node is no longer reachable from the scene roots is dropped silently.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::api::error::SceneError;
use crate::api::types::NodeId;
use crate::core::arena::NodeArena;
use crate::core::node::Node;
use crate::core::scene::{is_reachable, Scene};
use super::easing::{ease, Easing};

/// One-shot completion handler, run with the scene and the tweened node.
pub type OnDone = Box<dyn FnOnce(&mut Scene, NodeId)>;

/// Numeric node field a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenField {
    PositionX,
    PositionY,
    Rotation,
    ScaleX,
    ScaleY,
    OriginX,
    OriginY,
    SizeX,
    SizeY,
    ToX,
    ToY,
    Thickness,
    ColorR,
    ColorG,
    ColorB,
    ColorA,
}

impl TweenField {
    /// Canonical dotted path, accepted back by `FromStr`.
    pub fn path(self) -> &'static str {
        match self {
            TweenField::PositionX => "pos.x",
            TweenField::PositionY => "pos.y",
            TweenField::Rotation => "rot",
            TweenField::ScaleX => "scale.x",
            TweenField::ScaleY => "scale.y",
            TweenField::OriginX => "origin.x",
            TweenField::OriginY => "origin.y",
            TweenField::SizeX => "size.x",
            TweenField::SizeY => "size.y",
            TweenField::ToX => "to.x",
            TweenField::ToY => "to.y",
            TweenField::Thickness => "thickness",
            TweenField::ColorR => "color.r",
            TweenField::ColorG => "color.g",
            TweenField::ColorB => "color.b",
            TweenField::ColorA => "color.a",
        }
    }

    pub fn get(self, node: &Node) -> f32 {
        match self {
            TweenField::PositionX => node.position.x,
            TweenField::PositionY => node.position.y,
            TweenField::Rotation => node.rotation,
            TweenField::ScaleX => node.scale.x,
            TweenField::ScaleY => node.scale.y,
            TweenField::OriginX => node.origin.x,
            TweenField::OriginY => node.origin.y,
            TweenField::SizeX => node.size.x,
            TweenField::SizeY => node.size.y,
            TweenField::ToX => node.to.x,
            TweenField::ToY => node.to.y,
            TweenField::Thickness => node.thickness,
            TweenField::ColorR => node.color.r as f32,
            TweenField::ColorG => node.color.g as f32,
            TweenField::ColorB => node.color.b as f32,
            TweenField::ColorA => node.color.a as f32,
        }
    }

    /// Write `value`. Color channels are rounded and clamped to 0..=255.
    pub fn set(self, node: &mut Node, value: f32) {
        match self {
            TweenField::PositionX => node.position.x = value,
            TweenField::PositionY => node.position.y = value,
            TweenField::Rotation => node.rotation = value,
            TweenField::ScaleX => node.scale.x = value,
            TweenField::ScaleY => node.scale.y = value,
            TweenField::OriginX => node.origin.x = value,
            TweenField::OriginY => node.origin.y = value,
            TweenField::SizeX => node.size.x = value,
            TweenField::SizeY => node.size.y = value,
            TweenField::ToX => node.to.x = value,
            TweenField::ToY => node.to.y = value,
            TweenField::Thickness => node.thickness = value,
            TweenField::ColorR => node.color.r = channel(value),
            TweenField::ColorG => node.color.g = channel(value),
            TweenField::ColorB => node.color.b = channel(value),
            TweenField::ColorA => node.color.a = channel(value),
        }
    }
}

#[inline]
fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for TweenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for TweenField {
    type Err = SceneError;

    /// Parse a dotted field path such as `"size.x"`, `"position.y"`,
    /// `"rotation"` or `"color.a"`.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = || SceneError::InvalidFieldPath(path.to_string());
        let mut parts = path.split('.');
        let head = parts.next().ok_or_else(invalid)?;
        let tail = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let field = match (head, tail) {
            ("pos" | "position", Some("x")) => TweenField::PositionX,
            ("pos" | "position", Some("y")) => TweenField::PositionY,
            ("rot" | "rotation", None) => TweenField::Rotation,
            ("scale", Some("x")) => TweenField::ScaleX,
            ("scale", Some("y")) => TweenField::ScaleY,
            ("origin", Some("x")) => TweenField::OriginX,
            ("origin", Some("y")) => TweenField::OriginY,
            ("size", Some("x")) => TweenField::SizeX,
            ("size", Some("y")) => TweenField::SizeY,
            ("to", Some("x")) => TweenField::ToX,
            ("to", Some("y")) => TweenField::ToY,
            ("thickness" | "tickness", None) => TweenField::Thickness,
            ("color", Some("r")) => TweenField::ColorR,
            ("color", Some("g")) => TweenField::ColorG,
            ("color", Some("b")) => TweenField::ColorB,
            ("color", Some("a")) => TweenField::ColorA,
            _ => return Err(invalid()),
        };
        Ok(field)
    }
}

/// A single scheduled interpolation.
pub struct Tween {
    pub field: TweenField,
    from: f32,
    /// End value.
    pub to: f32,
    /// Duration in seconds. Zero or negative completes on the first advance.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    on_done: Option<OnDone>,
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("field", &self.field)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("easing", &self.easing)
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

impl Tween {
    /// Tween `field` to `to` over `duration` seconds. The start value is
    /// captured from the node when the tween is scheduled.
    pub fn new(field: TweenField, to: f32, duration: f32) -> Self {
        Self {
            field,
            from: 0.0,
            to,
            duration,
            elapsed: 0.0,
            easing: Easing::Linear,
            on_done: None,
        }
    }

    // -- Builder methods --

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_done(mut self, callback: impl FnOnce(&mut Scene, NodeId) + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }

    pub(crate) fn with_boxed_on_done(mut self, callback: Option<OnDone>) -> Self {
        self.on_done = callback;
        self
    }

    /// Start value captured at schedule time.
    pub fn from(&self) -> f32 {
        self.from
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Interpolated value at the current progress.
    pub fn value(&self) -> f32 {
        ease(self.from, self.to, self.progress(), self.easing)
    }

    pub fn is_instant(&self) -> bool {
        self.duration <= 0.0
    }
}

/// Handle to a scheduled tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u32);

struct ActiveTween {
    id: TweenId,
    node: NodeId,
    tween: Tween,
}

/// A tween that completed during a step, with its handler still pending.
pub(crate) struct Finished {
    pub id: TweenId,
    pub node: NodeId,
    pub on_done: Option<OnDone>,
}

/// Active tweens, kept in registration order. When several tweens drive the
/// same field, the one registered last writes last and wins the frame.
#[derive(Default)]
pub struct TweenState {
    tweens: Vec<ActiveTween>,
    next_id: u32,
}

impl fmt::Debug for TweenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenState")
            .field("active", &self.tweens.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TweenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tweens: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Register a tween for `node`, capturing the start value from `current`.
    pub fn add(&mut self, node: NodeId, current: &Node, mut tween: Tween) -> TweenId {
        tween.from = tween.field.get(current);
        tween.elapsed = 0.0;
        let id = TweenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tweens.push(ActiveTween { id, node, tween });
        id
    }

    /// Cancel a tween. Its completion handler never runs.
    pub fn remove(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        self.tweens.len() != before
    }

    /// Cancel every tween targeting `node`. Returns how many were removed.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.node != node);
        before - self.tweens.len()
    }

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.iter().find(|t| t.id == id).map(|t| &t.tween)
    }

    /// Target node of a tween.
    pub fn target(&self, id: TweenId) -> Option<NodeId> {
        self.tweens.iter().find(|t| t.id == id).map(|t| t.node)
    }

    /// Iterate `(id, node, tween)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TweenId, NodeId, &Tween)> {
        self.tweens.iter().map(|t| (t.id, t.node, &t.tween))
    }

    pub(crate) fn has_instant(&self) -> bool {
        self.tweens.iter().any(|t| t.tween.is_instant())
    }

    /// Advance tweens by `dt` and write their values into `nodes`.
    ///
    /// No user code runs here. Completed tweens are removed and returned in
    /// registration order so the caller can run their handlers afterwards.
    /// Tweens whose node is unreachable from `roots` are dropped. With
    /// `instant_only` set, only tweens with a non-positive duration are
    /// touched.
    pub(crate) fn step(
        &mut self,
        dt: f32,
        instant_only: bool,
        nodes: &mut NodeArena,
        roots: &[NodeId],
    ) -> Vec<Finished> {
        let mut finished = Vec::new();
        self.tweens.retain_mut(|entry| {
            if instant_only && !entry.tween.is_instant() {
                return true;
            }
            if !is_reachable(nodes, roots, entry.node) {
                debug!(
                    "dropping tween {:?} on {}: target left the scene",
                    entry.id, entry.node
                );
                return false;
            }
            let Some(node) = nodes.get_mut(entry.node) else { return false };

            entry.tween.elapsed += dt;
            entry.tween.field.set(node, entry.tween.value());

            if entry.tween.is_complete() {
                finished.push(Finished {
                    id: entry.id,
                    node: entry.node,
                    on_done: entry.tween.on_done.take(),
                });
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn rooted(nodes: &mut NodeArena, node: Node) -> (NodeId, Vec<NodeId>) {
        let id = nodes.insert(node);
        (id, vec![id])
    }

    #[test]
    fn parses_paths_and_aliases() {
        assert_eq!("size.x".parse::<TweenField>().unwrap(), TweenField::SizeX);
        assert_eq!("position.y".parse::<TweenField>().unwrap(), TweenField::PositionY);
        assert_eq!("rot".parse::<TweenField>().unwrap(), TweenField::Rotation);
        assert_eq!("tickness".parse::<TweenField>().unwrap(), TweenField::Thickness);
        assert_eq!("color.a".parse::<TweenField>().unwrap(), TweenField::ColorA);
    }

    #[test]
    fn rejects_bad_paths() {
        for path in ["", "size", "size.z", "rot.x", "pos.x.y", "name", "color.x"] {
            let err = path.parse::<TweenField>().unwrap_err();
            assert!(matches!(err, SceneError::InvalidFieldPath(p) if p == path));
        }
    }

    #[test]
    fn canonical_paths_round_trip() {
        for field in [TweenField::PositionX, TweenField::Rotation, TweenField::ColorB, TweenField::Thickness] {
            assert_eq!(field.path().parse::<TweenField>().unwrap(), field);
        }
    }

    #[test]
    fn color_channels_clamp() {
        let mut node = Node::new();
        TweenField::ColorA.set(&mut node, 300.0);
        assert_eq!(node.color.a, 255);
        TweenField::ColorR.set(&mut node, -4.0);
        assert_eq!(node.color.r, 0);
        TweenField::ColorG.set(&mut node, 127.6);
        assert_eq!(node.color.g, 128);
    }

    #[test]
    fn step_interpolates_and_completes() {
        let mut nodes = NodeArena::new();
        let (id, roots) = rooted(&mut nodes, Node::new().with_pos(Vec2::ZERO));
        let mut tweens = TweenState::new();
        let node = nodes.get(id).unwrap();
        tweens.add(id, node, Tween::new(TweenField::PositionX, 100.0, 1.0));

        assert!(tweens.step(0.5, false, &mut nodes, &roots).is_empty());
        assert!((nodes.get(id).unwrap().position.x - 50.0).abs() < 0.01);

        let done = tweens.step(0.5, false, &mut nodes, &roots);
        assert_eq!(done.len(), 1);
        assert_eq!(nodes.get(id).unwrap().position.x, 100.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn instant_only_skips_timed_tweens() {
        let mut nodes = NodeArena::new();
        let (id, roots) = rooted(&mut nodes, Node::new());
        let mut tweens = TweenState::new();
        let node = nodes.get(id).unwrap().clone();
        tweens.add(id, &node, Tween::new(TweenField::SizeX, 0.0, 1.0));
        tweens.add(id, &node, Tween::new(TweenField::SizeY, 7.0, 0.0));

        let done = tweens.step(0.0, true, &mut nodes, &roots);
        assert_eq!(done.len(), 1);
        assert_eq!(nodes.get(id).unwrap().size, Vec2::new(100.0, 7.0));
        assert_eq!(tweens.len(), 1);
    }

    #[test]
    fn unreachable_target_is_dropped() {
        let mut nodes = NodeArena::new();
        let id = nodes.insert(Node::new());
        let mut tweens = TweenState::new();
        let node = nodes.get(id).unwrap().clone();
        tweens.add(id, &node, Tween::new(TweenField::Rotation, 90.0, 0.0));

        // Not in the root list.
        let done = tweens.step(1.0, false, &mut nodes, &[]);
        assert!(done.is_empty());
        assert!(tweens.is_empty());
        assert_eq!(nodes.get(id).unwrap().rotation, 0.0);
    }

    #[test]
    fn ids_wrap_instead_of_overflowing() {
        let node = Node::new();
        let mut tweens = TweenState::new();
        tweens.next_id = u32::MAX;
        let last = tweens.add(NodeId(1), &node, Tween::new(TweenField::Rotation, 1.0, 1.0));
        let next = tweens.add(NodeId(1), &node, Tween::new(TweenField::Rotation, 1.0, 1.0));
        assert_eq!(last, TweenId(u32::MAX));
        assert_eq!(next, TweenId(0));
        assert_eq!(tweens.len(), 2);
    }

    #[test]
    fn remove_and_remove_node() {
        let node = Node::new();
        let mut tweens = TweenState::new();
        let a = tweens.add(NodeId(1), &node, Tween::new(TweenField::PositionX, 1.0, 1.0));
        tweens.add(NodeId(1), &node, Tween::new(TweenField::PositionY, 1.0, 1.0));
        tweens.add(NodeId(2), &node, Tween::new(TweenField::Rotation, 1.0, 1.0));

        assert!(tweens.remove(a));
        assert!(!tweens.remove(a));
        assert_eq!(tweens.remove_node(NodeId(1)), 1);
        assert_eq!(tweens.len(), 1);
        assert_eq!(tweens.target(TweenId(2)), Some(NodeId(2)));
    }
}
