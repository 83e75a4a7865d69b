use std::collections::{HashMap, HashSet};
use std::path::Path;

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{Result, SceneError};
use crate::api::types::{Color, NodeId};
use crate::assets::registry::FunctionRegistry;
use crate::core::node::Node;
use crate::core::scene::Scene;

/// Persisted scene: a flat JSON array of node records.
///
/// Records are written depth-first with roots in root order, so a parent
/// always precedes its children. Loading does not rely on that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneDocument {
    pub nodes: Vec<NodeRecord>,
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `{ "x": .., "y": .. }` pair as stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VecRecord {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for VecRecord {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<VecRecord> for Vec2 {
    fn from(v: VecRecord) -> Self {
        Vec2::new(v.x, v.y)
    }
}

fn default_origin() -> VecRecord {
    VecRecord { x: 0.5, y: 0.5 }
}

fn default_thickness() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One persisted node. Texture handles are runtime resources and are not
/// stored; `children` is written for readability and ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub tag: String,
    pub pos: VecRecord,
    pub rot: f32,
    pub scale: VecRecord,
    pub size: VecRecord,
    #[serde(default = "default_origin")]
    pub origin: VecRecord,
    #[serde(default)]
    pub to: VecRecord,
    #[serde(default = "default_thickness")]
    pub tickness: f32,
    pub color: Color,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub draw_fn: Option<String>,
    #[serde(default)]
    pub update_fn: Option<String>,
    #[serde(default)]
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub children: Vec<Uuid>,
}

impl NodeRecord {
    fn from_node(node: &Node, parent: Option<Uuid>, children: Vec<Uuid>) -> Self {
        Self {
            uuid: node.uuid(),
            name: node.name.clone(),
            tag: node.tag.clone(),
            pos: node.position.into(),
            rot: node.rotation,
            scale: node.scale.into(),
            size: node.size.into(),
            origin: node.origin.into(),
            to: node.to.into(),
            tickness: node.thickness,
            color: node.color,
            visible: node.visible,
            enabled: node.enabled,
            order: node.order,
            draw_fn: node.draw.as_ref().map(|h| h.name.clone()),
            update_fn: node.update.as_ref().map(|h| h.name.clone()),
            parent,
            children,
        }
    }

    /// Build the node, resolving callback names through `registry`.
    fn to_node(&self, registry: &FunctionRegistry) -> Result<Node> {
        let mut node = Node::new()
            .with_uuid(self.uuid)
            .with_name(self.name.clone())
            .with_tag(self.tag.clone())
            .with_pos(self.pos.into())
            .with_rotation(self.rot)
            .with_scale(self.scale.into())
            .with_size(self.size.into())
            .with_origin(self.origin.into())
            .with_line(self.to.into(), self.tickness)
            .with_color(self.color)
            .with_visible(self.visible)
            .with_enabled(self.enabled)
            .with_order(self.order);
        if let Some(name) = &self.draw_fn {
            node.draw = Some(registry.resolve_draw(name)?);
        }
        if let Some(name) = &self.update_fn {
            node.update = Some(registry.resolve_update(name)?);
        }
        Ok(node)
    }
}

/// Reject duplicate identities, dangling parents and parent loops.
fn validate_links(doc: &SceneDocument) -> Result<()> {
    let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::with_capacity(doc.nodes.len());
    for record in &doc.nodes {
        if parents.insert(record.uuid, record.parent).is_some() {
            return Err(SceneError::DuplicateIdentity(record.uuid));
        }
    }

    // Identities whose ancestor chain is known to end at a root.
    let mut acyclic: HashSet<Uuid> = HashSet::with_capacity(doc.nodes.len());
    for record in &doc.nodes {
        if let Some(parent) = record.parent {
            if !parents.contains_key(&parent) {
                return Err(SceneError::UnknownParent { node: record.uuid, parent });
            }
        }

        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(record.uuid);
        while let Some(uuid) = current {
            if acyclic.contains(&uuid) {
                break;
            }
            if !seen.insert(uuid) {
                return Err(SceneError::ParentCycle(record.uuid));
            }
            chain.push(uuid);
            current = parents.get(&uuid).copied().flatten();
        }
        acyclic.extend(chain);
    }
    Ok(())
}

impl Scene {
    /// Snapshot every node reachable from the roots.
    pub fn to_document(&self) -> SceneDocument {
        let mut nodes = Vec::with_capacity(self.len());
        for &root in self.roots() {
            for id in self.descendants(root) {
                let Some(node) = self.get(id) else { continue };
                let parent = node.parent().and_then(|p| self.get(p)).map(|p| p.uuid());
                let children = node
                    .children()
                    .iter()
                    .filter_map(|&c| self.get(c).map(|n| n.uuid()))
                    .collect();
                nodes.push(NodeRecord::from_node(node, parent, children));
            }
        }
        SceneDocument { nodes }
    }

    pub fn save_json(&self) -> Result<String> {
        let doc = self.to_document();
        debug!("saving scene: {} nodes", doc.nodes.len());
        doc.to_json()
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.save_json()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Replace the scene's contents with `doc`.
    ///
    /// Every record is validated and resolved before the scene is touched,
    /// so on error the scene is left exactly as it was. Records without a
    /// parent become roots in document order; children are attached in
    /// document order. Returns the new root handles.
    pub fn load_document(&mut self, doc: &SceneDocument, registry: &FunctionRegistry) -> Result<Vec<NodeId>> {
        validate_links(doc)?;
        let built = doc
            .nodes
            .iter()
            .map(|record| record.to_node(registry))
            .collect::<Result<Vec<Node>>>()?;

        self.clear();
        let mut ids = HashMap::with_capacity(doc.nodes.len());
        for (record, node) in doc.nodes.iter().zip(built) {
            ids.insert(record.uuid, self.spawn(node));
        }

        let mut roots = Vec::new();
        for record in &doc.nodes {
            let Some(&id) = ids.get(&record.uuid) else { continue };
            match record.parent.and_then(|p| ids.get(&p).copied()) {
                Some(parent) => self.add_child(parent, id)?,
                None => {
                    self.add_node(id)?;
                    roots.push(id);
                }
            }
        }

        debug!("loaded scene: {} nodes, {} roots", doc.nodes.len(), roots.len());
        Ok(roots)
    }

    pub fn load_json(&mut self, json: &str, registry: &FunctionRegistry) -> Result<Vec<NodeId>> {
        let doc = SceneDocument::from_json(json)?;
        self.load_document(&doc, registry)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>, registry: &FunctionRegistry) -> Result<Vec<NodeId>> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_json(&json, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::NodeContext;
    use crate::core::node::UpdateHook;
    use crate::renderer::shapes;

    fn drift(ctx: &mut NodeContext<'_>, dt: f32) {
        if let Some(node) = ctx.node_mut() {
            node.translate(Vec2::new(dt, 0.0));
        }
    }

    fn registry() -> FunctionRegistry {
        let mut reg = FunctionRegistry::with_builtins();
        reg.register_update("drift", drift);
        reg
    }

    fn sample_scene() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.spawn(
            Node::new()
                .with_name("sun")
                .with_tag("star")
                .with_pos(Vec2::new(400.0, 300.0))
                .with_rotation(15.0)
                .with_order(2)
                .with_color(Color::rgb(250, 200, 0))
                .with_draw(shapes::circle())
                .with_update(UpdateHook::new("drift", drift)),
        );
        let a = scene.spawn(Node::new().with_name("a").with_pos(Vec2::new(80.0, 0.0)).with_draw(shapes::rectangle()));
        let b = scene.spawn(
            Node::new()
                .with_name("b")
                .with_line(Vec2::new(5.0, 6.0), 3.0)
                .with_visible(false)
                .with_draw(shapes::line()),
        );
        scene.add_node(root).unwrap();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        (scene, root, a, b)
    }

    #[test]
    fn round_trip_preserves_hierarchy_and_fields() {
        let (scene, _, _, _) = sample_scene();
        let json = scene.save_json().unwrap();

        let mut loaded = Scene::new();
        let roots = loaded.load_json(&json, &registry()).unwrap();
        assert_eq!(roots.len(), 1);

        let sun = loaded.get(roots[0]).unwrap();
        assert_eq!(sun.name, "sun");
        assert_eq!(sun.tag, "star");
        assert_eq!(sun.position, Vec2::new(400.0, 300.0));
        assert_eq!(sun.rotation, 15.0);
        assert_eq!(sun.order, 2);
        assert_eq!(sun.color, Color::rgb(250, 200, 0));
        assert_eq!(sun.draw.as_ref().unwrap().name, shapes::CIRCLE);
        assert_eq!(sun.update.as_ref().unwrap().name, "drift");

        let names: Vec<&str> = sun
            .children()
            .iter()
            .map(|&c| loaded.get(c).unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);

        let b = loaded.get(sun.children()[1]).unwrap();
        assert_eq!(b.to, Vec2::new(5.0, 6.0));
        assert_eq!(b.thickness, 3.0);
        assert!(!b.visible);
        assert_eq!(b.parent(), Some(roots[0]));
    }

    #[test]
    fn identities_survive_round_trip() {
        let (scene, root, a, _) = sample_scene();
        let root_uuid = scene.get(root).unwrap().uuid();
        let a_uuid = scene.get(a).unwrap().uuid();

        let mut loaded = Scene::new();
        loaded.load_json(&scene.save_json().unwrap(), &registry()).unwrap();
        let loaded_a = loaded.find_by_uuid(a_uuid).unwrap();
        let loaded_root = loaded.find_by_uuid(root_uuid).unwrap();
        assert_eq!(loaded.parent_of(loaded_a), Some(loaded_root));
    }

    #[test]
    fn saves_only_reachable_nodes_depth_first() {
        let (mut scene, root, a, _) = sample_scene();
        let grandchild = scene.spawn(Node::new().with_name("moon"));
        scene.add_child(a, grandchild).unwrap();
        scene.spawn(Node::new().with_name("loose"));

        let doc = scene.to_document();
        let names: Vec<&str> = doc.nodes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["sun", "a", "moon", "b"]);
        assert_eq!(doc.nodes[0].children.len(), 2);
        assert_eq!(doc.nodes[2].parent, Some(scene.get(a).unwrap().uuid()));
        assert_eq!(doc.nodes[0].parent, None);
        assert!(scene.get(root).is_some());
    }

    #[test]
    fn child_listed_before_parent_still_attaches() {
        let (scene, _, _, _) = sample_scene();
        let mut doc = scene.to_document();
        doc.nodes.reverse();

        let mut loaded = Scene::new();
        let roots = loaded.load_document(&doc, &registry()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(loaded.children_of(roots[0]).map(|c| c.len()), Some(2));
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"[
            {
                "uuid": "6f1c1c3e-2b8f-4c52-9a55-5a2d1c0e7b10",
                "name": "box",
                "tag": "",
                "pos": { "x": 10, "y": 20 },
                "rot": 0,
                "scale": { "x": 1, "y": 1 },
                "size": { "x": 40, "y": 30 },
                "color": { "r": 255, "g": 0, "b": 0, "a": 255 },
                "visible": true,
                "enabled": true,
                "order": 0,
                "draw_fn": "draw_rectangle",
                "update_fn": null,
                "parent": null,
                "children": []
            }
        ]"#;
        let mut scene = Scene::new();
        let roots = scene.load_json(json, &FunctionRegistry::with_builtins()).unwrap();
        let node = scene.get(roots[0]).unwrap();
        assert_eq!(node.origin, Vec2::new(0.5, 0.5));
        assert_eq!(node.to, Vec2::ZERO);
        assert_eq!(node.thickness, 1.0);
        assert!(node.update.is_none());
    }

    #[test]
    fn unknown_function_leaves_scene_untouched() {
        let (scene, _, _, _) = sample_scene();
        let json = scene.save_json().unwrap();

        let mut target = Scene::new();
        let keep = target.spawn(Node::new().with_name("keep"));
        target.add_node(keep).unwrap();

        // No "drift" update routine registered.
        let err = target.load_json(&json, &FunctionRegistry::with_builtins()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownFunction { ref name, .. } if name == "drift"));
        assert_eq!(target.len(), 1);
        assert_eq!(target.find_by_name("keep"), Some(keep));
    }

    #[test]
    fn rejects_broken_links() {
        let (scene, _, _, _) = sample_scene();
        let doc = scene.to_document();
        let reg = registry();

        let mut dangling = doc.clone();
        let ghost = Uuid::new_v4();
        dangling.nodes[1].parent = Some(ghost);
        assert!(matches!(
            Scene::new().load_document(&dangling, &reg),
            Err(SceneError::UnknownParent { parent, .. }) if parent == ghost
        ));

        let mut duplicated = doc.clone();
        duplicated.nodes[2].uuid = duplicated.nodes[1].uuid;
        assert!(matches!(
            Scene::new().load_document(&duplicated, &reg),
            Err(SceneError::DuplicateIdentity(_))
        ));

        let mut looped = doc;
        looped.nodes[0].parent = Some(looped.nodes[1].uuid);
        assert!(matches!(
            Scene::new().load_document(&looped, &reg),
            Err(SceneError::ParentCycle(_))
        ));
    }

    fn chain(len: usize) -> SceneDocument {
        let mut parent = None;
        let nodes = (0..len)
            .map(|i| {
                let record = NodeRecord::from_node(&Node::new().with_name(format!("n{i}")), parent, Vec::new());
                parent = Some(record.uuid);
                record
            })
            .collect();
        SceneDocument { nodes }
    }

    #[test]
    fn deep_chain_loads_in_order() {
        let doc = chain(2000);
        let mut scene = Scene::new();
        let roots = scene.load_document(&doc, &registry()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(scene.descendants(roots[0]).len(), 2000);
    }

    #[test]
    fn cycle_below_verified_prefix_is_caught() {
        let mut doc = chain(6);
        // Records 0..3 verify first; then 3 -> 4 -> 5 -> 3 loops.
        doc.nodes[3].parent = Some(doc.nodes[5].uuid);
        assert!(matches!(
            Scene::new().load_document(&doc, &registry()),
            Err(SceneError::ParentCycle(_))
        ));
    }

    #[test]
    fn load_replaces_existing_contents() {
        let (scene, _, _, _) = sample_scene();
        let json = scene.save_json().unwrap();

        let mut target = Scene::new();
        let old = target.spawn(Node::new());
        target.add_node(old).unwrap();
        target.schedule_tween(old, "pos.x", 1.0, 1.0, None).unwrap();

        target.load_json(&json, &registry()).unwrap();
        assert!(target.get(old).is_none());
        assert_eq!(target.tween_count(), 0);
        assert_eq!(target.roots().len(), 1);
    }

    #[test]
    fn file_round_trip() {
        let (scene, _, _, _) = sample_scene();
        let path = std::env::temp_dir().join(format!("sprig-scene-{}.json", Uuid::new_v4()));
        scene.save_to_file(&path).unwrap();

        let mut loaded = Scene::new();
        let roots = loaded.load_from_file(&path, &registry()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.get(roots[0]).unwrap().name, "sun");

        assert!(matches!(
            Scene::new().load_from_file(&path, &registry()),
            Err(SceneError::Io(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = Scene::new().load_json("{ not json", &registry()).unwrap_err();
        assert!(matches!(err, SceneError::Json(_)));
    }
}
