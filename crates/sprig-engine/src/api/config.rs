use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Scene-wide settings, provided by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial node slot capacity (default: 256).
    pub node_capacity: usize,
    /// Initial active-tween capacity (default: 64).
    pub tween_capacity: usize,
    /// Maximum extra zero-dt passes per advancement used to settle instant
    /// tweens scheduled from completion callbacks (default: 16).
    pub max_settle_passes: u32,
    /// Origin given to nodes created through `Scene::spawn_default`.
    pub default_origin: Vec2,
    /// Size given to nodes created through `Scene::spawn_default`.
    pub default_size: Vec2,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            node_capacity: 256,
            tween_capacity: 64,
            max_settle_passes: 16,
            default_origin: Vec2::new(0.5, 0.5),
            default_size: Vec2::new(100.0, 50.0),
        }
    }
}

impl SceneConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
