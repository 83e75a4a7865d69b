pub mod api;
pub mod core;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::SceneConfig;
pub use api::error::{FunctionKind, Result, SceneError};
pub use api::types::{Color, NodeId, Rect, TextureHandle};
pub use core::context::NodeContext;
pub use core::math::Transform2D;
pub use core::node::{DrawFn, DrawHook, Node, UpdateFn, UpdateHook};
pub use core::scene::Scene;
pub use renderer::{DrawBackend, DrawCommand, RecordingBackend};
pub use input::queue::{InputEvent, InputProbe, InputQueue, InputState, MouseButton, NoInput};
pub use assets::document::{NodeRecord, SceneDocument};
pub use assets::registry::FunctionRegistry;

// Extensions
pub use extensions::{
    Easing, lerp, ease,
    OnDone, Tween, TweenField, TweenId, TweenState,
};
