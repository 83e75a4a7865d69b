use std::collections::HashMap;

use crate::api::error::{FunctionKind, Result, SceneError};
use crate::core::node::{DrawFn, DrawHook, UpdateFn, UpdateHook};
use crate::renderer::shapes;

/// Registry of named draw and update routines.
/// Resolves the function names stored in scene documents back to code.
pub struct FunctionRegistry {
    draw: HashMap<String, DrawFn>,
    update: HashMap<String, UpdateFn>,
}

impl FunctionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            draw: HashMap::new(),
            update: HashMap::new(),
        }
    }

    /// Registry pre-filled with the built-in shape routines.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register_draw(shapes::RECTANGLE, shapes::draw_rectangle);
        reg.register_draw(shapes::CIRCLE, shapes::draw_circle);
        reg.register_draw(shapes::LINE, shapes::draw_line);
        reg.register_draw(shapes::TEXTURE, shapes::draw_texture);
        reg
    }

    /// Register a draw routine. An existing entry with the same name is replaced.
    pub fn register_draw(&mut self, name: impl Into<String>, func: DrawFn) {
        self.draw.insert(name.into(), func);
    }

    /// Register an update routine. An existing entry with the same name is replaced.
    pub fn register_update(&mut self, name: impl Into<String>, func: UpdateFn) {
        self.update.insert(name.into(), func);
    }

    /// Look up a draw routine by name. Returns None if not found.
    pub fn draw(&self, name: &str) -> Option<DrawHook> {
        self.draw.get(name).map(|&func| DrawHook::new(name, func))
    }

    /// Look up an update routine by name. Returns None if not found.
    pub fn update(&self, name: &str) -> Option<UpdateHook> {
        self.update.get(name).map(|&func| UpdateHook::new(name, func))
    }

    pub(crate) fn resolve_draw(&self, name: &str) -> Result<DrawHook> {
        self.draw(name).ok_or_else(|| SceneError::UnknownFunction {
            kind: FunctionKind::Draw,
            name: name.to_string(),
        })
    }

    pub(crate) fn resolve_update(&self, name: &str) -> Result<UpdateHook> {
        self.update(name).ok_or_else(|| SceneError::UnknownFunction {
            kind: FunctionKind::Update,
            name: name.to_string(),
        })
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
