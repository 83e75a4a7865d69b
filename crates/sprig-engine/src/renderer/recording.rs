use glam::Vec2;

use crate::api::types::{Color, Rect, TextureHandle};
use super::traits::DrawBackend;

/// One captured backend call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Rectangle { dest: Rect, pivot: Vec2, rotation: f32, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Line { from: Vec2, to: Vec2, thickness: f32, color: Color },
    Texture {
        texture: TextureHandle,
        source: Rect,
        dest: Rect,
        pivot: Vec2,
        rotation: f32,
        tint: Color,
    },
}

/// Backend that records every call instead of rasterizing.
/// Used for headless runs and as a test double.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub commands: Vec<DrawCommand>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(64),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain the commands recorded so far.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawBackend for RecordingBackend {
    fn draw_rectangle(&mut self, dest: Rect, pivot: Vec2, rotation: f32, color: Color) {
        self.commands.push(DrawCommand::Rectangle { dest, pivot, rotation, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, thickness, color });
    }

    fn draw_texture(
        &mut self,
        texture: TextureHandle,
        source: Rect,
        dest: Rect,
        pivot: Vec2,
        rotation: f32,
        tint: Color,
    ) {
        self.commands.push(DrawCommand::Texture { texture, source, dest, pivot, rotation, tint });
    }
}
