// renderer/shapes.rs
//
// Built-in draw routines. Each one reads the node's freshly composed global
// transform and issues a single backend call. Hosts register their own
// routines next to these through the FunctionRegistry.

use glam::Vec2;

use crate::api::types::Rect;
use crate::core::node::{DrawHook, Node};
use super::traits::DrawBackend;

pub const RECTANGLE: &str = "draw_rectangle";
pub const CIRCLE: &str = "draw_circle";
pub const LINE: &str = "draw_line";
pub const TEXTURE: &str = "draw_texture";

/// Rendered size and pivot: both follow the global scale.
fn placement(node: &Node) -> (Rect, Vec2) {
    let pos = node.global_position();
    let size = node.size * node.global_scale();
    (Rect::new(pos.x, pos.y, size.x, size.y), node.origin * size)
}

pub fn draw_rectangle(node: &Node, backend: &mut dyn DrawBackend) {
    let (dest, pivot) = placement(node);
    backend.draw_rectangle(dest, pivot, node.global_rotation(), node.color);
}

/// Circle with diameter `size.x`, centered on the global position.
pub fn draw_circle(node: &Node, backend: &mut dyn DrawBackend) {
    let radius = node.size.x / 2.0 * node.global_scale().x;
    backend.draw_circle(node.global_position(), radius, node.color);
}

/// Segment from the global position to `node.to`. The end point is used as
/// given, not transformed.
pub fn draw_line(node: &Node, backend: &mut dyn DrawBackend) {
    backend.draw_line(node.global_position(), node.to, node.thickness, node.color);
}

/// Full texture stretched over the node's rectangle. Nodes without a texture
/// draw nothing.
pub fn draw_texture(node: &Node, backend: &mut dyn DrawBackend) {
    let Some(texture) = node.texture else { return };
    let source = Rect::new(0.0, 0.0, texture.width as f32, texture.height as f32);
    let (dest, pivot) = placement(node);
    backend.draw_texture(texture, source, dest, pivot, node.global_rotation(), node.color);
}

pub fn rectangle() -> DrawHook {
    DrawHook::new(RECTANGLE, draw_rectangle)
}

pub fn circle() -> DrawHook {
    DrawHook::new(CIRCLE, draw_circle)
}

pub fn line() -> DrawHook {
    DrawHook::new(LINE, draw_line)
}

pub fn texture() -> DrawHook {
    DrawHook::new(TEXTURE, draw_texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Color, TextureHandle};
    use crate::renderer::recording::{DrawCommand, RecordingBackend};

    #[test]
    fn rectangle_pivot_follows_scale() {
        let node = Node::new()
            .with_pos(Vec2::new(10.0, 20.0))
            .with_size(Vec2::new(100.0, 50.0))
            .with_scale(Vec2::new(2.0, 1.0))
            .with_color(Color::BLUE);
        let mut backend = RecordingBackend::new();
        draw_rectangle(&node, &mut backend);

        assert_eq!(
            backend.commands[0],
            DrawCommand::Rectangle {
                dest: Rect::new(10.0, 20.0, 200.0, 50.0),
                pivot: Vec2::new(100.0, 25.0),
                rotation: 0.0,
                color: Color::BLUE,
            }
        );
    }

    #[test]
    fn circle_radius_is_half_width() {
        let node = Node::new().with_size(Vec2::new(40.0, 10.0)).with_scale(Vec2::splat(1.5));
        let mut backend = RecordingBackend::new();
        draw_circle(&node, &mut backend);
        assert!(matches!(backend.commands[0], DrawCommand::Circle { radius, .. } if radius == 30.0));
    }

    #[test]
    fn line_end_is_untransformed() {
        let node = Node::new().with_pos(Vec2::new(1.0, 1.0)).with_line(Vec2::new(9.0, 9.0), 4.0);
        let mut backend = RecordingBackend::new();
        draw_line(&node, &mut backend);
        assert!(matches!(
            backend.commands[0],
            DrawCommand::Line { from, to, thickness, .. }
                if from == Vec2::ONE && to == Vec2::splat(9.0) && thickness == 4.0
        ));
    }

    #[test]
    fn texture_uses_full_source() {
        let mut backend = RecordingBackend::new();
        draw_texture(&Node::new(), &mut backend);
        assert!(backend.is_empty());

        let node = Node::new().with_texture(TextureHandle::new(3, 256, 128));
        draw_texture(&node, &mut backend);
        assert!(matches!(
            backend.commands[0],
            DrawCommand::Texture { source, .. } if source == Rect::new(0.0, 0.0, 256.0, 128.0)
        ));
    }
}
