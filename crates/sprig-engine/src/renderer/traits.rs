//! Draw backend contract.
//!
//! The engine never talks to a graphics API directly. Draw routines attached
//! to nodes translate node state into these primitive calls, and the host
//! implements the trait on top of whatever window/render layer it uses.

use glam::Vec2;

use crate::api::types::{Color, Rect, TextureHandle};

/// Primitive drawing capability supplied by the host.
///
/// Rotations are in degrees. `pivot` is the rotation/placement point
/// measured from the top-left corner of `dest`, in screen units.
///
/// # Example Implementation
///
/// ```ignore
/// struct WindowBackend<'w> {
///     frame: &'w mut Frame,
/// }
///
/// impl DrawBackend for WindowBackend<'_> {
///     fn draw_rectangle(&mut self, dest: Rect, pivot: Vec2, rotation: f32, color: Color) {
///         self.frame.fill_rotated_rect(dest, pivot, rotation, color);
///     }
///     // ...
/// }
/// ```
pub trait DrawBackend {
    /// Filled rectangle placed with its pivot at `(dest.x, dest.y)`.
    fn draw_rectangle(&mut self, dest: Rect, pivot: Vec2, rotation: f32, color: Color);

    /// Filled circle.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Line segment of the given thickness.
    fn draw_line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color);

    /// Textured quad: `source` in texture pixels, `dest` placed like a rectangle.
    fn draw_texture(
        &mut self,
        texture: TextureHandle,
        source: Rect,
        dest: Rect,
        pivot: Vec2,
        rotation: f32,
        tint: Color,
    );
}
