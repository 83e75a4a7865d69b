// extensions/mod.rs
//
// Time-driven animation on top of the scene graph.
// Easing curves are pure functions; tweens write node fields by name.

pub mod easing;
pub mod tween;

pub use easing::{Easing, lerp, ease};
pub use tween::{OnDone, Tween, TweenField, TweenId, TweenState};
