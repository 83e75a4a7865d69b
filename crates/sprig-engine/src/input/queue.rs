use std::collections::HashSet;

use glam::Vec2;

/// Mouse / pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input event types the engine understands.
/// Generic, with no application-specific semantics.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// A button was pressed at screen coordinates (x, y).
    PointerDown { button: MouseButton, x: f32, y: f32 },
    /// A button was released at screen coordinates (x, y).
    PointerUp { button: MouseButton, x: f32, y: f32 },
    /// The cursor moved to screen coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed (repeats arrive as further `KeyDown`s).
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
}

/// A queue of input events.
/// The host pushes events as its window layer reports them; they are drained
/// once per frame into an [`InputState`].
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Input queries available to update routines.
/// The scene never consults input itself; it only forwards the probe.
pub trait InputProbe {
    /// Key is currently held.
    fn is_key_down(&self, key_code: u32) -> bool;
    /// Key went down during the current frame.
    fn is_key_pressed(&self, key_code: u32) -> bool;
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;
    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool;
    fn mouse_position(&self) -> Vec2;
}

/// Probe that reports no input at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputProbe for NoInput {
    fn is_key_down(&self, _key_code: u32) -> bool {
        false
    }

    fn is_key_pressed(&self, _key_code: u32) -> bool {
        false
    }

    fn is_mouse_button_down(&self, _button: MouseButton) -> bool {
        false
    }

    fn is_mouse_button_pressed(&self, _button: MouseButton) -> bool {
        false
    }

    fn mouse_position(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Held/pressed state folded from queued events, one frame at a time.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<u32>,
    keys_pressed: HashSet<u32>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: forget last frame's presses, then apply `events`.
    pub fn begin_frame(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        for event in events {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { button, x, y } => {
                self.pointer = Vec2::new(x, y);
                if self.buttons_down.insert(button) {
                    self.buttons_pressed.insert(button);
                }
            }
            InputEvent::PointerUp { button, x, y } => {
                self.pointer = Vec2::new(x, y);
                self.buttons_down.remove(&button);
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
            InputEvent::KeyDown { key_code } => {
                if self.keys_down.insert(key_code) {
                    self.keys_pressed.insert(key_code);
                }
            }
            InputEvent::KeyUp { key_code } => {
                self.keys_down.remove(&key_code);
            }
        }
    }
}

impl InputProbe for InputState {
    fn is_key_down(&self, key_code: u32) -> bool {
        self.keys_down.contains(&key_code)
    }

    fn is_key_pressed(&self, key_code: u32) -> bool {
        self.keys_pressed.contains(&key_code)
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    fn mouse_position(&self) -> Vec2 {
        self.pointer
    }
}
