//! Input handling for the field window.
//!
//! [`Input`] sits between raw winit events and the app. It tracks the
//! pointer in window pixels, the viewport size, mouse drags and wheel
//! motion, plus the keys the app reacts to. Per-frame state (keys just
//! pressed, drag and scroll deltas) is cleared by `begin_frame`.
//!
//! Key bindings resolve to [`Command`]s:
//!
//! | key       | command                         |
//! |-----------|---------------------------------|
//! | 1 to 5    | `Select(kind)` in [`GeometryKind::ALL`] order |
//! | C         | `Clear`                         |
//! | Escape    | `Quit`                          |

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::geometry::GeometryKind;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(button: WinitMouseButton) -> Option<Self> {
        match button {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Keys the field app listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    C,
    Escape,
}

impl KeyCode {
    fn from_winit(key: WinitKeyCode) -> Option<Self> {
        match key {
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => Some(KeyCode::Key1),
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => Some(KeyCode::Key2),
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => Some(KeyCode::Key3),
            WinitKeyCode::Digit4 | WinitKeyCode::Numpad4 => Some(KeyCode::Key4),
            WinitKeyCode::Digit5 | WinitKeyCode::Numpad5 => Some(KeyCode::Key5),
            WinitKeyCode::KeyC => Some(KeyCode::C),
            WinitKeyCode::Escape => Some(KeyCode::Escape),
            _ => None,
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clear the field and rebuild it from this geometry.
    Select(GeometryKind),
    /// Clear the field.
    Clear,
    /// Release the frame loop and close the window.
    Quit,
}

impl Command {
    pub fn from_key(key: KeyCode) -> Self {
        match key {
            KeyCode::Key1 => Command::Select(GeometryKind::ALL[0]),
            KeyCode::Key2 => Command::Select(GeometryKind::ALL[1]),
            KeyCode::Key3 => Command::Select(GeometryKind::ALL[2]),
            KeyCode::Key4 => Command::Select(GeometryKind::ALL[3]),
            KeyCode::Key5 => Command::Select(GeometryKind::ALL[4]),
            KeyCode::C => Command::Clear,
            KeyCode::Escape => Command::Quit,
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    /// Keys that went down this frame, in press order.
    keys_pressed: Vec<KeyCode>,

    mouse_held: HashSet<MouseButton>,

    pointer: Option<Vec2>,
    pointer_moved: bool,
    drag_delta: Vec2,
    scroll_delta: f32,

    viewport: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self {
            viewport: Vec2::new(800.0, 600.0),
            ..Default::default()
        }
    }

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Last pointer position in window pixels. `None` until the pointer
    /// enters the window, and again after it leaves.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Whether the pointer moved, entered or left this frame.
    pub fn pointer_moved(&self) -> bool {
        self.pointer_moved
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Pointer motion this frame while a mouse button was held, in pixels.
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    /// Scroll wheel delta this frame. Positive values indicate scrolling up.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Commands for the keys pressed this frame, in press order.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.keys_pressed.iter().map(|&key| Command::from_key(key))
    }

    /// Called at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.pointer_moved = false;
        self.drag_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = KeyCode::from_winit(code) {
                        match event.state {
                            ElementState::Pressed => self.press_key(key),
                            ElementState::Released => self.release_key(key),
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = MouseButton::from_winit(*button) {
                    match state {
                        ElementState::Pressed => {
                            self.mouse_held.insert(button);
                        }
                        ElementState::Released => {
                            self.mouse_held.remove(&button);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                self.pointer_moved = true;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }

            WindowEvent::Resized(size) => self.set_viewport(size.width, size.height),

            _ => {}
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        // Only fire pressed event if not already held (no repeat)
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    fn move_pointer(&mut self, position: Vec2) {
        if let Some(previous) = self.pointer {
            if !self.mouse_held.is_empty() {
                self.drag_delta += position - previous;
            }
        }
        self.pointer = Some(position);
        self.pointer_moved = true;
    }
}
