//! Keyboard input and locomotion key bindings.

pub mod bindings;
pub mod keyboard;

pub use bindings::{ControlAction, ControlBindings, MovementIntent, parse_key};
pub use keyboard::KeyboardState;
