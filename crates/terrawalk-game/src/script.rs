//! Scripted keyboard input for headless runs.
//!
//! Tick 0 taps the view toggle to enter follow view. The entity then walks
//! forward for the whole run, turning left through the second quarter and
//! right through the third. The last tick taps the toggle again to return to
//! orbit view.

use terrawalk_input::{ControlAction, ControlBindings, KeyboardState};
use winit::keyboard::KeyCode;

/// Key script over a fixed number of ticks.
#[derive(Clone, Debug)]
pub struct InputScript {
    frames: u32,
    toggle: KeyCode,
    forward: KeyCode,
    left: KeyCode,
    right: KeyCode,
}

impl InputScript {
    /// Script `frames` ticks using the first key bound to each action.
    pub fn new(frames: u32, bindings: &ControlBindings) -> Self {
        let key = |action: ControlAction, fallback: KeyCode| {
            bindings.keys(action).first().copied().unwrap_or(fallback)
        };
        Self {
            frames,
            toggle: key(ControlAction::ToggleView, KeyCode::KeyC),
            forward: key(ControlAction::MoveForward, KeyCode::KeyW),
            left: key(ControlAction::TurnLeft, KeyCode::KeyA),
            right: key(ControlAction::TurnRight, KeyCode::KeyD),
        }
    }

    /// Press and release keys for `frame`. Call after clearing the previous
    /// frame's transients and before reading the intent.
    pub fn drive(&self, frame: u32, keyboard: &mut KeyboardState) {
        let quarter = self.frames / 4;

        // A tap: pressed on this frame, released on the next.
        keyboard.release(self.toggle);
        if frame == 0 || (self.frames > 1 && frame == self.frames - 1) {
            keyboard.press(self.toggle);
        }

        set(keyboard, self.forward, frame > 0);
        set(keyboard, self.left, frame >= quarter && frame < 2 * quarter);
        set(keyboard, self.right, frame >= 2 * quarter && frame < 3 * quarter);
    }
}

fn set(keyboard: &mut KeyboardState, key: KeyCode, down: bool) {
    if down {
        keyboard.press(key);
    } else {
        keyboard.release(key);
    }
}
