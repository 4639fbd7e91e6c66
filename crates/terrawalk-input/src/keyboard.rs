//! Per-frame keyboard state keyed by physical key code.
//!
//! Physical codes keep WASD in the same place on every layout.

use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Held keys plus the press/release edges seen since the last
/// [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    /// No keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a press or release of `key`.
    pub fn apply(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // A press while already held is a repeat in disguise.
                if self.held.insert(key) {
                    self.pressed_this_frame.insert(key);
                }
            }
            ElementState::Released => {
                if self.held.remove(&key) {
                    self.released_this_frame.insert(key);
                }
            }
        }
    }

    /// Shorthand for `apply(key, Pressed)`.
    pub fn press(&mut self, key: KeyCode) {
        self.apply(key, ElementState::Pressed);
    }

    /// Shorthand for `apply(key, Released)`.
    pub fn release(&mut self, key: KeyCode) {
        self.apply(key, ElementState::Released);
    }

    /// `true` while `key` is down.
    #[must_use]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// `true` if `key` went down this frame.
    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    /// `true` if `key` came up this frame.
    #[must_use]
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Forget this frame's edges. Call once per tick after input is consumed.
    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.released_this_frame.extend(self.held.drain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let kb = KeyboardState::new();
        for key in [KeyCode::KeyW, KeyCode::KeyC, KeyCode::ArrowLeft] {
            assert!(!kb.is_held(key));
            assert!(!kb.just_pressed(key));
            assert!(!kb.just_released(key));
        }
    }

    #[test]
    fn test_press_edge_lasts_one_frame() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyC);
        assert!(kb.just_pressed(KeyCode::KeyC));
        assert!(kb.is_held(KeyCode::KeyC));
        kb.clear_transients();
        assert!(!kb.just_pressed(KeyCode::KeyC));
        assert!(kb.is_held(KeyCode::KeyC));
    }

    #[test]
    fn test_repeated_press_is_not_a_new_edge() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyW);
        kb.clear_transients();
        kb.press(KeyCode::KeyW);
        assert!(!kb.just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_release_edge() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyS);
        kb.clear_transients();
        kb.release(KeyCode::KeyS);
        assert!(kb.just_released(KeyCode::KeyS));
        assert!(!kb.is_held(KeyCode::KeyS));
        kb.clear_transients();
        assert!(!kb.just_released(KeyCode::KeyS));
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut kb = KeyboardState::new();
        kb.release(KeyCode::KeyA);
        assert!(!kb.just_released(KeyCode::KeyA));
    }

    #[test]
    fn test_release_all() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyW);
        kb.press(KeyCode::KeyA);
        kb.clear_transients();
        kb.release_all();
        assert!(!kb.is_held(KeyCode::KeyW) && !kb.is_held(KeyCode::KeyA));
        assert!(kb.just_released(KeyCode::KeyW) && kb.just_released(KeyCode::KeyA));
    }
}
