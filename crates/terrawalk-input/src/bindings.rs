//! Key bindings for ground locomotion and the per-tick intent they produce.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use winit::keyboard::KeyCode;

use crate::keyboard::KeyboardState;

/// What the player wants this tick. Built fresh every frame from input state
/// and passed by value into the locomotion update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementIntent {
    /// Rotate counter-clockwise (seen from above).
    pub turn_left: bool,
    /// Rotate clockwise.
    pub turn_right: bool,
    /// Walk along the facing direction.
    pub move_forward: bool,
    /// Walk against the facing direction.
    pub move_backward: bool,
    /// The view-mode key went down this tick. Holding it does not repeat.
    pub toggle_view: bool,
}

impl MovementIntent {
    /// No input at all.
    pub const IDLE: Self = Self {
        turn_left: false,
        turn_right: false,
        move_forward: false,
        move_backward: false,
        toggle_view: false,
    };

    /// `true` if any movement key is held.
    pub fn is_moving(&self) -> bool {
        self.turn_left || self.turn_right || self.move_forward || self.move_backward
    }
}

/// Locomotion actions that can be bound to keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlAction {
    /// Turn left.
    TurnLeft,
    /// Turn right.
    TurnRight,
    /// Walk forward.
    MoveForward,
    /// Walk backward.
    MoveBackward,
    /// Switch between orbit and follow view.
    ToggleView,
}

impl ControlAction {
    /// Every bindable action.
    pub const ALL: [Self; 5] = [
        Self::TurnLeft,
        Self::TurnRight,
        Self::MoveForward,
        Self::MoveBackward,
        Self::ToggleView,
    ];

    /// Config name of the action (`"turn_left"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
            Self::MoveForward => "move_forward",
            Self::MoveBackward => "move_backward",
            Self::ToggleView => "toggle_view",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Keys bound to each [`ControlAction`]. Any bound key triggers the action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlBindings {
    bindings: HashMap<ControlAction, Vec<KeyCode>>,
}

impl Default for ControlBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            (ControlAction::TurnLeft, vec![KeyCode::KeyA, KeyCode::ArrowLeft]),
            (ControlAction::TurnRight, vec![KeyCode::KeyD, KeyCode::ArrowRight]),
            (ControlAction::MoveForward, vec![KeyCode::KeyW, KeyCode::ArrowUp]),
            (ControlAction::MoveBackward, vec![KeyCode::KeyS, KeyCode::ArrowDown]),
            (ControlAction::ToggleView, vec![KeyCode::KeyC]),
        ]);
        Self { bindings }
    }
}

impl ControlBindings {
    /// Keys currently bound to `action`.
    pub fn keys(&self, action: ControlAction) -> &[KeyCode] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the keys bound to `action`.
    pub fn rebind(&mut self, action: ControlAction, keys: Vec<KeyCode>) {
        self.bindings.insert(action, keys);
    }

    /// Apply `action name -> key name` overrides from config. Unknown names
    /// are logged and skipped.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (action_name, key_name) in overrides {
            let Some(action) = ControlAction::from_name(action_name) else {
                warn!(action = %action_name, "Ignoring binding for unknown action");
                continue;
            };
            let Some(key) = parse_key(key_name) else {
                warn!(action = %action_name, key = %key_name, "Ignoring binding to unknown key");
                continue;
            };
            self.rebind(action, vec![key]);
        }
    }

    /// `true` if any key bound to `action` is held.
    pub fn held(&self, keyboard: &KeyboardState, action: ControlAction) -> bool {
        self.keys(action).iter().any(|&k| keyboard.is_held(k))
    }

    /// `true` if any key bound to `action` went down this frame.
    pub fn just_pressed(&self, keyboard: &KeyboardState, action: ControlAction) -> bool {
        self.keys(action).iter().any(|&k| keyboard.just_pressed(k))
    }

    /// Resolve this frame's keyboard state into a [`MovementIntent`].
    pub fn intent(&self, keyboard: &KeyboardState) -> MovementIntent {
        MovementIntent {
            turn_left: self.held(keyboard, ControlAction::TurnLeft),
            turn_right: self.held(keyboard, ControlAction::TurnRight),
            move_forward: self.held(keyboard, ControlAction::MoveForward),
            move_backward: self.held(keyboard, ControlAction::MoveBackward),
            toggle_view: self.just_pressed(keyboard, ControlAction::ToggleView),
        }
    }
}

/// Parse a key name in winit's `KeyCode` debug spelling (`"KeyW"`, `"ArrowUp"`).
pub fn parse_key(name: &str) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    if let Some(letter) = name.strip_prefix("Key") {
        let mut chars = letter.chars();
        if let (Some(c @ 'A'..='Z'), None) = (chars.next(), chars.next()) {
            return Some(LETTERS[(c as u8 - b'A') as usize]);
        }
    }
    if let Some(digit) = name.strip_prefix("Digit") {
        let d: usize = digit.parse().ok()?;
        return DIGITS.get(d).copied();
    }
    Some(match name {
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Space" => KeyCode::Space,
        "Tab" => KeyCode::Tab,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_keyboard_idle_intent() {
        let intent = ControlBindings::default().intent(&KeyboardState::new());
        assert_eq!(intent, MovementIntent::IDLE);
        assert!(!intent.is_moving());
    }

    #[test]
    fn test_held_keys_map_to_intent() {
        let bindings = ControlBindings::default();
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyW);
        kb.press(KeyCode::ArrowLeft);
        let intent = bindings.intent(&kb);
        assert!(intent.move_forward && intent.turn_left);
        assert!(!intent.move_backward && !intent.turn_right);
        assert!(intent.is_moving());
    }

    #[test]
    fn test_toggle_is_edge_only() {
        let bindings = ControlBindings::default();
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyC);
        assert!(bindings.intent(&kb).toggle_view);
        kb.clear_transients();
        assert!(!bindings.intent(&kb).toggle_view, "Held toggle must not repeat");
    }

    #[test]
    fn test_opposite_keys_both_reported() {
        let bindings = ControlBindings::default();
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyW);
        kb.press(KeyCode::KeyS);
        let intent = bindings.intent(&kb);
        assert!(intent.move_forward && intent.move_backward);
    }

    #[test]
    fn test_overrides_rebind_and_skip_unknown() {
        let mut bindings = ControlBindings::default();
        let overrides = HashMap::from([
            ("toggle_view".to_string(), "KeyV".to_string()),
            ("jump".to_string(), "Space".to_string()),
            ("move_forward".to_string(), "NotAKey".to_string()),
        ]);
        bindings.apply_overrides(&overrides);
        assert_eq!(bindings.keys(ControlAction::ToggleView), &[KeyCode::KeyV]);
        assert_eq!(
            bindings.keys(ControlAction::MoveForward),
            &[KeyCode::KeyW, KeyCode::ArrowUp]
        );
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(parse_key("KeyQ"), Some(KeyCode::KeyQ));
        assert_eq!(parse_key("Digit7"), Some(KeyCode::Digit7));
        assert_eq!(parse_key("ArrowDown"), Some(KeyCode::ArrowDown));
        assert_eq!(parse_key("Keyq"), None);
        assert_eq!(parse_key("Digit12"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in ControlAction::ALL {
            assert_eq!(ControlAction::from_name(action.name()), Some(action));
        }
        assert_eq!(ControlAction::from_name("fly"), None);
    }
}
