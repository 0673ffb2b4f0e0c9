//! Keyboard bindings

use handmade_shared::Button;
use hashbrown::HashMap;
use winit::keyboard::KeyCode;

/// What a key does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Drives a button on the keyboard controller
    Button(Button),
    TogglePause,
    ToggleReplay,
}

/// Physical key to action table.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, KeyAction>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = [
            (KeyCode::KeyW, KeyAction::Button(Button::MoveUp)),
            (KeyCode::KeyS, KeyAction::Button(Button::MoveDown)),
            (KeyCode::KeyA, KeyAction::Button(Button::MoveLeft)),
            (KeyCode::KeyD, KeyAction::Button(Button::MoveRight)),
            (KeyCode::ArrowUp, KeyAction::Button(Button::ActionUp)),
            (KeyCode::ArrowDown, KeyAction::Button(Button::ActionDown)),
            (KeyCode::ArrowLeft, KeyAction::Button(Button::ActionLeft)),
            (KeyCode::ArrowRight, KeyAction::Button(Button::ActionRight)),
            (KeyCode::KeyQ, KeyAction::Button(Button::LeftShoulder)),
            (KeyCode::KeyE, KeyAction::Button(Button::RightShoulder)),
            (KeyCode::Space, KeyAction::Button(Button::Start)),
            (KeyCode::Escape, KeyAction::Button(Button::Back)),
            (KeyCode::KeyP, KeyAction::TogglePause),
            (KeyCode::KeyL, KeyAction::ToggleReplay),
        ];
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

impl KeyMap {
    pub fn action(&self, key: KeyCode) -> Option<KeyAction> {
        self.bindings.get(&key).copied()
    }

    pub fn bind(&mut self, key: KeyCode, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}
