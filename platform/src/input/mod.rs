//! OS input into the frame's [`InputFrame`]
//!
//! Keyboard and mouse arrive as window events and are applied as they come.
//! Gamepads are sampled once per tick.

#[cfg(feature = "gamepad")]
mod gamepad;
mod keyboard;

#[cfg(feature = "gamepad")]
pub use gamepad::GamepadInput;
pub use keyboard::{KeyAction, KeyMap};

use handmade_core::input::process_keyboard_event;
use handmade_shared::{InputFrame, MOUSE_BUTTON_COUNT};
use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Analog stick deadzone, as a fraction of full travel.
pub const STICK_DEADZONE: f32 = 0.24;

/// Platform-level requests raised by key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCommand {
    TogglePause,
    ToggleReplay,
}

/// Keyboard and mouse state for the keyboard controller slot.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    keymap: KeyMap,
}

impl KeyboardInput {
    pub fn new(keymap: KeyMap) -> Self {
        Self { keymap }
    }

    /// Apply a key event to `new`. Platform commands fire on the initial
    /// press only.
    pub fn handle_key(
        &self,
        new: &mut InputFrame,
        key: KeyCode,
        is_down: bool,
        repeat: bool,
    ) -> Option<PlatformCommand> {
        match self.keymap.action(key)? {
            KeyAction::Button(button) => {
                process_keyboard_event(new.keyboard_mut().buttons.button_mut(button), is_down);
                None
            }
            KeyAction::TogglePause if is_down && !repeat => Some(PlatformCommand::TogglePause),
            KeyAction::ToggleReplay if is_down && !repeat => Some(PlatformCommand::ToggleReplay),
            _ => None,
        }
    }

    pub fn handle_cursor(&self, new: &mut InputFrame, x: f64, y: f64) {
        new.mouse_x = x as i32;
        new.mouse_y = y as i32;
    }

    pub fn handle_mouse_button(&self, new: &mut InputFrame, button: MouseButton, is_down: bool) {
        if let Some(index) = mouse_button_index(button) {
            process_keyboard_event(&mut new.mouse_buttons[index], is_down);
        }
    }

    pub fn handle_wheel(&self, new: &mut InputFrame, delta: MouseScrollDelta) {
        new.mouse_z += match delta {
            MouseScrollDelta::LineDelta(_, y) => y as i32,
            MouseScrollDelta::PixelDelta(position) => position.y as i32,
        };
    }
}

fn mouse_button_index(button: MouseButton) -> Option<usize> {
    let index = match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::Back => 3,
        MouseButton::Forward => 4,
        MouseButton::Other(_) => return None,
    };
    (index < MOUSE_BUTTON_COUNT).then_some(index)
}
