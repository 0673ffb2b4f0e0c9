//! Gamepad polling through gilrs

use gilrs::{Axis, Gamepad, GamepadId, Gilrs};
use handmade_core::GamepadReading;
use handmade_core::input::{apply_gamepad_reading, disconnect_controller};
use handmade_shared::{CONTROLLER_COUNT, InputFrame, KEYBOARD_CONTROLLER};
use hashbrown::HashMap;
use tracing::{info, warn};

use super::STICK_DEADZONE;

/// Gamepads mapped onto controller slots after the keyboard's.
pub struct GamepadInput {
    gilrs: Gilrs,
    slots: HashMap<GamepadId, usize>,
}

impl GamepadInput {
    /// `None` if the platform has no gamepad support.
    pub fn new() -> Option<Self> {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(e) => {
                warn!("Gamepad support unavailable: {}", e);
                return None;
            }
        };
        let mut input = Self {
            gilrs,
            slots: HashMap::new(),
        };
        let present: Vec<GamepadId> = input.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in present {
            input.connect(id);
        }
        Some(input)
    }

    fn connect(&mut self, id: GamepadId) {
        if self.slots.contains_key(&id) {
            return;
        }
        let free = (0..CONTROLLER_COUNT)
            .filter(|&slot| slot != KEYBOARD_CONTROLLER)
            .find(|slot| !self.slots.values().any(|s| s == slot));
        match free {
            Some(slot) => {
                info!("Gamepad {} connected as controller {}", id, slot);
                self.slots.insert(id, slot);
            }
            None => warn!("Gamepad {} connected but every controller slot is taken", id),
        }
    }

    /// Drain connection events and sample every mapped gamepad into `new`.
    pub fn poll(&mut self, old: &InputFrame, new: &mut InputFrame) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => self.connect(event.id),
                gilrs::EventType::Disconnected => {
                    if let Some(slot) = self.slots.remove(&event.id) {
                        info!("Gamepad {} (controller {}) disconnected", event.id, slot);
                        disconnect_controller(&old.controllers[slot], &mut new.controllers[slot]);
                    }
                }
                _ => {}
            }
        }

        for (&id, &slot) in &self.slots {
            let reading = read_gamepad(&self.gilrs.gamepad(id));
            apply_gamepad_reading(
                &old.controllers[slot],
                &mut new.controllers[slot],
                &reading,
                STICK_DEADZONE,
            );
        }
    }
}

fn read_gamepad(gamepad: &Gamepad<'_>) -> GamepadReading {
    use gilrs::Button;
    let btn = |button: Button| gamepad.is_pressed(button);

    GamepadReading {
        stick_x: gamepad.value(Axis::LeftStickX),
        // gilrs already reports up as positive
        stick_y: gamepad.value(Axis::LeftStickY),
        dpad_up: btn(Button::DPadUp),
        dpad_down: btn(Button::DPadDown),
        dpad_left: btn(Button::DPadLeft),
        dpad_right: btn(Button::DPadRight),
        action_up: btn(Button::North),
        action_down: btn(Button::South),
        action_left: btn(Button::West),
        action_right: btn(Button::East),
        left_shoulder: btn(Button::LeftTrigger),
        right_shoulder: btn(Button::RightTrigger),
        back: btn(Button::Select),
        start: btn(Button::Start),
    }
}
