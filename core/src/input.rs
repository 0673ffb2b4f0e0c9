//! Double-buffered input
//!
//! Two [`InputFrame`]s live in a fixed arena. Each tick the platform writes
//! into the "new" slot while the "old" slot holds last tick's snapshot, then
//! [`DoubleBufferedInput::swap`] flips the roles.

use handmade_shared::{Button, ButtonState, ControllerSnapshot, InputFrame, KEYBOARD_CONTROLLER};

/// Stick magnitude past which a stick also drives the move buttons.
pub const STICK_BUTTON_THRESHOLD: f32 = 0.5;

/// Two alternating input snapshots.
#[derive(Debug, Clone, Default)]
pub struct DoubleBufferedInput {
    frames: [InputFrame; 2],
    current: usize,
}

impl DoubleBufferedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot being built for this tick.
    pub fn new_frame(&self) -> &InputFrame {
        &self.frames[self.current]
    }

    pub fn new_frame_mut(&mut self) -> &mut InputFrame {
        &mut self.frames[self.current]
    }

    /// Last tick's snapshot.
    pub fn old_frame(&self) -> &InputFrame {
        &self.frames[self.current ^ 1]
    }

    /// Both snapshots at once: `(old, new)`.
    pub fn split_mut(&mut self) -> (&InputFrame, &mut InputFrame) {
        let [first, second] = &mut self.frames;
        if self.current == 0 {
            (second, first)
        } else {
            (first, second)
        }
    }

    /// Prepare the new snapshot before any OS events are pumped into it.
    ///
    /// Every button keeps its `ended_down` from the old snapshot and starts
    /// with zero transitions. The keyboard slot is always connected and
    /// never analog.
    pub fn begin_frame(&mut self) {
        let (old, new) = self.split_mut();
        for (old_pad, new_pad) in old.controllers.iter().zip(new.controllers.iter_mut()) {
            carry_buttons(old_pad, new_pad);
        }
        for (old_button, new_button) in old.mouse_buttons.iter().zip(new.mouse_buttons.iter_mut()) {
            *new_button = carried(old_button);
        }
        new.mouse_x = old.mouse_x;
        new.mouse_y = old.mouse_y;
        new.mouse_z = 0;

        let keyboard = &mut new.controllers[KEYBOARD_CONTROLLER];
        keyboard.is_connected = true;
        keyboard.is_analog = false;
    }

    /// Hand this tick's snapshot over as next tick's "old".
    pub fn swap(&mut self) {
        self.current ^= 1;
    }
}

fn carried(old: &ButtonState) -> ButtonState {
    ButtonState {
        half_transition_count: 0,
        ended_down: old.ended_down,
    }
}

fn carry_buttons(old: &ControllerSnapshot, new: &mut ControllerSnapshot) {
    for button in Button::ALL {
        *new.buttons.button_mut(button) = carried(old.buttons.button(button));
    }
    new.is_connected = old.is_connected;
    new.is_analog = old.is_analog;
    new.stick_average_x = old.stick_average_x;
    new.stick_average_y = old.stick_average_y;
}

/// Apply a keyboard key event. Auto-repeat events that don't change the
/// state are ignored.
pub fn process_keyboard_event(state: &mut ButtonState, is_down: bool) {
    if state.ended_down != is_down {
        state.ended_down = is_down;
        state.half_transition_count += 1;
    }
}

/// Apply a polled digital button, counting an edge against the old snapshot.
pub fn process_digital_button(old: &ButtonState, new: &mut ButtonState, is_down: bool) {
    new.ended_down = is_down;
    new.half_transition_count = u32::from(old.ended_down != is_down);
}

/// Rescale a raw stick axis in `-1.0..=1.0` so the deadzone maps to zero.
pub fn process_stick_value(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let magnitude = (value.abs() - deadzone) / (1.0 - deadzone);
        value.signum() * magnitude.clamp(0.0, 1.0)
    }
}

/// Gamepad state sampled once per tick, before mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadReading {
    pub stick_x: f32,
    /// Up is positive
    pub stick_y: f32,
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub action_up: bool,
    pub action_down: bool,
    pub action_left: bool,
    pub action_right: bool,
    pub left_shoulder: bool,
    pub right_shoulder: bool,
    pub back: bool,
    pub start: bool,
}

/// Map a gamepad reading onto a controller slot.
///
/// The D-pad overrides the stick and marks the controller digital. A stick
/// pushed past [`STICK_BUTTON_THRESHOLD`] also drives the move buttons.
pub fn apply_gamepad_reading(
    old: &ControllerSnapshot,
    new: &mut ControllerSnapshot,
    reading: &GamepadReading,
    deadzone: f32,
) {
    new.is_connected = true;
    new.stick_average_x = process_stick_value(reading.stick_x, deadzone);
    new.stick_average_y = process_stick_value(reading.stick_y, deadzone);
    new.is_analog = new.stick_average_x != 0.0 || new.stick_average_y != 0.0;

    if reading.dpad_up {
        new.stick_average_y = 1.0;
        new.is_analog = false;
    }
    if reading.dpad_down {
        new.stick_average_y = -1.0;
        new.is_analog = false;
    }
    if reading.dpad_left {
        new.stick_average_x = -1.0;
        new.is_analog = false;
    }
    if reading.dpad_right {
        new.stick_average_x = 1.0;
        new.is_analog = false;
    }

    let digital = [
        (Button::MoveUp, new.stick_average_y > STICK_BUTTON_THRESHOLD),
        (Button::MoveDown, new.stick_average_y < -STICK_BUTTON_THRESHOLD),
        (Button::MoveLeft, new.stick_average_x < -STICK_BUTTON_THRESHOLD),
        (Button::MoveRight, new.stick_average_x > STICK_BUTTON_THRESHOLD),
        (Button::ActionUp, reading.action_up),
        (Button::ActionDown, reading.action_down),
        (Button::ActionLeft, reading.action_left),
        (Button::ActionRight, reading.action_right),
        (Button::LeftShoulder, reading.left_shoulder),
        (Button::RightShoulder, reading.right_shoulder),
        (Button::Back, reading.back),
        (Button::Start, reading.start),
    ];
    for (button, is_down) in digital {
        process_digital_button(old.buttons.button(button), new.buttons.button_mut(button), is_down);
    }
}

/// Mark a slot as disconnected, releasing every button.
pub fn disconnect_controller(old: &ControllerSnapshot, new: &mut ControllerSnapshot) {
    for button in Button::ALL {
        process_digital_button(old.buttons.button(button), new.buttons.button_mut(button), false);
    }
    new.is_connected = false;
    new.is_analog = false;
    new.stick_average_x = 0.0;
    new.stick_average_y = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Edge detection
    // ============================================================================

    #[test]
    fn test_press_counts_one_transition() {
        let old = ButtonState::default();
        let mut new = ButtonState::default();
        process_digital_button(&old, &mut new, true);
        assert!(new.ended_down);
        assert_eq!(new.half_transition_count, 1);
    }

    #[test]
    fn test_identical_snapshots_count_zero() {
        let mut input = DoubleBufferedInput::new();
        for _ in 0..2 {
            input.begin_frame();
            let (old, new) = input.split_mut();
            process_digital_button(
                &old.controllers[1].buttons.start,
                &mut new.controllers[1].buttons.start,
                true,
            );
            input.swap();
        }
        // the second tick's snapshot is now "old"
        let second = input.old_frame();
        assert!(second.controllers[1].buttons.start.ended_down);
        assert_eq!(second.controllers[1].buttons.start.half_transition_count, 0);
    }

    #[test]
    fn test_keyboard_repeat_is_ignored() {
        let mut state = ButtonState::default();
        process_keyboard_event(&mut state, true);
        process_keyboard_event(&mut state, true);
        assert_eq!(state.half_transition_count, 1);
        process_keyboard_event(&mut state, false);
        assert_eq!(state.half_transition_count, 2);
        assert!(!state.ended_down);
    }

    // ============================================================================
    // Buffer swapping
    // ============================================================================

    #[test]
    fn test_begin_frame_carries_ended_down() {
        let mut input = DoubleBufferedInput::new();
        input.begin_frame();
        process_keyboard_event(&mut input.new_frame_mut().keyboard_mut().buttons.move_left, true);
        input.swap();

        input.begin_frame();
        let keyboard = input.new_frame().keyboard();
        assert!(keyboard.buttons.move_left.ended_down);
        assert_eq!(keyboard.buttons.move_left.half_transition_count, 0);
        assert!(keyboard.is_connected);
        assert!(!keyboard.is_analog);
    }

    #[test]
    fn test_swap_alternates_slots() {
        let mut input = DoubleBufferedInput::new();
        input.new_frame_mut().mouse_x = 10;
        input.swap();
        assert_eq!(input.old_frame().mouse_x, 10);
        input.new_frame_mut().mouse_x = 20;
        input.swap();
        assert_eq!(input.old_frame().mouse_x, 20);
        assert_eq!(input.new_frame().mouse_x, 10);
    }

    // ============================================================================
    // Gamepad mapping
    // ============================================================================

    #[test]
    fn test_stick_deadzone() {
        assert_eq!(process_stick_value(0.1, 0.2), 0.0);
        assert!((process_stick_value(1.0, 0.2) - 1.0).abs() < 1e-6);
        assert!((process_stick_value(-0.6, 0.2) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dpad_overrides_stick() {
        let old = ControllerSnapshot::default();
        let mut new = ControllerSnapshot::default();
        let reading = GamepadReading {
            stick_x: 0.9,
            dpad_left: true,
            ..Default::default()
        };
        apply_gamepad_reading(&old, &mut new, &reading, 0.1);
        assert_eq!(new.stick_average_x, -1.0);
        assert!(!new.is_analog);
        assert!(new.buttons.move_left.ended_down);
        assert!(!new.buttons.move_right.ended_down);
    }

    #[test]
    fn test_analog_stick_drives_move_buttons() {
        let old = ControllerSnapshot::default();
        let mut new = ControllerSnapshot::default();
        let reading = GamepadReading {
            stick_y: 0.95,
            action_down: true,
            ..Default::default()
        };
        apply_gamepad_reading(&old, &mut new, &reading, 0.1);
        assert!(new.is_connected);
        assert!(new.is_analog);
        assert!(new.buttons.move_up.ended_down);
        assert_eq!(new.buttons.move_up.half_transition_count, 1);
        assert!(new.buttons.action_down.ended_down);
    }

    #[test]
    fn test_disconnect_releases_buttons() {
        let mut old = ControllerSnapshot::default();
        old.is_connected = true;
        old.buttons.start.ended_down = true;
        let mut new = old;
        disconnect_controller(&old, &mut new);
        assert!(!new.is_connected);
        assert!(!new.buttons.start.ended_down);
        assert_eq!(new.buttons.start.half_transition_count, 1);
    }
}
